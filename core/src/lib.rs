//! Kiln core - platform-independent pieces of the real-time loop
//!
//! This crate contains everything that does not touch an OS facility
//! directly: input reduction, audio write-size pacing, frame pacing, the
//! pixel buffer, configuration, and the update-call boundary. The `kiln-shell`
//! crate supplies the windowing, audio-device, and joystick backends.

pub mod audio;
pub mod config;
pub mod game;
pub mod input;
pub mod surface;
pub mod timing;

pub use audio::{AudioBlock, AudioPacer, PlaybackQueue, SubmitError};
pub use config::Config;
pub use game::Game;
pub use input::{ButtonState, ControllerSnapshot, InputFrame, InputReducer, PadEvent, VirtualButton};
pub use surface::PixelSurface;
pub use timing::FrameGovernor;
