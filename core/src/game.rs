//! The update-call boundary

use crate::audio::AudioBlock;
use crate::input::InputFrame;
use crate::surface::PixelSurface;

/// One opaque per-frame update.
///
/// The loop invokes this exactly once per iteration with the finished input
/// snapshot, the pixel buffer, and this iteration's audio request. The
/// implementation writes pixels and samples in place; the borrows cannot
/// outlive the call.
pub trait Game {
    fn update(&mut self, input: &InputFrame, video: &mut PixelSurface, audio: &mut AudioBlock<'_>);
}
