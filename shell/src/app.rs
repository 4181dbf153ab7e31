//! The event loop: one window, one audio stream, one game
//!
//! Per iteration: window events drain first (possibly resizing the pixel
//! buffer), then joystick events fold into the input snapshot, then the
//! audio write is sized, the game updates, samples are submitted, the pixel
//! buffer is presented, the governor paces to the target period, and the
//! input frames swap. Everything runs on the event loop thread; the only
//! other thread is the audio device callback behind its ring buffer.

use std::sync::Arc;

use anyhow::{Context, Result};
use hashbrown::HashMap;
use kiln_core::{AudioPacer, Config, FrameGovernor, Game, InputReducer, PixelSurface, VirtualButton};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::audio::CpalPlaybackQueue;
use crate::gamepad::GamepadPoller;
use crate::graphics::Presenter;

/// Iterations between periodic frame statistics logs.
const STATS_INTERVAL: u64 = 300;

/// Run `game` under the platform loop until the window is closed.
pub fn run<G: Game>(config: Config, game: G) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;

    let mut app = ShellApp::new(config, game);
    event_loop
        .run_app(&mut app)
        .context("Event loop terminated abnormally")?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct ShellApp<G: Game> {
    config: Config,
    game: G,

    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    surface: PixelSurface,

    reducer: InputReducer,
    keymap: HashMap<KeyCode, VirtualButton>,
    gamepad: GamepadPoller,

    pacer: AudioPacer<CpalPlaybackQueue>,
    governor: FrameGovernor,

    frame_count: u64,
    error: Option<anyhow::Error>,
}

impl<G: Game> ShellApp<G> {
    fn new(config: Config, game: G) -> Self {
        let keymap = config.input.keyboard.resolve();
        let pacer = AudioPacer::new(config.audio.samples_per_second, config.audio.pace_hz);
        let governor = FrameGovernor::for_update_hz(config.video.update_hz);

        let mut reducer = InputReducer::new();
        reducer.begin_frame();

        Self {
            config,
            game,
            window: None,
            presenter: None,
            surface: PixelSurface::default(),
            reducer,
            keymap,
            gamepad: GamepadPoller::new(),
            pacer,
            governor,
            frame_count: 0,
            error: None,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("Kiln")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.video.width,
                self.config.video.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );

        let presenter = Presenter::new(window.clone())?;
        let size = window.inner_size();
        self.surface.resize(size.width.max(1), size.height.max(1));

        self.window = Some(window);
        self.presenter = Some(presenter);
        Ok(())
    }

    fn init_audio(&mut self) {
        match CpalPlaybackQueue::new(
            self.config.audio.samples_per_second,
            self.config.audio.pace_hz,
        ) {
            Ok(queue) => {
                // The device may have negotiated a different rate than the
                // config asked for; the pacer plans against the real one.
                self.pacer = AudioPacer::new(queue.sample_rate(), self.config.audio.pace_hz);
                self.pacer.open(queue);
            }
            Err(err) => {
                tracing::warn!("Failed to open audio device: {}. Running silent.", err);
            }
        }
    }

    fn run_iteration(&mut self) -> Result<()> {
        let Some(presenter) = &mut self.presenter else {
            return Ok(());
        };

        // Joystick events: a finite drain, empty when no device is present.
        let reducer = &mut self.reducer;
        self.gamepad.poll(|event| reducer.pad_event(event));

        // Size this iteration's audio write from the device delay, hand the
        // borrowed views to the update call, then submit what it produced.
        let frames = self.pacer.plan();
        {
            let mut block = self.pacer.block(frames);
            self.game
                .update(self.reducer.frame(), &mut self.surface, &mut block);
        }
        self.pacer.commit(frames);

        presenter.present(&self.surface)?;

        let frame_time = self.governor.pace();

        self.frame_count += 1;
        if self.frame_count % STATS_INTERVAL == 0 {
            tracing::debug!(
                frame_ms = frame_time.as_secs_f64() * 1000.0,
                missed_deadlines = self.governor.missed_deadlines(),
                "frame stats"
            );
        }

        // The snapshot just consumed becomes the next frame's baseline.
        self.reducer.end_frame();
        self.reducer.begin_frame();
        Ok(())
    }

    fn handle_key(&mut self, event: &winit::event::KeyEvent) {
        // Auto-repeat is synthetic; only real edges reach the reducer.
        if event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        if let Some(&button) = self.keymap.get(&code) {
            self.reducer.key_event(button, event.state.is_pressed());
        }
    }
}

impl<G: Game> ApplicationHandler for ShellApp<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init_window(event_loop) {
            tracing::error!("Failed to initialize window: {}", err);
            self.error = Some(err);
            event_loop.exit();
            return;
        }
        self.init_audio();
        // Startup cost is not a missed frame.
        self.governor.rearm();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.surface.resize(size.width, size.height);
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(&event);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.run_iteration() {
                    tracing::error!("Fatal loop error: {}", err);
                    self.error = Some(err);
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // The governor paces inside the iteration, so the loop itself polls.
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.pacer.close();
        tracing::info!(
            frames = self.frame_count,
            missed_deadlines = self.governor.missed_deadlines(),
            "shutting down"
        );
    }
}
