//! Window application hosting the background.

use std::sync::Arc;

use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::background::{FrameOutcome, WeatherBackground};
use crate::camera::Viewport;
use crate::condition::WeatherCondition;
use crate::config::BackdropConfig;
use crate::error::BackgroundError;
use crate::gpu::GpuState;

/// Open a window and run the background until it is closed.
pub fn run(config: BackdropConfig) -> Result<(), BackgroundError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}

struct App {
    config: BackdropConfig,
    window: Option<Arc<Window>>,
    /// `None` when GPU setup failed; the window then stays empty.
    background: Option<WeatherBackground<GpuState>>,
}

impl App {
    fn new(config: BackdropConfig) -> Self {
        Self {
            config,
            window: None,
            background: None,
        }
    }

    fn viewport(window: &Window) -> Viewport {
        let size = window.inner_size();
        Viewport::from_physical(size.width, size.height, window.scale_factor())
    }

    fn mount(&mut self, window: Arc<Window>) {
        let condition = self.config.initial_condition();
        let viewport = Self::viewport(&window);

        match GpuState::new(window.clone(), self.config.vsync) {
            Ok(gpu) => {
                let background = match self.config.seed {
                    Some(seed) => WeatherBackground::mount_seeded(gpu, viewport, condition, seed),
                    None => WeatherBackground::mount(gpu, viewport, condition),
                };
                self.background = Some(background);
                window.request_redraw();
            }
            Err(e) => {
                warn!("Background disabled, GPU setup failed: {}", e);
            }
        }
    }

    fn set_weather(&mut self, condition: WeatherCondition) {
        if let Some(background) = &mut self.background {
            info!("Condition: {}", condition);
            background.set_weather(condition);
        }
        if let Some(window) = &self.window {
            window.set_title(&format!("{} - {}", self.config.title, condition));
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let current = self
            .background
            .as_ref()
            .map(|b| b.condition())
            .unwrap_or_default();

        let next = match key {
            KeyCode::ArrowRight | KeyCode::ArrowUp => current.next(),
            KeyCode::ArrowLeft | KeyCode::ArrowDown => current.previous(),
            KeyCode::Digit0 => WeatherCondition::Default,
            KeyCode::Digit1 => WeatherCondition::ALL[0],
            KeyCode::Digit2 => WeatherCondition::ALL[1],
            KeyCode::Digit3 => WeatherCondition::ALL[2],
            KeyCode::Digit4 => WeatherCondition::ALL[3],
            KeyCode::Digit5 => WeatherCondition::ALL[4],
            KeyCode::Digit6 => WeatherCondition::ALL[5],
            KeyCode::Digit7 => WeatherCondition::ALL[6],
            KeyCode::Digit8 => WeatherCondition::ALL[7],
            _ => return,
        };
        self.set_weather(next);
    }

    fn shutdown(&mut self) {
        if let Some(mut background) = self.background.take() {
            background.unmount();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let title = format!("{} - {}", self.config.title, self.config.initial_condition());
        let window_attrs = Window::default_attributes()
            .with_title(title)
            .with_transparent(true)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.width,
                self.config.height,
            ));

        match event_loop.create_window(window_attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                self.window = Some(window.clone());
                self.mount(window);
            }
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(window), Some(background)) = (&self.window, &mut self.background) {
                    background.resize(Self::viewport(window));
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    self.shutdown();
                    event_loop.exit();
                } else {
                    self.handle_key(key);
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(background) = &mut self.background else {
                    return;
                };
                if background.frame() == FrameOutcome::Cancelled {
                    return;
                }
                if background.schedule_next() {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
