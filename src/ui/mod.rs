use std::num::NonZeroU32;
use std::sync::Arc;

use softbuffer::Surface;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowId};

use crate::ui::state::{Command, ViewerState};

mod font;
pub mod render;
pub mod state;

// ---------------------------------------------------------------------------
// Application handler (winit 0.30 style)
// ---------------------------------------------------------------------------

pub struct App {
    pub state: ViewerState,
    pub window: Option<Arc<Window>>,
    pub context: Option<softbuffer::Context<Arc<Window>>>,
    pub surface: Option<Surface<Arc<Window>, Arc<Window>>>,
}

impl App {
    pub fn new(state: ViewerState) -> Self {
        Self {
            state,
            window: None,
            context: None,
            surface: None,
        }
    }
}

fn command_for_key(key: &Key) -> Option<Command> {
    let Key::Named(named) = key else { return None };
    match named {
        NamedKey::Escape | NamedKey::Enter => Some(Command::Close),
        NamedKey::ArrowRight | NamedKey::ArrowDown => Some(Command::Next),
        NamedKey::ArrowLeft | NamedKey::ArrowUp => Some(Command::Previous),
        NamedKey::F11 => Some(Command::ToggleFullscreen),
        NamedKey::F12 => Some(Command::ToggleOverlay),
        NamedKey::Delete => Some(Command::ToggleDelete),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("fsv")
            .with_fullscreen(Some(Fullscreen::Borderless(None)));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));
        let context = softbuffer::Context::new(Arc::clone(&window)).expect("create context");
        let surface = Surface::new(&context, Arc::clone(&window)).expect("create surface");

        self.state.load_initial();
        window.request_redraw();
        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(_) => {
                if let Some(ref window) = self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let Some(command) = command_for_key(&event.logical_key) else {
                    return;
                };
                // held-down navigation keys repeat, toggles fire once per press
                if event.repeat && !matches!(command, Command::Next | Command::Previous) {
                    return;
                }
                let Some(window) = self.window.as_ref() else { return };
                if self.state.apply(command, window) {
                    event_loop.exit();
                    return;
                }
                window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                let (Some(window), Some(surface)) = (self.window.as_ref(), self.surface.as_mut())
                else {
                    return;
                };
                let size = window.inner_size();
                // nothing to present while a dimension is zero (minimized)
                let (Some(w), Some(h)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                else {
                    return;
                };
                if surface.resize(w, h).is_err() {
                    return;
                }
                if let Ok(mut buffer) = surface.buffer_mut() {
                    self.state.render(&mut buffer, size.width, size.height);
                    let _ = buffer.present();
                }
            }

            _ => {}
        }
    }
}
