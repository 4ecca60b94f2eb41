//! A native window for watching scenarios run.
//!
//! The window is created when a scenario opens the canvas and destroyed when it closes, so each
//! scenario gets its own window titled with its caption. The event loop is created once and
//! pumped without blocking from the runner's tick loop. Closing the window or pressing Escape
//! ends the current scenario after its tick completes.
use std::fmt::Display;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info};
use softbuffer::{Context, SoftBufferError, Surface};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::canvas::{Canvas, CanvasEvent, DrawRequest, FrameBuffer, BACKGROUND};
use crate::error::SimError;

// Event loop turns to wait for a requested window to appear
const OPEN_ATTEMPTS: usize = 200;

fn display_error(error: impl Display) -> SimError {
    SimError::DisplayError(error.to_string())
}

struct OpenWindow {
    window: Rc<Window>,
    surface: Surface<Rc<Window>, Rc<Window>>,
    _context: Context<Rc<Window>>,
}

impl OpenWindow {
    fn create(
        event_loop: &ActiveEventLoop,
        caption: &str,
        size: PhysicalSize<u32>,
    ) -> Result<Self, SimError> {
        let attributes = Window::default_attributes()
            .with_title(caption)
            .with_inner_size(size)
            .with_resizable(false);
        let window = Rc::new(event_loop.create_window(attributes).map_err(display_error)?);
        let context = Context::new(Rc::clone(&window)).map_err(display_error)?;
        let surface = Surface::new(&context, Rc::clone(&window)).map_err(display_error)?;
        Ok(OpenWindow {
            window,
            surface,
            _context: context,
        })
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), SoftBufferError> {
        let size = self.window.inner_size();
        // A minimized window has no area to draw on.
        let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(());
        };
        self.surface.resize(width, height)?;
        let mut buffer = self.surface.buffer_mut()?;
        frame.copy_scaled(&mut buffer, size.width as usize, size.height as usize);
        buffer.present()
    }
}

/// State driven by the event loop: the window, if any, and what happened to it.
#[derive(Default)]
struct WindowState {
    size: PhysicalSize<u32>,
    /// Caption of a window waiting for the event loop to create it.
    requested: Option<String>,
    open: Option<OpenWindow>,
    events: Vec<CanvasEvent>,
    error: Option<SimError>,
}

impl WindowState {
    fn new(size: PhysicalSize<u32>) -> Self {
        WindowState {
            size,
            ..WindowState::default()
        }
    }

    fn create_requested(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(caption) = self.requested.take() {
            match OpenWindow::create(event_loop, &caption, self.size) {
                Ok(open) => self.open = Some(open),
                Err(error) => self.error = Some(error),
            }
        }
    }

    fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.events.push(CanvasEvent::Quit),
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                self.events.push(CanvasEvent::Quit);
            }
            _ => {}
        }
    }

    fn take_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.create_requested(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        // Late events from the previous scenario's window are dropped.
        if self.open.as_ref().is_some_and(|open| open.window.id() == id) {
            self.handle_window_event(&event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.create_requested(event_loop);
    }
}

/// Shows the arena in a window, one pixel per arena unit.
pub struct WindowCanvas {
    event_loop: EventLoop<()>,
    state: WindowState,
    frame: FrameBuffer,
}

impl WindowCanvas {
    /// Connects to the display. Only one `WindowCanvas` can exist per process.
    ///
    /// # Errors
    ///
    /// Returns a display error if there is no display to connect to.
    pub fn new(width: f64, height: f64) -> Result<Self, SimError> {
        let frame = FrameBuffer::for_arena(width, height)?;
        let event_loop = EventLoop::new().map_err(display_error)?;
        let size = PhysicalSize::new(
            u32::try_from(frame.width()).map_err(display_error)?,
            u32::try_from(frame.height()).map_err(display_error)?,
        );
        debug!("connected to display for a {}x{} window", size.width, size.height);
        Ok(WindowCanvas {
            event_loop,
            state: WindowState::new(size),
            frame,
        })
    }

    fn pump(&mut self) -> PumpStatus {
        self.event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state)
    }
}

impl Canvas for WindowCanvas {
    fn open(&mut self, caption: &str) -> Result<(), SimError> {
        self.state.events.clear();
        self.state.requested = Some(caption.to_string());
        for _ in 0..OPEN_ATTEMPTS {
            if let PumpStatus::Exit(code) = self.pump() {
                return Err(SimError::DisplayError(format!(
                    "event loop exited with code {code}"
                )));
            }
            if let Some(error) = self.state.error.take() {
                return Err(error);
            }
            if self.state.open.is_some() {
                info!("opened window \"{}\"", caption);
                return Ok(());
            }
        }
        Err(SimError::DisplayError(format!(
            "window \"{caption}\" was not created"
        )))
    }

    fn clear(&mut self) {
        self.frame.clear(BACKGROUND);
    }

    fn draw(&mut self, request: DrawRequest) {
        self.frame.draw(request);
    }

    fn present(&mut self) -> Result<(), SimError> {
        if let Some(open) = self.state.open.as_mut() {
            open.present(&self.frame).map_err(display_error)?;
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<CanvasEvent> {
        if let PumpStatus::Exit(_) = self.pump() {
            self.state.events.push(CanvasEvent::Quit);
        }
        self.state.take_events()
    }

    fn close(&mut self) {
        self.state.requested = None;
        self.state.open = None;
        // Let the platform process the window's destruction.
        let _ = self.pump();
    }
}
