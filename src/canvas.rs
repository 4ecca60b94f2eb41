//! Display surfaces the runner draws each tick onto.
//!
//! The runner only talks to the [`Canvas`] trait: it opens the canvas with a caption when a
//! scenario starts, clears it and issues one [`DrawRequest`] per agent every tick, presents
//! the frame, and polls for a quit request. Two surfaces are provided:
//!
//! * `WindowCanvas` (in the `window` module) shows each scenario in its own native window and
//!   reports a quit when the window is closed.
//! * [`HeadlessCanvas`] draws nothing. It is used for batch runs and tests, and can be told to
//!   request a quit after a number of frames.
//!
//! Both the window and any off-screen consumer draw into a [`FrameBuffer`], a software raster
//! with one pixel per arena unit.
use log::trace;

use crate::agent::{Agent, HealthState};
use crate::error::SimError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentColor {
    Blue,
    Red,
    Green,
}

impl AgentColor {
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            AgentColor::Blue => (0, 0, 255),
            AgentColor::Red => (255, 0, 0),
            AgentColor::Green => (0, 255, 0),
        }
    }

    /// The color packed as `0x00RRGGBB`.
    #[must_use]
    pub fn pixel(self) -> u32 {
        let (r, g, b) = self.rgb();
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }
}

impl From<HealthState> for AgentColor {
    fn from(health_state: HealthState) -> Self {
        match health_state {
            HealthState::Susceptible => AgentColor::Blue,
            HealthState::Infected => AgentColor::Red,
            HealthState::Recovered => AgentColor::Green,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRequest {
    pub x: f64,
    pub y: f64,
    pub color: AgentColor,
    pub radius: f64,
}

impl DrawRequest {
    #[must_use]
    pub fn for_agent(agent: &Agent, radius: f64) -> Self {
        let position = agent.position();
        DrawRequest {
            x: position.x,
            y: position.y,
            color: agent.health_state().into(),
            radius,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasEvent {
    Quit,
}

pub trait Canvas {
    /// Prepares the surface for a new scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be created.
    fn open(&mut self, caption: &str) -> Result<(), SimError>;

    /// Fills the frame with the background color.
    fn clear(&mut self);

    fn draw(&mut self, request: DrawRequest);

    /// Shows the frame drawn since the last `clear`.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be written to the surface.
    fn present(&mut self) -> Result<(), SimError>;

    /// Returns the events received since the last poll.
    fn poll_events(&mut self) -> Vec<CanvasEvent>;

    /// Releases the surface at the end of a scenario.
    fn close(&mut self);
}

/// A canvas without output.
#[derive(Debug, Default)]
pub struct HeadlessCanvas {
    quit_after: Option<usize>,
    caption: Option<String>,
    frames: usize,
    draws: usize,
}

impl HeadlessCanvas {
    #[must_use]
    pub fn new() -> Self {
        HeadlessCanvas::default()
    }

    /// A canvas that requests a quit once `frames` frames have been presented.
    #[must_use]
    pub fn quit_after(frames: usize) -> Self {
        HeadlessCanvas {
            quit_after: Some(frames),
            ..HeadlessCanvas::default()
        }
    }

    /// Frames presented since the canvas was last opened.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Draw requests received since the canvas was last opened.
    #[must_use]
    pub fn draws(&self) -> usize {
        self.draws
    }

    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }
}

impl Canvas for HeadlessCanvas {
    fn open(&mut self, caption: &str) -> Result<(), SimError> {
        self.caption = Some(caption.to_string());
        self.frames = 0;
        self.draws = 0;
        Ok(())
    }

    fn clear(&mut self) {}

    fn draw(&mut self, _request: DrawRequest) {
        self.draws += 1;
    }

    fn present(&mut self) -> Result<(), SimError> {
        self.frames += 1;
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<CanvasEvent> {
        match self.quit_after {
            Some(limit) if self.frames >= limit => vec![CanvasEvent::Quit],
            _ => Vec::new(),
        }
    }

    fn close(&mut self) {}
}

/// White, in the same packing as [`AgentColor::pixel`].
pub const BACKGROUND: u32 = 0x00FF_FFFF;

/// A software raster of the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    /// # Errors
    ///
    /// Returns a display error if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::DisplayError(format!(
                "cannot draw on a {width}x{height} frame"
            )));
        }
        Ok(FrameBuffer {
            width,
            height,
            pixels: vec![BACKGROUND; width * height],
        })
    }

    /// A frame covering an arena of the given size, one pixel per unit.
    ///
    /// # Errors
    ///
    /// Returns a display error if the arena has no area.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn for_arena(width: f64, height: f64) -> Result<Self, SimError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SimError::DisplayError(format!(
                "cannot draw a {width}x{height} arena"
            )));
        }
        FrameBuffer::new(width.ceil() as usize, height.ceil() as usize)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Fills a disc of `request.radius` around the truncated position of the request. Parts
    /// outside the frame are clipped.
    #[allow(clippy::cast_possible_truncation)]
    pub fn draw(&mut self, request: DrawRequest) {
        let (cx, cy) = (request.x.trunc() as i64, request.y.trunc() as i64);
        self.fill_circle(cx, cy, request.radius, request.color.pixel());
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn fill_circle(&mut self, cx: i64, cy: i64, radius: f64, color: u32) {
        let reach = radius.max(0.0).ceil() as i64;
        let limit = radius * radius;
        let (width, height) = (self.width as i64, self.height as i64);
        let mut drawn = false;
        for dy in -reach..=reach {
            let y = cy + dy;
            if !(0..height).contains(&y) {
                continue;
            }
            for dx in -reach..=reach {
                let x = cx + dx;
                if (0..width).contains(&x) && ((dx * dx + dy * dy) as f64) <= limit {
                    self.pixels[(y * width + x) as usize] = color;
                    drawn = true;
                }
            }
        }
        if !drawn {
            trace!("agent at ({}, {}) is off the frame", cx, cy);
        }
    }

    /// Copies the frame into a `width` x `height` target, sampling the nearest source pixel
    /// when the sizes differ.
    pub fn copy_scaled(&self, target: &mut [u32], width: usize, height: usize) {
        if width == 0 || height == 0 {
            return;
        }
        for (row, line) in target.chunks_mut(width).take(height).enumerate() {
            let source_row = (row * self.height / height) * self.width;
            for (column, pixel) in line.iter_mut().enumerate() {
                *pixel = self.pixels[source_row + column * self.width / width];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Vec2;

    fn request(x: f64, y: f64, color: AgentColor) -> DrawRequest {
        DrawRequest {
            x,
            y,
            color,
            radius: 5.0,
        }
    }

    #[test]
    fn colors_follow_health_state() {
        assert_eq!(AgentColor::from(HealthState::Susceptible), AgentColor::Blue);
        assert_eq!(AgentColor::from(HealthState::Infected), AgentColor::Red);
        assert_eq!(AgentColor::from(HealthState::Recovered), AgentColor::Green);
        assert_eq!(AgentColor::Red.rgb(), (255, 0, 0));
    }

    #[test]
    fn draw_request_for_agent() {
        let agent = Agent::new(
            Vec2::new(12.5, 40.0),
            Vec2::default(),
            HealthState::Infected,
        );
        let drawn = DrawRequest::for_agent(&agent, 5.0);
        assert_eq!(drawn, request(12.5, 40.0, AgentColor::Red));
    }

    #[test]
    fn headless_canvas_quits_after_limit() {
        let mut canvas = HeadlessCanvas::quit_after(2);
        canvas.open("Scenario: test").unwrap();
        assert_eq!(canvas.caption(), Some("Scenario: test"));
        canvas.present().unwrap();
        assert!(canvas.poll_events().is_empty());
        canvas.draw(request(1.0, 1.0, AgentColor::Blue));
        canvas.present().unwrap();
        assert_eq!(canvas.poll_events(), vec![CanvasEvent::Quit]);
        assert_eq!(canvas.frames(), 2);
        assert_eq!(canvas.draws(), 1);
    }

    #[test]
    fn colors_pack_as_rgb() {
        assert_eq!(AgentColor::Blue.pixel(), 0x0000_00FF);
        assert_eq!(AgentColor::Red.pixel(), 0x00FF_0000);
        assert_eq!(AgentColor::Green.pixel(), 0x0000_FF00);
    }

    #[test]
    fn frame_starts_white() {
        let frame = FrameBuffer::for_arena(800.0, 600.0).unwrap();
        assert_eq!((frame.width(), frame.height()), (800, 600));
        assert!(frame.pixels().iter().all(|&pixel| pixel == BACKGROUND));
    }

    #[test]
    fn agents_are_discs_of_their_radius() {
        let mut frame = FrameBuffer::new(200, 200).unwrap();
        frame.draw(request(100.9, 100.2, AgentColor::Red));
        let red = AgentColor::Red.pixel();
        assert_eq!(frame.pixels().iter().filter(|&&p| p == red).count(), 81);
        assert_eq!(frame.pixel(100, 100), Some(red));
        assert_eq!(frame.pixel(105, 100), Some(red));
        assert_eq!(frame.pixel(106, 100), Some(BACKGROUND));
        assert_eq!(frame.pixel(104, 104), Some(BACKGROUND));

        let mut small = FrameBuffer::new(200, 200).unwrap();
        small.draw(DrawRequest {
            radius: 1.0,
            ..request(50.0, 50.0, AgentColor::Green)
        });
        assert_eq!(small.pixels().iter().filter(|&&p| p != BACKGROUND).count(), 5);
    }

    #[test]
    fn discs_are_clipped_at_the_edges() {
        let mut frame = FrameBuffer::new(50, 50).unwrap();
        frame.draw(request(0.0, 0.0, AgentColor::Blue));
        assert_eq!(frame.pixels().iter().filter(|&&p| p != BACKGROUND).count(), 26);
        frame.draw(request(-40.0, 400.0, AgentColor::Blue));
        assert_eq!(frame.pixels().iter().filter(|&&p| p != BACKGROUND).count(), 26);
    }

    #[test]
    fn clear_resets_frame() {
        let mut frame = FrameBuffer::new(20, 20).unwrap();
        frame.draw(request(10.0, 10.0, AgentColor::Green));
        frame.clear(BACKGROUND);
        assert!(frame.pixels().iter().all(|&pixel| pixel == BACKGROUND));
    }

    #[test]
    fn copy_scaled_samples_nearest_pixel() {
        let mut frame = FrameBuffer::new(4, 2).unwrap();
        frame.draw(DrawRequest {
            radius: 0.0,
            ..request(3.0, 1.0, AgentColor::Red)
        });
        let mut same = vec![0; 8];
        frame.copy_scaled(&mut same, 4, 2);
        assert_eq!(same, frame.pixels());

        let mut doubled = vec![0; 32];
        frame.copy_scaled(&mut doubled, 8, 4);
        let red = AgentColor::Red.pixel();
        assert_eq!(doubled.iter().filter(|&&p| p == red).count(), 4);
        assert_eq!(doubled[3 * 8 + 7], red);
        assert_eq!(doubled[0], BACKGROUND);
    }

    #[test]
    fn empty_frames_are_rejected() {
        assert!(matches!(
            FrameBuffer::new(0, 10),
            Err(SimError::DisplayError(_))
        ));
        assert!(FrameBuffer::for_arena(f64::NAN, 10.0).is_err());
    }
}
