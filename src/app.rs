// Application state module
// Owns the viewer state and turns window-system input into state changes

use crate::geometry::Viewport;
use crate::transform::TransformState;
use crate::widget::{hit_test, WidgetAction};
use log::{debug, info};

/// Pointer buttons the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Other,
}

/// Main application state, mutated only from the event loop thread
#[derive(Debug)]
pub struct AppState {
    pub viewport: Viewport,
    pub transform: TransformState,
    /// Last known pointer position in pixels
    pub cursor: (f64, f64),
    /// Contrast handle is being dragged
    pub dragging: bool,
    /// Primary button is currently held
    pub primary_held: bool,
    /// Displayed output is stale
    pub dirty: bool,
    /// Save was requested and has not been handled yet
    pub export_requested: bool,
    /// Whether the application should exit
    pub should_exit: bool,
}

impl AppState {
    /// Create a new application state; the first frame is always drawn
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            transform: TransformState::default(),
            cursor: (0.0, 0.0),
            dragging: false,
            primary_held: false,
            dirty: true,
            export_requested: false,
            should_exit: false,
        }
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("Ignoring zero-sized resize {}x{}", width, height);
            return;
        }
        let viewport = Viewport::new(width, height);
        if viewport != self.viewport {
            debug!("Viewport resized to {}x{}", width, height);
            self.viewport = viewport;
        }
        self.dirty = true;
    }

    /// Pointer entered the window; only the position is recorded
    pub fn on_pointer_enter(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    /// Releases that happen outside the window are never delivered, so drop
    /// any held state when the pointer leaves
    pub fn on_pointer_leave(&mut self) {
        self.primary_held = false;
        self.dragging = false;
    }

    pub fn on_cursor_motion(&mut self, x: f64, y: f64) {
        if self.primary_held {
            self.dirty = true;
            if self.dragging {
                self.transform.set_contrast_from_pixel_y(y, self.viewport);
            } else {
                self.transform.apply_pan(self.cursor, (x, y), self.viewport);
            }
        }
        self.cursor = (x, y);
    }

    pub fn on_button(&mut self, button: MouseButton, pressed: bool) {
        if button != MouseButton::Primary {
            return;
        }

        if !pressed {
            self.primary_held = false;
            self.dragging = false;
            return;
        }

        self.primary_held = true;
        let (x, y) = self.cursor;
        let hit = hit_test(x as f32, y as f32, self.viewport, self.transform.contrast);
        match hit.map(|widget| widget.action()) {
            Some(WidgetAction::RequestExport) => {
                info!("Save requested");
                self.export_requested = true;
            }
            Some(WidgetAction::BeginContrastDrag) => {
                self.dragging = true;
                self.transform.set_contrast_from_pixel_y(y, self.viewport);
                self.dirty = true;
            }
            // Plain press on the image starts a pan
            None => {}
        }
    }

    /// `delta_y` is in wheel notches, positive zooms in
    pub fn on_scroll(&mut self, delta_y: f64) {
        if delta_y == 0.0 {
            return;
        }
        self.transform
            .apply_scroll_wheel(delta_y, self.cursor, self.viewport);
        self.dirty = true;
    }

    /// Mark the application for exit
    pub fn request_exit(&mut self) {
        self.should_exit = true;
    }
}

/// Initial window size: the image's own size, or the whole display when the
/// image does not fit on it
pub fn initial_window_size(image: (u32, u32), display: (u32, u32)) -> (u32, u32) {
    if image.0 > display.0 || image.1 > display.1 {
        display
    } else {
        image
    }
}
