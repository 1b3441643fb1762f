// Widget geometry module
// Pixel-space rectangles for the on-screen controls, recomputed from the viewport on every call

/// Side length of the square contrast handle
pub const HANDLE_SIZE: f32 = 12.0;

/// Width of the vertical slider track
pub const SLIDER_WIDTH: f32 = 8.0;

/// Distance between the slider and the window edges
pub const SLIDER_PADDING: f32 = 24.0;

/// Save button placement (top-left corner, fixed size)
const SAVE_BUTTON: Rect = Rect {
    x: 16.0,
    y: 16.0,
    w: 32.0,
    h: 32.0,
};

/// Window size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Axis-aligned rectangle with a top-left origin, y growing downwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Inclusive on every edge
    pub fn contains(&self, x: f32, y: f32) -> bool {
        !(x < self.x || x > self.x + self.w || y < self.y || y > self.y + self.h)
    }
}

/// Convert a pixel position into normalized screen space ([-1, 1], y up)
pub fn pixel_to_screen(x: f32, y: f32, viewport: Viewport) -> (f32, f32) {
    (
        x / viewport.width * 2.0 - 1.0,
        -(y / viewport.height * 2.0 - 1.0),
    )
}

pub fn save_button_bounds() -> Rect {
    SAVE_BUTTON
}

/// The slider track, anchored to the right edge.
///
/// The height goes negative once the window is shorter than
/// `2 * SLIDER_PADDING + HANDLE_SIZE`; callers get a degenerate rectangle.
pub fn slider_bounds(viewport: Viewport) -> Rect {
    Rect {
        x: viewport.width - SLIDER_PADDING - SLIDER_WIDTH,
        y: SLIDER_PADDING,
        w: SLIDER_WIDTH,
        h: viewport.height - SLIDER_PADDING * 2.0 - HANDLE_SIZE,
    }
}

/// The slider track extended by half a handle at both ends, so the handle stays
/// clickable at the extremes of the track
pub fn slider_hit_bounds(viewport: Viewport) -> Rect {
    let mut rect = slider_bounds(viewport);
    rect.y -= HANDLE_SIZE / 2.0;
    rect.h += HANDLE_SIZE;
    rect
}

/// Vertical pixel position of the handle center
pub fn handle_pos(viewport: Viewport, contrast: f64) -> f32 {
    let slider = slider_bounds(viewport);
    slider.y + slider.h * contrast as f32
}

pub fn handle_bounds(viewport: Viewport, contrast: f64) -> Rect {
    let slider = slider_bounds(viewport);
    let y = handle_pos(viewport, contrast);
    Rect {
        x: slider.x - (HANDLE_SIZE - slider.w) / 2.0,
        y: y - HANDLE_SIZE / 2.0,
        w: HANDLE_SIZE,
        h: HANDLE_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive() {
        let rect = Rect {
            x: 10.0,
            y: 20.0,
            w: 5.0,
            h: 5.0,
        };
        assert!(rect.contains(10.0, 20.0));
        assert!(rect.contains(15.0, 25.0));
        assert!(!rect.contains(15.1, 25.0));
        assert!(!rect.contains(9.9, 22.0));
    }

    #[test]
    fn pixel_to_screen_maps_corners() {
        let vp = Viewport::new(800, 600);
        assert_eq!(pixel_to_screen(0.0, 0.0, vp), (-1.0, 1.0));
        assert_eq!(pixel_to_screen(800.0, 600.0, vp), (1.0, -1.0));
        assert_eq!(pixel_to_screen(400.0, 300.0, vp), (0.0, 0.0));
    }

    #[test]
    fn slider_follows_viewport() {
        let slider = slider_bounds(Viewport::new(800, 600));
        assert_eq!(slider.x, 800.0 - 24.0 - 8.0);
        assert_eq!(slider.y, 24.0);
        assert_eq!(slider.h, 600.0 - 48.0 - 12.0);

        let hit = slider_hit_bounds(Viewport::new(800, 600));
        assert_eq!(hit.y, 18.0);
        assert_eq!(hit.h, slider.h + 12.0);
    }

    #[test]
    fn save_button_ignores_viewport() {
        assert_eq!(save_button_bounds(), SAVE_BUTTON);
    }

    #[test]
    fn handle_moves_monotonically_within_track() {
        for height in [60u32, 61, 100, 600, 2160] {
            let vp = Viewport::new(640, height);
            let slider = slider_bounds(vp);
            let mut last = f32::NEG_INFINITY;
            for step in 0..=100 {
                let contrast = step as f64 / 100.0;
                let pos = handle_pos(vp, contrast);
                assert!(pos >= last, "height {height}: {pos} < {last}");
                assert!(pos >= slider.y && pos <= slider.y + slider.h);
                last = pos;
            }
        }
    }

    #[test]
    fn handle_is_centered_on_track() {
        let vp = Viewport::new(800, 600);
        let handle = handle_bounds(vp, 0.5);
        let slider = slider_bounds(vp);
        assert_eq!(handle.x + handle.w / 2.0, slider.x + slider.w / 2.0);
        assert_eq!(handle.y + handle.h / 2.0, handle_pos(vp, 0.5));
    }

    #[test]
    fn tiny_viewport_gives_degenerate_track() {
        let vp = Viewport::new(40, 30);
        let slider = slider_bounds(vp);
        assert!(slider.h < 0.0);
        // Nothing lies inside a negative-height rectangle
        assert!(!slider.contains(slider.x, slider.y + 1.0));
        let _ = handle_bounds(vp, 0.5);
    }
}
