// Image transform module
// Zoom, pan and contrast state plus the geometry of the on-screen image quad

use crate::geometry::{pixel_to_screen, slider_bounds, Viewport};

/// Lower bound for the zoom factor, keeps the quad from collapsing or flipping
pub const MIN_ZOOM: f64 = 0.01;

/// Zoom change per scroll wheel notch, relative to the current zoom
const ZOOM_STEP: f64 = 0.3;

/// Contrast value that leaves the image unchanged
pub const NEUTRAL_CONTRAST: f64 = 0.5;

/// Image vertex: screen-space position and texture coordinates
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ImageVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

/// Unit quad as a triangle strip. Texture rows are stored bottom-first, so the
/// top edge samples v = 1.
const UNIT_QUAD: [ImageVertex; 4] = [
    ImageVertex {
        position: [-1.0, 1.0],
        tex_coords: [0.0, 1.0],
    },
    ImageVertex {
        position: [-1.0, -1.0],
        tex_coords: [0.0, 0.0],
    },
    ImageVertex {
        position: [1.0, 1.0],
        tex_coords: [1.0, 1.0],
    },
    ImageVertex {
        position: [1.0, -1.0],
        tex_coords: [1.0, 0.0],
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    /// Scale of the image, never below `MIN_ZOOM`
    pub zoom: f64,
    /// Offset of the image center in normalized screen space
    pub scroll_x: f64,
    pub scroll_y: f64,
    /// Slider fraction in (0, 1); 0.5 shows the original image
    pub contrast: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            contrast: NEUTRAL_CONTRAST,
        }
    }
}

impl TransformState {
    /// Zoom by `delta_y` wheel notches around the cursor.
    ///
    /// The pan correction is first order: the point under the cursor drifts
    /// slightly for large steps, which is unnoticeable when applied per notch.
    pub fn apply_scroll_wheel(&mut self, delta_y: f64, cursor: (f64, f64), viewport: Viewport) {
        let zoom_add = self.zoom * delta_y * ZOOM_STEP;
        let (cx, cy) = pixel_to_screen(cursor.0 as f32, cursor.1 as f32, viewport);
        // Relative to the image center
        let cx = cx as f64 - self.scroll_x;
        let cy = cy as f64 - self.scroll_y;

        // offset / zoom_add == c / zoom
        self.scroll_x -= cx / self.zoom * zoom_add;
        self.scroll_y -= cy / self.zoom * zoom_add;

        self.zoom += zoom_add;
        if self.zoom < MIN_ZOOM {
            self.zoom = MIN_ZOOM;
        }
    }

    /// Move the image by the screen-space distance between two cursor positions
    pub fn apply_pan(&mut self, from: (f64, f64), to: (f64, f64), viewport: Viewport) {
        let (fx, fy) = pixel_to_screen(from.0 as f32, from.1 as f32, viewport);
        let (tx, ty) = pixel_to_screen(to.0 as f32, to.1 as f32, viewport);
        self.scroll_x += (tx - fx) as f64;
        self.scroll_y += (ty - fy) as f64;
    }

    /// Place the contrast handle at pixel row `y`.
    ///
    /// The handle is kept one pixel inside the track so the contrast never
    /// reaches exactly 0 or 1. A track too short to hold that inset on both
    /// ends leaves the contrast untouched.
    pub fn set_contrast_from_pixel_y(&mut self, y: f64, viewport: Viewport) {
        let slider = slider_bounds(viewport);
        let track_len = slider.h as f64;
        if track_len < 2.0 {
            return;
        }

        let mut handle_y = y - slider.y as f64;
        if handle_y <= 0.0 {
            handle_y = 1.0;
        } else if handle_y >= track_len {
            handle_y = track_len - 1.0;
        }
        self.contrast = handle_y / track_len;
    }

    /// Mix factor between mid gray and the source image.
    ///
    /// 1.0 at the neutral position, rising towards the top of the track
    /// (amplified contrast) and falling towards the bottom (washed out).
    pub fn contrast_gain(&self) -> f32 {
        (1.0 - (self.contrast * 2.0).ln()) as f32
    }

    /// Screen-space quad for an image of the given size: scaled by zoom,
    /// shifted by the scroll offset, then squeezed on one axis so the image
    /// keeps its aspect ratio inside the viewport.
    pub fn image_quad(
        &self,
        image_width: u32,
        image_height: u32,
        viewport: Viewport,
    ) -> [ImageVertex; 4] {
        let image_aspect = image_width as f64 / image_height as f64;
        let viewport_aspect = viewport.aspect();
        let aspect_diff = viewport_aspect - image_aspect;

        let mut verts = UNIT_QUAD;
        for vert in verts.iter_mut() {
            let mut x = vert.position[0] as f64 * self.zoom + self.scroll_x;
            let mut y = vert.position[1] as f64 * self.zoom + self.scroll_y;

            if aspect_diff > 0.0 {
                x *= image_aspect / viewport_aspect;
            } else if aspect_diff < 0.0 {
                y *= 1.0 / image_aspect * viewport_aspect;
            }
            vert.position = [x as f32, y as f32];
        }
        verts
    }
}
