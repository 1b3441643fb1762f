// Frame scheduling module
// Decides once per loop iteration whether to redraw and whether to export

use crate::app::AppState;
use crate::export::{write_image, ExportError, PixelBuffer};
use crate::geometry::{pixel_to_screen, Rect, Viewport};
use crate::image_loader::ImageData;
use crate::transform::ImageVertex;
use crate::widget::DRAW_ORDER;
use anyhow::Result;
use log::{debug, error, warn};
use std::path::Path;

/// Overlay vertex: screen-space position and flat color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
}

/// Vertices per overlay quad (triangle strip)
pub const QUAD_VERTICES: usize = 4;

/// Everything the GPU needs to draw one frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Mix factor for the contrast pass
    pub contrast_gain: f32,
    pub image_quad: [ImageVertex; 4],
    /// One strip of `QUAD_VERTICES` per widget, in draw order
    pub overlay: Vec<OverlayVertex>,
}

impl Frame {
    pub fn build(state: &AppState, image_width: u32, image_height: u32) -> Self {
        let viewport = state.viewport;
        let contrast = state.transform.contrast;
        let overlay = DRAW_ORDER
            .iter()
            .flat_map(|widget| {
                overlay_quad(widget.bounds(viewport, contrast), widget.color(), viewport)
            })
            .collect();

        Self {
            contrast_gain: state.transform.contrast_gain(),
            image_quad: state.transform.image_quad(image_width, image_height, viewport),
            overlay,
        }
    }
}

/// Convert a pixel rectangle to a screen-space strip
fn overlay_quad(
    rect: Rect,
    color: [f32; 3],
    viewport: Viewport,
) -> [OverlayVertex; QUAD_VERTICES] {
    let (x1, y1) = pixel_to_screen(rect.x, rect.y, viewport);
    let (x2, y2) = pixel_to_screen(rect.x + rect.w, rect.y + rect.h, viewport);
    [[x1, y1], [x2, y1], [x1, y2], [x2, y2]].map(|position| OverlayVertex { position, color })
}

/// GPU side of the viewer
pub trait FrameRenderer {
    /// Draw the contrast, composite and overlay passes and present.
    /// Returns `Ok(false)` when the frame had to be skipped.
    fn draw_frame(&mut self, frame: &Frame) -> Result<bool>;

    /// Read the contrast-adjusted image back at its native size
    fn read_back(&mut self) -> Result<PixelBuffer, ExportError>;
}

/// Run one loop iteration: redraw if dirty, then service a pending export
pub fn tick<R: FrameRenderer>(
    state: &mut AppState,
    image: &ImageData,
    renderer: &mut R,
    output: &Path,
) {
    if state.dirty {
        state.dirty = false;
        let frame = Frame::build(state, image.width, image.height);
        match renderer.draw_frame(&frame) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Frame skipped, will redraw on the next event");
                state.dirty = true;
            }
            Err(e) => warn!("Render error, keeping previous frame: {:?}", e),
        }
    }

    if state.export_requested {
        if let Err(e) = export(renderer, image, output) {
            error!("Export to {} failed: {}", output.display(), e);
        }
        state.export_requested = false;
    }
}

fn export<R: FrameRenderer>(
    renderer: &mut R,
    image: &ImageData,
    output: &Path,
) -> Result<(), ExportError> {
    let pixels = renderer.read_back()?;
    write_image(output, pixels, image.channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::save_button_bounds;
    use crate::widget::Widget;
    use tempfile::TempDir;

    /// Records calls instead of touching a GPU
    struct RecordingRenderer {
        image: (u32, u32),
        frames: Vec<Frame>,
        read_backs: usize,
        skip_next: bool,
        fail_read_back: bool,
    }

    impl RecordingRenderer {
        fn new(image: &ImageData) -> Self {
            Self {
                image: (image.width, image.height),
                frames: Vec::new(),
                read_backs: 0,
                skip_next: false,
                fail_read_back: false,
            }
        }
    }

    impl FrameRenderer for RecordingRenderer {
        fn draw_frame(&mut self, frame: &Frame) -> Result<bool> {
            if std::mem::take(&mut self.skip_next) {
                return Ok(false);
            }
            self.frames.push(frame.clone());
            Ok(true)
        }

        fn read_back(&mut self) -> Result<PixelBuffer, ExportError> {
            self.read_backs += 1;
            if self.fail_read_back {
                return Err(ExportError::ReadBackAlloc("out of memory".into()));
            }
            let (width, height) = self.image;
            Ok(PixelBuffer {
                width,
                height,
                rgba_data: vec![128; (width * height * 4) as usize],
            })
        }
    }

    fn image(width: u32, height: u32) -> ImageData {
        ImageData {
            width,
            height,
            channels: 3,
            rgba_data: vec![255; (width * height * 4) as usize],
        }
    }

    fn out_dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn idle_ticks_do_not_draw() {
        let img = image(4, 4);
        let mut renderer = RecordingRenderer::new(&img);
        let mut state = AppState::new(800, 600);
        let dir = out_dir();
        let out = dir.path().join("idle.png");

        frame_tick_n(&mut state, &img, &mut renderer, &out, 1);
        assert_eq!(renderer.frames.len(), 1);
        assert!(!state.dirty);

        frame_tick_n(&mut state, &img, &mut renderer, &out, 50);
        assert_eq!(renderer.frames.len(), 1);
        assert_eq!(renderer.read_backs, 0);
    }

    fn frame_tick_n(
        state: &mut AppState,
        img: &ImageData,
        renderer: &mut RecordingRenderer,
        out: &Path,
        n: usize,
    ) {
        for _ in 0..n {
            tick(state, img, renderer, out);
        }
    }

    #[test]
    fn input_triggers_one_redraw() {
        let img = image(4, 4);
        let mut renderer = RecordingRenderer::new(&img);
        let mut state = AppState::new(800, 600);
        let dir = out_dir();
        let out = dir.path().join("redraw.png");
        tick(&mut state, &img, &mut renderer, &out);

        state.on_scroll(1.0);
        frame_tick_n(&mut state, &img, &mut renderer, &out, 3);
        assert_eq!(renderer.frames.len(), 2);
    }

    #[test]
    fn skipped_frame_stays_dirty() {
        let img = image(4, 4);
        let mut renderer = RecordingRenderer::new(&img);
        renderer.skip_next = true;
        let mut state = AppState::new(800, 600);
        let dir = out_dir();
        tick(&mut state, &img, &mut renderer, &dir.path().join("skip.png"));
        assert!(state.dirty);
        assert!(renderer.frames.is_empty());
    }

    #[test]
    fn frame_reflects_state() {
        let img = image(400, 200);
        let state = AppState::new(800, 600);
        let frame = Frame::build(&state, img.width, img.height);
        assert!((frame.contrast_gain - 1.0).abs() < 1e-6);
        assert_eq!(frame.overlay.len(), DRAW_ORDER.len() * QUAD_VERTICES);

        // Save button is drawn last
        let save = &frame.overlay[2 * QUAD_VERTICES..];
        assert!(save.iter().all(|v| v.color == Widget::SaveButton.color()));
        let rect = save_button_bounds();
        let (x1, y1) = pixel_to_screen(rect.x, rect.y, state.viewport);
        assert_eq!(save[0].position, [x1, y1]);
        assert!(save[3].position[1] < save[0].position[1]);
    }

    #[test]
    fn export_uses_native_size_regardless_of_view() {
        let img = image(40, 20);
        let mut renderer = RecordingRenderer::new(&img);
        let mut state = AppState::new(800, 600);
        state.on_cursor_motion(100.0, 500.0);
        state.on_scroll(3.0);
        state.on_button(crate::app::MouseButton::Primary, true);
        state.on_cursor_motion(300.0, 100.0);
        state.on_button(crate::app::MouseButton::Primary, false);
        assert!(state.transform.zoom > 1.0);

        let save = save_button_bounds();
        state.on_cursor_motion((save.x + 1.0) as f64, (save.y + 1.0) as f64);
        state.on_button(crate::app::MouseButton::Primary, true);
        assert!(state.export_requested);

        let dir = out_dir();
        let out = dir.path().join("export.png");
        tick(&mut state, &img, &mut renderer, &out);
        assert!(!state.export_requested);
        assert_eq!(renderer.read_backs, 1);
        assert_eq!(image::image_dimensions(&out).unwrap(), (40, 20));
    }

    #[test]
    fn failed_export_clears_flag() {
        let img = image(4, 4);
        let mut renderer = RecordingRenderer::new(&img);
        renderer.fail_read_back = true;
        let mut state = AppState::new(800, 600);
        state.export_requested = true;
        let dir = out_dir();
        let out = dir.path().join("fail.png");
        tick(&mut state, &img, &mut renderer, &out);
        assert!(!state.export_requested);
        assert_eq!(renderer.read_backs, 1);

        tick(&mut state, &img, &mut renderer, &out);
        assert_eq!(renderer.read_backs, 1);
        assert!(!out.exists());
    }
}
