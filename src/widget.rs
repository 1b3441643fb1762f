// On-screen widgets
// The fixed set of controls drawn over the image, with their hit testing

use crate::geometry::{handle_bounds, save_button_bounds, slider_hit_bounds, Rect, Viewport};

/// The controls, in hit-test priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    SaveButton,
    /// Slider track including the half-handle margins at both ends
    Slider,
    Handle,
}

/// What a press on a widget asks the application to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    /// Export the contrast-adjusted image on the next loop iteration
    RequestExport,
    /// Start dragging the contrast handle
    BeginContrastDrag,
}

/// Hit-test order: the first match wins
pub const HIT_ORDER: [Widget; 3] = [Widget::SaveButton, Widget::Slider, Widget::Handle];

/// Draw order: the handle is painted over its track
pub const DRAW_ORDER: [Widget; 3] = [Widget::Slider, Widget::Handle, Widget::SaveButton];

impl Widget {
    pub fn bounds(self, viewport: Viewport, contrast: f64) -> Rect {
        match self {
            Widget::SaveButton => save_button_bounds(),
            Widget::Slider => slider_hit_bounds(viewport),
            Widget::Handle => handle_bounds(viewport, contrast),
        }
    }

    /// Solid RGB fill
    pub fn color(self) -> [f32; 3] {
        match self {
            Widget::SaveButton => [0.9, 0.35, 0.35],
            Widget::Slider => [1.0, 0.8, 0.4],
            Widget::Handle => [0.4, 0.8, 1.0],
        }
    }

    pub fn action(self) -> WidgetAction {
        match self {
            Widget::SaveButton => WidgetAction::RequestExport,
            Widget::Slider | Widget::Handle => WidgetAction::BeginContrastDrag,
        }
    }
}

/// Find the widget under a press, scanning in priority order
pub fn hit_test(x: f32, y: f32, viewport: Viewport, contrast: f64) -> Option<Widget> {
    HIT_ORDER
        .into_iter()
        .find(|widget| widget.bounds(viewport, contrast).contains(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::slider_bounds;

    #[test]
    fn press_on_save_button() {
        let vp = Viewport::new(800, 600);
        assert_eq!(hit_test(20.0, 20.0, vp, 0.5), Some(Widget::SaveButton));
        assert_eq!(hit_test(48.0, 48.0, vp, 0.5), Some(Widget::SaveButton));
        assert_eq!(Widget::SaveButton.action(), WidgetAction::RequestExport);
    }

    #[test]
    fn press_on_slider_track() {
        let vp = Viewport::new(800, 600);
        let slider = slider_bounds(vp);
        let hit = hit_test(slider.x + 1.0, slider.y + 100.0, vp, 0.5);
        assert_eq!(hit, Some(Widget::Slider));
        assert_eq!(Widget::Slider.action(), WidgetAction::BeginContrastDrag);
    }

    #[test]
    fn handle_outside_track_is_still_clickable() {
        let vp = Viewport::new(800, 600);
        let handle = handle_bounds(vp, 0.5);
        // Left edge of the handle sticks out beyond the track width
        let hit = hit_test(handle.x, handle.y + handle.h / 2.0, vp, 0.5);
        assert_eq!(hit, Some(Widget::Handle));
    }

    #[test]
    fn press_on_image_hits_nothing() {
        let vp = Viewport::new(800, 600);
        assert_eq!(hit_test(400.0, 300.0, vp, 0.5), None);
    }

    #[test]
    fn save_button_wins_overlap() {
        // Narrow window pushes the slider over the save button
        let vp = Viewport::new(60, 200);
        let slider = slider_hit_bounds(vp);
        let save = save_button_bounds();
        let (x, y) = (30.0, 30.0);
        assert!(slider.contains(x, y) && save.contains(x, y));
        assert_eq!(hit_test(x, y, vp, 0.5), Some(Widget::SaveButton));
    }
}
