//! Camera placement over a laid-out graph.
//!
//! A camera maps graph coordinates to container coordinates as
//! `screen = graph * zoom + pan`. Everything here is plain geometry on top of
//! [`LayoutInfo`]; nothing is animated or stored.

use crate::layout::{LayoutInfo, Rect, Size};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub zoom: f32,
    pub pan: (f32, f32),
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: (0.0, 0.0),
        }
    }
}

impl Camera {
    /// Container position of a graph-space point.
    pub fn project(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.zoom + self.pan.0, y * self.zoom + self.pan.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    min: f32,
    max: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min: 1.0, max: 3.0 }
    }
}

impl ZoomLimits {
    /// `None` unless `min` is positive. A `max` below `min` is raised to it.
    pub fn new(min: f32, max: f32) -> Option<Self> {
        if !(min > 0.0) {
            return None;
        }
        Some(Self {
            min,
            max: max.max(min),
        })
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn clamp(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min, self.max)
    }
}

/// Range the pan may take at `zoom` while keeping the movable area in view.
/// Returned as `(left, top, right, bottom)` limits on the pan.
pub fn pan_bounds(info: &LayoutInfo, zoom: f32) -> (f32, f32, f32, f32) {
    let area = info.movable_area;
    let container = info.container_size;

    let left = zoom * area.left.min(0) as f32;
    let top = zoom * area.top.min(0) as f32;
    let right = (zoom * area.right.max(container.width) as f32 - container.width as f32).max(left);
    let bottom =
        (zoom * area.bottom.max(container.height) as f32 - container.height as f32).max(top);

    let pan_left = -right;
    let pan_right = (-left).max(pan_left);
    let pan_top = -bottom;
    let pan_bottom = (-top).max(pan_top);
    (pan_left, pan_top, pan_right, pan_bottom)
}

/// Clamps `camera.pan` into [`pan_bounds`] for its zoom.
pub fn clamp_pan(info: &LayoutInfo, camera: Camera) -> Camera {
    let (left, top, right, bottom) = pan_bounds(info, camera.zoom);
    Camera {
        zoom: camera.zoom,
        pan: (camera.pan.0.clamp(left, right), camera.pan.1.clamp(top, bottom)),
    }
}

/// Zooms `camera` to `zoom`, clamped to `limits`, around the container
/// center. The graph point under the center stays where it is.
pub fn container_center(
    info: &LayoutInfo,
    camera: Camera,
    zoom: f32,
    limits: ZoomLimits,
) -> Camera {
    let zoom = limits.clamp(zoom);
    if !(camera.zoom > 0.0) {
        return Camera { zoom, ..camera };
    }
    let ratio = zoom / camera.zoom;
    let center_x = info.container_size.width as f32 / 2.0;
    let center_y = info.container_size.height as f32 / 2.0;
    Camera {
        zoom,
        pan: (
            center_x - (center_x - camera.pan.0) * ratio,
            center_y - (center_y - camera.pan.1) * ratio,
        ),
    }
}

/// Centers the selected items (all of them when `indices` is `None`) at
/// `zoom`, clamped to `limits`.
pub fn items_center(
    info: &LayoutInfo,
    indices: Option<&[usize]>,
    zoom: f32,
    limits: ZoomLimits,
) -> Camera {
    let zoom = limits.clamp(zoom);
    Camera {
        zoom,
        pan: centered_pan(info.items_rect(indices), zoom, info.container_size),
    }
}

/// Picks the largest zoom within `limits` at which the selected items fit in
/// the container minus content padding, then centers them. With
/// `with_padding`, the centered rect is grown by the padding scaled by zoom.
pub fn fit_items(
    info: &LayoutInfo,
    indices: Option<&[usize]>,
    with_padding: bool,
    limits: ZoomLimits,
) -> Camera {
    let container = info.container_size;
    let padding = info.content_padding;
    let items = info.items_rect(indices);

    let zoom_x = axis_zoom(items.width(), container.width, padding.horizontal(), limits);
    let zoom_y = axis_zoom(items.height(), container.height, padding.vertical(), limits);
    let zoom = zoom_x.min(zoom_y);

    let target = if with_padding {
        let scaled = |value: i32| (value as f32 * zoom).round() as i32;
        Rect::new(
            items.left - scaled(padding.left),
            items.top - scaled(padding.top),
            items.right + scaled(padding.right),
            items.bottom + scaled(padding.bottom),
        )
    } else {
        items
    };

    tracing::trace!(zoom_x, zoom_y, zoom, "fitted camera zoom");
    Camera {
        zoom,
        pan: centered_pan(target, zoom, container),
    }
}

fn axis_zoom(items: i32, container: i32, padding: i32, limits: ZoomLimits) -> f32 {
    let zoom = if items > 0 {
        (container - padding).max(0) as f32 / items as f32
    } else {
        0.0
    };
    limits.clamp(zoom)
}

fn centered_pan(rect: Rect, zoom: f32, container: Size) -> (f32, f32) {
    let center = rect.center();
    (
        -(center.x as f32 * zoom - container.width as f32 / 2.0),
        -(center.y as f32 * zoom - container.height as f32 / 2.0),
    )
}
