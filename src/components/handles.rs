// ============================================================================
// LAYER BOXES & HANDLE HOTSPOTS — what the editor paints and hit-tests
// ============================================================================
//
// A layer box is drawn unrotated at its position and then rotated about its
// own center. Handles are laid out in the box's local (unrotated) space, so
// they rotate with the box for free; hit-testing maps the pointer back into
// that local space before comparing.

use crate::components::layers::{DesignLayers, DesignTransform, Point, Size};
use crate::components::tools::Handle;

/// Hit radius of every handle, in display units.
pub const HANDLE_RADIUS: f64 = 8.0;
/// Distance of the rotate handle's center below the bottom edge.
pub const ROTATE_HANDLE_OFFSET: f64 = 24.0;

const Z_SELECTED: u32 = 10;
const Z_NORMAL: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleHotspot {
    pub handle: Handle,
    /// Center of the hotspot relative to the box's unrotated top-left.
    pub local_center: Point,
    pub radius: f64,
}

impl HandleHotspot {
    fn contains(&self, local: Point) -> bool {
        self.local_center.distance_to(local) <= self.radius
    }
}

/// The 8 resize handles followed by the rotate handle, for a box of `size`.
pub fn handle_hotspots(size: Size) -> [HandleHotspot; 9] {
    let (w, h) = (size.width, size.height);
    let at = |handle, x, y| HandleHotspot {
        handle,
        local_center: Point::new(x, y),
        radius: HANDLE_RADIUS,
    };
    [
        at(Handle::NorthWest, 0.0, 0.0),
        at(Handle::NorthEast, w, 0.0),
        at(Handle::SouthWest, 0.0, h),
        at(Handle::SouthEast, w, h),
        at(Handle::North, w / 2.0, 0.0),
        at(Handle::South, w / 2.0, h),
        at(Handle::East, w, h / 2.0),
        at(Handle::West, 0.0, h / 2.0),
        at(Handle::Rotate, w / 2.0, h + ROTATE_HANDLE_OFFSET),
    ]
}

/// Screen-facing view of one layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerBox {
    pub index: usize,
    pub position: Point,
    pub size: Size,
    pub rotation: f64,
    pub selected: bool,
    pub z_index: u32,
}

impl LayerBox {
    pub fn new(index: usize, transform: &DesignTransform, selected: bool) -> Self {
        Self {
            index,
            position: transform.position,
            size: transform.size,
            rotation: transform.rotation,
            selected,
            z_index: if selected { Z_SELECTED } else { Z_NORMAL },
        }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    /// CSS-equivalent transform string for the box.
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) rotate({}deg)",
            self.position.x, self.position.y, self.rotation
        )
    }

    /// Local (unrotated, top-left origin) point to container coordinates.
    pub fn local_to_container(&self, local: Point) -> Point {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let dx = local.x - self.size.width / 2.0;
        let dy = local.y - self.size.height / 2.0;
        let c = self.center();
        Point::new(c.x + dx * cos - dy * sin, c.y + dx * sin + dy * cos)
    }

    /// Container point to the box's local, unrotated space.
    pub fn container_to_local(&self, p: Point) -> Point {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let c = self.center();
        let dx = p.x - c.x;
        let dy = p.y - c.y;
        Point::new(
            dx * cos + dy * sin + self.size.width / 2.0,
            -dx * sin + dy * cos + self.size.height / 2.0,
        )
    }

    pub fn hotspots(&self) -> [HandleHotspot; 9] {
        handle_hotspots(self.size)
    }

    /// Which part of the box, if any, lies under `pointer`. Handles are only
    /// considered when they are visible (the box is selected).
    pub fn hit_test(&self, pointer: Point, handles_visible: bool) -> Option<Handle> {
        let local = self.container_to_local(pointer);
        if !local.is_finite() {
            return None;
        }
        if handles_visible {
            // Rotate handle first, then corners before edges.
            let hotspots = self.hotspots();
            let (resize, rotate) = hotspots.split_at(8);
            if let Some(hit) = rotate
                .iter()
                .chain(resize.iter())
                .find(|h| h.contains(local))
            {
                return Some(hit.handle);
            }
        }
        let inside = local.x >= 0.0
            && local.y >= 0.0
            && local.x <= self.size.width
            && local.y <= self.size.height;
        inside.then_some(Handle::Body)
    }
}

/// Boxes in paint order (bottom first, selected last).
pub fn layer_boxes(layers: &DesignLayers) -> Vec<LayerBox> {
    layers
        .paint_order()
        .into_iter()
        .filter_map(|i| {
            layers
                .get(i)
                .map(|t| LayerBox::new(i, t, layers.selected() == Some(i)))
        })
        .collect()
}

/// Topmost box under `pointer` and the handle that was hit.
pub fn hit_test_layers(layers: &DesignLayers, pointer: Point) -> Option<(usize, Handle)> {
    layer_boxes(layers)
        .iter()
        .rev()
        .find_map(|b| b.hit_test(pointer, b.selected).map(|h| (b.index, h)))
}
