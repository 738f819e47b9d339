// ============================================================================
// DESIGN LAYERS — per-layer placement (position / size / rotation) + selection
// ============================================================================
//
// Coordinates live in the editor's display space: the space of the background
// image as it is shown on screen, not its native pixels. The compositor
// rescales into native resolution at commit time.

use serde::{Deserialize, Serialize};

/// Smallest width/height any layer may have after an interaction.
pub const MIN_LAYER_SIZE: f64 = 20.0;
/// Width and height of a freshly added layer.
pub const DEFAULT_LAYER_SIZE: f64 = 150.0;
/// Top-left of the first layer.
pub const DEFAULT_ORIGIN: f64 = 50.0;
/// Each new layer is offset by this much from the previous one.
pub const CASCADE_STEP: f64 = 20.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_finite(self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(DEFAULT_LAYER_SIZE, DEFAULT_LAYER_SIZE)
    }
}

/// Placement of one design image over the background.
///
/// `rotation` is in degrees, clockwise, about the layer's own center. It is
/// never normalised; 370° and 10° draw the same but are stored as given.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignTransform {
    /// Top-left corner of the unrotated box.
    pub position: Point,
    pub size: Size,
    pub rotation: f64,
}

impl DesignTransform {
    /// Default cascaded placement for the layer at `index`.
    pub fn default_for(index: usize) -> Self {
        let offset = DEFAULT_ORIGIN + index as f64 * CASCADE_STEP;
        Self {
            position: Point::new(offset, offset),
            size: Size::default(),
            rotation: 0.0,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    /// Box of `size` centered on `center`, keeping this transform's rotation.
    pub fn with_center(&self, center: Point, size: Size) -> Self {
        Self {
            position: Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0),
            size,
            rotation: self.rotation,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.size.is_finite() && self.rotation.is_finite()
    }
}

/// Ordered layer list plus the single selected layer.
///
/// Index is the layer id for the session and maps 1:1 to the design image at
/// the same index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DesignLayers {
    transforms: Vec<DesignTransform>,
    selected: Option<usize>,
}

impl DesignLayers {
    /// One transform per design. Reuses `previous[i]` when present (returning
    /// from a generation round-trip), otherwise the cascaded default. The last
    /// layer ends up selected.
    pub fn initialize(design_count: usize, previous: Option<&[DesignTransform]>) -> Self {
        let transforms = (0..design_count)
            .map(|i| {
                previous
                    .and_then(|prev| prev.get(i).copied())
                    .unwrap_or_else(|| DesignTransform::default_for(i))
            })
            .collect();
        Self {
            transforms,
            selected: design_count.checked_sub(1),
        }
    }

    /// Append default transforms for `count` newly added designs.
    pub fn push_defaults(&mut self, count: usize) {
        let start = self.transforms.len();
        self.transforms
            .extend((start..start + count).map(DesignTransform::default_for));
    }

    /// Remove the layer at `index`; later layers shift down by one. Selection
    /// keeps pointing at the same logical layer, or becomes `None` when that
    /// layer is the one removed.
    pub fn remove(&mut self, index: usize) -> Option<DesignTransform> {
        if index >= self.transforms.len() {
            return None;
        }
        let removed = self.transforms.remove(index);
        self.selected = match self.selected {
            Some(sel) if sel == index => None,
            Some(sel) if sel > index => Some(sel - 1),
            other => other,
        };
        Some(removed)
    }

    pub fn select(&mut self, index: Option<usize>) {
        match index {
            Some(i) if i >= self.transforms.len() => {}
            _ => self.selected = index,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn get(&self, index: usize) -> Option<&DesignTransform> {
        self.transforms.get(index)
    }

    /// Replace a layer's transform. Ignored for unknown indices.
    pub fn set(&mut self, index: usize, transform: DesignTransform) {
        if let Some(slot) = self.transforms.get_mut(index) {
            *slot = transform;
        }
    }

    pub fn transforms(&self) -> &[DesignTransform] {
        &self.transforms
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Indices bottom-to-top for on-screen painting: ascending, with the
    /// selected layer raised above all others.
    pub fn paint_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.transforms.len())
            .filter(|&i| Some(i) != self.selected)
            .collect();
        if let Some(sel) = self.selected {
            order.push(sel);
        }
        order
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.transforms)
    }

    pub fn transforms_from_json(json: &str) -> serde_json::Result<Vec<DesignTransform>> {
        serde_json::from_str(json)
    }
}
