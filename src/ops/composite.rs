// ============================================================================
// COMPOSITOR — flatten design layers onto the background at native resolution
// ============================================================================
//
// Layer transforms are stored in display space (the background as shown in
// the editor). Here they are rescaled into the background's native pixels
// with independent x/y factors, then each design is stretched to its box,
// rotated about the box center and blended in ascending layer order.
//
// Rows are processed in parallel via rayon.
// ============================================================================

use std::fmt;
use std::str::FromStr;

use image::RgbaImage;
use rayon::prelude::*;

use crate::components::layers::{DesignTransform, Point, Size};
use crate::error::ComposeError;

/// Look of the local simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MockupStyle {
    #[default]
    Engrave,
    Print,
    Emboss,
}

impl MockupStyle {
    pub fn all() -> &'static [MockupStyle] {
        &[MockupStyle::Engrave, MockupStyle::Print, MockupStyle::Emboss]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MockupStyle::Engrave => "Engrave",
            MockupStyle::Print => "Print",
            MockupStyle::Emboss => "Emboss",
        }
    }

    /// Stable lowercase key used in settings and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            MockupStyle::Engrave => "engrave",
            MockupStyle::Print => "print",
            MockupStyle::Emboss => "emboss",
        }
    }

    pub fn profile(&self) -> StyleProfile {
        match self {
            MockupStyle::Engrave => StyleProfile {
                blend: CompositeBlend::Multiply,
                opacity: 0.7,
                filter: Some(DesignFilter { grayscale: true, brightness: 0.6 }),
            },
            MockupStyle::Print => StyleProfile {
                blend: CompositeBlend::Normal,
                opacity: 0.9,
                filter: None,
            },
            MockupStyle::Emboss => StyleProfile {
                blend: CompositeBlend::Overlay,
                opacity: 0.4,
                filter: Some(DesignFilter { grayscale: true, brightness: 1.1 }),
            },
        }
    }
}

impl fmt::Display for MockupStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MockupStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "engrave" => Ok(MockupStyle::Engrave),
            "print" => Ok(MockupStyle::Print),
            "emboss" => Ok(MockupStyle::Emboss),
            other => Err(format!("unknown mockup style '{other}' (expected engrave, print or emboss)")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeBlend {
    Normal,
    Multiply,
    Overlay,
}

/// Per-pixel filter applied to design pixels before blending.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DesignFilter {
    pub grayscale: bool,
    /// Linear multiplier (1.0 = unchanged).
    pub brightness: f32,
}

impl DesignFilter {
    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let [mut r, mut g, mut b] = rgb;
        if self.grayscale {
            let l = 0.2126 * r + 0.7152 * g + 0.0722 * b;
            (r, g, b) = (l, l, l);
        }
        [
            (r * self.brightness).clamp(0.0, 1.0),
            (g * self.brightness).clamp(0.0, 1.0),
            (b * self.brightness).clamp(0.0, 1.0),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleProfile {
    pub blend: CompositeBlend,
    pub opacity: f32,
    pub filter: Option<DesignFilter>,
}

/// `Final` is the plain composite handed to a generation service;
/// `Simulation` is the local stand-in result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    Final,
    Simulation(MockupStyle),
}

impl RenderMode {
    pub fn profile(&self) -> StyleProfile {
        match self {
            RenderMode::Final => StyleProfile {
                blend: CompositeBlend::Normal,
                opacity: 1.0,
                filter: None,
            },
            RenderMode::Simulation(style) => style.profile(),
        }
    }
}

/// A design's box in native background pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedDesign {
    pub center: Point,
    pub size: Size,
    pub rotation_rad: f64,
}

/// Horizontal and vertical display → native scale factors.
pub fn scale_factors(native_width: u32, native_height: u32, container: Size) -> Result<(f64, f64), ComposeError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(container.width) || !valid(container.height) {
        return Err(ComposeError::InvalidContainer {
            width: container.width,
            height: container.height,
        });
    }
    Ok((
        native_width as f64 / container.width,
        native_height as f64 / container.height,
    ))
}

pub fn place(transform: &DesignTransform, sx: f64, sy: f64) -> PlacedDesign {
    let x = transform.position.x * sx;
    let y = transform.position.y * sy;
    let width = transform.size.width * sx;
    let height = transform.size.height * sy;
    PlacedDesign {
        center: Point::new(x + width / 2.0, y + height / 2.0),
        size: Size::new(width, height),
        rotation_rad: transform.rotation.to_radians(),
    }
}

/// Draw every design over a copy of `background`.
pub fn compose(
    background: &RgbaImage,
    designs: &[RgbaImage],
    transforms: &[DesignTransform],
    container: Size,
    mode: RenderMode,
) -> Result<RgbaImage, ComposeError> {
    if background.width() == 0 || background.height() == 0 {
        return Err(ComposeError::EmptyBackground);
    }
    if designs.len() != transforms.len() {
        return Err(ComposeError::LayerCountMismatch {
            designs: designs.len(),
            transforms: transforms.len(),
        });
    }
    let (sx, sy) = scale_factors(background.width(), background.height(), container)?;
    let profile = mode.profile();

    let mut canvas = background.clone();
    for (design, transform) in designs.iter().zip(transforms) {
        let placed = place(transform, sx, sy);
        draw_design(&mut canvas, design, &placed, &profile);
    }
    Ok(canvas)
}

fn draw_design(canvas: &mut RgbaImage, design: &RgbaImage, placed: &PlacedDesign, profile: &StyleProfile) {
    let (dw, dh) = (design.width(), design.height());
    if dw == 0 || dh == 0 || placed.size.width <= 0.0 || placed.size.height <= 0.0 {
        return;
    }
    let canvas_w = canvas.width() as usize;
    let canvas_h = canvas.height() as i64;

    let (sin, cos) = placed.rotation_rad.sin_cos();
    let hw = placed.size.width / 2.0;
    let hh = placed.size.height / 2.0;

    // Axis-aligned bounds of the rotated box, clipped to the canvas.
    let ext_x = hw * cos.abs() + hh * sin.abs();
    let ext_y = hw * sin.abs() + hh * cos.abs();
    let x0 = ((placed.center.x - ext_x).floor() as i64).clamp(0, canvas_w as i64) as usize;
    let x1 = ((placed.center.x + ext_x).ceil() as i64).clamp(0, canvas_w as i64) as usize;
    let y0 = ((placed.center.y - ext_y).floor() as i64).clamp(0, canvas_h);
    let y1 = ((placed.center.y + ext_y).ceil() as i64).clamp(0, canvas_h);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let u_scale = dw as f64 / placed.size.width;
    let v_scale = dh as f64 / placed.size.height;
    let row_bytes = canvas_w * 4;

    canvas
        .as_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .skip(y0 as usize)
        .take((y1 - y0) as usize)
        .for_each(|(py, row)| {
            let dy = py as f64 + 0.5 - placed.center.y;
            for px in x0..x1 {
                let dx = px as f64 + 0.5 - placed.center.x;
                // Inverse-rotate into the design's local frame.
                let lx = dx * cos + dy * sin;
                let ly = -dx * sin + dy * cos;
                if lx.abs() > hw || ly.abs() > hh {
                    continue;
                }
                let u = ((lx + hw) * u_scale - 0.5) as f32;
                let v = ((ly + hh) * v_scale - 0.5) as f32;
                let top = bilinear_sample_clamped(design, u, v);
                let i = px * 4;
                let base = [row[i], row[i + 1], row[i + 2], row[i + 3]];
                row[i..i + 4].copy_from_slice(&blend_pixel(base, top, profile));
            }
        });
}

/// Bilinear sample with edge clamping, so box edges don't fade out.
fn bilinear_sample_clamped(img: &RgbaImage, x: f32, y: f32) -> [f32; 4] {
    let max_x = (img.width() - 1) as f32;
    let max_y = (img.height() - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(img.width() - 1);
    let y1 = (y0 + 1).min(img.height() - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let sample = |sx: u32, sy: u32| -> [f32; 4] {
        let p = img.get_pixel(sx, sy);
        [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
    };
    let tl = sample(x0, y0);
    let tr = sample(x1, y0);
    let bl = sample(x0, y1);
    let br = sample(x1, y1);

    let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = lerp(tl[c], tr[c], fx);
        let bot = lerp(bl[c], br[c], fx);
        out[c] = lerp(top, bot, fy);
    }
    out
}

fn overlay_channel(base: f32, top: f32) -> f32 {
    if base < 0.5 {
        2.0 * base * top
    } else {
        1.0 - 2.0 * (1.0 - base) * (1.0 - top)
    }
}

/// Source-over of a filtered, blended design pixel (`top`, 0–255 floats)
/// onto `base`.
fn blend_pixel(base: [u8; 4], top: [f32; 4], profile: &StyleProfile) -> [u8; 4] {
    let top_a = (top[3] / 255.0) * profile.opacity.clamp(0.0, 1.0);
    if top_a <= 0.0 {
        return base;
    }

    let base_rgb = [base[0] as f32 / 255.0, base[1] as f32 / 255.0, base[2] as f32 / 255.0];
    let base_a = base[3] as f32 / 255.0;
    let mut top_rgb = [top[0] / 255.0, top[1] / 255.0, top[2] / 255.0];
    if let Some(filter) = profile.filter {
        top_rgb = filter.apply(top_rgb);
    }

    let mut out = [0u8; 4];
    let out_a = top_a + base_a * (1.0 - top_a);
    for c in 0..3 {
        let (b, t) = (base_rgb[c], top_rgb[c]);
        let blended = match profile.blend {
            CompositeBlend::Normal => t,
            CompositeBlend::Multiply => b * t,
            CompositeBlend::Overlay => overlay_channel(b, t),
        };
        // Where the backdrop is transparent the plain source color shows.
        let mixed = (1.0 - base_a) * t + base_a * blended;
        let value = (mixed * top_a + b * base_a * (1.0 - top_a)) / out_a;
        out[c] = (value * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}
