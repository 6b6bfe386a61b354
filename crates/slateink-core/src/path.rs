//! Finalized vector paths and their stroke styling.

use kurbo::{Affine, BezPath, Rect, Shape as _};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mask::ClipPath;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// True when the color is not fully opaque.
    pub fn is_translucent(self) -> bool {
        self.a < 255
    }
}

impl From<Rgba> for Color {
    fn from(c: Rgba) -> Self {
        Color::from_rgba8(c.r, c.g, c.b, c.a)
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

/// Drop shadow attached to a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Rgba,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Stroke styling shared by the pencil and eraser brushes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub width: f64,
    /// Overall opacity (0.0 transparent, 1.0 opaque).
    pub opacity: f64,
    pub shadow: Option<Shadow>,
}

impl StrokeStyle {
    /// Stroke color with the style's opacity folded into the alpha channel.
    pub fn effective_color(&self) -> Color {
        let alpha = (self.color.a as f64 * self.opacity).round().clamp(0.0, 255.0) as u8;
        Color::from_rgba8(self.color.r, self.color.g, self.color.b, alpha)
    }

    /// True when strokes need a full redraw instead of incremental
    /// segments: translucent ink or a shadow would double-darken where
    /// segments overlap.
    pub fn needs_layered_render(&self) -> bool {
        self.opacity < 1.0 || self.color.is_translucent() || self.shadow.is_some()
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Rgba::black(),
            width: 1.0,
            opacity: 1.0,
            shadow: None,
        }
    }
}

/// A finalized vector path: geometry plus the transform placing it in the
/// scene and an optional clip restricting where it applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InkPath {
    pub id: Uuid,
    pub path: BezPath,
    pub transform: Affine,
    pub style: StrokeStyle,
    pub clip: Option<ClipPath>,
}

impl InkPath {
    pub fn new(path: BezPath, style: StrokeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            path,
            transform: Affine::IDENTITY,
            style,
            clip: None,
        }
    }

    /// Bounding box of the path geometry under its transform.
    pub fn bounding_rect(&self) -> Rect {
        (self.transform * self.path.clone()).bounding_box()
    }

    /// True when the path carries no segments at all.
    pub fn is_degenerate(&self) -> bool {
        self.path.elements().is_empty()
    }

    /// Clone for propagation into another coordinate frame. Each clone is a
    /// suspension point in the eraser fan-out.
    pub async fn clone_async(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: self.path.clone(),
            transform: self.transform,
            style: self.style.clone(),
            clip: self.clip.clone(),
        }
    }

    /// Rebase the path by an outer transform (`outer · transform`).
    pub fn apply_transform(&mut self, outer: Affine) {
        self.transform = outer * self.transform;
    }
}
