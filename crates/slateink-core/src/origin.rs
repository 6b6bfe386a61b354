//! Origin anchor resolution and origin⇄center translation.
//!
//! An object's stored position is relative to a configurable anchor
//! (`origin_x`/`origin_y`). Conversions between anchor-relative and
//! center-relative coordinates shift by a fraction of the transformed
//! dimensions and, for rotated objects, rotate that shift about the
//! pre-offset point so the visual anchor is preserved.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::transform::rotate_point;

/// Horizontal anchor of an object's stored position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OriginX {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor of an object's stored position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OriginY {
    #[default]
    Top,
    Center,
    Bottom,
}

impl OriginX {
    /// Fractional offset along the width: left 0, center 0.5, right 1.
    pub fn resolve(self) -> f64 {
        match self {
            OriginX::Left => 0.0,
            OriginX::Center => 0.5,
            OriginX::Right => 1.0,
        }
    }
}

impl OriginY {
    /// Fractional offset along the height: top 0, center 0.5, bottom 1.
    pub fn resolve(self) -> f64 {
        match self {
            OriginY::Top => 0.0,
            OriginY::Center => 0.5,
            OriginY::Bottom => 1.0,
        }
    }
}

/// Translate `point` from one origin anchor to another, given the object's
/// transformed dimensions and rotation angle (degrees).
///
/// The rotation is applied about `point` itself (the pre-offset anchor),
/// not the shifted point.
pub fn translate_to_given_origin(
    point: Point,
    dimensions: Vec2,
    angle: f64,
    from: (OriginX, OriginY),
    to: (OriginX, OriginY),
) -> Point {
    let dx = (to.0.resolve() - from.0.resolve()) * dimensions.x;
    let dy = (to.1.resolve() - from.1.resolve()) * dimensions.y;
    let shifted = Point::new(point.x + dx, point.y + dy);
    if angle != 0.0 {
        rotate_point(shifted, point, angle)
    } else {
        shifted
    }
}

/// Translate an anchor-relative position to the object's geometric center.
pub fn translate_to_center_point(
    position: Point,
    dimensions: Vec2,
    angle: f64,
    origin: (OriginX, OriginY),
) -> Point {
    translate_to_given_origin(
        position,
        dimensions,
        angle,
        origin,
        (OriginX::Center, OriginY::Center),
    )
}

/// Translate the geometric center back to an anchor-relative position.
pub fn translate_from_center_point(
    center: Point,
    dimensions: Vec2,
    angle: f64,
    origin: (OriginX, OriginY),
) -> Point {
    translate_to_given_origin(
        center,
        dimensions,
        angle,
        (OriginX::Center, OriginY::Center),
        origin,
    )
}
