//! Scene objects: geometric properties, transform-matrix caching, corner
//! coordinates and intersection queries.
//!
//! Matrix caches are keyed by a structural fingerprint (the cloned property
//! struct, plus the ancestor chain's property structs for the full matrix),
//! so any geometric mutation invalidates them by construction. Corner
//! caches do **not** self-invalidate: the object-mutation layer is expected
//! to call [`SceneObject::refresh_coordinate_cache`] after property changes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mask::{ClipPath, EraserMask};
use crate::origin::{OriginX, OriginY, translate_from_center_point, translate_to_center_point};
use crate::polygon::{
    CornerSet, polygon_contains_point, polygon_contains_polygon, polygons_intersect,
};
use crate::transform::{ComposeOptions, compose, decompose, invert, multiply};

pub type ObjectId = Uuid;

/// Shared handle to a scene object. The scene graph is single-threaded and
/// cooperatively scheduled, so `Rc<RefCell<..>>` is the ownership model.
pub type ObjectRef = Rc<RefCell<SceneObject>>;

/// The geometric property set of an object. Doubles as the structural
/// fingerprint for the matrix caches: a cache entry is valid iff its stored
/// key compares equal to the freshly cloned properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    /// Rotation in degrees.
    pub angle: f64,
    pub origin_x: OriginX,
    pub origin_y: OriginY,
    pub stroke_width: f64,
    /// When set, stroke width is added after scaling as a flat addend.
    pub stroke_uniform: bool,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for ObjectGeometry {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            angle: 0.0,
            origin_x: OriginX::Left,
            origin_y: OriginY::Top,
            stroke_width: 0.0,
            stroke_uniform: false,
            flip_x: false,
            flip_y: false,
        }
    }
}

/// Scale/skew overrides for [`SceneObject::transformed_dimensions_with`].
#[derive(Debug, Clone, Copy)]
pub struct DimensionOverrides {
    pub scale_x: f64,
    pub scale_y: f64,
    pub skew_x: f64,
    pub skew_y: f64,
}

/// Object kind: a plain leaf, or a collection of children. Only the
/// collection variant carries children and the deep-erase capability.
#[derive(Debug)]
pub enum ObjectKind {
    Leaf,
    Collection {
        /// Erasure propagates to erasable children instead of the
        /// collection itself.
        deep_erasable: bool,
        children: Vec<ObjectRef>,
    },
}

impl ObjectKind {
    pub fn children(&self) -> &[ObjectRef] {
        match self {
            ObjectKind::Leaf => &[],
            ObjectKind::Collection { children, .. } => children,
        }
    }

    pub fn is_deep_erasable(&self) -> bool {
        matches!(
            self,
            ObjectKind::Collection {
                deep_erasable: true,
                ..
            }
        )
    }
}

#[derive(Debug, Clone)]
struct MatrixCacheEntry {
    key: Vec<ObjectGeometry>,
    value: Affine,
}

/// A node of the scene graph.
#[derive(Debug)]
pub struct SceneObject {
    pub id: ObjectId,
    pub geometry: ObjectGeometry,
    pub kind: ObjectKind,
    /// Back-reference to the owning group (tree, not DAG). Never an
    /// ownership edge.
    pub group: Option<Weak<RefCell<SceneObject>>>,
    /// Eligible to be affected by the eraser.
    pub erasable: bool,
    /// Accumulated erasure mask, lazily created on first erase.
    pub eraser: Option<EraserMask>,
    pub clip_path: Option<ClipPath>,
    pub visible: bool,
    /// Consumed by the external render layer to schedule redraws.
    pub dirty: bool,
    /// Extra interactive hit margin, applied as a rotated-rectangle inflate
    /// on the viewport corners.
    pub padding: f64,
    /// Absolute corners from the last coordinate refresh.
    pub a_coords: Option<CornerSet>,
    /// Viewport-space corners from the last refresh, used for hit-testing.
    pub line_coords: Option<CornerSet>,
    last_viewport: Affine,
    own_matrix_cache: RefCell<Option<MatrixCacheEntry>>,
    matrix_cache: RefCell<Option<MatrixCacheEntry>>,
}

impl SceneObject {
    pub fn new(geometry: ObjectGeometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry,
            kind: ObjectKind::Leaf,
            group: None,
            erasable: false,
            eraser: None,
            clip_path: None,
            visible: true,
            dirty: false,
            padding: 0.0,
            a_coords: None,
            line_coords: None,
            last_viewport: Affine::IDENTITY,
            own_matrix_cache: RefCell::new(None),
            matrix_cache: RefCell::new(None),
        }
    }

    /// Build a collection node. Children's `group` back-references are wired
    /// by [`into_ref`](Self::into_ref).
    pub fn collection(geometry: ObjectGeometry, deep_erasable: bool, children: Vec<ObjectRef>) -> Self {
        let mut object = Self::new(geometry);
        object.kind = ObjectKind::Collection {
            deep_erasable,
            children,
        };
        object
    }

    /// Wrap into a shared handle and point children back at it.
    pub fn into_ref(self) -> ObjectRef {
        let rc = Rc::new(RefCell::new(self));
        for child in rc.borrow().kind.children() {
            child.borrow_mut().group = Some(Rc::downgrade(&rc));
        }
        rc
    }

    fn parent(&self) -> Option<ObjectRef> {
        self.group.as_ref().and_then(Weak::upgrade)
    }

    /// Fingerprint covering this object and its ancestor chain.
    fn chain_key(&self) -> Vec<ObjectGeometry> {
        let mut key = vec![self.geometry.clone()];
        let mut parent = self.parent();
        while let Some(p) = parent {
            let p = p.borrow();
            key.push(p.geometry.clone());
            parent = p.parent();
        }
        key
    }

    /// Width/height after scale and skew, with stroke width folded in
    /// before scaling (non-uniform) or after, as a flat addend (uniform).
    pub fn transformed_dimensions(&self) -> Vec2 {
        self.transformed_dimensions_with(DimensionOverrides {
            scale_x: self.geometry.scale_x,
            scale_y: self.geometry.scale_y,
            skew_x: self.geometry.skew_x,
            skew_y: self.geometry.skew_y,
        })
    }

    pub fn transformed_dimensions_with(&self, overrides: DimensionOverrides) -> Vec2 {
        let g = &self.geometry;
        let (pre_stroke, post_stroke) = if g.stroke_uniform {
            (0.0, g.stroke_width)
        } else {
            (g.stroke_width, 0.0)
        };
        let dim_x = g.width + pre_stroke;
        let dim_y = g.height + pre_stroke;
        let size = if overrides.skew_x == 0.0 && overrides.skew_y == 0.0 {
            Vec2::new(dim_x * overrides.scale_x.abs(), dim_y * overrides.scale_y.abs())
        } else {
            let m = compose(&ComposeOptions {
                scale_x: overrides.scale_x,
                scale_y: overrides.scale_y,
                skew_x: overrides.skew_x,
                skew_y: overrides.skew_y,
                ..ComposeOptions::default()
            });
            let (hx, hy) = (dim_x / 2.0, dim_y / 2.0);
            let corners = [
                m * Point::new(-hx, -hy),
                m * Point::new(hx, -hy),
                m * Point::new(-hx, hy),
                m * Point::new(hx, hy),
            ];
            let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
            let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
            let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
            let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
            Vec2::new(max_x - min_x, max_y - min_y)
        };
        Vec2::new(size.x + post_stroke, size.y + post_stroke)
    }

    /// Geometric center in the parent's coordinate space.
    pub fn center_point(&self) -> Point {
        translate_to_center_point(
            Point::new(self.geometry.left, self.geometry.top),
            self.transformed_dimensions(),
            self.geometry.angle,
            (self.geometry.origin_x, self.geometry.origin_y),
        )
    }

    /// Position of a given origin anchor in the parent's coordinate space.
    pub fn position_by_origin(&self, origin: (OriginX, OriginY)) -> Point {
        translate_from_center_point(
            self.center_point(),
            self.transformed_dimensions(),
            self.geometry.angle,
            origin,
        )
    }

    /// Move the object so that `position` lands on the given origin anchor,
    /// converting back to the object's own stored anchor.
    pub fn set_position_by_origin(&mut self, position: Point, origin: (OriginX, OriginY)) {
        let dims = self.transformed_dimensions();
        let center = translate_to_center_point(position, dims, self.geometry.angle, origin);
        let anchored = translate_from_center_point(
            center,
            dims,
            self.geometry.angle,
            (self.geometry.origin_x, self.geometry.origin_y),
        );
        self.geometry.left = anchored.x;
        self.geometry.top = anchored.y;
    }

    /// Local affine matrix from the object's own geometric properties, with
    /// the geometric center (not the origin anchor) as translation.
    pub fn calc_own_matrix(&self) -> Affine {
        let key = vec![self.geometry.clone()];
        if let Some(entry) = self.own_matrix_cache.borrow().as_ref() {
            if entry.key == key {
                return entry.value;
            }
        }
        let center = self.center_point();
        let g = &self.geometry;
        let value = compose(&ComposeOptions {
            angle: g.angle,
            scale_x: g.scale_x,
            scale_y: g.scale_y,
            flip_x: g.flip_x,
            flip_y: g.flip_y,
            skew_x: g.skew_x,
            skew_y: g.skew_y,
            translate_x: center.x,
            translate_y: center.y,
        });
        *self.own_matrix_cache.borrow_mut() = Some(MatrixCacheEntry { key, value });
        value
    }

    /// Full transform including the ancestor chain. `skip_ancestors` (or the
    /// absence of a parent) reduces this to [`calc_own_matrix`](Self::calc_own_matrix).
    pub fn calc_transform_matrix(&self, skip_ancestors: bool) -> Affine {
        let own = self.calc_own_matrix();
        if skip_ancestors {
            return own;
        }
        let Some(parent) = self.parent() else {
            return own;
        };
        let key = self.chain_key();
        if let Some(entry) = self.matrix_cache.borrow().as_ref() {
            if entry.key == key {
                return entry.value;
            }
        }
        let value = multiply(parent.borrow().calc_transform_matrix(false), own, false);
        *self.matrix_cache.borrow_mut() = Some(MatrixCacheEntry { key, value });
        value
    }

    /// The 4 corners of the untransformed bounding box carried through
    /// `translate(center) · rotate(angle)` only; scale and skew are already
    /// absorbed by the half-dimensions. Viewport-invariant.
    pub fn calc_absolute_corners(&self) -> CornerSet {
        let full = self.calc_transform_matrix(false);
        let components = decompose(full);
        let dims = self.transformed_dimensions_with(DimensionOverrides {
            scale_x: components.scale_x,
            scale_y: components.scale_y,
            skew_x: components.skew_x,
            skew_y: components.skew_y,
        });
        let (hx, hy) = (dims.x / 2.0, dims.y / 2.0);
        let place = Affine::translate((components.translate_x, components.translate_y))
            * Affine::rotate(components.angle.to_radians());
        CornerSet {
            tl: place * Point::new(-hx, -hy),
            tr: place * Point::new(hx, -hy),
            br: place * Point::new(hx, hy),
            bl: place * Point::new(-hx, hy),
        }
    }

    /// Absolute corners projected into viewport space with the rotated
    /// padding inflate. Each corner shifts along a different combination of
    /// `cos(angle) ± sin(angle)`; this is not a uniform bounding-box inflate.
    pub fn calc_viewport_corners(&self, viewport: Affine) -> CornerSet {
        let absolute = self.calc_absolute_corners();
        let mut tl = viewport * absolute.tl;
        let mut tr = viewport * absolute.tr;
        let mut br = viewport * absolute.br;
        let mut bl = viewport * absolute.bl;
        if self.padding != 0.0 {
            let angle = decompose(self.calc_transform_matrix(false))
                .angle
                .to_radians();
            let cos_p = angle.cos() * self.padding;
            let sin_p = angle.sin() * self.padding;
            let cos_p_sin_p = cos_p + sin_p;
            let cos_p_minus_sin_p = cos_p - sin_p;
            tl.x -= cos_p_minus_sin_p;
            tl.y -= cos_p_sin_p;
            tr.x += cos_p_sin_p;
            tr.y -= cos_p_minus_sin_p;
            bl.x -= cos_p_sin_p;
            bl.y += cos_p_minus_sin_p;
            br.x += cos_p_minus_sin_p;
            br.y += cos_p_sin_p;
        }
        CornerSet { tl, tr, br, bl }
    }

    /// Recompute and store both corner sets. Must be called by the
    /// object-mutation layer after property changes; corner caches never
    /// invalidate themselves.
    pub fn refresh_coordinate_cache(&mut self, viewport: Affine) {
        self.a_coords = Some(self.calc_absolute_corners());
        self.line_coords = Some(self.calc_viewport_corners(viewport));
        self.last_viewport = viewport;
    }

    /// Cached corner set, recomputing when absent or when `force` is set.
    pub fn corners(&self, use_absolute: bool, force: bool) -> CornerSet {
        if use_absolute {
            match (&self.a_coords, force) {
                (Some(c), false) => *c,
                _ => self.calc_absolute_corners(),
            }
        } else {
            match (&self.line_coords, force) {
                (Some(c), false) => *c,
                _ => self.calc_viewport_corners(self.last_viewport),
            }
        }
    }

    /// Axis-aligned bounding box over the requested corner set.
    pub fn bounding_box(&self, use_absolute: bool, force_recalculate: bool) -> Rect {
        self.corners(use_absolute, force_recalculate).bounding_rect()
    }

    pub fn intersects_rect(&self, rect: Rect) -> bool {
        polygons_intersect(
            &self.corners(true, false),
            &CornerSet::from_rect(rect),
        )
    }

    /// True on proper intersection, coincidence, or containment in either
    /// direction. Containment is checked explicitly because edge-touching
    /// polygons may report no edge intersection.
    pub fn intersects_object(&self, other: &SceneObject) -> bool {
        let a = self.corners(true, false);
        let b = other.corners(true, false);
        polygons_intersect(&a, &b)
            || polygon_contains_polygon(&a, &b)
            || polygon_contains_polygon(&b, &a)
    }

    pub fn contains_point(&self, point: Point) -> bool {
        polygon_contains_point(&self.corners(true, false), point)
    }

    /// All 4 of this object's corners lie inside `other`.
    pub fn is_contained_within_object(&self, other: &SceneObject) -> bool {
        polygon_contains_polygon(&other.corners(true, false), &self.corners(true, false))
    }

    pub fn is_contained_within_rect(&self, rect: Rect) -> bool {
        polygon_contains_polygon(&CornerSet::from_rect(rect), &self.corners(true, false))
    }

    /// Visibility against the viewport: corner-in-viewport first, then
    /// polygon/rect intersection, then the "object contains the viewport
    /// center" check for objects larger than the entire viewport.
    pub fn is_on_screen(&self, viewport: Affine, viewport_size: Size) -> bool {
        let Some(world) = visible_world_rect(viewport, viewport_size) else {
            return false;
        };
        let corners = self.corners(true, false);
        if corners.points().iter().any(|&p| rect_contains(world, p)) {
            return true;
        }
        self.intersects_rect(world) || self.contains_point(world.center())
    }

    /// On screen but not necessarily with any corner visible.
    pub fn is_partially_on_screen(&self, viewport: Affine, viewport_size: Size) -> bool {
        let Some(world) = visible_world_rect(viewport, viewport_size) else {
            return false;
        };
        if self.intersects_rect(world) {
            return true;
        }
        let all_outside = self
            .corners(true, false)
            .points()
            .iter()
            .all(|&p| !rect_contains(world, p));
        all_outside && self.contains_point(world.center())
    }
}

fn rect_contains(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// The viewport rectangle expressed in scene coordinates, or `None` for a
/// degenerate viewport matrix.
pub fn visible_world_rect(viewport: Affine, viewport_size: Size) -> Option<Rect> {
    let inverse = invert(viewport)?;
    let tl = inverse * Point::ZERO;
    let br = inverse * Point::new(viewport_size.width, viewport_size.height);
    Some(Rect::new(
        tl.x.min(br.x),
        tl.y.min(br.y),
        tl.x.max(br.x),
        tl.y.max(br.y),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::approx_eq;

    const TOL: f64 = 1e-9;

    fn rect_object(left: f64, top: f64, width: f64, height: f64) -> SceneObject {
        SceneObject::new(ObjectGeometry {
            left,
            top,
            width,
            height,
            ..ObjectGeometry::default()
        })
    }

    #[test]
    fn test_own_matrix_translation_is_center() {
        let object = rect_object(10.0, 20.0, 100.0, 50.0);
        let [.., e, f] = object.calc_own_matrix().as_coeffs();
        assert!((e - 60.0).abs() < TOL);
        assert!((f - 45.0).abs() < TOL);
    }

    #[test]
    fn test_own_matrix_cache_invalidates_on_mutation() {
        let mut object = rect_object(0.0, 0.0, 10.0, 10.0);
        let before = object.calc_own_matrix();
        // A second call must hit the cache and agree.
        assert!(approx_eq(object.calc_own_matrix(), before, TOL));
        object.geometry.left = 40.0;
        let after = object.calc_own_matrix();
        assert!(!approx_eq(before, after, TOL));
        let [.., e, _] = after.as_coeffs();
        assert!((e - 45.0).abs() < TOL);
    }

    #[test]
    fn test_transform_matrix_includes_parent() {
        let child = rect_object(0.0, 0.0, 10.0, 10.0).into_ref();
        let group = SceneObject::collection(
            ObjectGeometry {
                left: 100.0,
                top: 100.0,
                width: 10.0,
                height: 10.0,
                ..ObjectGeometry::default()
            },
            false,
            vec![child.clone()],
        )
        .into_ref();

        let child_ref = child.borrow();
        let full = child_ref.calc_transform_matrix(false);
        let own = child_ref.calc_transform_matrix(true);
        let expected = multiply(group.borrow().calc_own_matrix(), own, false);
        assert!(approx_eq(full, expected, TOL));
        assert!(!approx_eq(full, own, TOL));
    }

    #[test]
    fn test_full_matrix_cache_tracks_ancestor_mutation() {
        let child = rect_object(0.0, 0.0, 10.0, 10.0).into_ref();
        let group = SceneObject::collection(
            ObjectGeometry {
                width: 10.0,
                height: 10.0,
                ..ObjectGeometry::default()
            },
            false,
            vec![child.clone()],
        )
        .into_ref();

        let before = child.borrow().calc_transform_matrix(false);
        group.borrow_mut().geometry.left = 500.0;
        let after = child.borrow().calc_transform_matrix(false);
        assert!(!approx_eq(before, after, TOL));
    }

    #[test]
    fn test_corner_consistency_unrotated() {
        let object = rect_object(0.0, 0.0, 100.0, 60.0);
        let corners = object.calc_absolute_corners();
        assert!((corners.tl.x - 0.0).abs() < TOL && (corners.tl.y - 0.0).abs() < TOL);
        assert!((corners.tr.x - 100.0).abs() < TOL && (corners.tr.y - 0.0).abs() < TOL);
        assert!((corners.bl.x - 0.0).abs() < TOL && (corners.bl.y - 60.0).abs() < TOL);
        assert!((corners.br.x - 100.0).abs() < TOL && (corners.br.y - 60.0).abs() < TOL);
    }

    #[test]
    fn test_corners_follow_scale() {
        let mut object = rect_object(0.0, 0.0, 100.0, 60.0);
        object.geometry.scale_x = 2.0;
        let corners = object.calc_absolute_corners();
        assert!((corners.tr.x - 200.0).abs() < TOL);
        assert!((corners.br.y - 60.0).abs() < TOL);
    }

    #[test]
    fn test_rotated_corners_stay_centered() {
        let mut object = rect_object(0.0, 0.0, 100.0, 100.0);
        object.geometry.angle = 45.0;
        object.geometry.origin_x = OriginX::Center;
        object.geometry.origin_y = OriginY::Center;
        let corners = object.calc_absolute_corners();
        let b = corners.bounding_rect();
        // A 100x100 square rotated 45 degrees spans 100*sqrt(2).
        let span = 100.0 * 2f64.sqrt();
        assert!((b.width() - span).abs() < 1e-6);
        assert!((b.height() - span).abs() < 1e-6);
    }

    #[test]
    fn test_viewport_corners_padding_inflate() {
        let mut object = rect_object(0.0, 0.0, 100.0, 100.0);
        object.padding = 10.0;
        let corners = object.calc_viewport_corners(Affine::IDENTITY);
        // Unrotated: cos=1, sin=0, so the inflate is axis-aligned.
        assert!((corners.tl.x + 10.0).abs() < TOL);
        assert!((corners.tl.y + 10.0).abs() < TOL);
        assert!((corners.br.x - 110.0).abs() < TOL);
        assert!((corners.br.y - 110.0).abs() < TOL);
    }

    #[test]
    fn test_refresh_coordinate_cache_is_explicit() {
        let mut object = rect_object(0.0, 0.0, 50.0, 50.0);
        object.refresh_coordinate_cache(Affine::IDENTITY);
        let cached = object.a_coords.unwrap();
        object.geometry.left = 400.0;
        // Stale until refreshed again.
        assert_eq!(object.corners(true, false), cached);
        let fresh = object.corners(true, true);
        assert!((fresh.tl.x - 400.0).abs() < TOL);
        object.refresh_coordinate_cache(Affine::IDENTITY);
        assert_eq!(object.corners(true, false), fresh);
    }

    #[test]
    fn test_line_coords_use_viewport() {
        let mut object = rect_object(0.0, 0.0, 50.0, 50.0);
        let viewport = Affine::scale(2.0);
        object.refresh_coordinate_cache(viewport);
        let line = object.line_coords.unwrap();
        assert!((line.br.x - 100.0).abs() < TOL);
    }

    #[test]
    fn test_disjoint_rectangles_do_not_intersect() {
        let a = rect_object(0.0, 0.0, 10.0, 10.0);
        let b = rect_object(100.0, 100.0, 10.0, 10.0);
        assert!(!a.intersects_object(&b));
        assert!(!b.intersects_object(&a));
    }

    #[test]
    fn test_containment_implies_intersection() {
        let outer = rect_object(0.0, 0.0, 100.0, 100.0);
        let inner = rect_object(40.0, 40.0, 10.0, 10.0);
        assert!(inner.is_contained_within_object(&outer));
        assert!(outer.intersects_object(&inner));
        assert!(inner.intersects_object(&outer));
        assert!(!outer.is_contained_within_object(&inner));
    }

    #[test]
    fn test_contains_point() {
        let object = rect_object(0.0, 0.0, 100.0, 100.0);
        assert!(object.contains_point(Point::new(50.0, 50.0)));
        assert!(!object.contains_point(Point::new(150.0, 50.0)));
    }

    #[test]
    fn test_transformed_dimensions_stroke_modes() {
        let mut object = rect_object(0.0, 0.0, 100.0, 50.0);
        object.geometry.scale_x = 2.0;
        object.geometry.scale_y = 2.0;
        object.geometry.stroke_width = 10.0;

        // Non-uniform: stroke folds in before scaling.
        let scaled = object.transformed_dimensions();
        assert!((scaled.x - 220.0).abs() < TOL);
        assert!((scaled.y - 120.0).abs() < TOL);

        // Uniform: flat post-scale addend.
        object.geometry.stroke_uniform = true;
        let uniform = object.transformed_dimensions();
        assert!((uniform.x - 210.0).abs() < TOL);
        assert!((uniform.y - 110.0).abs() < TOL);
    }

    #[test]
    fn test_skewed_dimensions_grow() {
        let mut object = rect_object(0.0, 0.0, 100.0, 100.0);
        object.geometry.skew_x = 45.0;
        let dims = object.transformed_dimensions();
        assert!((dims.x - 200.0).abs() < 1e-6);
        assert!((dims.y - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_is_on_screen_fallback_chain() {
        let viewport = Affine::IDENTITY;
        let size = Size::new(800.0, 600.0);

        let visible = rect_object(10.0, 10.0, 50.0, 50.0);
        assert!(visible.is_on_screen(viewport, size));

        let off = rect_object(2000.0, 2000.0, 50.0, 50.0);
        assert!(!off.is_on_screen(viewport, size));

        // Larger than the whole viewport: no corner inside, no edge
        // intersection, caught by the contains-center fallback.
        let huge = rect_object(-5000.0, -5000.0, 10000.0, 10000.0);
        assert!(huge.is_on_screen(viewport, size));
        assert!(huge.is_partially_on_screen(viewport, size));
    }

    #[test]
    fn test_set_position_by_origin() {
        let mut object = rect_object(0.0, 0.0, 100.0, 50.0);
        object.set_position_by_origin(Point::new(200.0, 100.0), (OriginX::Center, OriginY::Center));
        assert!((object.geometry.left - 150.0).abs() < TOL);
        assert!((object.geometry.top - 75.0).abs() < TOL);
        let c = object.center_point();
        assert!((c.x - 200.0).abs() < TOL);
        assert!((c.y - 100.0).abs() < TOL);
    }

    #[test]
    fn test_deep_erasable_capability() {
        let leaf = rect_object(0.0, 0.0, 10.0, 10.0);
        assert!(!leaf.kind.is_deep_erasable());
        assert!(leaf.kind.children().is_empty());

        let group = SceneObject::collection(ObjectGeometry::default(), true, vec![]);
        assert!(group.kind.is_deep_erasable());
    }
}
