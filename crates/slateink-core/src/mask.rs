//! Erasure masks and clip-path composition.
//!
//! An [`EraserMask`] is a collection-typed drawable owned by exactly one
//! scene object. It accumulates erase paths at a fixed size (it never
//! resizes as paths are added) and renders as an opaque mask. Its persisted
//! form is the ordered path list plus width/height, reconstructible through
//! the asynchronous [`EraserMask::revive`].

use kurbo::{Affine, BezPath};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::path::InkPath;

/// A clip region: path geometry, the transform placing it, and whether that
/// transform is scene-absolute or relative to the clipped object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipPath {
    pub path: BezPath,
    pub transform: Affine,
    /// When set, `transform` is in scene coordinates rather than the
    /// clipped object's local frame.
    pub absolute_positioned: bool,
    /// When set, the clip keeps the complement of the path region: the
    /// clipped geometry survives everywhere except inside the path.
    #[serde(default)]
    pub inverted: bool,
    /// Further clip this region intersects with, if any.
    pub and: Option<Box<ClipPath>>,
}

impl ClipPath {
    pub fn new(path: BezPath) -> Self {
        Self {
            path,
            transform: Affine::IDENTITY,
            absolute_positioned: false,
            inverted: false,
            and: None,
        }
    }

    /// Rebase by an outer transform (`outer · transform`).
    pub fn apply_transform(&mut self, outer: Affine) {
        self.transform = outer * self.transform;
    }

    /// Single clip equivalent to the intersection of `a` and `b`.
    ///
    /// `b` is chained onto the innermost intersection slot of `a`, so the
    /// result clips to exactly the region both accept.
    pub fn intersect(a: ClipPath, b: ClipPath) -> ClipPath {
        let mut merged = a;
        let mut slot = &mut merged.and;
        while let Some(next) = slot {
            slot = &mut next.and;
        }
        *slot = Some(Box::new(b));
        merged
    }

    /// Clone for propagation. A suspension point, like path cloning.
    pub async fn clone_async(&self) -> Self {
        self.clone()
    }
}

/// Persisted form of an eraser mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EraserMaskData {
    pub width: f64,
    pub height: f64,
    pub paths: Vec<InkPath>,
}

/// Per-object mask accumulating erase-path shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EraserMask {
    pub id: Uuid,
    /// Fixed layout size, set at creation; adding paths never resizes it.
    pub width: f64,
    pub height: f64,
    paths: Vec<InkPath>,
}

impl EraserMask {
    /// Create an empty mask with a fixed layout size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            width,
            height,
            paths: Vec::new(),
        }
    }

    pub fn add_path(&mut self, path: InkPath) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[InkPath] {
        &self.paths
    }

    /// Mutable access for in-place rewrites, such as carving a restored
    /// region out of existing entries.
    pub fn paths_mut(&mut self) -> &mut [InkPath] {
        &mut self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn to_data(&self) -> EraserMaskData {
        EraserMaskData {
            width: self.width,
            height: self.height,
            paths: self.paths.clone(),
        }
    }

    /// Reconstruct a mask from its persisted form, reviving each path and
    /// any nested clip path. Each revived entry is a suspension point.
    pub async fn revive(data: EraserMaskData) -> Self {
        let mut mask = Self::new(data.width, data.height);
        for path in data.paths {
            let mut revived = path.clone_async().await;
            if let Some(clip) = revived.clip.take() {
                revived.clip = Some(clip.clone_async().await);
            }
            mask.add_path(revived);
        }
        log::debug!("revived eraser mask {} with {} paths", mask.id, mask.paths.len());
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::StrokeStyle;
    use futures::executor::block_on;
    use kurbo::Point;

    fn sample_path() -> InkPath {
        let mut p = BezPath::new();
        p.move_to(Point::new(0.0, 0.0));
        p.line_to(Point::new(5.0, 5.0));
        InkPath::new(p, StrokeStyle::default())
    }

    #[test]
    fn test_mask_keeps_fixed_size() {
        let mut mask = EraserMask::new(800.0, 600.0);
        mask.add_path(sample_path());
        mask.add_path(sample_path());
        assert_eq!(mask.width, 800.0);
        assert_eq!(mask.height, 600.0);
        assert_eq!(mask.paths().len(), 2);
    }

    #[test]
    fn test_clip_intersection_chains() {
        let a = ClipPath::new(BezPath::new());
        let b = ClipPath::new(BezPath::new());
        let c = ClipPath::new(BezPath::new());
        let ab = ClipPath::intersect(a, b);
        let abc = ClipPath::intersect(ab, c);
        let mut depth = 0;
        let mut cursor = Some(&abc);
        while let Some(clip) = cursor {
            depth += 1;
            cursor = clip.and.as_deref();
        }
        assert_eq!(depth, 3);
    }

    #[test]
    fn test_revive_round_trip() {
        let mut mask = EraserMask::new(400.0, 300.0);
        let mut path = sample_path();
        path.clip = Some(ClipPath::new(BezPath::new()));
        mask.add_path(path);

        let json = serde_json::to_string(&mask.to_data()).unwrap();
        let data: EraserMaskData = serde_json::from_str(&json).unwrap();
        let revived = block_on(EraserMask::revive(data));

        assert_eq!(revived.width, 400.0);
        assert_eq!(revived.height, 300.0);
        assert_eq!(revived.paths().len(), 1);
        assert!(revived.paths()[0].clip.is_some());
    }
}
