//! Slateink Core Library
//!
//! Geometric core of the slateink 2D scene-graph canvas: affine transform
//! algebra, per-object matrix and coordinate caching, origin translation,
//! erasure-mask data model and the scene container.

pub mod mask;
pub mod object;
pub mod origin;
pub mod path;
pub mod polygon;
pub mod scene;
pub mod transform;

pub use mask::{ClipPath, EraserMask, EraserMaskData};
pub use object::{
    DimensionOverrides, ObjectGeometry, ObjectId, ObjectKind, ObjectRef, SceneObject,
};
pub use origin::{OriginX, OriginY};
pub use path::{InkPath, Rgba, Shadow, StrokeStyle};
pub use polygon::CornerSet;
pub use scene::Scene;
pub use transform::{ComposeOptions, TransformComponents};
