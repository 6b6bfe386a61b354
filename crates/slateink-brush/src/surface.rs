//! Render-surface collaborator contract.
//!
//! The brushes issue drawing calls through [`RenderSurface`]; surface
//! lifecycle, rasterization and pixel formats are the implementation's
//! concern. The canvas exposes two layered surfaces: a persistent main
//! surface and a transient top/overlay surface the user sees moving under
//! the cursor, plus off-screen pattern surfaces the eraser prepares.

use kurbo::{Affine, BezPath, Size};
use peniko::{Color, Compose};
use slateink_core::object::SceneObject;

/// Drawing primitives the brushes need from a canvas surface.
pub trait RenderSurface {
    fn size(&self) -> Size;

    /// Device-pixel scaling factor (HiDPI).
    fn scale_factor(&self) -> f64;

    fn clear(&mut self);

    fn save(&mut self);

    fn restore(&mut self);

    fn set_transform(&mut self, transform: Affine);

    /// Select the compositing operator for subsequent drawing.
    fn set_compose(&mut self, compose: Compose);

    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color);

    /// Draw one scene object with its current state.
    fn draw_object(&mut self, object: &SceneObject);

    /// Draw another surface's content onto this one.
    fn blit(&mut self, source: &dyn RenderSurface);
}

/// One recorded drawing call (see [`RecordingSurface`]).
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Clear,
    Save,
    Restore,
    SetTransform(Affine),
    SetCompose(Compose),
    StrokePath { width: f64, color: Color },
    DrawObject(slateink_core::object::ObjectId),
    Blit,
}

/// Surface implementation that records the issued operation stream instead
/// of rasterizing. Used as the test double for the compositing protocol.
#[derive(Debug)]
pub struct RecordingSurface {
    size: Size,
    scale_factor: f64,
    pub ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            scale_factor: 1.0,
            ops: Vec::new(),
        }
    }

    /// Ids of the objects drawn onto this surface, in draw order.
    pub fn drawn_objects(&self) -> Vec<slateink_core::object::ObjectId> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::DrawObject(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// The compose operator active when the `index`-th stroke was issued.
    pub fn compose_for_stroke(&self, index: usize) -> Option<Compose> {
        let mut current = Compose::SrcOver;
        let mut strokes = 0;
        for op in &self.ops {
            match op {
                SurfaceOp::SetCompose(c) => current = *c,
                SurfaceOp::StrokePath { .. } => {
                    if strokes == index {
                        return Some(current);
                    }
                    strokes += 1;
                }
                _ => {}
            }
        }
        None
    }

    pub fn stroke_widths(&self) -> Vec<f64> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::StrokePath { width, .. } => Some(*width),
                _ => None,
            })
            .collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    fn clear(&mut self) {
        self.ops.push(SurfaceOp::Clear);
    }

    fn save(&mut self) {
        self.ops.push(SurfaceOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(SurfaceOp::Restore);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.ops.push(SurfaceOp::SetTransform(transform));
    }

    fn set_compose(&mut self, compose: Compose) {
        self.ops.push(SurfaceOp::SetCompose(compose));
    }

    fn stroke_path(&mut self, _path: &BezPath, width: f64, color: Color) {
        self.ops.push(SurfaceOp::StrokePath { width, color });
    }

    fn draw_object(&mut self, object: &SceneObject) {
        self.ops.push(SurfaceOp::DrawObject(object.id));
    }

    fn blit(&mut self, _source: &dyn RenderSurface) {
        self.ops.push(SurfaceOp::Blit);
    }
}
