//! Scene container: the slice of the external object store the geometric
//! core consumes: z-ordered top-level objects, background/overlay
//! drawables and the active viewport.

use kurbo::{Affine, Size};

use crate::object::{ObjectId, ObjectRef, visible_world_rect};
use crate::transform::decompose;

#[derive(Debug)]
pub struct Scene {
    /// Top-level objects, back to front.
    pub objects: Vec<ObjectRef>,
    /// Background drawable, rendered beneath all objects.
    pub background: Option<ObjectRef>,
    /// Overlay drawable, rendered above all objects.
    pub overlay: Option<ObjectRef>,
    /// Active viewport transform (zoom/pan), scene to device space.
    pub viewport: Affine,
    /// Viewport size in device pixels.
    pub viewport_size: Size,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            objects: Vec::new(),
            background: None,
            overlay: None,
            viewport: Affine::IDENTITY,
            viewport_size: Size::new(width, height),
        }
    }

    pub fn add_object(&mut self, object: ObjectRef) {
        log::debug!("scene: add object {}", object.borrow().id);
        self.objects.push(object);
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Option<ObjectRef> {
        let index = self.objects.iter().position(|o| o.borrow().id == id)?;
        log::debug!("scene: remove object {id}");
        Some(self.objects.remove(index))
    }

    pub fn find_object(&self, id: ObjectId) -> Option<ObjectRef> {
        self.objects
            .iter()
            .find(|o| o.borrow().id == id)
            .cloned()
    }

    /// Current zoom factor, read off the viewport matrix.
    pub fn zoom(&self) -> f64 {
        decompose(self.viewport).scale_x
    }

    /// Viewport rectangle in scene coordinates, `None` if the viewport
    /// matrix is degenerate.
    pub fn visible_rect(&self) -> Option<kurbo::Rect> {
        visible_world_rect(self.viewport, self.viewport_size)
    }
}
