//! Selective eraser: masked two-surface compositing during the drag and an
//! asynchronous attachment fan-out on release.
//!
//! Compositing operators can only subtract against what is currently
//! drawn, not against one object's pixels. The pattern surface works
//! around that: it holds exactly the content that must show through the
//! gesture, and the overlay masks the live stroke with it. On pointer-up
//! the finalized path is cloned into every intersected erasable object's
//! mask, recursing through deep-erasable collections with clip-path
//! re-expression along the way.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{try_join_all, LocalBoxFuture};
use futures::FutureExt;
use kurbo::{Point, Rect, Size};
use peniko::{Color, Compose};
use thiserror::Error;

use slateink_core::mask::{ClipPath, EraserMask};
use slateink_core::object::{ObjectId, ObjectRef, SceneObject};
use slateink_core::path::{InkPath, StrokeStyle};
use slateink_core::polygon::{polygon_contains_polygon, polygons_intersect, CornerSet};
use slateink_core::scene::Scene;
use slateink_core::transform::{invert, multiply};

use crate::events::{CanvasEvent, ErasureSummary, EventBus};
use crate::pencil::{decimate_points, smooth_path, DEFAULT_DECIMATE};
use crate::surface::RenderSurface;

/// The main-surface clip stroke is narrowed by this amount so its
/// antialiased fringe stays hidden under the overlay stroke.
pub const ALIASING_WIDTH_CORRECTION: f64 = 1.0;

#[derive(Debug, Error)]
pub enum EraseError {
    #[error("object {0} has a non-invertible transform")]
    DegenerateTransform(ObjectId),
}

/// Objects whose state was temporarily rewritten while rendering the
/// pattern surface. Dropping it without calling [`restore`] would leave
/// the scene in the pattern's masked state.
///
/// [`restore`]: RestorationContext::restore
#[derive(Debug, Default)]
#[must_use]
pub struct RestorationContext {
    hidden: Vec<ObjectRef>,
    detached: Vec<(ObjectRef, EraserMask)>,
}

impl RestorationContext {
    pub fn restore(self) {
        for object in self.hidden {
            object.borrow_mut().visible = true;
        }
        for (object, mask) in self.detached {
            object.borrow_mut().eraser = Some(mask);
        }
    }
}

/// Where a leaf attachment is recorded in the gesture summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttachmentRole {
    /// Top-level target, already recorded at dispatch.
    Target,
    /// Child of a deep-erasable collection.
    Subtarget,
    /// Background or overlay drawable.
    Drawable,
}

/// What the finalized gesture does to a target's erasure state: erase
/// appends mask entries, restore carves the gesture region back out of
/// existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropagationMode {
    Erase,
    Restore,
}

/// Accumulates the affected-object sets as the fan-out settles.
#[derive(Debug, Default)]
struct ErasureAttachmentContext {
    targets: Vec<ObjectId>,
    subtargets: Vec<ObjectId>,
    drawables: Vec<ObjectId>,
}

impl ErasureAttachmentContext {
    fn record(&mut self, role: AttachmentRole, id: ObjectId) {
        match role {
            AttachmentRole::Target => {}
            AttachmentRole::Subtarget => self.subtargets.push(id),
            AttachmentRole::Drawable => self.drawables.push(id),
        }
    }

    fn into_summary(self) -> ErasureSummary {
        ErasureSummary {
            targets: self.targets,
            subtargets: self.subtargets,
            drawables: self.drawables,
        }
    }
}

/// Eraser gesture brush. `inverted` flips the semantics to un-erasing:
/// the stroke restores previously erased regions instead of removing ink.
#[derive(Debug)]
pub struct EraserBrush {
    pub width: f64,
    pub inverted: bool,
    pub decimate: f64,
    points: Vec<Point>,
    bus: EventBus,
}

impl EraserBrush {
    pub fn new(bus: EventBus) -> Self {
        Self {
            width: 10.0,
            inverted: false,
            decimate: DEFAULT_DECIMATE,
            points: Vec::new(),
            bus,
        }
    }

    /// Render the pattern surface: the content that must visually show
    /// through the gesture. Normal mode hides erasable objects (recursing
    /// through deep-erasable collections); inverted mode draws everything
    /// with existing masks detached so erased regions reappear. The scene
    /// is restored before returning.
    pub fn prepare_pattern(&self, scene: &Scene, pattern: &mut dyn RenderSurface) {
        pattern.clear();
        let mut restoration = RestorationContext::default();
        let drawables = [scene.background.clone(), scene.overlay.clone()];
        for object in scene
            .objects
            .iter()
            .chain(drawables.iter().flatten())
        {
            if self.inverted {
                detach_masks(object, &mut restoration);
            } else {
                hide_erasables(object, &mut restoration);
            }
        }

        if let Some(background) = &scene.background {
            let background = background.borrow();
            if background.visible {
                pattern.draw_object(&background);
            }
        }
        for object in &scene.objects {
            let object = object.borrow();
            if object.visible {
                pattern.draw_object(&object);
            }
        }
        if let Some(overlay) = &scene.overlay {
            let overlay = overlay.borrow();
            if overlay.visible {
                pattern.draw_object(&overlay);
            }
        }
        restoration.restore();
    }

    /// Start an erase gesture. Re-entering abandons the previous session's
    /// point buffer.
    pub fn on_pointer_down(
        &mut self,
        pointer: Point,
        scene: &Scene,
        main: &mut dyn RenderSurface,
        overlay: &mut dyn RenderSurface,
        pattern: &mut dyn RenderSurface,
    ) {
        self.points.clear();
        self.points.push(pointer);
        self.prepare_pattern(scene, pattern);
        self.bus.fire(&CanvasEvent::ErasingStart);
        self.render_stroke(main, overlay, pattern);
    }

    pub fn on_pointer_move(
        &mut self,
        pointer: Point,
        main: &mut dyn RenderSurface,
        overlay: &mut dyn RenderSurface,
        pattern: &mut dyn RenderSurface,
    ) {
        if self.points.is_empty() || self.points.last() == Some(&pointer) {
            return;
        }
        self.points.push(pointer);
        self.render_stroke(main, overlay, pattern);
    }

    /// Finish the gesture: decimate and smooth the captured points, then
    /// fan the finalized path out. Normal mode attaches the path to every
    /// intersected erasable target; inverted mode never appends a mask
    /// entry and instead carves the restored region out of the existing
    /// entries of every intersected target that carries one. Degenerate
    /// strokes abort silently with `Ok(None)`. A failed task aborts the
    /// join; siblings that already settled keep their attachments and no
    /// gesture-end event fires.
    pub async fn on_pointer_up(
        &mut self,
        scene: &Scene,
        overlay: &mut dyn RenderSurface,
    ) -> Result<Option<ErasureSummary>, EraseError> {
        overlay.clear();
        let points = std::mem::take(&mut self.points);
        if points.is_empty() {
            return Ok(None);
        }
        let points = if self.decimate > 0.0 {
            decimate_points(&points, self.decimate, scene.zoom())
        } else {
            points
        };
        let path = smooth_path(&points, self.width / 1000.0);
        if path.elements().is_empty() {
            return Ok(None);
        }
        let path = Rc::new(InkPath::new(
            path,
            StrokeStyle {
                width: self.width,
                ..StrokeStyle::default()
            },
        ));
        let bounds = path.bounding_rect();
        let canvas = scene.viewport_size;
        let mode = if self.inverted {
            PropagationMode::Restore
        } else {
            PropagationMode::Erase
        };
        let context = Rc::new(RefCell::new(ErasureAttachmentContext::default()));

        let mut tasks = Vec::new();
        for object in &scene.objects {
            let eligible = {
                let o = object.borrow();
                propagation_candidate(&o, mode) && intersects_bounds(&o, bounds)
            };
            if eligible {
                context.borrow_mut().targets.push(object.borrow().id);
                tasks.push(attach_to_object(
                    object.clone(),
                    path.clone(),
                    mode,
                    AttachmentRole::Target,
                    canvas,
                    context.clone(),
                    self.bus.clone(),
                ));
            }
        }
        for drawable in [&scene.background, &scene.overlay].into_iter().flatten() {
            if propagation_candidate(&drawable.borrow(), mode) {
                tasks.push(attach_to_object(
                    drawable.clone(),
                    path.clone(),
                    mode,
                    AttachmentRole::Drawable,
                    canvas,
                    context.clone(),
                    self.bus.clone(),
                ));
            }
        }
        let task_count = tasks.len();
        try_join_all(tasks).await?;
        log::debug!("erase fan-out settled across {task_count} targets");

        let context = Rc::try_unwrap(context)
            .map(RefCell::into_inner)
            .unwrap_or_default();
        let summary = context.into_summary();
        self.bus.fire(&CanvasEvent::ErasingEnd {
            summary: summary.clone(),
        });
        Ok(Some(summary))
    }

    /// Live compositing: clip the main surface with a narrowed
    /// destination-out stroke, then rebuild the overlay from the pattern
    /// masked by the full-width stroke.
    fn render_stroke(
        &self,
        main: &mut dyn RenderSurface,
        overlay: &mut dyn RenderSurface,
        pattern: &mut dyn RenderSurface,
    ) {
        let path = smooth_path(&self.points, 0.0);
        let clip_width = (self.width - ALIASING_WIDTH_CORRECTION).max(0.0);
        main.save();
        main.set_compose(Compose::DestOut);
        main.stroke_path(&path, clip_width, Color::BLACK);
        main.restore();

        overlay.clear();
        overlay.save();
        overlay.blit(pattern);
        if self.inverted {
            overlay.set_compose(Compose::SrcOver);
            overlay.stroke_path(&path, self.width, Color::WHITE);
        } else {
            overlay.set_compose(Compose::DestIn);
            overlay.stroke_path(&path, self.width, Color::BLACK);
        }
        overlay.restore();
    }
}

/// Hide `object` if erasable; recurse instead of hiding when it is a
/// deep-erasable collection.
fn hide_erasables(object: &ObjectRef, restoration: &mut RestorationContext) {
    let mut o = object.borrow_mut();
    if o.kind.is_deep_erasable() {
        let children = o.kind.children().to_vec();
        drop(o);
        for child in &children {
            hide_erasables(child, restoration);
        }
    } else if o.erasable && o.visible {
        o.visible = false;
        drop(o);
        restoration.hidden.push(object.clone());
    }
}

/// Detach every erasure mask in the subtree rooted at `object`.
fn detach_masks(object: &ObjectRef, restoration: &mut RestorationContext) {
    let mut o = object.borrow_mut();
    if let Some(mask) = o.eraser.take() {
        restoration.detached.push((object.clone(), mask));
    }
    let children = o.kind.children().to_vec();
    drop(o);
    for child in &children {
        detach_masks(child, restoration);
    }
}

/// Whether an object can receive this gesture at all: erasing wants
/// erasable targets, restoring wants targets that already carry mask
/// entries to give back. Deep collections qualify either way and defer to
/// their children.
fn propagation_candidate(object: &SceneObject, mode: PropagationMode) -> bool {
    if object.kind.is_deep_erasable() {
        return true;
    }
    match mode {
        PropagationMode::Erase => object.erasable,
        PropagationMode::Restore => object.eraser.as_ref().is_some_and(|m| !m.is_empty()),
    }
}

fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Polygon intersection of the object's absolute corners against the
/// finalized path's bounding rect, including containment either way.
fn intersects_bounds(object: &SceneObject, bounds: Rect) -> bool {
    let rect = CornerSet::from_rect(bounds);
    let corners = object.corners(true, true);
    polygons_intersect(&corners, &rect)
        || polygon_contains_polygon(&corners, &rect)
        || polygon_contains_polygon(&rect, &corners)
}

/// Attach the gesture path to one target. Erasing leaves get a clone of
/// the path transformed into their local frame added to a lazily created
/// mask; restoring leaves get the same local-frame region carved out of
/// their existing entries instead, never a new entry. Deep-erasable
/// collections re-express their clip path in the path's frame and recurse.
/// Each clone is a suspension point; sibling attachments proceed
/// concurrently.
fn attach_to_object(
    target: ObjectRef,
    path: Rc<InkPath>,
    mode: PropagationMode,
    role: AttachmentRole,
    canvas: Size,
    context: Rc<RefCell<ErasureAttachmentContext>>,
    bus: EventBus,
) -> LocalBoxFuture<'static, Result<(), EraseError>> {
    async move {
        let deep = target.borrow().kind.is_deep_erasable();
        if deep {
            let mut branch = path.clone_async().await;
            let (id, clip, container_matrix, children) = {
                let t = target.borrow();
                (
                    t.id,
                    t.clip_path.clone(),
                    t.calc_transform_matrix(false),
                    t.kind.children().to_vec(),
                )
            };
            if let Some(clip) = clip {
                let mut clip = clip.clone_async().await;
                let path_inverse = invert(branch.transform)
                    .ok_or(EraseError::DegenerateTransform(id))?;
                // An absolutely positioned clip already lives in scene
                // space; a relative one is carried there by the
                // collection's matrix first.
                let reframe = if clip.absolute_positioned {
                    path_inverse
                } else {
                    multiply(path_inverse, container_matrix, false)
                };
                clip.apply_transform(reframe);
                clip.absolute_positioned = false;
                branch.clip = Some(match branch.clip.take() {
                    Some(existing) => ClipPath::intersect(existing, clip),
                    None => clip,
                });
            }
            let branch = Rc::new(branch);
            let tasks: Vec<_> = children
                .into_iter()
                .filter(|child| propagation_candidate(&child.borrow(), mode))
                .map(|child| {
                    attach_to_object(
                        child,
                        branch.clone(),
                        mode,
                        AttachmentRole::Subtarget,
                        canvas,
                        context.clone(),
                        bus.clone(),
                    )
                })
                .collect();
            try_join_all(tasks).await?;
            Ok(())
        } else {
            let mut clone = path.clone_async().await;
            let (id, matrix) = {
                let t = target.borrow();
                (t.id, t.calc_transform_matrix(false))
            };
            let inverse = invert(matrix).ok_or(EraseError::DegenerateTransform(id))?;
            clone.apply_transform(inverse);
            let touched = match mode {
                PropagationMode::Erase => {
                    let mut t = target.borrow_mut();
                    let mask = t
                        .eraser
                        .get_or_insert_with(|| EraserMask::new(canvas.width, canvas.height));
                    mask.add_path(clone);
                    t.dirty = true;
                    true
                }
                PropagationMode::Restore => restore_region(&target, &clone)?,
            };
            if touched {
                context.borrow_mut().record(role, id);
                bus.fire(&CanvasEvent::ObjectErased { id });
            }
            Ok(())
        }
    }
    .boxed_local()
}

/// Carve the restored region (already in the target's local frame) out of
/// the target's existing mask entries by chaining an inverted clip onto
/// each entry the region overlaps. Returns whether any entry changed.
fn restore_region(target: &ObjectRef, region: &InkPath) -> Result<bool, EraseError> {
    let restored = region.bounding_rect();
    let mut t = target.borrow_mut();
    let id = t.id;
    let mut touched = false;
    if let Some(mask) = t.eraser.as_mut() {
        for entry in mask.paths_mut() {
            if !rects_overlap(entry.bounding_rect(), restored) {
                continue;
            }
            // The cut is re-expressed in the entry's own frame so it
            // travels with the entry's transform.
            let entry_inverse =
                invert(entry.transform).ok_or(EraseError::DegenerateTransform(id))?;
            let mut cut = ClipPath::new(region.path.clone());
            cut.transform = multiply(entry_inverse, region.transform, false);
            cut.inverted = true;
            entry.clip = Some(match entry.clip.take() {
                Some(existing) => ClipPath::intersect(existing, cut),
                None => cut,
            });
            touched = true;
        }
    }
    if touched {
        t.dirty = true;
    }
    Ok(touched)
}
