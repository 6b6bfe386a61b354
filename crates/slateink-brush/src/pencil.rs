//! Free-hand stroke capture and smoothing.
//!
//! Pointer samples accumulate in a [`StrokeSession`]; rendering during the
//! drag is incremental (one quadratic segment per sample) unless the stroke
//! needs layered drawing, and finalization decimates the samples and builds
//! a successive-midpoint quadratic path.

use kurbo::{BezPath, Point};

use slateink_core::path::{InkPath, StrokeStyle};

use crate::events::{CanvasEvent, EventBus};
use crate::surface::RenderSurface;

/// Default decimation distance, in scene units at zoom 1.
pub const DEFAULT_DECIMATE: f64 = 0.4;

/// Transient state of one pointer drag.
#[derive(Debug, Default)]
pub struct StrokeSession {
    points: Vec<Point>,
    /// Set once the straight-line modifier has replaced a captured point.
    has_straight_line: bool,
    /// End anchor of the last incrementally rendered segment.
    old_end: Option<Point>,
    /// Style snapshot taken at pointer-down.
    style: StrokeStyle,
}

impl StrokeSession {
    fn new(style: StrokeStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn has_straight_line(&self) -> bool {
        self.has_straight_line
    }

    /// Append a captured point. Duplicates of the last point are rejected.
    fn add_point(&mut self, point: Point) -> bool {
        if self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        true
    }

    fn needs_full_render(&self) -> bool {
        self.has_straight_line || self.style.needs_layered_render()
    }
}

/// Free-hand drawing brush, `Idle → Capturing → Idle` per drag.
#[derive(Debug)]
pub struct PencilBrush {
    pub style: StrokeStyle,
    /// Decimation distance; 0 disables decimation.
    pub decimate: f64,
    /// Snap-to-straight-line modifier state, owned by the input layer.
    pub draw_straight_line: bool,
    session: Option<StrokeSession>,
    bus: EventBus,
}

impl PencilBrush {
    pub fn new(bus: EventBus) -> Self {
        Self {
            style: StrokeStyle::default(),
            decimate: DEFAULT_DECIMATE,
            draw_straight_line: false,
            session: None,
            bus,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.session.is_some()
    }

    /// Start a new stroke. Any in-progress session's point buffer is
    /// abandoned. The first point is captured unconditionally so a click
    /// without movement still renders as a dot.
    pub fn on_pointer_down(&mut self, pointer: Point, surface: &mut dyn RenderSurface) {
        let mut session = StrokeSession::new(self.style.clone());
        session.add_point(pointer);
        self.render_full(&session, surface);
        self.session = Some(session);
    }

    /// Capture a movement sample and render it.
    pub fn on_pointer_move(&mut self, pointer: Point, surface: &mut dyn RenderSurface) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if self.draw_straight_line && session.points.len() > 1 {
            // The line jumps from the last stable point to the pointer
            // instead of kinking through the intermediate sample.
            session.has_straight_line = true;
            session.points.pop();
        }
        if session.add_point(pointer) {
            if session.needs_full_render() {
                surface.clear();
                self.render_full(&session, surface);
            } else {
                self.render_increment(&mut session, surface);
            }
        }
        self.session = Some(session);
    }

    /// Finish the stroke. `insert` hands the finalized path to the object
    /// store; `before:path:created` fires before that insertion and
    /// `path:created` after it, so a subscriber reacting to the latter can
    /// already find the path. Empty or degenerate strokes are discarded
    /// silently (the capture surface is still cleared).
    pub fn on_pointer_up<F>(
        &mut self,
        zoom: f64,
        surface: &mut dyn RenderSurface,
        insert: F,
    ) -> Option<InkPath>
    where
        F: FnOnce(&InkPath),
    {
        self.draw_straight_line = false;
        let mut session = self.session.take()?;
        session.old_end = None;
        surface.clear();
        let path = finalize_session(&session, self.decimate, zoom)?;
        let ink = InkPath::new(path, session.style.clone());
        self.bus.fire(&CanvasEvent::BeforePathCreated { path: ink.clone() });
        insert(&ink);
        self.bus.fire(&CanvasEvent::PathCreated { path_id: ink.id });
        log::debug!("pencil stroke finalized with {} samples", session.points.len());
        Some(ink)
    }

    fn render_full(&self, session: &StrokeSession, surface: &mut dyn RenderSurface) {
        let path = render_path(&session.points, session.style.width);
        surface.stroke_path(&path, session.style.width, session.style.effective_color());
    }

    /// Stroke only the newest segment: the second-to-last point is the
    /// control and the midpoint of the last two points the end anchor.
    fn render_increment(&self, session: &mut StrokeSession, surface: &mut dyn RenderSurface) {
        let n = session.points.len();
        let (control, last) = (session.points[n - 2], session.points[n - 1]);
        let end = midpoint(control, last);
        let mut segment = BezPath::new();
        segment.move_to(session.old_end.unwrap_or(control));
        segment.quad_to(control, end);
        surface.stroke_path(&segment, session.style.width, session.style.effective_color());
        session.old_end = Some(end);
    }
}

pub(crate) fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Decimate, smooth and validate a session's samples. `None` when nothing
/// was captured.
pub(crate) fn finalize_session(
    session: &StrokeSession,
    decimate: f64,
    zoom: f64,
) -> Option<BezPath> {
    if session.points.is_empty() {
        return None;
    }
    let points = if decimate > 0.0 {
        decimate_points(&session.points, decimate, zoom)
    } else {
        session.points.clone()
    };
    let path = smooth_path(&points, session.style.width / 1000.0);
    if path.elements().is_empty() {
        return None;
    }
    Some(path)
}

/// Keep a point only once its squared distance from the last kept point
/// exceeds `(distance / zoom)²`. The final point is always kept so the
/// sequence never degenerates below 2 points.
pub fn decimate_points(points: &[Point], distance: f64, zoom: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let threshold = (distance / zoom).powi(2);
    let mut last = points[0];
    let mut kept = vec![last];
    for &p in &points[1..points.len() - 1] {
        let d = (p.x - last.x).powi(2) + (p.y - last.y).powi(2);
        if d >= threshold {
            last = p;
            kept.push(p);
        }
    }
    kept.push(points[points.len() - 1]);
    kept
}

/// Build a smoothed path from captured points: successive-midpoint
/// quadratic segments, with the endpoints nudged by `correction` along the
/// stroke direction. The correction keeps a stationary click visible; two
/// coincident endpoints would otherwise collapse to a zero-length path.
pub fn smooth_path(points: &[Point], correction: f64) -> BezPath {
    if points.is_empty() {
        return BezPath::new();
    }
    let points: Vec<Point> = if points.len() == 1 {
        vec![points[0], points[0]]
    } else {
        points.to_vec()
    };
    let many = points.len() > 2;
    let (mut sign_x, mut sign_y) = (1.0, 0.0);
    if many {
        sign_x = direction_sign(points[1].x, points[2].x);
        sign_y = direction_sign(points[1].y, points[2].y);
    }

    let mut path = BezPath::new();
    path.move_to(Point::new(
        points[0].x - sign_x * correction,
        points[0].y - sign_y * correction,
    ));
    let mut p1 = points[0];
    let mut p2 = points[1];
    for i in 1..points.len() {
        if p1 != p2 {
            path.quad_to(p1, midpoint(p1, p2));
        }
        p1 = points[i];
        if i + 1 < points.len() {
            p2 = points[i + 1];
        }
    }
    if many {
        let prev = points[points.len() - 2];
        sign_x = -direction_sign(p1.x, prev.x);
        sign_y = -direction_sign(p1.y, prev.y);
    }
    path.line_to(Point::new(
        p1.x + sign_x * correction,
        p1.y + sign_y * correction,
    ));
    path
}

fn direction_sign(from: f64, to: f64) -> f64 {
    if to < from {
        -1.0
    } else if to == from {
        0.0
    } else {
        1.0
    }
}

/// Path used for live full redraws: like [`smooth_path`] but the dot
/// nudge only applies to the two-coincident-points case.
fn render_path(points: &[Point], width: f64) -> BezPath {
    if points.len() <= 2 && points.windows(2).all(|w| w[0] == w[1]) {
        // Stationary click: spread the endpoints so a dot renders.
        let p = points[0];
        let offset = width / 1000.0;
        let mut path = BezPath::new();
        path.move_to(Point::new(p.x - offset, p.y - offset));
        path.line_to(Point::new(p.x + offset, p.y + offset));
        return path;
    }
    smooth_path(points, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use kurbo::PathEl;

    fn brush() -> PencilBrush {
        PencilBrush::new(EventBus::new())
    }

    #[test]
    fn test_capture_lifecycle() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut pencil = brush();
        assert!(!pencil.is_capturing());
        pencil.on_pointer_down(Point::new(0.0, 0.0), &mut surface);
        assert!(pencil.is_capturing());
        pencil.on_pointer_move(Point::new(10.0, 0.0), &mut surface);
        let ink = pencil.on_pointer_up(1.0, &mut surface, |_| {});
        assert!(ink.is_some());
        assert!(!pencil.is_capturing());
    }

    #[test]
    fn test_duplicate_points_rejected() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut pencil = brush();
        pencil.on_pointer_down(Point::new(5.0, 5.0), &mut surface);
        pencil.on_pointer_move(Point::new(5.0, 5.0), &mut surface);
        pencil.on_pointer_move(Point::new(6.0, 5.0), &mut surface);
        pencil.on_pointer_move(Point::new(6.0, 5.0), &mut surface);
        assert_eq!(pencil.session.as_ref().unwrap().points().len(), 2);
    }

    #[test]
    fn test_straight_line_replaces_last_point() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut pencil = brush();
        pencil.on_pointer_down(Point::new(0.0, 0.0), &mut surface);
        pencil.on_pointer_move(Point::new(10.0, 1.0), &mut surface);
        pencil.draw_straight_line = true;
        pencil.on_pointer_move(Point::new(20.0, 0.0), &mut surface);

        let session = pencil.session.as_ref().unwrap();
        assert!(session.has_straight_line());
        // (10, 1) was dropped; the line jumps from the first point.
        assert_eq!(
            session.points(),
            &[Point::new(0.0, 0.0), Point::new(20.0, 0.0)]
        );
    }

    #[test]
    fn test_straight_line_triggers_full_redraw() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut pencil = brush();
        pencil.on_pointer_down(Point::new(0.0, 0.0), &mut surface);
        pencil.draw_straight_line = true;
        pencil.on_pointer_move(Point::new(10.0, 0.0), &mut surface);
        pencil.on_pointer_move(Point::new(20.0, 0.0), &mut surface);
        assert!(
            surface
                .ops
                .iter()
                .any(|op| matches!(op, crate::surface::SurfaceOp::Clear))
        );
    }

    #[test]
    fn test_decimation_invariants() {
        let input: Vec<Point> = (0..100).map(|i| Point::new(i as f64 * 0.1, 0.0)).collect();
        let kept = decimate_points(&input, 2.0, 1.0);
        assert!(kept.len() >= 2);
        assert_eq!(*kept.last().unwrap(), *input.last().unwrap());
        for p in &kept {
            assert!(input.contains(p));
        }
        assert!(kept.len() < input.len());
    }

    #[test]
    fn test_decimation_respects_zoom() {
        let input: Vec<Point> = (0..100).map(|i| Point::new(i as f64 * 0.1, 0.0)).collect();
        let zoomed_out = decimate_points(&input, 2.0, 0.5);
        let zoomed_in = decimate_points(&input, 2.0, 4.0);
        // Higher zoom shrinks the threshold, keeping more points.
        assert!(zoomed_in.len() > zoomed_out.len());
    }

    #[test]
    fn test_single_click_produces_dot_path() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut pencil = brush();
        pencil.style.width = 10.0;
        pencil.on_pointer_down(Point::new(50.0, 50.0), &mut surface);
        let ink = pencil.on_pointer_up(1.0, &mut surface, |_| {}).unwrap();
        assert!(!ink.is_degenerate());
        let bounds = ink.bounding_rect();
        // The width/1000 correction spreads the endpoints just enough to
        // keep the dot renderable.
        assert!(bounds.width() > 0.0 && bounds.width() < 1.0);
    }

    #[test]
    fn test_empty_session_discarded() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut pencil = brush();
        assert!(pencil.on_pointer_up(1.0, &mut surface, |_| {}).is_none());
    }

    #[test]
    fn test_finalize_fires_events_around_insertion() {
        let bus = EventBus::new();
        let order = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = order.clone();
        bus.subscribe(move |event| {
            let tag = match event {
                CanvasEvent::BeforePathCreated { .. } => "before",
                CanvasEvent::PathCreated { .. } => "created",
                _ => "other",
            };
            sink.borrow_mut().push(tag);
        });

        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut pencil = PencilBrush::new(bus);
        pencil.on_pointer_down(Point::new(0.0, 0.0), &mut surface);
        pencil.on_pointer_move(Point::new(30.0, 30.0), &mut surface);
        let insert_sink = order.clone();
        pencil.on_pointer_up(1.0, &mut surface, |_| {
            insert_sink.borrow_mut().push("insert");
        });
        // The path lands in the store before `path:created` fires.
        assert_eq!(*order.borrow(), vec!["before", "insert", "created"]);
    }

    #[test]
    fn test_smooth_path_uses_quadratics() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 5.0),
        ];
        let path = smooth_path(&points, 0.0);
        let quads = path
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::QuadTo(..)))
            .count();
        assert_eq!(quads, 3);
        assert!(matches!(path.elements().last(), Some(PathEl::LineTo(_))));
    }

    #[test]
    fn test_incremental_render_tracks_cursor() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut pencil = brush();
        pencil.on_pointer_down(Point::new(0.0, 0.0), &mut surface);
        pencil.on_pointer_move(Point::new(10.0, 0.0), &mut surface);
        assert_eq!(
            pencil.session.as_ref().unwrap().old_end,
            Some(Point::new(5.0, 0.0))
        );
        pencil.on_pointer_move(Point::new(20.0, 0.0), &mut surface);
        assert_eq!(
            pencil.session.as_ref().unwrap().old_end,
            Some(Point::new(15.0, 0.0))
        );
    }

    #[test]
    fn test_new_pointer_down_abandons_session() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut pencil = brush();
        pencil.on_pointer_down(Point::new(0.0, 0.0), &mut surface);
        pencil.on_pointer_move(Point::new(50.0, 0.0), &mut surface);
        pencil.on_pointer_down(Point::new(100.0, 100.0), &mut surface);
        assert_eq!(pencil.session.as_ref().unwrap().points().len(), 1);
    }
}
