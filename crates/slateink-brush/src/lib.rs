//! Slateink Brush Library
//!
//! Interactive brushes for the slateink canvas: free-hand pencil stroke
//! capture and smoothing, the selective eraser's masked compositing
//! pipeline, the render-surface contract and the brush event bus.

pub mod eraser;
pub mod events;
pub mod pencil;
pub mod surface;

pub use eraser::{EraseError, EraserBrush, RestorationContext, ALIASING_WIDTH_CORRECTION};
pub use events::{CanvasEvent, ErasureSummary, EventBus};
pub use pencil::{decimate_points, smooth_path, PencilBrush, StrokeSession, DEFAULT_DECIMATE};
pub use surface::{RecordingSurface, RenderSurface, SurfaceOp};
