//! Invitra is a template-driven invitation rendering and compositing engine.
//!
//! It takes a declarative template (background images, positioned text
//! fields, auto-fit text boxes) plus user-supplied values and
//! deterministically produces a pixel image, then composites a front/back
//! pair onto a mockup backdrop for final export.
//!
//! # Pipeline overview
//!
//! 1. **Compose**: field values are decorated and combined into display text
//!    ([`decorate`], [`compose`])
//! 2. **Render**: each side is painted onto a [`Surface`]: backgrounds,
//!    fields, auto-fit slots ([`SideRenderer`])
//! 3. **Approve**: the [`ApprovalWorkflow`] gates which side is editable and
//!    when the sides may be merged
//! 4. **Composite**: the rendered sides land on the mockup backdrop with
//!    per-side transforms and drop shadows ([`MockupCompositor`])
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: rendering the same template, values and
//!   side twice yields byte-identical pixels.
//! - **No IO in renderers**: image references resolve through the
//!   [`ImageLoader`] seam; renders for one surface supersede each other
//!   through [`RenderGate`] tickets.
//! - **Premultiplied RGBA8** end-to-end; straight alpha only at the export
//!   boundary.
#![forbid(unsafe_code)]

mod assets;
mod foundation;
mod render;
mod session;
mod template;
mod text;

pub use assets::loader::{
    FsImageLoader, ImageLoader, LoadedImage, MemoryImageLoader, decode_image, normalize_rel_path,
};
pub use foundation::core::{
    Align, BoxRect, CanvasSize, LayerPosition, Point, Rect, Rgba8, Side, Vec2,
};
pub use foundation::error::{InvitraError, InvitraResult};
pub use render::composite::{over, over_in_place};
pub use render::gate::{RenderGate, RenderTicket};
pub use render::mockup::MockupCompositor;
pub use render::shadow::{ShadowParams, drop_shadow};
pub use render::side::SideRenderer;
pub use render::surface::Surface;
pub use session::editor::EditorSession;
pub use session::workflow::{ApprovalWorkflow, WorkflowPhase};
pub use template::model::{
    Field, FieldKind, Manifest, MockupLayout, Slot, Template, Wrapper,
};
pub use template::values::{
    TEXT_COLOR_KEY, ValueSnapshot, ValueStore, custom_background_key,
};
pub use text::compose::{compose, decorate};
pub use text::fit::{FIT_FLOOR, FIT_MARGIN, fit_text_to_box, fit_text_to_box_with_floor};
pub use text::shaper::{TextBrush, TextMeasure, TextMetrics, TextShaper, layout_metrics};
