//! Unit dependency graph, traversal, planning, and rendering.
//!
//! - [`unit`]: [`UnitGraph`], the name-keyed registry of [`Unit`]s and edges
//! - [`walk`]: depth-first traversal with entry/exit hooks
//! - [`plan`]: [`ExecutionPlan`], cycle-checked dependency order
//! - [`render`]: box-drawing tree of every edge
pub mod plan;
pub mod render;
pub mod unit;
pub mod walk;

pub use plan::ExecutionPlan;
pub use render::render_tree;
pub use unit::{ROOT_NAME, Unit, UnitGraph, UnitId};
pub use walk::{Cursor, Enter, Visitor};
