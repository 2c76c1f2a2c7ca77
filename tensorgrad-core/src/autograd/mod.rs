//! # Autograd (`autograd`)
//!
//! Graph bookkeeping for reverse-mode differentiation:
//!
//! - [`context`]: per-application scratch record of values saved for backward.
//! - [`function`]: the closed [`Op`] table, each variant a forward/backward pair.
//! - [`history`]: the edge linking a derived tensor to its op, context and inputs.
//! - [`graph`]: reverse topological ordering of the graph behind a tensor.
//! - [`backward`]: the engine that walks that order and routes gradients.
//! - [`grad_check`]: central-difference validation of the engine.

pub mod backward;
pub mod context;
pub mod function;
pub mod grad_check;
pub mod graph;
pub mod history;

pub use context::{Context, SavedValue};
pub use function::{Function, Gradients, Op};
pub use history::History;
