//! Layered refinement engine.
//!
//! Walks a free-text idea down the layers of a [`Template`](altitude_core::Template):
//! scores readiness, extracts branches into the caller's tree, asks a
//! text-generation service for a refinement aimed at the next layer (with a
//! deterministic local fallback), and assembles the final output once the
//! output layer is reached.
//!
//! The engine is stateless. Callers own the tree or history between calls.

pub mod branches;
pub mod builtin;
pub mod output;
pub mod plan;
pub mod prompt;
pub mod readiness;
pub mod refiner;
pub mod registry;
pub mod rewrite;
pub mod text;

pub use branches::{extract, merge_unique, prune, prune_tree};
pub use output::{AssembledOutput, IdeaExport, LayerRecord, assemble, assemble_output};
pub use plan::{ExecutionPlan, TimelinePhase};
pub use prompt::{InstructionPayload, ServiceReply};
pub use readiness::{Assessment, assess};
pub use refiner::{RefinementResult, RefinementSource, Refiner};
pub use registry::TemplateRegistry;
pub use rewrite::local_rewrite;
