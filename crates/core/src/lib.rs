//! # Altitude Core
//!
//! Domain types, traits, and error definitions for the Altitude idea
//! refinement engine. This crate has **no framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! A refinement walks a free-text idea down an ordered sequence of layers.
//! Everything the engine needs to know about a layer (its questions, its
//! vocabulary, its readiness thresholds) is *data*, declared in a
//! [`Blueprint`] and frozen into a [`Template`]. External text generation is
//! a trait ([`TextGenerator`]) so the engine never knows which backend, if any,
//! is behind it.

pub mod error;
pub mod layer;
pub mod message;
pub mod provider;
pub mod readiness;
pub mod template;
pub mod tree;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, TemplateError, TreeError};
pub use layer::{ExtractionRule, LayerDefinition, LayerVocabulary, ReadinessSignal};
pub use message::{Message, Role};
pub use provider::{GenerationOptions, Provider, ProviderRequest, ProviderResponse, TextGenerator};
pub use readiness::{ReadinessStatus, Thresholds};
pub use template::{
    Blueprint, FieldSource, LayerBlueprint, OutputFormat, OutputFormatBlueprint, Template,
};
pub use tree::{Branch, IdeaTree, LayerHistory, LayerHistoryEntry, Progress};
