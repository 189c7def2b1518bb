//! `prosub_core` is a text-substitution engine for build pipelines. Given a
//! text buffer it replaces occurrences of tokens — named properties between
//! configurable delimiters, or literal/regex patterns — with resolved
//! values, while emitting a mapping from output positions back to original
//! source positions.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Raw properties + config
//!   → PropertyTable (flatten nested values, inject time built-ins,
//!     resolve cross-references with cycle detection, fold case)
//!   → TokenScanner (delimited property name | escaped literal | regex)
//!   → SubstitutionEngine (scan/replace loop, literal + replacement spans)
//!   → MappingBuilder (line-delimited chunks attributed to source points)
//!   → output text + SourceMap
//! ```
//!
//! ## Key Types
//!
//! - [`Substitution`] — A configured substitution, reusable across units.
//!   Built by [`Substitution::properties`] (property mode) or
//!   [`Substitution::pattern`] (literal/regex mode).
//! - [`TextUnit`] — The file-like unit a pipeline hands in: path, buffer,
//!   and an optional pre-existing [`SourceMap`] to compose against.
//! - [`ReplaceConfig`] — Delimiters, case policy, date formats, failure
//!   policies. Validated eagerly; deserializable with serde.
//! - [`PropertyTable`] — The flattened, resolved property map, read-only
//!   after construction and shareable across threads.
//! - [`SourceMap`] — Ordered generated-to-source segments with
//!   nearest-segment lookup and composition.
//! - [`DiagnosticSink`] — Injectable leveled diagnostics; [`TracingSink`]
//!   forwards to `tracing`.
//!
//! ## Quick Start
//!
//! ```rust
//! use prosub_core::ReplaceConfig;
//! use prosub_core::Substitution;
//! use prosub_core::TextUnit;
//! use serde_json::json;
//!
//! let raw = json!({ "user": { "name": "Ada" } });
//! let substitution = Substitution::properties(&raw, ReplaceConfig::default()).unwrap();
//!
//! let unit = TextUnit::new("greeting.txt", "Hello #[[user.name]]!");
//! let output = substitution.transform(unit).unwrap();
//!
//! assert_eq!(output.contents, "Hello Ada!");
//! assert!(output.source_map.is_some());
//! ```

pub use config::*;
pub use diagnostics::*;
pub use engine::*;
pub use error::*;
pub use pipeline::*;
pub use position::*;
pub use properties::*;
pub use scanner::*;

pub mod config;
pub mod diagnostics;
mod engine;
mod error;
mod pipeline;
mod position;
pub mod properties;
mod scanner;
pub(crate) mod timefmt;

#[cfg(test)]
mod __fixtures;
