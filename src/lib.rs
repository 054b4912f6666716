//! # annotab
//!
//! Tabular aggregation engine for page-partitioned text annotation
//! collections.
//!
//! A collection is a named, versioned set of annotations anchored to one
//! document. Each annotation carries a fixed core (annotator, tag, span,
//! context, date) plus an **open set of named properties**; annotab
//! flattens that semi-structured shape into a normalized table with one
//! dynamic column per property, and supports queries, statistics and bulk
//! mutation over it.
//!
//! ## Pipeline
//!
//! | Stage | Module | Role |
//! |-------|--------|------|
//! | Load | [`loader`] | partition files → ordered [`Annotation`] entities |
//! | Normalize | [`table`] | entities → [`Table`] with dynamic `prop:` columns |
//! | Query/Mutate | [`collection`], [`stats`] | filters, duplication views, statistics, bulk property edits |
//! | Export | [`export`], [`csv_io`] | tabular contract for token-aligned exporters, bulk-edit CSV |
//! | Sync | [`sync`] | stage/commit/push the collection directory |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use annotab::{AnnotationCollection, GroupKey, Text};
//! use std::path::Path;
//!
//! # fn main() -> annotab::Result<()> {
//! let text = Text::new("My Novel", "the full document text ...");
//! let ac = AnnotationCollection::load(
//!     Path::new("/data/projects"),
//!     "P_42",
//!     "C_7",
//!     text,
//!     AnnotationCollection::DEFAULT_CONTEXT,
//! )?;
//!
//! // Structural queries over the normalized table.
//! let heroes = ac.filter_by_tag_path("Character");
//! let by_mood = ac.duplicate_by_prop("mood")?;
//! let stats = ac.tag_stats(&GroupKey::Tag, None, 10)?;
//! # let _ = (heroes, by_mood, stats);
//! # Ok(())
//! # }
//! ```
//!
//! ## Staleness Contract
//!
//! Bulk mutations ([`AnnotationCollection::annotate_properties`],
//! [`AnnotationCollection::rename_property_value`],
//! [`AnnotationCollection::delete_properties`], CSV import) operate on the
//! entity layer. The derived table does **not** auto-recompute; callers
//! check [`AnnotationCollection::is_table_stale`] and call
//! [`AnnotationCollection::refresh_table`] explicitly.
//!
//! ## Design Notes
//!
//! - Spans are **character** offsets into the document text, `[start, end)`.
//! - The missing-value marker for dynamic columns is the one-element list
//!   `["nan"]`; a declared-but-unset property keeps its empty list. The
//!   two are deliberately distinguishable.
//! - Tags live in an arena ([`TagArena`]) with parent links stored as
//!   indices, never owning references.

#![warn(missing_docs)]

pub mod annotation;
pub mod collection;
pub mod csv_io;
mod error;
pub mod export;
pub mod loader;
pub mod stats;
pub mod sync;
pub mod table;
pub mod tag;
pub mod text;

pub use annotation::{Annotation, RawRecord, RawTag};
pub use collection::{AgreementRow, AnnotationCollection};
pub use csv_io::{CsvRow, ImportSummary};
pub use error::{Error, Result};
pub use export::ExportAdapter;
pub use loader::Header;
pub use stats::{most_common_tokens, GroupKey, GroupStats};
pub use table::{Row, Table, FIXED_COLUMNS, MISSING, PROP_PREFIX};
pub use tag::{TagArena, TagId, TagNode};
pub use text::Text;
