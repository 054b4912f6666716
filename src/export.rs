//! Output contract for downstream export adapters.
//!
//! Token-aligned exporters (basic token tables, annotated token tables,
//! TEI serialization) and visualization adapters live outside this crate.
//! They consume exactly three things, all stable parts of the public API:
//!
//! 1. the ordered entity sequence
//!    ([`AnnotationCollection::annotations`]),
//! 2. the normalized table ([`AnnotationCollection::table`]) with the
//!    fixed column set of [`crate::table::FIXED_COLUMNS`] plus
//!    `prop:`-prefixed dynamic columns, and
//! 3. tag-name-filtered plain projections
//!    ([`AnnotationCollection::to_list`]).
//!
//! The table shape is a de facto public contract: adding, removing or
//! reordering fixed columns is a breaking change for every adapter.

use crate::collection::AnnotationCollection;
use crate::error::Result;
use std::path::Path;

/// A consumer of the collection's tabular output contract.
///
/// Implementations write token-aligned tagged sequences, agreement tables
/// or visualization inputs; none of that logic is part of this crate.
pub trait ExportAdapter {
    /// Short adapter name, used in logs and default file naming.
    fn name(&self) -> &str;

    /// Consume the collection and write the export to `out`.
    fn export(&mut self, collection: &AnnotationCollection, out: &Path) -> Result<()>;
}
