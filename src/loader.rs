//! On-disk collection store loading.
//!
//! A collection lives at `<root>/<project_id>/collections/<collection_id>/`:
//!
//! ```text
//! header.json          collection metadata (name, source document, version)
//! annotations/         zero or more partition files, each a JSON array of
//!                      raw annotation records
//! ```
//!
//! A missing `header.json` is fatal ([`crate::Error::NotFound`]); a missing
//! `annotations/` directory is not an error and yields an empty collection.
//! Partition files that fail to parse are propagated as
//! [`crate::Error::MalformedRecord`], never skipped.

use crate::annotation::{Annotation, RawRecord};
use crate::error::{Error, Result};
use crate::tag::TagArena;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Collection metadata stored in `header.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    /// The collection's human-readable name.
    pub name: String,
    /// Identifier of the annotated source document.
    #[serde(rename = "sourceDocumentId")]
    pub source_document_id: String,
    /// Version marker of the source document, if recorded.
    #[serde(rename = "sourceDocumentVersion", default)]
    pub source_document_version: Option<String>,
}

/// Read and parse `header.json` from a collection directory.
pub fn read_header(dir: &Path) -> Result<Header> {
    let path = dir.join("header.json");
    if !path.is_file() {
        return Err(Error::not_found(path));
    }
    let raw = fs::read_to_string(&path)?;
    serde_json::from_str(&raw).map_err(|e| Error::malformed_record(&path, e))
}

/// Load every partition file under `annotations/`, construct annotations
/// against the document `body`, and return them in total order.
///
/// Partition files arrive in arbitrary directory order; the result is
/// sorted by `(start_point, end_point, uuid)` so collection contents are
/// stable across file systems.
pub fn load_annotations(
    dir: &Path,
    body: &str,
    context: usize,
    tags: &mut TagArena,
) -> Result<Vec<Annotation>> {
    let pages = dir.join("annotations");
    if !pages.is_dir() {
        return Ok(Vec::new());
    }

    let mut annotations = Vec::new();
    for entry in fs::read_dir(&pages)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let raw = fs::read_to_string(&path)?;
        let records: Vec<RawRecord> =
            serde_json::from_str(&raw).map_err(|e| Error::malformed_record(&path, e))?;
        for record in records {
            annotations.push(Annotation::from_record(record, &path, body, context, tags)?);
        }
    }

    annotations.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
    log::debug!(
        "loaded {} annotations from {}",
        annotations.len(),
        pages.display()
    );
    Ok(annotations)
}
