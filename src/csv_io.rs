//! Bulk-edit CSV export and import.
//!
//! The bulk-edit table lets annotators fill in property values in a
//! spreadsheet and feed them back. One row per (annotation, property)
//! pair, semicolon-separated:
//!
//! ```text
//! id;annotation_collection;tag;text;property;values
//! CATMA_1;my collection;Hero;the hero;importance;high,medium
//! ```
//!
//! `values` is comma-joined and may be empty (it is always empty when
//! exporting only missing property values). Import applies a
//! property-value set per non-empty row; rows with unknown identifiers, a
//! mismatched tag, or an empty values field are counted as missed rather
//! than raised. The round trip is lossy by design for rows without values.

use crate::collection::AnnotationCollection;
use crate::error::Result;
use crate::table::clean_text;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of the bulk-edit table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRow {
    /// Annotation identifier.
    pub id: String,
    /// Collection name.
    pub annotation_collection: String,
    /// Tag name.
    pub tag: String,
    /// Whitespace-normalized annotation text.
    pub text: String,
    /// Property name.
    pub property: String,
    /// Comma-joined value list, possibly empty.
    pub values: String,
}

/// Outcome of a bulk-edit import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Rows whose property values were applied.
    pub updated: usize,
    /// Rows skipped: unknown id, mismatched tag, or empty values field.
    pub missed: usize,
}

impl AnnotationCollection {
    /// Write the bulk-edit CSV to `path`.
    ///
    /// `tag_names` restricts the exported annotations (`None` = all tags);
    /// `property` restricts to one property (`None` = every property
    /// observed in the collection). With `only_missing_prop_values`, only
    /// declared-but-unset properties are written and the values field is
    /// left empty. Returns the number of data rows written.
    pub fn write_annotation_csv(
        &self,
        path: &Path,
        tag_names: Option<&[&str]>,
        property: Option<&str>,
        only_missing_prop_values: bool,
    ) -> Result<usize> {
        let properties: Vec<String> = match property {
            Some(p) => vec![p.to_string()],
            None => self.table().prop_names().to_vec(),
        };

        let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
        let mut written = 0;
        for an in self.annotations() {
            let tag = self.tags().name(an.tag);
            if let Some(names) = tag_names {
                if !names.contains(&tag) {
                    continue;
                }
            }
            for (prop, values) in &an.properties {
                if !properties.iter().any(|p| p == prop) {
                    continue;
                }
                if only_missing_prop_values && !values.is_empty() {
                    continue;
                }
                writer.serialize(CsvRow {
                    id: an.uuid.clone(),
                    annotation_collection: self.name.clone(),
                    tag: tag.to_string(),
                    text: clean_text(&an.text),
                    property: prop.clone(),
                    values: if only_missing_prop_values {
                        String::new()
                    } else {
                        values.join(",")
                    },
                })?;
                written += 1;
            }
        }
        writer.flush()?;
        Ok(written)
    }

    /// Read a bulk-edit CSV written by
    /// [`AnnotationCollection::write_annotation_csv`] and apply its
    /// property values to the matching annotations.
    ///
    /// Each row with a non-empty values field sets the comma-split value
    /// list on the annotation with that identifier, provided the tag
    /// matches. Everything else counts as missed. The table becomes stale
    /// when any row applied.
    pub fn read_annotation_csv(&mut self, path: &Path) -> Result<ImportSummary> {
        let mut reader = csv::ReaderBuilder::new().delimiter(b';').from_path(path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            rows.push(row?);
        }

        let mut summary = ImportSummary::default();
        for row in rows {
            if row.values.is_empty() {
                summary.missed += 1;
                continue;
            }
            let target = self
                .annotations()
                .iter()
                .position(|a| a.uuid == row.id && self.tags().name(a.tag) == row.tag);
            match target {
                Some(i) => {
                    let values = row.values.split(',').map(str::to_string).collect();
                    self.annotations_mut()[i].set_property_values(&row.property, values);
                    summary.updated += 1;
                }
                None => summary.missed += 1,
            }
        }

        log::info!(
            "updated values for {} annotations ({} missed)",
            summary.updated,
            summary.missed
        );
        Ok(summary)
    }
}
