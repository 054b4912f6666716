//! Normalized tabular representation with a dynamic property schema.
//!
//! # The Open-Schema Problem
//!
//! Every annotation carries a fixed core (annotator, tag, span, context,
//! date) plus an arbitrary set of named properties. The table flattens that
//! open schema into stable columns: the set of dynamic columns is the union
//! of property names seen across the whole collection, and every row holds
//! a value list for every dynamic column.
//!
//! ```text
//! properties seen          resulting dynamic columns
//! ─────────────────        ───────────────────────────────
//! row 0: {importance}      prop:importance   prop:mood
//! row 1: {mood}            ["high"]          ["nan"]
//! row 2: {}                ["nan"]           ["calm"]
//!                          ["nan"]           ["nan"]
//! ```
//!
//! The normalizer is a single pass: a property first seen at row `i`
//! backfills rows `0..i` with the missing marker, and after each row every
//! known property absent from that row gets the marker appended. Columns
//! therefore always have exactly one cell per row.
//!
//! The missing marker is the one-element list `["nan"]`. A property that is
//! declared but unset keeps its empty list, so "never declared" and
//! "declared with zero values" stay distinguishable downstream.

use crate::annotation::Annotation;
use crate::error::{Error, Result};
use crate::tag::TagArena;
use once_cell::sync::Lazy;
use regex::Regex;

/// Missing-value marker for dynamic property cells.
pub const MISSING: &str = "nan";

/// Prefix that disambiguates dynamic property columns from fixed columns.
pub const PROP_PREFIX: &str = "prop:";

/// The canonical fixed columns, in order.
pub const FIXED_COLUMNS: [&str; 11] = [
    "document",
    "annotation collection",
    "annotator",
    "tag",
    "tag_path",
    "left_context",
    "annotation",
    "right_context",
    "start_point",
    "end_point",
    "date",
];

/// Fixed-column portion of one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Document title.
    pub document: String,
    /// Collection name.
    pub collection: String,
    /// The authoring annotator.
    pub annotator: String,
    /// Tag name.
    pub tag: String,
    /// Full root-first tag path.
    pub tag_path: String,
    /// Whitespace-normalized context preceding the span.
    pub left_context: String,
    /// Whitespace-normalized span text.
    pub annotation: String,
    /// Whitespace-normalized context following the span.
    pub right_context: String,
    /// Span start in character offsets.
    pub start_point: usize,
    /// Span end (exclusive) in character offsets.
    pub end_point: usize,
    /// Creation/modification date.
    pub date: String,
}

/// The normalized table: fixed columns plus dynamic property columns.
///
/// Derived from the annotation sequence by [`Table::normalize`]; a
/// collection recomputes it after bulk entity mutation.
#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<Row>,
    prop_names: Vec<String>,
    /// prop_cols[p][r] is the value list of property `p` at row `r`.
    prop_cols: Vec<Vec<Vec<String>>>,
}

/// Collapse newlines and multi-space runs to single spaces.
///
/// Applied to the three text columns only; the underlying entity text is
/// never touched.
#[must_use]
pub fn clean_text(text: &str) -> String {
    static NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n").unwrap());
    static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());
    let no_newlines = NEWLINES.replace_all(text, " ");
    SPACES.replace_all(&no_newlines, " ").into_owned()
}

impl Table {
    /// Build the normalized table from an ordered annotation sequence.
    ///
    /// The row order follows the input order; dynamic columns appear in
    /// first-seen order. An empty sequence yields zero rows and no dynamic
    /// columns.
    #[must_use]
    pub fn normalize(
        annotations: &[Annotation],
        tags: &TagArena,
        title: &str,
        collection_name: &str,
    ) -> Self {
        let mut rows = Vec::with_capacity(annotations.len());
        let mut prop_names: Vec<String> = Vec::new();
        let mut prop_cols: Vec<Vec<Vec<String>>> = Vec::new();

        for (index, an) in annotations.iter().enumerate() {
            rows.push(Row {
                document: title.to_string(),
                collection: collection_name.to_string(),
                annotator: an.author.clone(),
                tag: tags.name(an.tag).to_string(),
                tag_path: tags.full_path(an.tag),
                left_context: clean_text(&an.pretext),
                annotation: clean_text(&an.text),
                right_context: clean_text(&an.posttext),
                start_point: an.start_point,
                end_point: an.end_point,
                date: an.date.clone(),
            });

            for (key, values) in &an.properties {
                match prop_names.iter().position(|name| name == key) {
                    Some(p) => prop_cols[p].push(values.clone()),
                    None => {
                        // First sighting: backfill all previous rows.
                        let mut column = vec![missing_cell(); index];
                        column.push(values.clone());
                        prop_names.push(key.clone());
                        prop_cols.push(column);
                    }
                }
            }

            // Pad every known property this annotation does not declare.
            for (p, name) in prop_names.iter().enumerate() {
                if !an.properties.contains_key(name) {
                    prop_cols[p].push(missing_cell());
                }
            }
        }

        Self {
            rows,
            prop_names,
            prop_cols,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The fixed-column rows, in order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Dynamic property names in first-seen order, without the prefix.
    #[must_use]
    pub fn prop_names(&self) -> &[String] {
        &self.prop_names
    }

    /// All column names: the fixed set followed by prefixed property columns.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        FIXED_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .chain(self.prop_names.iter().map(|p| format!("{PROP_PREFIX}{p}")))
            .collect()
    }

    /// The value lists of one property column, one cell per row.
    ///
    /// Accepts the bare property name or the `prop:`-prefixed column name.
    #[must_use]
    pub fn prop_column(&self, prop: &str) -> Option<&[Vec<String>]> {
        let bare = prop.strip_prefix(PROP_PREFIX).unwrap_or(prop);
        self.prop_names
            .iter()
            .position(|name| name == bare)
            .map(|p| self.prop_cols[p].as_slice())
    }

    /// The rows whose full tag path contains `path_element` (case-sensitive).
    #[must_use]
    pub fn filter_by_tag_path(&self, path_element: &str) -> Table {
        self.filter_rows(|row| row.tag_path.contains(path_element))
    }

    /// Derived view with one row per (annotation, property-value) pair.
    ///
    /// A row with `N` values for `prop` becomes `N` rows, identical in
    /// every other column, each carrying a single value. Rows whose value
    /// list is empty (declared but unset) produce no output rows. The
    /// canonical table is never mutated.
    pub fn duplicate_by_prop(&self, prop: &str) -> Result<Table> {
        let bare = prop.strip_prefix(PROP_PREFIX).unwrap_or(prop);
        let p = self
            .prop_names
            .iter()
            .position(|name| name == bare)
            .ok_or_else(|| Error::invalid_property(bare, self.prop_names.clone()))?;

        let mut out = Table {
            rows: Vec::new(),
            prop_names: self.prop_names.clone(),
            prop_cols: vec![Vec::new(); self.prop_names.len()],
        };
        for (r, row) in self.rows.iter().enumerate() {
            for value in &self.prop_cols[p][r] {
                out.rows.push(row.clone());
                for (q, col) in out.prop_cols.iter_mut().enumerate() {
                    if q == p {
                        col.push(vec![value.clone()]);
                    } else {
                        col.push(self.prop_cols[q][r].clone());
                    }
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn filter_rows<F: Fn(&Row) -> bool>(&self, keep: F) -> Table {
        let mut out = Table {
            rows: Vec::new(),
            prop_names: self.prop_names.clone(),
            prop_cols: vec![Vec::new(); self.prop_names.len()],
        };
        for (r, row) in self.rows.iter().enumerate() {
            if keep(row) {
                out.rows.push(row.clone());
                for (q, col) in out.prop_cols.iter_mut().enumerate() {
                    col.push(self.prop_cols[q][r].clone());
                }
            }
        }
        out
    }

    /// Summed span length over all rows.
    #[must_use]
    pub fn text_span(&self) -> usize {
        self.rows.iter().map(|r| r.end_point - r.start_point).sum()
    }

    /// Mean span length over all rows, 0.0 for an empty table.
    #[must_use]
    pub fn text_span_mean(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.text_span() as f64 / self.rows.len() as f64
    }
}

fn missing_cell() -> Vec<String> {
    vec![MISSING.to_string()]
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::annotation::{RawRecord, RawTag};
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn arb_properties() -> impl Strategy<Value = BTreeMap<String, Vec<String>>> {
        proptest::collection::btree_map(
            "[a-e]{1,3}",
            proptest::collection::vec("[a-z]{0,4}", 0..3),
            0..4,
        )
    }

    proptest! {
        #[test]
        fn no_ragged_columns(prop_maps in proptest::collection::vec(arb_properties(), 0..12)) {
            let mut tags = TagArena::new();
            let body = "0123456789";
            let annotations: Vec<_> = prop_maps
                .into_iter()
                .enumerate()
                .map(|(i, properties)| {
                    let record = RawRecord {
                        id: format!("a{i}"),
                        author: "ada".to_string(),
                        tag: RawTag {
                            id: "T1".to_string(),
                            name: "Tag".to_string(),
                            path: vec![],
                        },
                        properties,
                        start: 0,
                        end: 5,
                        date: String::new(),
                    };
                    crate::Annotation::from_record(record, Path::new("p"), body, 3, &mut tags).unwrap()
                })
                .collect();

            let table = Table::normalize(&annotations, &tags, "doc", "ac");
            prop_assert_eq!(table.len(), annotations.len());
            for name in table.prop_names() {
                prop_assert_eq!(table.prop_column(name).unwrap().len(), annotations.len());
            }
        }

        #[test]
        fn duplication_row_count_matches_value_count(
            prop_maps in proptest::collection::vec(arb_properties(), 1..8)
        ) {
            let mut tags = TagArena::new();
            let annotations: Vec<_> = prop_maps
                .into_iter()
                .enumerate()
                .map(|(i, properties)| {
                    let record = RawRecord {
                        id: format!("a{i}"),
                        author: "ada".to_string(),
                        tag: RawTag { id: "T1".to_string(), name: "Tag".to_string(), path: vec![] },
                        properties,
                        start: 0,
                        end: 3,
                        date: String::new(),
                    };
                    crate::Annotation::from_record(record, Path::new("p"), "0123456789", 3, &mut tags).unwrap()
                })
                .collect();

            let table = Table::normalize(&annotations, &tags, "doc", "ac");
            for name in table.prop_names() {
                let expected: usize = table
                    .prop_column(name)
                    .unwrap()
                    .iter()
                    .map(|cell| cell.len())
                    .sum();
                let doubled = table.duplicate_by_prop(name).unwrap();
                prop_assert_eq!(doubled.len(), expected);
            }
        }
    }
}
