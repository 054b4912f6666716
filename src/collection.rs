//! The annotation collection aggregate.
//!
//! An [`AnnotationCollection`] owns the ordered annotation sequence, the
//! shared tag arena, and the derived normalized [`Table`]. Queries read the
//! table; bulk mutations operate on the entity layer and leave the table
//! stale until [`AnnotationCollection::refresh_table`] recomputes it. That
//! staleness window is part of the documented contract, not a bug:
//! [`AnnotationCollection::is_table_stale`] reports it and every mutation
//! marks it.

use crate::annotation::Annotation;
use crate::error::Result;
use crate::loader;
use crate::stats::{self, GroupKey, GroupStats};
use crate::table::Table;
use crate::tag::{TagArena, TagId};
use crate::text::Text;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Four-column projection used as input for inter-annotator agreement
/// tooling (pygamma-shaped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementRow {
    /// The authoring annotator.
    pub annotator: String,
    /// Tag name.
    pub tag: String,
    /// Span start in character offsets.
    pub start_point: usize,
    /// Span end (exclusive) in character offsets.
    pub end_point: usize,
}

/// A named, versioned set of annotations anchored to one document.
#[derive(Debug, Clone)]
pub struct AnnotationCollection {
    /// The collection's identifier (directory name in the store).
    pub uuid: String,
    /// The collection's human-readable name, from header.json.
    pub name: String,
    /// The collection's on-disk directory.
    pub directory: PathBuf,
    /// Identifier of the annotated source document.
    pub document_id: String,
    /// Version marker of the source document, if recorded.
    pub document_version: Option<String>,
    text: Text,
    tags: TagArena,
    annotations: Vec<Annotation>,
    table: Table,
    table_stale: bool,
}

impl AnnotationCollection {
    /// Default context window length, in characters.
    pub const DEFAULT_CONTEXT: usize = 50;

    /// Load a collection from
    /// `<projects_root>/<project_id>/collections/<collection_id>/`.
    ///
    /// `text` is the annotated document's plain text (retrieval of which is
    /// outside this crate); `context` is the context window length in
    /// characters. A missing `annotations/` directory yields an empty
    /// collection; a missing `header.json` is fatal.
    pub fn load(
        projects_root: &Path,
        project_id: &str,
        collection_id: &str,
        text: Text,
        context: usize,
    ) -> Result<Self> {
        let directory = projects_root
            .join(project_id)
            .join("collections")
            .join(collection_id);
        let header = loader::read_header(&directory)?;
        let mut tags = TagArena::new();
        let annotations = loader::load_annotations(&directory, &text.body, context, &mut tags)?;
        let table = Table::normalize(&annotations, &tags, &text.title, &header.name);

        Ok(Self {
            uuid: collection_id.to_string(),
            name: header.name,
            directory,
            document_id: header.source_document_id,
            document_version: header.source_document_version,
            text,
            tags,
            annotations,
            table,
            table_stale: false,
        })
    }

    /// The ordered annotation sequence.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The derived normalized table.
    ///
    /// May be stale after bulk mutation; see
    /// [`AnnotationCollection::refresh_table`].
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The shared tag arena.
    #[must_use]
    pub fn tags(&self) -> &TagArena {
        &self.tags
    }

    /// Per-annotation tag handles, in annotation order.
    #[must_use]
    pub fn tag_ids(&self) -> Vec<TagId> {
        self.annotations.iter().map(|a| a.tag).collect()
    }

    /// The annotated document.
    #[must_use]
    pub fn text(&self) -> &Text {
        &self.text
    }

    /// Number of annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Whether the collection holds no annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Whether entity mutations have outrun the materialized table.
    #[must_use]
    pub fn is_table_stale(&self) -> bool {
        self.table_stale
    }

    /// Recompute the table from the current annotation sequence.
    pub fn refresh_table(&mut self) {
        self.table = Table::normalize(&self.annotations, &self.tags, &self.text.title, &self.name);
        self.table_stale = false;
    }

    /// Uuid-keyed lookup map over the annotation sequence.
    #[must_use]
    pub fn annotation_dict(&self) -> HashMap<&str, &Annotation> {
        self.annotations
            .iter()
            .map(|a| (a.uuid.as_str(), a))
            .collect()
    }

    /// Plain projections of each annotation, optionally restricted to the
    /// given tag names. `None` includes every tag.
    #[must_use]
    pub fn to_list(&self, tag_names: Option<&[&str]>) -> Vec<serde_json::Value> {
        self.annotations
            .iter()
            .filter(|a| match tag_names {
                Some(names) => names.contains(&self.tags.name(a.tag)),
                None => true,
            })
            .map(|a| a.to_json(&self.tags))
            .collect()
    }

    /// Annotations whose tag, or whose tag's parent, has the given name.
    #[must_use]
    pub fn get_annotation_by_tag(&self, tag_name: &str) -> Vec<&Annotation> {
        self.annotations
            .iter()
            .filter(|a| {
                self.tags.name(a.tag) == tag_name
                    || self.tags.parent_name(a.tag) == Some(tag_name)
            })
            .collect()
    }

    /// Rows whose full tag path contains `path_element` (case-sensitive).
    #[must_use]
    pub fn filter_by_tag_path(&self, path_element: &str) -> Table {
        self.table.filter_by_tag_path(path_element)
    }

    /// Derived view with one row per (annotation, property-value) pair.
    pub fn duplicate_by_prop(&self, prop: &str) -> Result<Table> {
        self.table.duplicate_by_prop(prop)
    }

    /// Per-group statistics (count, summed span, mean span, frequent
    /// tokens) for the chosen grouping column.
    pub fn tag_stats(
        &self,
        key: &GroupKey,
        stopwords: Option<&[&str]>,
        ranking: usize,
    ) -> Result<Vec<GroupStats>> {
        stats::group_stats(&self.table, key, stopwords, ranking)
    }

    /// Value frequency counts for every dynamic property column.
    #[must_use]
    pub fn property_stats(&self) -> Vec<(String, Vec<(String, usize)>)> {
        stats::property_stats(&self.table)
    }

    /// The agreement-table projection: annotator, tag, start, end per row.
    #[must_use]
    pub fn to_pygamma_table(&self) -> Vec<AgreementRow> {
        self.annotations
            .iter()
            .map(|a| AgreementRow {
                annotator: a.author.clone(),
                tag: self.tags.name(a.tag).to_string(),
                start_point: a.start_point,
                end_point: a.end_point,
            })
            .collect()
    }

    /// Set `values` for `prop` on every annotation tagged `tag`.
    ///
    /// Operates on the entity layer; the table becomes stale. Returns the
    /// number of annotations touched.
    pub fn annotate_properties(&mut self, tag: &str, prop: &str, values: Vec<String>) -> usize {
        let tags = &self.tags;
        let mut touched = 0;
        for an in &mut self.annotations {
            if tags.name(an.tag) == tag {
                an.set_property_values(prop, values.clone());
                touched += 1;
            }
        }
        if touched > 0 {
            self.table_stale = true;
        }
        touched
    }

    /// Rename the exact value `old_value` of `prop` to `new_value` on every
    /// annotation tagged `tag`. Non-matching values are untouched. Returns
    /// the number of annotations with at least one renamed value.
    pub fn rename_property_value(
        &mut self,
        tag: &str,
        prop: &str,
        old_value: &str,
        new_value: &str,
    ) -> usize {
        let tags = &self.tags;
        let mut renamed = 0;
        for an in &mut self.annotations {
            if tags.name(an.tag) == tag && an.modify_property_value(prop, old_value, new_value) {
                renamed += 1;
            }
        }
        if renamed > 0 {
            self.table_stale = true;
        }
        renamed
    }

    /// Delete `prop` from every annotation tagged `tag`. Returns the number
    /// of annotations that carried the property.
    pub fn delete_properties(&mut self, tag: &str, prop: &str) -> usize {
        let tags = &self.tags;
        let mut deleted = 0;
        for an in &mut self.annotations {
            if tags.name(an.tag) == tag && an.delete_property(prop) {
                deleted += 1;
            }
        }
        if deleted > 0 {
            self.table_stale = true;
        }
        deleted
    }

    pub(crate) fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
        self.table_stale = true;
        &mut self.annotations
    }
}

impl fmt::Display for AnnotationCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnnotationCollection(name: {}, document: {}, length: {})",
            self.name,
            self.text.title,
            self.len()
        )
    }
}

impl<'a> IntoIterator for &'a AnnotationCollection {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.iter()
    }
}
