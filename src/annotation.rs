//! Annotation entities and the raw partition-record format.
//!
//! A partition file holds a JSON array of [`RawRecord`]s. The loader turns
//! each record into an [`Annotation`]: the span text and its context
//! windows are materialized from the document body at construction time,
//! and the tag reference is interned into the collection's [`TagArena`].

use crate::error::{Error, Result};
use crate::tag::{TagArena, TagId};
use crate::text::slice_chars;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Tag reference as stored in a partition record.
///
/// `path` is root-first and ends with the tag's own name; when absent the
/// tag is treated as a root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTag {
    /// Stable identifier of the tag definition.
    pub id: String,
    /// The tag's name.
    pub name: String,
    /// Root-first hierarchy path, including the tag itself.
    #[serde(default)]
    pub path: Vec<String>,
}

/// One annotation record as stored in a partition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    /// Unique annotation identifier.
    pub id: String,
    /// The authoring annotator.
    pub author: String,
    /// Tag applied to the span.
    pub tag: RawTag,
    /// Property name to ordered value list. An empty list means the
    /// property is declared but unset.
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<String>>,
    /// Span start, in document character offsets.
    pub start: usize,
    /// Span end (exclusive), in document character offsets.
    pub end: usize,
    /// Creation/modification date.
    #[serde(default)]
    pub date: String,
}

/// A single annotation anchored to a character span of the document.
///
/// Owned exclusively by its [`crate::AnnotationCollection`]; mutations go
/// through the property methods below and leave the collection's derived
/// table stale until recomputed.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Unique annotation identifier.
    pub uuid: String,
    /// The authoring annotator.
    pub author: String,
    /// The annotation's tag, resolved through the collection's arena.
    pub tag: TagId,
    /// Property name to ordered value list.
    pub properties: BTreeMap<String, Vec<String>>,
    /// Span start in character offsets.
    pub start_point: usize,
    /// Span end (exclusive) in character offsets.
    pub end_point: usize,
    /// Context window preceding the span.
    pub pretext: String,
    /// The annotated span text.
    pub text: String,
    /// Context window following the span.
    pub posttext: String,
    /// Creation/modification date.
    pub date: String,
    /// Partition file this record was loaded from.
    pub provenance: PathBuf,
}

impl Annotation {
    /// Construct an annotation from a raw record.
    ///
    /// `body` is the document plain text; `context` is the context window
    /// length in characters on either side of the span.
    pub fn from_record(
        record: RawRecord,
        page_file: &Path,
        body: &str,
        context: usize,
        tags: &mut TagArena,
    ) -> Result<Self> {
        if record.start > record.end {
            return Err(Error::InvalidSpan {
                start: record.start,
                end: record.end,
            });
        }

        let path = if record.tag.path.is_empty() {
            vec![record.tag.name.clone()]
        } else {
            record.tag.path.clone()
        };
        let tag = tags
            .intern_path(&path)
            .ok_or_else(|| Error::malformed_record(page_file, "record has an empty tag path"))?;

        Ok(Self {
            uuid: record.id,
            author: record.author,
            tag,
            properties: record.properties,
            start_point: record.start,
            end_point: record.end,
            pretext: slice_chars(body, record.start.saturating_sub(context), record.start),
            text: slice_chars(body, record.start, record.end),
            posttext: slice_chars(body, record.end, record.end + context),
            date: record.date,
            provenance: page_file.to_path_buf(),
        })
    }

    /// Span length in characters.
    #[must_use]
    pub fn span_len(&self) -> usize {
        self.end_point - self.start_point
    }

    /// Total-order key: document position first, then identifier.
    #[must_use]
    pub fn order_key(&self) -> (usize, usize, &str) {
        (self.start_point, self.end_point, &self.uuid)
    }

    /// Replace the value list of `prop`, declaring it if absent.
    pub fn set_property_values(&mut self, prop: &str, values: Vec<String>) {
        self.properties.insert(prop.to_string(), values);
    }

    /// Rename every occurrence of `old_value` under `prop` to `new_value`.
    ///
    /// Other values of the property are untouched. Returns whether any
    /// value changed.
    pub fn modify_property_value(&mut self, prop: &str, old_value: &str, new_value: &str) -> bool {
        let mut changed = false;
        if let Some(values) = self.properties.get_mut(prop) {
            for value in values.iter_mut() {
                if value == old_value {
                    *value = new_value.to_string();
                    changed = true;
                }
            }
        }
        changed
    }

    /// Remove `prop` entirely. Returns whether the property was present.
    pub fn delete_property(&mut self, prop: &str) -> bool {
        self.properties.remove(prop).is_some()
    }

    /// Plain projection consumed by export adapters.
    #[must_use]
    pub fn to_json(&self, tags: &TagArena) -> serde_json::Value {
        serde_json::json!({
            "id": self.uuid,
            "annotator": self.author,
            "tag": tags.name(self.tag),
            "tag_path": tags.full_path(self.tag),
            "properties": self.properties,
            "start_point": self.start_point,
            "end_point": self.end_point,
            "pretext": self.pretext,
            "text": self.text,
            "posttext": self.posttext,
            "date": self.date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, start: usize, end: usize) -> RawRecord {
        RawRecord {
            id: id.to_string(),
            author: "ada".to_string(),
            tag: RawTag {
                id: "T1".to_string(),
                name: "Hero".to_string(),
                path: vec!["Plot".to_string(), "Character".to_string(), "Hero".to_string()],
            },
            properties: BTreeMap::new(),
            start,
            end,
            date: "2024-03-01T10:00:00".to_string(),
        }
    }

    #[test]
    fn from_record_materializes_span_and_context() {
        let body = "0123456789abcdefghij";
        let mut tags = TagArena::new();
        let an = Annotation::from_record(record("a1", 10, 13), Path::new("page_0.json"), body, 5, &mut tags)
            .unwrap();

        assert_eq!(an.text, "abc");
        assert_eq!(an.pretext, "56789");
        assert_eq!(an.posttext, "defgh");
        assert_eq!(an.span_len(), 3);
        assert_eq!(tags.full_path(an.tag), "Plot>Character>Hero");
    }

    #[test]
    fn context_clamps_at_document_boundaries() {
        let body = "abcdef";
        let mut tags = TagArena::new();
        let an = Annotation::from_record(record("a1", 1, 5), Path::new("p"), body, 50, &mut tags).unwrap();
        assert_eq!(an.pretext, "a");
        assert_eq!(an.posttext, "f");
    }

    #[test]
    fn inverted_span_is_rejected() {
        let mut tags = TagArena::new();
        let err = Annotation::from_record(record("a1", 5, 2), Path::new("p"), "abcdef", 10, &mut tags);
        assert!(matches!(err, Err(Error::InvalidSpan { start: 5, end: 2 })));
    }

    #[test]
    fn modify_property_value_touches_exact_matches_only() {
        let mut tags = TagArena::new();
        let mut an =
            Annotation::from_record(record("a1", 0, 3), Path::new("p"), "abcdef", 10, &mut tags).unwrap();
        an.set_property_values("mood", vec!["dark".into(), "light".into(), "dark".into()]);

        assert!(an.modify_property_value("mood", "dark", "grim"));
        assert_eq!(
            an.properties["mood"],
            vec!["grim".to_string(), "light".to_string(), "grim".to_string()]
        );
        assert!(!an.modify_property_value("mood", "missing", "x"));
    }

    #[test]
    fn delete_property_reports_presence() {
        let mut tags = TagArena::new();
        let mut an =
            Annotation::from_record(record("a1", 0, 3), Path::new("p"), "abcdef", 10, &mut tags).unwrap();
        an.set_property_values("mood", vec![]);
        assert!(an.delete_property("mood"));
        assert!(!an.delete_property("mood"));
    }
}
