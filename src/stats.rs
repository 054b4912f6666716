//! Token and per-group statistics over a normalized table.
//!
//! Grouping is expressed through [`GroupKey`] rather than string-sniffing
//! column names: statistics over a property column transparently use the
//! row-duplicated view so every row contributes exactly one group value.

use crate::error::Result;
use crate::table::{Table, MISSING};
use std::collections::HashMap;

/// Python's `string.punctuation`, stripped from tokens before counting.
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Column selector for grouped statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    /// Group by tag name.
    Tag,
    /// Group by annotator.
    Annotator,
    /// Group by a dynamic property column (bare name, no prefix).
    Property(String),
}

/// Statistics for one distinct value of the grouping column.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    /// The distinct group value.
    pub group: String,
    /// Number of annotations in the group.
    pub annotations: usize,
    /// Summed span length (`end - start`) over the group.
    pub text_span: usize,
    /// Mean span length over the group.
    pub text_span_mean: f64,
    /// Most frequent tokens of the group's annotation text, ranked by
    /// descending frequency, ties broken by first encounter.
    pub tokens: Vec<(String, usize)>,
}

/// Count token frequencies over a sequence of texts.
///
/// Punctuation characters are stripped, texts split on single spaces,
/// empty tokens dropped, stopwords (if given) removed. The result is
/// ranked by descending count with ties in first-encountered order,
/// truncated to `ranking` entries.
#[must_use]
pub fn most_common_tokens<'a, I>(
    texts: I,
    stopwords: Option<&[&str]>,
    ranking: usize,
) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for text in texts {
        let stripped: String = text.chars().filter(|c| !PUNCTUATION.contains(*c)).collect();
        for token in stripped.split(' ') {
            if token.is_empty() {
                continue;
            }
            if let Some(words) = stopwords {
                if words.contains(&token) {
                    continue;
                }
            }
            match index.get(token) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(token.to_string(), counts.len());
                    counts.push((token.to_string(), 1));
                }
            }
        }
    }

    // Stable sort keeps first-encountered order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(ranking);
    counts
}

/// Per-group statistics over `table` for the chosen grouping column.
///
/// Groups appear in row-encounter order. Returns
/// [`crate::Error::InvalidProperty`] when grouping by a property the
/// collection never observed.
pub fn group_stats(
    table: &Table,
    key: &GroupKey,
    stopwords: Option<&[&str]>,
    ranking: usize,
) -> Result<Vec<GroupStats>> {
    let analyzed = match key {
        GroupKey::Property(prop) => table.duplicate_by_prop(prop)?,
        _ => table.clone(),
    };

    let group_values: Vec<String> = match key {
        GroupKey::Tag => analyzed.rows().iter().map(|r| r.tag.clone()).collect(),
        GroupKey::Annotator => analyzed.rows().iter().map(|r| r.annotator.clone()).collect(),
        GroupKey::Property(prop) => analyzed
            .prop_column(prop)
            .map(|col| {
                col.iter()
                    .map(|cell| cell.first().cloned().unwrap_or_else(|| MISSING.to_string()))
                    .collect()
            })
            .unwrap_or_default(),
    };

    let mut distinct: Vec<&String> = Vec::new();
    for value in &group_values {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }

    let mut out = Vec::with_capacity(distinct.len());
    for group in distinct {
        let member_rows: Vec<usize> = group_values
            .iter()
            .enumerate()
            .filter(|(_, v)| *v == group)
            .map(|(i, _)| i)
            .collect();
        let text_span: usize = member_rows
            .iter()
            .map(|&i| analyzed.rows()[i].end_point - analyzed.rows()[i].start_point)
            .sum();
        let tokens = most_common_tokens(
            member_rows
                .iter()
                .map(|&i| analyzed.rows()[i].annotation.as_str()),
            stopwords,
            ranking,
        );
        out.push(GroupStats {
            group: group.clone(),
            annotations: member_rows.len(),
            text_span,
            text_span_mean: text_span as f64 / member_rows.len() as f64,
            tokens,
        });
    }
    Ok(out)
}

/// Value frequency counts for every dynamic property column.
///
/// Uses the row-duplicated view per property so multi-valued cells count
/// each value once. Counts are ranked like [`most_common_tokens`].
#[must_use]
pub fn property_stats(table: &Table) -> Vec<(String, Vec<(String, usize)>)> {
    let mut out = Vec::new();
    for prop in table.prop_names() {
        // The property is known by construction, so duplication cannot fail.
        let Ok(doubled) = table.duplicate_by_prop(prop) else {
            continue;
        };
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        if let Some(col) = doubled.prop_column(prop) {
            for cell in col {
                for value in cell {
                    match index.get(value) {
                        Some(&i) => counts[i].1 += 1,
                        None => {
                            index.insert(value.clone(), counts.len());
                            counts.push((value.clone(), 1));
                        }
                    }
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        out.push((prop.clone(), counts));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, RawRecord, RawTag};
    use crate::tag::TagArena;
    use std::collections::BTreeMap;
    use std::path::Path;

    #[test]
    fn token_ranking_ties_break_by_first_encounter() {
        // "a" and "c" tie at one occurrence; "a" was seen first and wins
        // the truncated ranking.
        let tokens = most_common_tokens(["a b b", "b c"], None, 2);
        assert_eq!(tokens, vec![("b".to_string(), 3), ("a".to_string(), 1)]);
    }

    #[test]
    fn punctuation_is_stripped_before_splitting() {
        let tokens = most_common_tokens(["end. end, (end)"], None, 10);
        assert_eq!(tokens, vec![("end".to_string(), 3)]);
    }

    #[test]
    fn stopwords_are_dropped() {
        let tokens = most_common_tokens(["the quick the fox"], Some(&["the"]), 10);
        assert_eq!(
            tokens,
            vec![("quick".to_string(), 1), ("fox".to_string(), 1)]
        );
    }

    #[test]
    fn empty_tokens_are_dropped() {
        let tokens = most_common_tokens(["a  b", "...", ""], None, 10);
        assert_eq!(tokens, vec![("a".to_string(), 1), ("b".to_string(), 1)]);
    }

    fn annotation(
        tags: &mut TagArena,
        id: &str,
        tag: &str,
        author: &str,
        props: &[(&str, &[&str])],
        start: usize,
        end: usize,
    ) -> Annotation {
        let mut properties = BTreeMap::new();
        for (key, values) in props {
            properties.insert(
                (*key).to_string(),
                values.iter().map(|v| (*v).to_string()).collect(),
            );
        }
        let record = RawRecord {
            id: id.to_string(),
            author: author.to_string(),
            tag: RawTag {
                id: format!("T_{tag}"),
                name: tag.to_string(),
                path: vec![],
            },
            properties,
            start,
            end,
            date: String::new(),
        };
        Annotation::from_record(
            record,
            Path::new("p"),
            "the hero fought the dragon bravely today",
            5,
            tags,
        )
        .unwrap()
    }

    #[test]
    fn group_stats_by_tag_counts_and_spans() {
        let mut tags = TagArena::new();
        let annotations = vec![
            annotation(&mut tags, "a1", "Hero", "ada", &[], 0, 8),
            annotation(&mut tags, "a2", "Hero", "bob", &[], 9, 15),
            annotation(&mut tags, "a3", "Dragon", "ada", &[], 20, 26),
        ];
        let table = Table::normalize(&annotations, &tags, "doc", "ac");
        let stats = group_stats(&table, &GroupKey::Tag, None, 3).unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].group, "Hero");
        assert_eq!(stats[0].annotations, 2);
        assert_eq!(stats[0].text_span, 14);
        assert!((stats[0].text_span_mean - 7.0).abs() < f64::EPSILON);
        assert_eq!(stats[1].group, "Dragon");
        assert_eq!(stats[1].annotations, 1);
    }

    #[test]
    fn group_stats_by_property_uses_duplicated_view() {
        let mut tags = TagArena::new();
        let annotations = vec![
            annotation(&mut tags, "a1", "Hero", "ada", &[("mood", &["dark", "tense"])], 0, 4),
            annotation(&mut tags, "a2", "Hero", "ada", &[("mood", &["dark"])], 5, 9),
        ];
        let table = Table::normalize(&annotations, &tags, "doc", "ac");
        let stats = group_stats(&table, &GroupKey::Property("mood".into()), None, 3).unwrap();

        let dark = stats.iter().find(|s| s.group == "dark").unwrap();
        assert_eq!(dark.annotations, 2);
        let tense = stats.iter().find(|s| s.group == "tense").unwrap();
        assert_eq!(tense.annotations, 1);
    }

    #[test]
    fn group_stats_by_unknown_property_fails() {
        let tags = TagArena::new();
        let table = Table::normalize(&[], &tags, "doc", "ac");
        let err = group_stats(&table, &GroupKey::Property("mood".into()), None, 3);
        assert!(err.is_err());
    }

    #[test]
    fn property_stats_counts_values_and_markers() {
        let mut tags = TagArena::new();
        let annotations = vec![
            annotation(&mut tags, "a1", "Hero", "ada", &[("mood", &["dark", "dark"])], 0, 4),
            annotation(&mut tags, "a2", "Hero", "ada", &[], 5, 9),
        ];
        let table = Table::normalize(&annotations, &tags, "doc", "ac");
        let stats = property_stats(&table);

        assert_eq!(stats.len(), 1);
        let (prop, counts) = &stats[0];
        assert_eq!(prop, "mood");
        assert_eq!(counts[0], ("dark".to_string(), 2));
        // Undeclared row contributes one "nan" marker value.
        assert_eq!(counts[1], (MISSING.to_string(), 1));
    }
}
