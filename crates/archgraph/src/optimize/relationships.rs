//! Relationship pass: merging, transitive simplification and label shortening.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::{debug, trace};

use archgraph_core::{
    identifier::Id,
    model::{RelationKind, Relationship},
};

use crate::config::MergeKey;

/// Phrases replaced when a label is too common, matched case-insensitively.
const SHORTENINGS: &[(&str, &str)] = &[
    ("depends on", "uses"),
    ("communicates with", "calls"),
    ("sends data to", "sends to"),
    ("receives data from", "gets from"),
    ("interacts with", "uses"),
];

const MAX_LABEL_CHARS: usize = 20;
const TRUNCATED_LABEL_CHARS: usize = 17;

/// Share of `max_relationship_labels` a label count must exceed to be shortened.
const COMMON_LABEL_RATIO: f64 = 0.3;

/// Collapses relationships that share a grouping key into the first one.
///
/// Labels are combined with [`merge_labels`] and properties are merged with
/// later values overwriting earlier ones. Returns the surviving relationships
/// in first-occurrence order and the number of relationships folded away.
pub fn merge_duplicates(relationships: Vec<Relationship>, key: MergeKey) -> (Vec<Relationship>, usize) {
    let total = relationships.len();
    let mut groups: IndexMap<(Id, Id, Option<RelationKind>), Relationship> = IndexMap::new();

    for rel in relationships {
        let kind = match key {
            MergeKey::Endpoints => None,
            MergeKey::EndpointsAndKind => Some(rel.kind()),
        };
        match groups.get_mut(&(rel.source(), rel.target(), kind)) {
            Some(existing) => {
                let label = merge_labels(existing.label(), rel.label());
                trace!(into:% = existing.id(), merged:% = rel.id(), label = label; "Merging relationship");
                existing.set_label(label);
                existing.properties_mut().merge(rel.properties());
            }
            None => {
                groups.insert((rel.source(), rel.target(), kind), rel);
            }
        }
    }

    let merged = total - groups.len();
    (groups.into_values().collect(), merged)
}

/// Combines two labels of merged relationships.
///
/// Empty labels yield the other one, equal labels are kept, a label that
/// contains the other (ignoring case) wins, otherwise both are joined as
/// `"first / second"`.
///
/// # Examples
///
/// ```
/// # use archgraph::optimize::merge_labels;
/// assert_eq!(merge_labels("uses", "calls"), "uses / calls");
/// assert_eq!(merge_labels("reads", "Reads orders"), "Reads orders");
/// assert_eq!(merge_labels("", "calls"), "calls");
/// ```
pub fn merge_labels(first: &str, second: &str) -> String {
    if first.is_empty() {
        return second.to_string();
    }
    if second.is_empty() || first == second {
        return first.to_string();
    }

    let first_lower = first.to_lowercase();
    let second_lower = second.to_lowercase();
    if second.len() > first.len() && second_lower.contains(&first_lower) {
        return second.to_string();
    }
    if first.len() > second.len() && first_lower.contains(&second_lower) {
        return first.to_string();
    }
    format!("{first} / {second}")
}

/// Ids of relationships `s -> t` for which some `s -> i -> t` exists with `i != t`.
///
/// Only single intermediates are considered; longer chains are not followed.
pub fn transitive_relationships(relationships: &[Relationship]) -> HashSet<Id> {
    let mut adjacency: HashMap<Id, HashSet<Id>> = HashMap::new();
    for rel in relationships {
        adjacency.entry(rel.source()).or_default().insert(rel.target());
    }

    relationships
        .iter()
        .filter(|rel| {
            adjacency.get(&rel.source()).is_some_and(|intermediates| {
                intermediates.iter().any(|intermediate| {
                    *intermediate != rel.target()
                        && adjacency
                            .get(intermediate)
                            .is_some_and(|targets| targets.contains(&rel.target()))
                })
            })
        })
        .inspect(|rel| {
            debug!(
                id:% = rel.id(),
                source:% = rel.source(),
                target:% = rel.target();
                "Transitive relationship"
            )
        })
        .map(Relationship::id)
        .collect()
}

/// Shortens labels that are shared by too many relationships.
///
/// A label is common when its normalized count exceeds 30% of
/// `max_labels`. Returns the number of labels changed.
pub fn shorten_common_labels<'a>(
    relationships: impl Iterator<Item = &'a mut Relationship>,
    max_labels: usize,
) -> usize {
    let mut relationships: Vec<&mut Relationship> = relationships.collect();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for rel in &relationships {
        *counts.entry(normalize(rel.label())).or_default() += 1;
    }

    let limit = max_labels as f64 * COMMON_LABEL_RATIO;
    let mut shortened = 0;
    for rel in &mut relationships {
        let count = counts.get(&normalize(rel.label())).copied().unwrap_or_default();
        if count as f64 <= limit {
            continue;
        }
        let short = shorten_label(rel.label());
        if short != rel.label() {
            rel.set_label(short);
            shortened += 1;
        }
    }
    shortened
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Applies the first matching phrase shortening, else truncates labels longer
/// than 20 characters to 17 characters plus `"..."`.
pub fn shorten_label(label: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `label`.
    let lower = label.to_ascii_lowercase();
    for (long, short) in SHORTENINGS {
        if let Some(start) = lower.find(long) {
            let end = start + long.len();
            return format!("{}{short}{}", &label[..start], &label[end..]);
        }
    }

    if label.chars().count() > MAX_LABEL_CHARS {
        let mut truncated: String = label.chars().take(TRUNCATED_LABEL_CHARS).collect();
        truncated.push_str("...");
        return truncated;
    }
    label.to_string()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn rel(id: &str, source: &str, target: &str, kind: RelationKind, label: &str) -> Relationship {
        Relationship::new(Id::new(id), Id::new(source), Id::new(target), kind).with_label(label)
    }

    #[test]
    fn test_merge_by_endpoints() {
        let relationships = vec![
            rel("r1", "a", "b", RelationKind::Uses, "uses"),
            rel("r2", "a", "b", RelationKind::Calls, "calls"),
            rel("r3", "b", "a", RelationKind::Uses, "uses"),
        ];
        let (merged, folded) = merge_duplicates(relationships, MergeKey::Endpoints);

        assert_eq!(folded, 1);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id(), "r1");
        assert_eq!(merged[0].label(), "uses / calls");
        assert_eq!(merged[0].kind(), RelationKind::Uses);
        assert_eq!(merged[1].id(), "r3");
    }

    #[test]
    fn test_merge_by_endpoints_and_kind() {
        let relationships = vec![
            rel("r1", "a", "b", RelationKind::Uses, "uses"),
            rel("r2", "a", "b", RelationKind::Calls, "calls"),
            rel("r3", "a", "b", RelationKind::Uses, "Uses the API"),
        ];
        let (merged, folded) = merge_duplicates(relationships, MergeKey::EndpointsAndKind);

        assert_eq!(folded, 1);
        assert_eq!(merged[0].label(), "Uses the API");
        assert_eq!(merged[1].label(), "calls");
    }

    #[test]
    fn test_merge_properties_later_wins() {
        let mut first = rel("r1", "a", "b", RelationKind::Uses, "x");
        first.properties_mut().insert("protocol", "http");
        first.properties_mut().insert("sync", true);
        let mut second = rel("r2", "a", "b", RelationKind::Uses, "x");
        second.properties_mut().insert("protocol", "grpc");

        let (merged, _) = merge_duplicates(vec![first, second], MergeKey::Endpoints);
        assert_eq!(merged[0].properties().get_str("protocol"), "grpc");
        assert!(merged[0].properties().get_bool("sync"));
    }

    #[test]
    fn test_merge_labels() {
        assert_eq!(merge_labels("uses", "uses"), "uses");
        assert_eq!(merge_labels("uses", ""), "uses");
        assert_eq!(merge_labels("Reads orders", "reads"), "Reads orders");
        assert_eq!(merge_labels("Uses", "uses"), "Uses / uses");
    }

    #[test]
    fn test_transitive_single_hop() {
        let relationships = vec![
            rel("ab", "a", "b", RelationKind::Uses, ""),
            rel("bc", "b", "c", RelationKind::Uses, ""),
            rel("ac", "a", "c", RelationKind::Uses, ""),
        ];
        let removed = transitive_relationships(&relationships);
        assert_eq!(removed, HashSet::from([Id::new("ac")]));
    }

    #[test]
    fn test_transitive_ignores_longer_chains() {
        // a -> b -> c -> d with a shortcut a -> d: no single intermediate.
        let relationships = vec![
            rel("ab", "a", "b", RelationKind::Uses, ""),
            rel("bc", "b", "c", RelationKind::Uses, ""),
            rel("cd", "c", "d", RelationKind::Uses, ""),
            rel("ad", "a", "d", RelationKind::Uses, ""),
        ];
        assert!(transitive_relationships(&relationships).is_empty());
    }

    #[test]
    fn test_shorten_label() {
        assert_eq!(shorten_label("Depends on"), "uses");
        assert_eq!(shorten_label("Service depends on cache"), "Service uses cache");
        assert_eq!(
            shorten_label("Synchronizes inventory levels"),
            "Synchronizes inve..."
        );
        assert_eq!(shorten_label("Reads data"), "Reads data");
    }

    #[test]
    fn test_only_common_labels_are_shortened() {
        let mut relationships: Vec<Relationship> = (0..4)
            .map(|i| rel(&format!("r{i}"), "a", &format!("t{i}"), RelationKind::DependsOn, "Depends On"))
            .collect();
        relationships.push(rel("rare", "a", "z", RelationKind::Uses, "Interacts with"));

        // Limit 10 * 0.3 = 3: four "depends on" labels exceed it, one "interacts with" does not.
        let shortened = shorten_common_labels(relationships.iter_mut(), 10);
        assert_eq!(shortened, 4);
        assert!(relationships[..4].iter().all(|rel| rel.label() == "uses"));
        assert_eq!(relationships[4].label(), "Interacts with");
    }

    proptest! {
        #[test]
        fn transitive_is_noop_without_two_edge_paths(
            pairs in prop::collection::vec((0u8..8, 0u8..8), 0..20)
        ) {
            let relationships: Vec<Relationship> = pairs
                .iter()
                .enumerate()
                .map(|(i, (s, t))| {
                    rel(&format!("p{i}"), &format!("n{s}"), &format!("n{t}"), RelationKind::Uses, "")
                })
                .collect();
            let has_two_edge_path = relationships.iter().any(|first| {
                relationships.iter().any(|second| {
                    first.target() == second.source()
                        && relationships.iter().any(|direct| {
                            direct.source() == first.source()
                                && direct.target() == second.target()
                                && first.target() != second.target()
                        })
                })
            });
            prop_assume!(!has_two_edge_path);

            prop_assert!(transitive_relationships(&relationships).is_empty());
        }
    }
}
