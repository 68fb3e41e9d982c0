//! Hierarchy builder: flattens a nested source into path-identified items.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::entities::{join_path, Item, LevelInfo};

/// Constructs a flat, depth-first ordered item list from nested source data.
///
/// Accepted node shapes:
/// - mapping: each key is a child, its value is recursed into
/// - list: each string (or number/bool) entry is a leaf child; a mapping entry
///   contributes its keys at the same level
/// - null or scalar: no children
pub struct HierarchyBuilder {
    level_names: Vec<String>,
}

impl HierarchyBuilder {
    pub fn new<I, S>(level_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            level_names: level_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Build items in pre-order, keeping source order among siblings.
    #[instrument(level = "debug", skip_all, fields(levels = self.level_names.len()))]
    pub fn build(&self, source: &Value) -> Vec<Item> {
        let mut items = Vec::new();
        let mut stack: Vec<(Vec<String>, Option<&Value>)> = child_entries(source)
            .into_iter()
            .rev()
            .map(|(key, value)| (vec![key], value))
            .collect();

        while let Some((path, value)) = stack.pop() {
            let entries = value.map(child_entries).unwrap_or_default();
            let children_ids = entries
                .iter()
                .map(|(key, _)| child_id(&path, key))
                .collect();

            items.push(self.make_item(&path, children_ids));

            for (key, child) in entries.into_iter().rev() {
                let mut child_path = path.clone();
                child_path.push(key);
                stack.push((child_path, child));
            }
        }

        debug!("built {} items", items.len());
        items
    }

    fn make_item(&self, path: &[String], children_ids: Vec<String>) -> Item {
        let key = path.last().map(String::as_str).unwrap_or_default();
        let mut item = Item::from_path(path.iter().cloned(), display_name(key))
            .with_children(children_ids);
        for (depth, component) in path.iter().enumerate() {
            item.level_info
                .insert(depth, LevelInfo::new(display_name(component), self.level_label(depth)));
        }
        item
    }

    fn level_label(&self, depth: usize) -> String {
        self.level_names
            .get(depth)
            .cloned()
            .unwrap_or_else(|| format!("Level {depth}"))
    }
}

/// Children of a source node: key plus the value to recurse into, if any.
fn child_entries(node: &Value) -> Vec<(String, Option<&Value>)> {
    match node {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), Some(v))).collect(),
        Value::Array(entries) => entries
            .iter()
            .flat_map(|entry| match entry {
                Value::String(name) => vec![(name.clone(), None)],
                Value::Number(n) => vec![(n.to_string(), None)],
                Value::Bool(b) => vec![(b.to_string(), None)],
                Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), Some(v))).collect(),
                Value::Null | Value::Array(_) => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn child_id(parent_path: &[String], key: &str) -> String {
    let mut id = join_path(parent_path);
    id.push('/');
    id.push_str(key);
    id
}

/// Human-readable name from a raw key: separators become spaces, words are title-cased.
pub fn display_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for ch in raw.chars() {
        let ch = if ch == '-' || ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn disease_source() -> Value {
        json!({"cardiovascular": {"ischemic-heart-disease": ["myocardial-infarction", "angina-pectoris"]}})
    }

    #[test]
    fn builds_depth_first_items() {
        let items = HierarchyBuilder::new(["chapter", "condition", "subtype"]).build(&disease_source());
        let ids: Vec<_> = items.iter().map(|i| (i.id.as_str(), i.depth)).collect();
        assert_eq!(
            ids,
            vec![
                ("cardiovascular", 0),
                ("cardiovascular/ischemic-heart-disease", 1),
                ("cardiovascular/ischemic-heart-disease/myocardial-infarction", 2),
                ("cardiovascular/ischemic-heart-disease/angina-pectoris", 2),
            ]
        );
    }

    #[test]
    fn children_ids_are_full_paths() {
        let items = HierarchyBuilder::new(["chapter", "condition", "subtype"]).build(&disease_source());
        assert_eq!(items[0].children_ids, vec!["cardiovascular/ischemic-heart-disease"]);
        assert_eq!(items[1].children_ids.len(), 2);
        assert!(items[2].is_leaf());
        assert_eq!(items[2].parent_id.as_deref(), Some("cardiovascular/ischemic-heart-disease"));
    }

    #[test]
    fn level_info_covers_whole_lineage() {
        let items = HierarchyBuilder::new(["chapter"]).build(&disease_source());
        let leaf = &items[3];
        assert_eq!(leaf.level_info.len(), 3);
        assert_eq!(leaf.level_name(0), Some("Cardiovascular"));
        assert_eq!(leaf.level_info[&0].level_name, "chapter");
        assert_eq!(leaf.level_info[&2].level_name, "Level 2");
        assert_eq!(leaf.name, "Angina Pectoris");
    }

    #[test]
    fn empty_and_scalar_values_have_no_children() {
        let items = HierarchyBuilder::new(["a", "b"]).build(&json!({"x": {}, "y": null, "z": 3}));
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.is_leaf() && i.depth == 0));
    }

    #[test]
    fn flat_list_source_yields_roots() {
        let items = HierarchyBuilder::new(["role"]).build(&json!(["nurse", "midwife", 42]));
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["nurse", "midwife", "42"]);
    }

    #[test]
    fn mapping_inside_list_contributes_its_keys() {
        let items = HierarchyBuilder::new(["a", "b"]).build(&json!({"root": ["leaf", {"branch": ["tip"]}]}));
        assert_eq!(items[0].children_ids, vec!["root/leaf", "root/branch"]);
        assert_eq!(items.last().map(|i| i.id.as_str()), Some("root/branch/tip"));
    }

    #[test]
    fn display_name_title_cases_words() {
        assert_eq!(display_name("ischemic-heart-disease"), "Ischemic Heart Disease");
        assert_eq!(display_name("provider_facing"), "Provider Facing");
        assert_eq!(display_name("COPD"), "Copd");
    }
}
