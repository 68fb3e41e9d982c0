//! Validated, immutable dimension

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, instrument, warn};

use crate::domain::entities::{
    join_path, DimensionType, HierarchyInfo, Item, Metadata, ReferenceInfo, PATH_SEPARATOR,
};
use crate::domain::error::{DomainError, DomainResult, Relation};

/// Unvalidated dimension fields, as read from or written to the persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionParts {
    pub dimension: DimensionType,
    pub description: String,
    #[serde(default)]
    pub reference: Option<ReferenceInfo>,
    pub hierarchy: HierarchyInfo,
    pub items: Vec<Item>,
    #[serde(default)]
    pub dimension_metadata: Metadata,
}

/// One complete hierarchical taxonomy.
///
/// Only obtainable through validation, so every instance satisfies the item
/// invariants and parent/child referential integrity. Items keep insertion
/// order; lookups go through an id index and a sorted-by-id index built once.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "DimensionParts")]
pub struct Dimension {
    dimension: DimensionType,
    description: String,
    reference: Option<ReferenceInfo>,
    hierarchy: HierarchyInfo,
    items: Vec<Item>,
    dimension_metadata: Metadata,
    by_id: HashMap<String, usize>,
    by_depth: BTreeMap<usize, Vec<usize>>,
    sorted_ids: Vec<usize>,
}

impl TryFrom<DimensionParts> for Dimension {
    type Error = DomainError;

    fn try_from(parts: DimensionParts) -> Result<Self, Self::Error> {
        Dimension::new(parts)
    }
}

impl Dimension {
    /// Validate parts and freeze them into a dimension.
    ///
    /// Checks, first violation wins:
    /// 1. path/depth consistency per item
    /// 2. id/path (and derived parent) consistency per item
    /// 3. non-empty item collection
    /// 4. id uniqueness
    /// 5. parent and children resolve within the dimension
    /// 6. reference date and sources
    #[instrument(level = "debug", skip(parts), fields(dimension = %parts.dimension, items = parts.items.len()))]
    pub fn new(parts: DimensionParts) -> DomainResult<Self> {
        for item in &parts.items {
            item.validate_shape()?;
            validate_parent_link(item)?;
        }

        if parts.items.is_empty() {
            return Err(DomainError::EmptyDimension);
        }

        let mut by_id = HashMap::with_capacity(parts.items.len());
        for (pos, item) in parts.items.iter().enumerate() {
            if by_id.insert(item.id.clone(), pos).is_some() {
                return Err(DomainError::DuplicateIdentifier(item.id.clone()));
            }
        }

        for item in &parts.items {
            if let Some(parent) = &item.parent_id {
                if !by_id.contains_key(parent) {
                    return Err(DomainError::ReferentialIntegrityViolation {
                        item_id: item.id.clone(),
                        relation: Relation::Parent,
                        missing: parent.clone(),
                    });
                }
            }
            if let Some(child) = item.children_ids.iter().find(|c| !by_id.contains_key(*c)) {
                return Err(DomainError::ReferentialIntegrityViolation {
                    item_id: item.id.clone(),
                    relation: Relation::Child,
                    missing: child.clone(),
                });
            }
        }

        if let Some(reference) = &parts.reference {
            reference.validate()?;
        }

        let mut by_depth: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (pos, item) in parts.items.iter().enumerate() {
            by_depth.entry(item.depth).or_default().push(pos);
        }

        let mut sorted_ids: Vec<usize> = (0..parts.items.len()).collect();
        sorted_ids.sort_by(|&a, &b| parts.items[a].id.cmp(&parts.items[b].id));

        let observed = by_depth.keys().next_back().copied().unwrap_or(0);
        if observed != parts.hierarchy.max_depth {
            warn!(
                "dimension {}: declared max_depth {} but items reach depth {}",
                parts.dimension, parts.hierarchy.max_depth, observed
            );
        }
        debug!("validated {} items over {} depths", parts.items.len(), by_depth.len());

        Ok(Self {
            dimension: parts.dimension,
            description: parts.description,
            reference: parts.reference,
            hierarchy: parts.hierarchy,
            items: parts.items,
            dimension_metadata: parts.dimension_metadata,
            by_id,
            by_depth,
            sorted_ids,
        })
    }

    pub fn dimension_type(&self) -> DimensionType {
        self.dimension
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reference(&self) -> Option<&ReferenceInfo> {
        self.reference.as_ref()
    }

    pub fn hierarchy(&self) -> &HierarchyInfo {
        &self.hierarchy
    }

    /// All items, all depths mixed, in stored order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn dimension_metadata(&self) -> &Metadata {
        &self.dimension_metadata
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a validated dimension.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.by_id.get(id).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Deepest depth any item reaches.
    pub fn observed_max_depth(&self) -> usize {
        self.by_depth.keys().next_back().copied().unwrap_or(0)
    }

    /// Give the fields back, e.g. to derive a modified dimension.
    pub fn into_parts(self) -> DimensionParts {
        DimensionParts {
            dimension: self.dimension,
            description: self.description,
            reference: self.reference,
            hierarchy: self.hierarchy,
            items: self.items,
            dimension_metadata: self.dimension_metadata,
        }
    }

    pub(crate) fn item_at(&self, pos: usize) -> &Item {
        &self.items[pos]
    }

    pub(crate) fn positions_at_depth(&self, depth: usize) -> &[usize] {
        self.by_depth.get(&depth).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stored positions of every strict path-descendant of `ancestor`, in stored order.
    ///
    /// Descendant ids share the `ancestor/` prefix and therefore form one
    /// contiguous run of the sorted index.
    pub(crate) fn descendant_positions(&self, ancestor: &str) -> Vec<usize> {
        let prefix = format!("{ancestor}{PATH_SEPARATOR}");
        let start = self
            .sorted_ids
            .partition_point(|&pos| self.items[pos].id.as_str() < prefix.as_str());
        let mut hits: Vec<usize> = self.sorted_ids[start..]
            .iter()
            .copied()
            .take_while(|&pos| self.items[pos].id.starts_with(&prefix))
            .collect();
        hits.sort_unstable();
        hits
    }
}

fn validate_parent_link(item: &Item) -> DomainResult<()> {
    let expected = if item.depth > 0 {
        Some(join_path(&item.path_components[..item.depth]))
    } else {
        None
    };
    if item.parent_id != expected {
        return Err(DomainError::schema(
            &item.id,
            format!(
                "parent_id {:?} does not match path (expected {:?})",
                item.parent_id, expected
            ),
        ));
    }
    Ok(())
}

#[derive(Serialize)]
struct DimensionRef<'a> {
    dimension: DimensionType,
    description: &'a str,
    reference: Option<&'a ReferenceInfo>,
    hierarchy: &'a HierarchyInfo,
    items: &'a [Item],
    dimension_metadata: &'a Metadata,
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DimensionRef {
            dimension: self.dimension,
            description: &self.description,
            reference: self.reference.as_ref(),
            hierarchy: &self.hierarchy,
            items: &self.items,
            dimension_metadata: &self.dimension_metadata,
        }
        .serialize(serializer)
    }
}

impl PartialEq for Dimension {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension
            && self.description == other.description
            && self.reference == other.reference
            && self.hierarchy == other.hierarchy
            && self.items == other.items
            && self.dimension_metadata == other.dimension_metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(items: Vec<Item>) -> DimensionParts {
        DimensionParts {
            dimension: DimensionType::Diseases,
            description: "test".into(),
            reference: None,
            hierarchy: HierarchyInfo::from_levels("chapter -> condition", vec!["chapter", "condition"]),
            items,
            dimension_metadata: Metadata::new(),
        }
    }

    fn tree() -> Vec<Item> {
        vec![
            Item::from_path(["cardio"], "Cardio").with_children(["cardio/stroke"]),
            Item::from_path(["cardio", "stroke"], "Stroke"),
            Item::from_path(["cardiovascular"], "Cardiovascular"),
        ]
    }

    #[test]
    fn valid_parts_build_dimension() {
        let dim = Dimension::new(parts(tree())).unwrap();
        assert_eq!(dim.len(), 3);
        assert_eq!(dim.get("cardio/stroke").map(|i| i.depth), Some(1));
        assert!(dim.get("missing").is_none());
    }

    #[test]
    fn empty_items_rejected() {
        assert_eq!(Dimension::new(parts(vec![])), Err(DomainError::EmptyDimension));
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut items = tree();
        items.push(Item::from_path(["cardio"], "Again"));
        assert_eq!(
            Dimension::new(parts(items)),
            Err(DomainError::DuplicateIdentifier("cardio".into()))
        );
    }

    #[test]
    fn dangling_child_rejected() {
        let mut items = tree();
        items[2].children_ids.push("cardiovascular/ghost".into());
        assert!(matches!(
            Dimension::new(parts(items)),
            Err(DomainError::ReferentialIntegrityViolation {
                relation: Relation::Child,
                ..
            })
        ));
    }

    #[test]
    fn root_with_parent_rejected_as_schema_violation() {
        let mut items = tree();
        items[2].parent_id = Some("cardio".into());
        assert!(matches!(
            Dimension::new(parts(items)),
            Err(DomainError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn bad_reference_date_rejected() {
        let mut p = parts(tree());
        p.reference = Some(ReferenceInfo {
            classification: None,
            burden_metric: None,
            data_source: None,
            last_updated: "2025/01/30".into(),
            sources: vec!["WHO".into()],
        });
        assert_eq!(
            Dimension::new(p),
            Err(DomainError::DateFormatError("2025/01/30".into()))
        );
    }

    #[test]
    fn descendant_positions_do_not_leak_into_textual_siblings() {
        let dim = Dimension::new(parts(tree())).unwrap();
        assert_eq!(dim.descendant_positions("cardio"), vec![1]);
        assert!(dim.descendant_positions("cardiovascular").is_empty());
    }
}
