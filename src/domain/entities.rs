//! Domain entities: items, dimension tags and descriptive records

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Separator between path segments of an item id.
pub const PATH_SEPARATOR: char = '/';

/// Open key/value bag, opaque to the core.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Closed set of dimension tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DimensionType {
    TaskSkills,
    Personas,
    Diseases,
    Timeline,
    LocationResources,
    Condition,
    Stage,
    Location,
    CareTask,
    AgentFacing,
    AnchoringLayer,
    AssignedAuthority,
}

impl DimensionType {
    pub const ALL: [DimensionType; 12] = [
        Self::TaskSkills,
        Self::Personas,
        Self::Diseases,
        Self::Timeline,
        Self::LocationResources,
        Self::Condition,
        Self::Stage,
        Self::Location,
        Self::CareTask,
        Self::AgentFacing,
        Self::AnchoringLayer,
        Self::AssignedAuthority,
    ];

    /// Wire tag, as written in the persisted form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskSkills => "task-skills",
            Self::Personas => "personas",
            Self::Diseases => "diseases",
            Self::Timeline => "timeline",
            Self::LocationResources => "location-resources",
            Self::Condition => "condition",
            Self::Stage => "stage",
            Self::Location => "location",
            Self::CareTask => "care-task",
            Self::AgentFacing => "agent-facing",
            Self::AnchoringLayer => "anchoring-layer",
            Self::AssignedAuthority => "assigned-authority",
        }
    }
}

impl fmt::Display for DimensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DimensionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::Decode(format!("unknown dimension type: {s}")))
    }
}

/// Citation and provenance of a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceInfo {
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub burden_metric: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
    /// ISO-8601 calendar date (YYYY-MM-DD)
    pub last_updated: String,
    pub sources: Vec<String>,
}

impl ReferenceInfo {
    /// Parsed `last_updated`.
    pub fn last_updated_date(&self) -> DomainResult<NaiveDate> {
        parse_calendar_date(&self.last_updated)
    }

    pub(crate) fn validate(&self) -> DomainResult<()> {
        self.last_updated_date()?;
        if self.sources.is_empty() {
            return Err(DomainError::schema("reference", "sources must not be empty"));
        }
        Ok(())
    }
}

/// Strict `YYYY-MM-DD` parse.
pub fn parse_calendar_date(value: &str) -> DomainResult<NaiveDate> {
    // chrono accepts unpadded fields, the persisted form does not
    if value.len() != 10 {
        return Err(DomainError::DateFormatError(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| DomainError::DateFormatError(value.to_string()))
}

/// Level names of a dimension, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyInfo {
    pub structure: String,
    pub levels: Vec<String>,
    /// Maximum depth (0-indexed)
    pub max_depth: usize,
}

impl HierarchyInfo {
    /// Hierarchy whose `max_depth` is the last level index.
    pub fn from_levels<S: Into<String>>(structure: impl Into<String>, levels: Vec<S>) -> Self {
        let levels: Vec<String> = levels.into_iter().map(Into::into).collect();
        Self {
            structure: structure.into(),
            max_depth: levels.len().saturating_sub(1),
            levels,
        }
    }

    /// Level label for a depth, `depth_N` when undeclared.
    pub fn level_label(&self, depth: usize) -> String {
        self.levels
            .get(depth)
            .cloned()
            .unwrap_or_else(|| format!("depth_{depth}"))
    }
}

/// Display context for one ancestor level of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub name: String,
    pub level_name: String,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl LevelInfo {
    pub fn new(name: impl Into<String>, level_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level_name: level_name.into(),
            extra: Metadata::new(),
        }
    }
}

/// A node in exactly one dimension's hierarchy, identified by its full path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub path_components: Vec<String>,
    pub depth: usize,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children_ids: Vec<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Keyed by depth, one entry per level along the path
    #[serde(default)]
    pub level_info: BTreeMap<usize, LevelInfo>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Item {
    /// Item whose id, depth and parent are derived from its path.
    pub fn from_path<I, S>(components: I, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path_components: Vec<String> = components.into_iter().map(Into::into).collect();
        let depth = path_components.len().saturating_sub(1);
        let parent_id = if depth > 0 {
            Some(join_path(&path_components[..depth]))
        } else {
            None
        };
        Self {
            id: join_path(&path_components),
            path_components,
            depth,
            parent_id,
            children_ids: Vec::new(),
            name: name.into(),
            description: None,
            level_info: BTreeMap::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children_ids = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_level(mut self, depth: usize, info: LevelInfo) -> Self {
        self.level_info.insert(depth, info);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    pub fn is_leaf(&self) -> bool {
        self.children_ids.is_empty()
    }

    /// Id of the ancestor (or self) at `target_depth`.
    pub fn ancestor_id_at_depth(&self, target_depth: usize) -> Option<String> {
        if target_depth >= self.path_components.len() {
            return None;
        }
        Some(join_path(&self.path_components[..=target_depth]))
    }

    /// Strict ancestor test over `/`-separated ids.
    pub fn is_ancestor_of(&self, other: &Item) -> bool {
        is_path_descendant(&other.id, &self.id)
    }

    /// Strict descendant test over `/`-separated ids.
    pub fn is_descendant_of(&self, other: &Item) -> bool {
        is_path_descendant(&self.id, &other.id)
    }

    /// Display name recorded for a level of this item's lineage.
    pub fn level_name(&self, depth: usize) -> Option<&str> {
        self.level_info.get(&depth).map(|info| info.name.as_str())
    }

    /// Checks the per-item invariants (path/depth, segments, then id/path).
    pub(crate) fn validate_shape(&self) -> DomainResult<()> {
        if self.path_components.len() != self.depth + 1 {
            return Err(DomainError::schema(
                &self.id,
                format!(
                    "path has {} components but depth is {}",
                    self.path_components.len(),
                    self.depth
                ),
            ));
        }
        if let Some(segment) = self
            .path_components
            .iter()
            .find(|c| c.is_empty() || c.contains(PATH_SEPARATOR))
        {
            return Err(DomainError::schema(
                &self.id,
                format!("path segment '{segment}' must be non-empty and free of '{PATH_SEPARATOR}'"),
            ));
        }
        let expected = join_path(&self.path_components);
        if self.id != expected {
            return Err(DomainError::schema(
                &self.id,
                format!("id must match path components: expected '{expected}'"),
            ));
        }
        Ok(())
    }
}

/// Join path segments into an item id.
pub fn join_path<S: AsRef<str>>(components: &[S]) -> String {
    let mut id = String::new();
    for (i, c) in components.iter().enumerate() {
        if i > 0 {
            id.push(PATH_SEPARATOR);
        }
        id.push_str(c.as_ref());
    }
    id
}

/// `candidate` lies strictly below `ancestor` (`ancestor` + "/" prefix).
pub fn is_path_descendant(candidate: &str, ancestor: &str) -> bool {
    candidate.len() > ancestor.len()
        && candidate.starts_with(ancestor)
        && candidate[ancestor.len()..].starts_with(PATH_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_derives_identity() {
        let item = Item::from_path(["cardiovascular", "stroke"], "Stroke");
        assert_eq!(item.id, "cardiovascular/stroke");
        assert_eq!(item.depth, 1);
        assert_eq!(item.parent_id.as_deref(), Some("cardiovascular"));
        item.validate_shape().unwrap();
    }

    #[test]
    fn validate_shape_rejects_depth_mismatch() {
        let mut item = Item::from_path(["a", "b"], "B");
        item.depth = 3;
        assert!(matches!(
            item.validate_shape(),
            Err(DomainError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn validate_shape_rejects_id_mismatch() {
        let mut item = Item::from_path(["a", "b"], "B");
        item.id = "a-b".into();
        assert!(matches!(
            item.validate_shape(),
            Err(DomainError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn descendant_test_requires_separator() {
        assert!(is_path_descendant("cardio/x", "cardio"));
        assert!(!is_path_descendant("cardiovascular", "cardio"));
        assert!(!is_path_descendant("cardio", "cardio"));
    }

    #[test]
    fn validate_shape_rejects_separator_inside_segment() {
        let item = Item::from_path(["r", "x/y"], "Y");
        assert!(matches!(
            item.validate_shape(),
            Err(DomainError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn validate_shape_rejects_empty_segment() {
        let item = Item::from_path(["r", ""], "Empty");
        assert!(matches!(
            item.validate_shape(),
            Err(DomainError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn lineage_checks_respect_segment_boundary() {
        let cardio = Item::from_path(["cardio"], "Cardio");
        let child = Item::from_path(["cardio", "x"], "X");
        let cardiovascular = Item::from_path(["cardiovascular"], "Cardiovascular");

        assert!(cardio.is_ancestor_of(&child));
        assert!(child.is_descendant_of(&cardio));
        assert!(!cardio.is_ancestor_of(&cardiovascular));
        assert!(!cardiovascular.is_descendant_of(&cardio));
        assert!(!cardio.is_ancestor_of(&cardio));
        assert!(!child.is_ancestor_of(&cardio));
    }

    #[test]
    fn ancestor_id_at_depth_bounds() {
        let item = Item::from_path(["a", "b", "c"], "C");
        assert_eq!(item.ancestor_id_at_depth(0).as_deref(), Some("a"));
        assert_eq!(item.ancestor_id_at_depth(2).as_deref(), Some("a/b/c"));
        assert_eq!(item.ancestor_id_at_depth(3), None);
    }

    #[test]
    fn calendar_date_is_strict() {
        assert!(parse_calendar_date("2025-01-30").is_ok());
        assert_eq!(
            parse_calendar_date("2025-1-30"),
            Err(DomainError::DateFormatError("2025-1-30".into()))
        );
        assert!(parse_calendar_date("2025-02-30").is_err());
        assert!(parse_calendar_date("30/01/2025").is_err());
    }

    #[test]
    fn dimension_type_round_trips_through_wire_tag() {
        for tag in DimensionType::ALL {
            assert_eq!(tag.as_str().parse::<DimensionType>().unwrap(), tag);
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag.as_str()));
        }
    }
}
