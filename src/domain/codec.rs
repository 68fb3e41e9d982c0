//! Persisted JSON form of a dimension.
//!
//! Decoding goes through [`DimensionParts`] first so that validation failures
//! surface as their own [`DomainError`] kind instead of a generic serde message.

use serde_json::Value;
use tracing::instrument;

use crate::domain::dimension::{Dimension, DimensionParts};
use crate::domain::error::{DomainError, DomainResult};

impl Dimension {
    #[instrument(level = "debug", skip(json), fields(bytes = json.len()))]
    pub fn from_json_str(json: &str) -> DomainResult<Self> {
        let parts: DimensionParts =
            serde_json::from_str(json).map_err(|e| DomainError::Decode(e.to_string()))?;
        Dimension::new(parts)
    }

    pub fn from_json_value(value: Value) -> DomainResult<Self> {
        let parts: DimensionParts =
            serde_json::from_value(value).map_err(|e| DomainError::Decode(e.to_string()))?;
        Dimension::new(parts)
    }

    pub fn to_json_string(&self, pretty: bool) -> DomainResult<String> {
        let out = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        out.map_err(|e| DomainError::Encode(e.to_string()))
    }

    pub fn to_json_value(&self) -> DomainResult<Value> {
        serde_json::to_value(self).map_err(|e| DomainError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::entities::DimensionType;

    fn document() -> Value {
        json!({
            "dimension": "agent-facing",
            "description": "Whose cognition AI engages",
            "reference": {
                "classification": "Agent Facing Framework",
                "burden_metric": null,
                "data_source": null,
                "last_updated": "2026-02-04",
                "sources": ["CDM model", "PDM model"]
            },
            "hierarchy": {"structure": "Flat list", "levels": ["agent"], "max_depth": 0},
            "items": [
                {
                    "id": "provider_facing",
                    "path_components": ["provider_facing"],
                    "depth": 0,
                    "parent_id": null,
                    "children_ids": [],
                    "name": "Provider-Facing",
                    "description": "Engages the provider",
                    "level_info": {"0": {"name": "Provider-Facing", "level_name": "Agent Type"}},
                    "metadata": {"primary_user": "Healthcare professionals"}
                },
                {
                    "id": "patient_facing",
                    "path_components": ["patient_facing"],
                    "depth": 0,
                    "parent_id": null,
                    "children_ids": [],
                    "name": "Patient-Facing",
                    "description": null,
                    "level_info": {"0": {"name": "Patient-Facing", "level_name": "Agent Type", "order": 2}},
                    "metadata": {}
                }
            ],
            "dimension_metadata": {"total": 2}
        })
    }

    #[test]
    fn decodes_persisted_form() {
        let dim = Dimension::from_json_value(document()).unwrap();
        assert_eq!(dim.dimension_type(), DimensionType::AgentFacing);
        assert_eq!(dim.len(), 2);
        let item = dim.get("patient_facing").unwrap();
        assert_eq!(item.level_info[&0].extra["order"], 2);
    }

    #[test]
    fn encode_then_decode_preserves_items_and_order() {
        let dim = Dimension::from_json_value(document()).unwrap();
        let text = dim.to_json_string(true).unwrap();
        let again = Dimension::from_json_str(&text).unwrap();
        assert_eq!(dim, again);
        assert_eq!(dim.to_json_value().unwrap(), document());
    }

    #[test]
    fn validation_errors_keep_their_kind() {
        let mut doc = document();
        doc["items"][1]["id"] = json!("provider_facing");
        doc["items"][1]["path_components"] = json!(["provider_facing"]);
        assert_eq!(
            Dimension::from_json_value(doc),
            Err(DomainError::DuplicateIdentifier("provider_facing".into()))
        );
    }

    #[test]
    fn malformed_json_is_decode_error() {
        assert!(matches!(
            Dimension::from_json_str("{\"dimension\": 3}"),
            Err(DomainError::Decode(_))
        ));
    }
}
