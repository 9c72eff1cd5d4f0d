//! Entity candidates produced by the external recognizer for one turn.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity kinds the engine asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    AmountOfMoney,
    Number,
    Time,
}

impl EntityKind {
    /// Tag the recognizer uses for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::AmountOfMoney => "amount-of-money",
            EntityKind::Number => "number",
            EntityKind::Time => "time",
        }
    }

    pub fn from_tag(tag: &str) -> Option<EntityKind> {
        match tag {
            "amount-of-money" => Some(EntityKind::AmountOfMoney),
            "number" => Some(EntityKind::Number),
            "time" => Some(EntityKind::Time),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognized entity in the current turn.
///
/// The field layout follows the recognizer's message format: the tag is
/// under `entity`, the resolved payload (for amounts and times) under
/// `additional_info`. Tags the engine does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCandidate {
    #[serde(rename = "entity")]
    pub tag: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default, alias = "confidence_entity", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<String>,
}

impl EntityCandidate {
    pub fn new(kind: EntityKind, value: serde_json::Value) -> Self {
        EntityCandidate {
            tag: kind.as_str().to_string(),
            value,
            confidence: None,
            additional_info: None,
            extractor: None,
        }
    }

    pub fn with_info(mut self, info: serde_json::Value) -> Self {
        self.additional_info = Some(info);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn kind(&self) -> Option<EntityKind> {
        EntityKind::from_tag(&self.tag)
    }

    /// Ranking score; candidates without a confidence rank as certain.
    pub fn rank(&self) -> f64 {
        self.confidence.unwrap_or(1.0)
    }

    /// A field of `additional_info`, treating `null` as absent.
    pub fn info(&self, field: &str) -> Option<&serde_json::Value> {
        self.additional_info
            .as_ref()
            .and_then(|info| info.get(field))
            .filter(|v| !v.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_recognizer_format() {
        let entity: EntityCandidate = serde_json::from_value(json!({
            "entity": "amount-of-money",
            "value": 12.5,
            "confidence_entity": 0.87,
            "extractor": "DucklingEntityExtractor",
            "additional_info": { "value": 12.5, "unit": "$" }
        }))
        .unwrap();
        assert_eq!(entity.kind(), Some(EntityKind::AmountOfMoney));
        assert_eq!(entity.rank(), 0.87);
        assert_eq!(entity.info("unit"), Some(&json!("$")));
    }

    #[test]
    fn unknown_tags_are_kept() {
        let entity: EntityCandidate =
            serde_json::from_value(json!({ "entity": "vendor_name", "value": "amazon" })).unwrap();
        assert_eq!(entity.kind(), None);
        assert_eq!(entity.tag, "vendor_name");
        assert_eq!(entity.rank(), 1.0);
    }

    #[test]
    fn null_info_fields_read_as_absent() {
        let entity = EntityCandidate::new(EntityKind::AmountOfMoney, json!(5))
            .with_info(json!({ "value": 5, "unit": null }));
        assert_eq!(entity.info("unit"), None);
        assert_eq!(entity.info("value"), Some(&json!(5)));
    }
}
