//! Versioned migration of stored card records.

use super::{CardDocument, TITLE_FIELD};
use crate::transform::TransformValues;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("card record is not an object")]
    NotAnObject,
    #[error("unsupported card schema version {0}")]
    UnsupportedVersion(u64),
    #[error("card schema version must be a non-negative integer, got {0}")]
    InvalidVersion(serde_json::Value),
    #[error("malformed card record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Card shape written before schema versioning: images and their
/// placement lived in maps separate from text fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCard {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub images: BTreeMap<String, String>,
    #[serde(default)]
    pub image_transforms: BTreeMap<String, TransformValues>,
    #[serde(default)]
    pub border_color: Option<String>,
    #[serde(default)]
    pub border_width: Option<f64>,
    #[serde(default)]
    pub count: Option<u32>,
}

/// A stored card, tagged by its schema version.
#[derive(Debug, Clone, PartialEq)]
pub enum CardRecord {
    V0(LegacyCard),
    V1(CardDocument),
}

impl CardRecord {
    /// Read a record, dispatching on its `schemaVersion` (absent means 0).
    pub fn from_value(value: serde_json::Value) -> Result<Self, MigrationError> {
        let version = match value.as_object().ok_or(MigrationError::NotAnObject)?.get("schemaVersion") {
            None => 0,
            Some(raw) => raw
                .as_u64()
                .ok_or_else(|| MigrationError::InvalidVersion(raw.clone()))?,
        };
        match version {
            0 => Ok(CardRecord::V0(serde_json::from_value(value)?)),
            1 => Ok(CardRecord::V1(serde_json::from_value(value)?)),
            other => Err(MigrationError::UnsupportedVersion(other)),
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            CardRecord::V0(_) => 0,
            CardRecord::V1(_) => 1,
        }
    }

    /// Upgrade to the current document shape.
    pub fn migrate(self) -> CardDocument {
        match self {
            CardRecord::V0(legacy) => migrate_v0(legacy),
            CardRecord::V1(doc) => doc,
        }
    }
}

fn migrate_v0(legacy: LegacyCard) -> CardDocument {
    let mut data = legacy.fields;
    for (element_id, src) in legacy.images {
        data.entry(element_id).or_insert(src);
    }

    let name = legacy
        .name
        .or(legacy.title)
        .or_else(|| data.get(TITLE_FIELD).cloned())
        .unwrap_or_else(|| "Untitled".to_string());
    data.insert(TITLE_FIELD.to_string(), name.clone());

    let id = legacy.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    log::debug!("migrated legacy card {} to schema {}", id, CURRENT_SCHEMA_VERSION);

    CardDocument {
        id,
        name,
        data,
        transforms: (!legacy.image_transforms.is_empty()).then_some(legacy.image_transforms),
        border_color: legacy.border_color,
        border_width: legacy.border_width,
        count: legacy.count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unversioned_record_is_legacy() {
        let record = CardRecord::from_value(json!({
            "id": "c1",
            "title": "Dragon",
            "fields": {"cost": "7"},
            "images": {"art": "data:image/png;base64,AAAA"},
            "imageTransforms": {"art": {"x": 1, "y": 2, "width": 50, "height": 40}},
            "count": 2
        }))
        .unwrap();
        assert_eq!(record.version(), 0);

        let card = record.migrate();
        assert_eq!(card.id, "c1");
        assert_eq!(card.name, "Dragon");
        assert_eq!(card.field(TITLE_FIELD), Some("Dragon"));
        assert_eq!(card.field("cost"), Some("7"));
        assert_eq!(card.field("art"), Some("data:image/png;base64,AAAA"));
        assert_eq!(card.transform("art").unwrap().width, 50.0);
        assert_eq!(card.count, Some(2));
    }

    #[test]
    fn test_legacy_title_from_fields() {
        let card = CardRecord::from_value(json!({"fields": {"title": "Imp"}}))
            .unwrap()
            .migrate();
        assert_eq!(card.name, "Imp");
        assert!(card.transforms.is_none());
        assert!(!card.id.is_empty());
    }

    #[test]
    fn test_current_record_passes_through() {
        let card = CardDocument::new("Knight").with_field("power", "3");
        let record = CardRecord::from_value(card.to_record_value().unwrap()).unwrap();
        assert_eq!(record.version(), 1);
        assert_eq!(record.migrate(), card);
    }

    #[test]
    fn test_future_version_rejected() {
        let err = CardRecord::from_value(json!({"schemaVersion": 9, "id": "x", "name": "y"})).unwrap_err();
        assert!(matches!(err, MigrationError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_non_integer_version_rejected() {
        for raw in [json!("1"), json!(1.5), json!(-1), json!(null)] {
            let err = CardRecord::from_value(json!({"schemaVersion": raw, "id": "x", "name": "y"})).unwrap_err();
            assert!(matches!(err, MigrationError::InvalidVersion(_)), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            CardRecord::from_value(json!([1, 2])),
            Err(MigrationError::NotAnObject)
        ));
    }
}
