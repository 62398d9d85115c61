//! Card documents.
//!
//! A card is edited by replacing the whole document: every helper here
//! returns a new [`CardDocument`] and leaves the original untouched, so
//! history snapshots never alias the live state.

mod migrate;

pub use migrate::{CardRecord, LegacyCard, MigrationError, CURRENT_SCHEMA_VERSION};

use crate::assets::DataUrl;
use crate::transform::TransformValues;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Element id whose content is mirrored into [`CardDocument::name`].
pub const TITLE_FIELD: &str = "title";

/// Content and placement of one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDocument {
    pub id: String,
    pub name: String,
    /// Text and image values keyed by template element id.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    /// Placement of transformable elements, keyed by element id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transforms: Option<BTreeMap<String, TransformValues>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    /// Copies of this card in the deck.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl Default for CardDocument {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl CardDocument {
    /// Create an empty card with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut data = BTreeMap::new();
        data.insert(TITLE_FIELD.to_string(), name.clone());
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            data,
            transforms: None,
            border_color: None,
            border_width: None,
            count: None,
        }
    }

    /// Value of a content field.
    pub fn field(&self, element_id: &str) -> Option<&str> {
        self.data.get(element_id).map(String::as_str)
    }

    /// Fields holding inline `data:` images.
    pub fn image_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data
            .iter()
            .filter(|(_, value)| DataUrl::is_image(value))
            .map(|(id, value)| (id.as_str(), value.as_str()))
    }

    /// Placement of an element.
    pub fn transform(&self, element_id: &str) -> Option<&TransformValues> {
        self.transforms.as_ref()?.get(element_id)
    }

    /// Copy with one content field replaced. Setting the title field also
    /// renames the card.
    pub fn with_field(&self, element_id: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        if element_id == TITLE_FIELD {
            next.name = value.clone();
        }
        next.data.insert(element_id.to_string(), value);
        next
    }

    /// Copy with a new name, mirrored into the title field.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        self.with_field(TITLE_FIELD, name)
    }

    /// Copy with one element's placement replaced.
    pub fn with_transform(&self, element_id: &str, values: TransformValues) -> Self {
        let mut next = self.clone();
        next.transforms
            .get_or_insert_with(BTreeMap::new)
            .insert(element_id.to_string(), values);
        next
    }

    /// Copy with new border settings.
    pub fn with_border(&self, color: Option<String>, width: Option<f64>) -> Self {
        Self {
            border_color: color,
            border_width: width,
            ..self.clone()
        }
    }

    /// Copy with a new copy count.
    pub fn with_count(&self, count: Option<u32>) -> Self {
        Self {
            count,
            ..self.clone()
        }
    }

    /// Serialize as a versioned record.
    pub fn to_record_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("schemaVersion".to_string(), CURRENT_SCHEMA_VERSION.into());
        }
        Ok(value)
    }
}
