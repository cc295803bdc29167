use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::catalog::{AspectRatio, BrandId, ShapeId, StyleId};

/// A brand-scoped reference image kept for reuse across generations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryAsset {
    pub id: String,
    #[serde(deserialize_with = "brand_or_default")]
    pub brand_id: BrandId,
    pub name: String,
    #[serde(rename = "imageBase64")]
    pub image: String,
    pub timestamp: i64,
}

impl LibraryAsset {
    pub fn new(brand_id: BrandId, name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            brand_id,
            name: name.into(),
            image: image.into(),
            timestamp: now_millis(),
        }
    }
}

/// One generation result. Records are never mutated; an edit produces a new
/// record through [`GeneratedSticker::derive_edit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSticker {
    pub id: String,
    pub image_url: String,
    pub prompt: String,
    pub timestamp: i64,
    #[serde(deserialize_with = "brand_or_default")]
    pub brand_id: BrandId,
    #[serde(deserialize_with = "style_or_default")]
    pub style_id: StyleId,
    #[serde(
        default,
        deserialize_with = "shape_or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub shape_id: Option<ShapeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_prompt: Option<String>,
    #[serde(
        default,
        deserialize_with = "known_ratio",
        skip_serializing_if = "Option::is_none"
    )]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
}

const EDIT_PREFIX: &str = "Edit:";
const EDIT_ORIGINAL_MARKER: &str = "(Original:";

impl GeneratedSticker {
    /// Child record for an edit of `self`. Brand, enhanced prompt, ratio and
    /// size carry over from the parent.
    pub fn derive_edit(
        &self,
        image_url: impl Into<String>,
        edit_prompt: &str,
        style_id: StyleId,
        shape_id: ShapeId,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            image_url: image_url.into(),
            prompt: format!("{EDIT_PREFIX} {edit_prompt} {EDIT_ORIGINAL_MARKER} {})", self.prompt),
            timestamp: now_millis(),
            style_id,
            shape_id: Some(shape_id),
            ..self.clone()
        }
    }

    pub fn is_edit(&self) -> bool {
        self.prompt.starts_with(EDIT_PREFIX)
    }

    /// The prompt to put back into the editor when recalling this record:
    /// for edits, only the edit instruction.
    pub fn recall_prompt(&self) -> String {
        if !self.is_edit() {
            return self.prompt.clone();
        }
        let head = self
            .prompt
            .split(EDIT_ORIGINAL_MARKER)
            .next()
            .unwrap_or_default();
        head.replacen(EDIT_PREFIX, "", 1).trim().to_string()
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

// Stored ids outlive catalog changes. An id this build does not know maps to
// the catalog default instead of failing the whole record.

fn brand_or_default<'de, D: Deserializer<'de>>(de: D) -> Result<BrandId, D::Error> {
    let raw = String::deserialize(de)?;
    Ok(BrandId::parse(&raw).unwrap_or(BrandId::RedDevils))
}

fn style_or_default<'de, D: Deserializer<'de>>(de: D) -> Result<StyleId, D::Error> {
    let raw = String::deserialize(de)?;
    Ok(StyleId::parse(&raw).unwrap_or_default())
}

fn shape_or_default<'de, D: Deserializer<'de>>(de: D) -> Result<Option<ShapeId>, D::Error> {
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.map(|raw| ShapeId::parse(&raw).unwrap_or_default()))
}

/// Unknown ratios are dropped; callers already fall back to the print size.
fn known_ratio<'de, D: Deserializer<'de>>(de: D) -> Result<Option<AspectRatio>, D::Error> {
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.as_deref().and_then(AspectRatio::parse))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{GeneratedSticker, LibraryAsset};
    use crate::catalog::{AspectRatio, BrandId, ShapeId, StyleId};

    fn sticker() -> GeneratedSticker {
        GeneratedSticker {
            id: "s-1".to_string(),
            image_url: "data:image/png;base64,AAAA".to_string(),
            prompt: "Teufel jagt Adler".to_string(),
            timestamp: 1,
            brand_id: BrandId::RedDevils,
            style_id: StyleId::Vector,
            shape_id: Some(ShapeId::Contour),
            enhanced_prompt: Some("A red devil chasing an eagle".to_string()),
            aspect_ratio: Some(AspectRatio::Square),
            size_label: Some("Quadrat".to_string()),
        }
    }

    #[test]
    fn derive_edit_appends_new_record_referencing_parent() {
        let parent = sticker();
        let child = parent.derive_edit(
            "data:image/png;base64,BBBB",
            "add flames",
            StyleId::Graffiti,
            ShapeId::Circle,
        );
        assert_ne!(child.id, parent.id);
        assert_eq!(child.prompt, "Edit: add flames (Original: Teufel jagt Adler)");
        assert_eq!(child.enhanced_prompt, parent.enhanced_prompt);
        assert_eq!(child.size_label.as_deref(), Some("Quadrat"));
        assert_eq!(child.style_id, StyleId::Graffiti);
        assert_eq!(child.shape_id, Some(ShapeId::Circle));
        assert_eq!(parent.prompt, "Teufel jagt Adler");
    }

    #[test]
    fn recall_prompt_strips_edit_annotation() {
        let child = sticker().derive_edit("x", "add flames", StyleId::Vector, ShapeId::Contour);
        assert!(child.is_edit());
        assert_eq!(child.recall_prompt(), "add flames");
        assert_eq!(sticker().recall_prompt(), "Teufel jagt Adler");
    }

    #[test]
    fn serializes_with_storage_field_names() -> anyhow::Result<()> {
        let value = serde_json::to_value(sticker())?;
        assert_eq!(value["imageUrl"], json!("data:image/png;base64,AAAA"));
        assert_eq!(value["brandId"], json!("RED_DEVILS"));
        assert_eq!(value["styleId"], json!("vector"));
        assert_eq!(value["aspectRatio"], json!("1:1"));
        assert_eq!(value["sizeLabel"], json!("Quadrat"));

        let minimal: GeneratedSticker = serde_json::from_value(json!({
            "id": "s-2",
            "imageUrl": "data:image/png;base64,AAAA",
            "prompt": "p",
            "timestamp": 2,
            "brandId": "HOODPLAKA",
            "styleId": "3d-render",
        }))?;
        assert_eq!(minimal.shape_id, None);
        assert_eq!(serde_json::to_value(&minimal)?.get("sizeLabel"), None::<&Value>);
        Ok(())
    }

    #[test]
    fn unknown_catalog_ids_fall_back_to_defaults() -> anyhow::Result<()> {
        let stale: GeneratedSticker = serde_json::from_value(json!({
            "id": "odd",
            "imageUrl": "data:image/png;base64,AAAA",
            "prompt": "p",
            "timestamp": 3,
            "brandId": "FORMER_CLUB",
            "styleId": "neon-2099",
            "shapeId": "star",
            "aspectRatio": "21:9",
        }))?;
        assert_eq!(stale.brand_id, BrandId::RedDevils);
        assert_eq!(stale.style_id, StyleId::Vector);
        assert_eq!(stale.shape_id, Some(ShapeId::Contour));
        assert_eq!(stale.aspect_ratio, None);

        let asset: LibraryAsset = serde_json::from_value(json!({
            "id": "a-1",
            "brandId": "FORMER_CLUB",
            "name": "crest.png",
            "imageBase64": "data:image/jpeg;base64,AAAA",
            "timestamp": 4,
        }))?;
        assert_eq!(asset.brand_id, BrandId::RedDevils);
        Ok(())
    }
}
