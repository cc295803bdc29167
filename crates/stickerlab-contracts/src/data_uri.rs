use anyhow::{bail, Context};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

/// A `data:<mime>;base64,<payload>` image reference, the form every stored
/// image takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub data: String,
}

impl DataUri {
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.trim().strip_prefix("data:")?;
        let (mime_type, data) = rest.split_once(";base64,")?;
        if mime_type.is_empty() || data.is_empty() {
            return None;
        }
        Some(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: BASE64.encode(bytes),
        }
    }

    pub fn decode(&self) -> anyhow::Result<Vec<u8>> {
        let bytes = BASE64
            .decode(self.data.as_bytes())
            .context("data URI base64 decode failed")?;
        if bytes.is_empty() {
            bail!("data URI payload is empty");
        }
        Ok(bytes)
    }

    /// Gemini `inlineData` content part.
    pub fn inline_part(&self) -> Value {
        json!({
            "inlineData": {
                "mimeType": self.mime_type,
                "data": self.data,
            }
        })
    }
}

impl std::fmt::Display for DataUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::DataUri;

    #[test]
    fn parse_splits_mime_and_payload() {
        let uri = DataUri::parse("data:image/jpeg;base64,AAEC").unwrap_or_else(|| {
            panic!("expected a data URI");
        });
        assert_eq!(uri.mime_type, "image/jpeg");
        assert_eq!(uri.data, "AAEC");
        assert_eq!(uri.to_string(), "data:image/jpeg;base64,AAEC");
    }

    #[test]
    fn parse_rejects_plain_urls_and_empty_payloads() {
        assert!(DataUri::parse("https://example.com/a.png").is_none());
        assert!(DataUri::parse("data:image/png;base64,").is_none());
        assert!(DataUri::parse("data:;base64,AAEC").is_none());
    }

    #[test]
    fn inline_part_matches_gemini_shape() -> anyhow::Result<()> {
        let uri = DataUri::from_bytes("image/png", &[1, 2, 3]);
        assert_eq!(uri.decode()?, vec![1, 2, 3]);
        assert_eq!(
            uri.inline_part(),
            json!({"inlineData": {"mimeType": "image/png", "data": "AQID"}})
        );
        Ok(())
    }
}
