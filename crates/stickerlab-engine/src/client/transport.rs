use std::io::Cursor;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use stickerlab_contracts::catalog::AspectRatio;
use stickerlab_contracts::data_uri::DataUri;

use crate::config::StudioConfig;
use crate::error::StickerResult;

/// One `generateContent` round trip. Implementations must be shareable
/// across the scoped enrichment threads.
pub trait ContentTransport: Send + Sync {
    fn name(&self) -> &str;
    fn generate_content(&self, model: &str, payload: &Value) -> Result<Value>;
}

pub struct GeminiTransport {
    api_base: String,
    api_key: String,
    timeout_s: f64,
    http: HttpClient,
}

impl GeminiTransport {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, timeout_s: f64) -> Self {
        Self {
            api_base: api_base.into().trim().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout_s,
            http: HttpClient::new(),
        }
    }

    pub fn from_config(config: &StudioConfig) -> StickerResult<Self> {
        let api_key = config.require_api_key()?;
        Ok(Self::new(
            config.api_base.clone(),
            api_key,
            config.request_timeout_s,
        ))
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

impl ContentTransport for GeminiTransport {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate_content(&self, model: &str, payload: &Value) -> Result<Value> {
        let endpoint = self.endpoint_for_model(model);
        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .timeout(Duration::from_secs_f64(self.timeout_s))
            .json(payload)
            .send()
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;
        response_json_or_error("Gemini", response)
    }
}

/// Offline transport. Text requests get an echo, image requests a solid
/// PNG whose color is derived from the request text.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryrunTransport;

const DRYRUN_LONG_EDGE: u32 = 256;

impl ContentTransport for DryrunTransport {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn generate_content(&self, model: &str, payload: &Value) -> Result<Value> {
        let text = request_text(payload);
        let image_config = payload
            .get("generationConfig")
            .and_then(|config| config.get("imageConfig"));
        let Some(image_config) = image_config else {
            let answer = quoted_segment(&text)
                .map(str::to_string)
                .unwrap_or_else(|| format!("[{model}] {}", truncate_text(text.trim(), 240)));
            return Ok(text_response(&answer));
        };

        let ratio = image_config
            .get("aspectRatio")
            .and_then(Value::as_str)
            .and_then(AspectRatio::parse)
            .unwrap_or_default();
        let (width, height) = dryrun_dims(ratio);
        let (r, g, b) = color_from_prompt(&text);
        let mut canvas = RgbImage::new(width, height);
        for pixel in canvas.pixels_mut() {
            *pixel = Rgb([r, g, b]);
        }
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(canvas)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .context("dryrun image encode failed")?;
        let image = DataUri::from_bytes("image/png", &bytes);
        Ok(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [image.inline_part()],
                }
            }]
        }))
    }
}

pub(crate) fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

pub(crate) fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }],
            }
        }]
    })
}

/// Concatenated text parts of every content entry in a request payload.
pub(crate) fn request_text(payload: &Value) -> String {
    payload
        .get("contents")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|content| content.get("parts").and_then(Value::as_array))
        .flatten()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

fn quoted_segment(text: &str) -> Option<&str> {
    let (_, rest) = text.split_once('"')?;
    let (quoted, _) = rest.split_once('"')?;
    Some(quoted).filter(|value| !value.trim().is_empty())
}

fn dryrun_dims(ratio: AspectRatio) -> (u32, u32) {
    let (w, h) = match ratio {
        AspectRatio::Square => (1, 1),
        AspectRatio::Portrait9x16 => (9, 16),
        AspectRatio::Landscape16x9 => (16, 9),
        AspectRatio::Landscape4x3 => (4, 3),
        AspectRatio::Portrait3x4 => (3, 4),
    };
    let long = w.max(h);
    (
        (DRYRUN_LONG_EDGE * w / long).max(1),
        (DRYRUN_LONG_EDGE * h / long).max(1),
    )
}

fn color_from_prompt(prompt: &str) -> (u8, u8, u8) {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    let digest = hasher.finalize();
    (digest[0], digest[1], digest[2])
}
