//! Sequences the calls to the generation service: best-effort enrichment
//! (prompt enhancement, location context, reference analysis) around one
//! mandatory synthesis call.

mod transport;

use std::sync::Arc;
use std::thread;

use serde_json::{json, Map, Value};
use stickerlab_contracts::catalog::{AspectRatio, BrandId, BrandProfile, ShapeId, StyleId};
use stickerlab_contracts::data_uri::DataUri;
use stickerlab_contracts::models::{ModelRoster, ModelTask};
use stickerlab_contracts::records::GeneratedSticker;
use tracing::{debug, info, warn};

pub use transport::{ContentTransport, DryrunTransport, GeminiTransport};

use crate::composer::{self, EditDirective, GenerationDirective};
use crate::config::StudioConfig;
use crate::error::{StickerError, StickerResult};

/// Prompts shorter than this (in characters) are always enriched.
pub const ENRICHMENT_PROMPT_THRESHOLD: usize = 20;

pub const LOCATION_KEYWORDS: [&str; 13] = [
    "stadion",
    "arena",
    "platz",
    "betze",
    "fritz-walter",
    "auswärts",
    "heimspiel",
    "stadt",
    "park",
    "treffpunkt",
    "kurve",
    "westkurve",
    "wand",
];

const LOCATION_LABEL: &str = "Location/Architecture Visuals: ";

const ANALYSIS_INSTRUCTION: &str = "Analyze this image for a graphic designer. Describe: 1. The exact Logo/Crest design (colors, shapes, text). 2. The artistic style. 3. The mood. 4. Any text. Be extremely precise about the logo details so it can be recreated.";

const RED_DEVILS_CLUB_CONTEXT: &str = "IMPORTANT: The user owns rights to '1. FC Kaiserslautern'. If the prompt implies the club, ensure '1. FCK' or 'FCK' is used correctly. The mascot is 'Betzi' (Red Devil).";

/// Everything one synthesis needs, captured from the selection state at the
/// moment the user triggered it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPlan {
    /// Raw prompt as typed, or the edit instruction.
    pub prompt: String,
    /// Prompt with shape and layout directives merged in.
    pub subject: String,
    pub brand_id: BrandId,
    pub style_id: StyleId,
    pub shape_id: ShapeId,
    pub aspect_ratio: AspectRatio,
    pub size_label: String,
    /// Selected library assets. The driver resolves them to images and puts
    /// them in front of `reference_images` before synthesis.
    pub library_asset_ids: Vec<String>,
    /// Library selections first, then the manual upload.
    pub reference_images: Vec<String>,
    pub image_analysis: Option<String>,
    pub use_search: bool,
    pub cut_line: bool,
    /// Set when this plan edits an existing result.
    pub parent: Option<GeneratedSticker>,
}

impl GenerationPlan {
    pub fn is_edit(&self) -> bool {
        self.parent.is_some()
    }

    pub fn should_enrich(&self) -> bool {
        !self.is_edit()
            && (self.use_search || self.prompt.chars().count() < ENRICHMENT_PROMPT_THRESHOLD)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub image_url: String,
    /// Subject text that went into the directive, enhanced when enrichment ran.
    pub enhanced_prompt: String,
    pub composed_prompt: String,
}

pub fn needs_location_context(prompt: &str) -> bool {
    let lowered = prompt.to_lowercase();
    LOCATION_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

pub struct StickerClient {
    transport: Arc<dyn ContentTransport>,
    roster: ModelRoster,
}

impl StickerClient {
    pub fn new(transport: Arc<dyn ContentTransport>, roster: ModelRoster) -> Self {
        Self { transport, roster }
    }

    /// Live Gemini client, or the offline dryrun transport with its roster.
    pub fn from_config(config: &StudioConfig, dryrun: bool) -> StickerResult<Self> {
        if dryrun {
            return Ok(Self::new(Arc::new(DryrunTransport), ModelRoster::dryrun()));
        }
        let transport = GeminiTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport), ModelRoster::default()))
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Rewrites the prompt into a detailed visual description using search
    /// grounding. Falls back to the input on any failure or empty answer.
    pub fn enhance_prompt(&self, prompt: &str, brand: &BrandProfile) -> String {
        let model = self.roster.model_for(ModelTask::PromptEnhancement);
        let payload = json!({
            "contents": [user_content(vec![
                json!({ "text": enhancement_instruction(prompt, brand) })
            ])],
            "tools": [{ "googleSearch": {} }],
            "safetySettings": default_safety_settings(),
        });
        match self.call_text(&model, &payload) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => prompt.to_string(),
            Err(err) => {
                warn!(
                    model = %model,
                    error = %format!("{err:#}"),
                    "prompt enhancement failed; using original prompt"
                );
                prompt.to_string()
            }
        }
    }

    /// Location visuals for prompts naming a place. Returns an empty string
    /// without calling out when no location keyword is present.
    pub fn location_context(&self, prompt: &str) -> String {
        if !needs_location_context(prompt) {
            return String::new();
        }
        let model = self.roster.model_for(ModelTask::LocationContext);
        let instruction = format!(
            "Find relevant visual details for this location request: \"{prompt}\". Focus on: architecture colors, iconic landmarks (e.g., specific stadium roof pillars, stand steepness), and atmosphere. Keep it brief and visual."
        );
        let payload = json!({
            "contents": [user_content(vec![json!({ "text": instruction })])],
            "tools": [{ "googleMaps": {} }],
        });
        match self.call_text(&model, &payload) {
            Ok(text) if !text.trim().is_empty() => format!("{LOCATION_LABEL}{}", text.trim()),
            Ok(_) => String::new(),
            Err(err) => {
                warn!(model = %model, error = %format!("{err:#}"), "location lookup failed");
                String::new()
            }
        }
    }

    /// Describes an uploaded reference image. Empty on failure.
    pub fn analyze_reference(&self, image: &str) -> String {
        let uri = DataUri::parse(image).unwrap_or_else(|| DataUri {
            mime_type: "image/png".to_string(),
            data: image.trim().to_string(),
        });
        let model = self.roster.model_for(ModelTask::ImageAnalysis);
        let payload = json!({
            "contents": [user_content(vec![
                uri.inline_part(),
                json!({ "text": ANALYSIS_INSTRUCTION }),
            ])],
        });
        match self.call_text(&model, &payload) {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!(model = %model, error = %format!("{err:#}"), "image analysis failed");
                String::new()
            }
        }
    }

    /// The mandatory image call. Reference entries that are not data URIs
    /// are skipped.
    pub fn synthesize(
        &self,
        composed_prompt: &str,
        reference_images: &[String],
        aspect_ratio: AspectRatio,
    ) -> StickerResult<String> {
        let mut parts: Vec<Value> = reference_images
            .iter()
            .filter_map(|image| DataUri::parse(image))
            .map(|uri| uri.inline_part())
            .collect();
        let skipped = reference_images.len() - parts.len();
        if skipped > 0 {
            debug!(skipped, "ignoring reference images that are not data URIs");
        }
        parts.push(json!({ "text": composed_prompt }));

        let model = self.roster.model_for(ModelTask::ImageSynthesis);
        let payload = json!({
            "contents": [user_content(parts)],
            "systemInstruction": { "parts": [{ "text": composer::system_instruction() }] },
            "generationConfig": {
                "imageConfig": { "aspectRatio": aspect_ratio.as_str() },
            },
            "safetySettings": default_safety_settings(),
        });
        let response = self.transport.generate_content(&model, &payload)?;
        first_inline_image(&response).ok_or(StickerError::NoImageProduced)
    }

    pub fn generate(&self, plan: &GenerationPlan) -> StickerResult<GenerationOutcome> {
        let brand = plan.brand_id.profile();
        let style = plan.style_id.style();

        if let Some(parent) = plan.parent.as_ref() {
            let composed_prompt = composer::compose_edit(&EditDirective {
                edit_prompt: &plan.prompt,
                style,
                brand,
                cut_line: plan.cut_line,
            });
            info!(brand = %plan.brand_id, parent = %parent.id, "editing sticker");
            let image_url = self.synthesize(
                &composed_prompt,
                std::slice::from_ref(&parent.image_url),
                plan.aspect_ratio,
            )?;
            return Ok(GenerationOutcome {
                image_url,
                enhanced_prompt: plan.prompt.clone(),
                composed_prompt,
            });
        }

        let (subject, location) = if plan.should_enrich() {
            self.enrich(&plan.subject, brand)
        } else {
            (plan.subject.clone(), String::new())
        };

        let composed_prompt = composer::compose_generation(&GenerationDirective {
            subject: &subject,
            location_context: &location,
            style,
            brand,
            image_analysis: plan.image_analysis.as_deref(),
            cut_line: plan.cut_line,
            has_reference_images: !plan.reference_images.is_empty(),
        });
        info!(
            brand = %plan.brand_id,
            style = %plan.style_id.as_str(),
            ratio = %plan.aspect_ratio,
            references = plan.reference_images.len(),
            "generating sticker"
        );
        let image_url =
            self.synthesize(&composed_prompt, &plan.reference_images, plan.aspect_ratio)?;
        Ok(GenerationOutcome {
            image_url,
            enhanced_prompt: subject,
            composed_prompt,
        })
    }

    /// Runs enhancement and location lookup side by side. Either one failing,
    /// even by panicking, leaves the other's answer intact.
    fn enrich(&self, subject: &str, brand: &BrandProfile) -> (String, String) {
        thread::scope(|scope| {
            let enhancement = scope.spawn(|| self.enhance_prompt(subject, brand));
            let location = scope.spawn(|| self.location_context(subject));
            let enhanced = enhancement.join().unwrap_or_else(|_| {
                warn!("prompt enhancement panicked; using original prompt");
                subject.to_string()
            });
            let location = location.join().unwrap_or_else(|_| {
                warn!("location lookup panicked");
                String::new()
            });
            (enhanced, location)
        })
    }

    fn call_text(&self, model: &str, payload: &Value) -> anyhow::Result<String> {
        let response = self.transport.generate_content(model, payload)?;
        Ok(response_text(&response))
    }
}

fn enhancement_instruction(prompt: &str, brand: &BrandProfile) -> String {
    let brand_context = if brand.id == BrandId::RedDevils {
        RED_DEVILS_CLUB_CONTEXT
    } else {
        ""
    };
    format!(
        "ROLE: You are an Expert AI Prompt Engineer.

USER INPUT: \"{prompt}\"
BRAND CONTEXT: {} ({brand_context})

YOUR TASK:
1. **UNDERSTAND THE MEANING:** If the user uses slang, abbreviations, or specific fan-culture terms (e.g., specific Ultra groups, rivals, chants), USE GOOGLE SEARCH to find out exactly what they visually refer to.
2. **VISUAL TRANSLATION:** Convert the user's intent into a physical description.
   - Example: If user says \"Betze burning\", describe \"Fritz-Walter-Stadion at night with red bengal flares lighting up the Westkurve\".
   - Example: If user says \"Against Waldhof\", find out Waldhof Mannheim colors (Blue/Black) and describe them as the defeated opponent.
3. **LOGO ACCURACY:** The user has licenses. Explicitly describe the official logos if requested.
4. **TEXT FIX:** Correct \"FK\" to \"FCK\".

OUTPUT:
Return ONLY the optimized, detailed English prompt for the image generator.",
        brand.name
    )
}

fn user_content(parts: Vec<Value>) -> Value {
    json!({ "role": "user", "parts": parts })
}

fn default_safety_settings() -> Vec<Value> {
    [
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(|category| {
        json!({
            "category": category,
            "threshold": "BLOCK_NONE",
        })
    })
    .collect()
}

fn first_candidate_parts(response: &Value) -> Vec<Value> {
    response
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Joined text parts of the first candidate.
fn response_text(response: &Value) -> String {
    first_candidate_parts(response)
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("")
}

fn first_inline_image(response: &Value) -> Option<String> {
    first_candidate_parts(response).into_iter().find_map(|part| {
        let inline = part
            .get("inlineData")
            .or_else(|| part.get("inline_data"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_else(Map::new);
        let data = inline
            .get("data")
            .and_then(Value::as_str)
            .filter(|data| !data.is_empty())?;
        let mime_type = inline
            .get("mimeType")
            .or_else(|| inline.get("mime_type"))
            .and_then(Value::as_str)
            .unwrap_or("image/png");
        Some(format!("data:{mime_type};base64,{data}"))
    })
}
