//! Parsing of the structured features a vision model extracts from a photo.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PipelineError;

/// Instruction sent alongside the photo. Asks for a bare JSON object.
pub const FEATURE_EXTRACTION_PROMPT: &str = r#"You are an AI assistant that analyzes an image and extracts key visual features into a structured JSON format. Do not describe the image with full sentences or artistic interpretations. Only extract the data points requested.

**Instructions:**
1.  Analyze the provided image to identify the main subject.
2.  Extract the following key characteristics into a JSON object:
    - "hair_color": A simple, one-word or very brief phrase for the primary hair color (e.g., "lime green", "blonde", "brown").
    - "clothing_description": A very brief, 2-5 word description of the main piece of clothing the subject is wearing (e.g., "black turtleneck", "blue jacket", "white t-shirt"). Focus on the most dominant item.
    - "accessory": A single, most prominent accessory, if any (e.g., "necklace", "hat", "glasses"). If no prominent accessory, use an empty string "".
    - "expression": A single, simple adjective describing the main facial expression (e.g., "serious", "smiling", "angry", "neutral"). If unclear or subtle, default to "neutral".
3.  Your output MUST be ONLY the raw JSON object. Do not include markdown code block ticks, any introductory phrases, or any other explanatory text.

**Example Output:**
{
  "hair_color": "green",
  "clothing_description": "white sleeveless top",
  "accessory": "green necklace",
  "expression": "serious"
}"#;

/// Key visual attributes of the photo's main subject.
///
/// Absent or `null` keys decode as empty strings; the prompt template skips them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedFeatures {
    #[serde(deserialize_with = "null_as_empty")]
    pub hair_color: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub clothing_description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub accessory: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub expression: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ExtractedFeatures {
    /// Parse the model's answer.
    ///
    /// Tolerates surrounding whitespace and a markdown code fence; anything
    /// else that is not a JSON object of string fields is rejected.
    pub fn parse(text: &str) -> Result<Self, PipelineError> {
        let malformed = |reason: String| {
            tracing::warn!("Vision model returned malformed features ({reason}): {text}");
            PipelineError::MalformedFeatures {
                raw: text.to_string(),
            }
        };

        let body = strip_code_fence(text.trim());
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
        // Structs also deserialize from arrays; only an object is a valid answer.
        if !value.is_object() {
            return Err(malformed("not a JSON object".to_string()));
        }
        let mut features: Self =
            serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
        features.normalize();
        Ok(features)
    }

    fn normalize(&mut self) {
        for field in [
            &mut self.hair_color,
            &mut self.clothing_description,
            &mut self.accessory,
            &mut self.expression,
        ] {
            *field = field.trim().to_string();
        }
    }
}

/// Remove a surrounding ```json ... ``` fence if present.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string ("json"), with or without a newline after it.
    rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim()
}
