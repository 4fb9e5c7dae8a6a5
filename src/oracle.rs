use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::catalog::Module;
use crate::error::{LabError, LabResult};
use crate::state::SimulationState;

/// The oracle's three-line reading of a state snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleResult {
    pub interpretation: String,
    pub harmonic_state: String,
    pub suggested_focus: String,
}

impl OracleResult {
    fn new(interpretation: &str, harmonic_state: &str, suggested_focus: &str) -> Self {
        OracleResult {
            interpretation: interpretation.to_string(),
            harmonic_state: harmonic_state.to_string(),
            suggested_focus: suggested_focus.to_string(),
        }
    }

    /// No API key configured.
    pub fn disconnected() -> Self {
        Self::new(
            "API Key missing. Cannot access the Grimoire Vibratoire.",
            "Disconnected",
            "Check configuration.",
        )
    }

    /// The provider call failed outright.
    pub fn silence() -> Self {
        Self::new(
            "The signal is too weak. The void does not answer.",
            "Silence",
            "Increase amplitude.",
        )
    }

    /// The provider answered with something that is not the expected JSON.
    pub fn interference() -> Self {
        Self::new(
            "Interference detected in the quantum field. Unable to decode.",
            "Unknown",
            "Recalibrate sensors.",
        )
    }
}

/// Remote text generation: one prompt plus an output-shape hint in, the
/// raw reply text out.
pub trait TextGenerator: Send + Sync {
    fn generate_text(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> impl Future<Output = LabResult<String>> + Send;
}

/// Output-shape hint: an object with three required string properties.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "interpretation": { "type": "STRING" },
            "harmonicState": { "type": "STRING" },
            "suggestedFocus": { "type": "STRING" }
        },
        "required": ["interpretation", "harmonicState", "suggestedFocus"]
    })
}

pub fn build_prompt(state: &SimulationState, module: &Module) -> String {
    format!(
        "You are the AI interface for the SymbiΩn Multiverse Lab.\n\
        Analyze the current vibratory state of the fractal spiral.\n\n\
        Current Module: {} ({})\n\
        Perfect Number Resonance: {}\n\n\
        Simulation Parameters:\n\
        - Phi Factor: {}\n\
        - Total S (Modulation): {}\n\
        - Qubits: {}\n\
        - Coupling (J): {}\n\
        - Decoherence: {}\n\n\
        Provide a \"Techno-poetic\" interpretation of this state. Be mystical yet scientific.\n\n\
        Return ONLY a JSON object with this schema:\n\
        {{\n  \
          \"interpretation\": \"A short paragraph (max 50 words) describing the energetic feeling.\",\n  \
          \"harmonicState\": \"A 1-3 word status (e.g., 'Resonant', 'Chaotic', 'Divine Alignment')\",\n  \
          \"suggestedFocus\": \"A short advice (max 10 words) for the operator.\"\n\
        }}",
        module.name(),
        module.description,
        module.perfect_number,
        state.phi,
        state.s_total,
        state.qubits,
        state.coupling,
        state.decoherence,
    )
}

/// Drop a surrounding ``` / ```json fence and whitespace.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Unwrap, then parse. All three fields must be present strings.
pub fn parse_reply(text: &str) -> LabResult<OracleResult> {
    Ok(serde_json::from_str(strip_code_fences(text))?)
}

/// Single-shot consult. Never fails: every error path maps onto one of the
/// fixed fallback results. Callers keep at most one consult in flight.
pub struct OracleClient<G> {
    generator: Option<G>,
}

impl<G: TextGenerator> OracleClient<G> {
    pub fn new(generator: G) -> Self {
        OracleClient { generator: Some(generator) }
    }

    pub fn disconnected() -> Self {
        OracleClient { generator: None }
    }

    pub fn is_connected(&self) -> bool {
        self.generator.is_some()
    }

    pub fn generator(&self) -> Option<&G> {
        self.generator.as_ref()
    }

    pub async fn consult(&self, state: &SimulationState, module: &Module) -> OracleResult {
        let Some(generator) = &self.generator else {
            info!("oracle consulted without an api key");
            return OracleResult::disconnected();
        };

        let prompt = build_prompt(state, module);
        debug!(module = module.id, prompt_len = prompt.len(), "consulting oracle");

        let text = match generator.generate_text(&prompt, &response_schema()).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "oracle request failed");
                return OracleResult::silence();
            }
        };

        match parse_reply(&text) {
            Ok(result) => {
                info!(harmonic_state = %result.harmonic_state, "oracle answered");
                result
            }
            Err(err) => {
                warn!(error = %err, "failed to parse oracle reply");
                OracleResult::interference()
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: ReplyContent,
}

#[derive(Debug, Default, Deserialize)]
struct ReplyContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: String,
}

/// Gemini `generateContent` over REST.
pub struct GeminiGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl TextGenerator for GeminiGenerator {
    async fn generate_text(&self, prompt: &str, schema: &Value) -> LabResult<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LabError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateResponse = response.json().await?;
        reply_text(reply)
    }
}

fn reply_text(reply: GenerateResponse) -> LabResult<String> {
    let text: String = reply
        .candidates
        .into_iter()
        .next()
        .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LabError::EmptyReply);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_module;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
        assert_eq!(strip_code_fences("not json"), "not json");
    }

    #[test]
    fn parse_requires_all_three_fields() {
        let ok = parse_reply(
            r#"{"interpretation":"x","harmonicState":"Resonant","suggestedFocus":"y"}"#,
        )
        .unwrap();
        assert_eq!(ok.harmonic_state, "Resonant");

        assert!(parse_reply(r#"{"interpretation":"x","harmonicState":"Resonant"}"#).is_err());
        assert!(parse_reply(r#"["x","y","z"]"#).is_err());
        assert!(matches!(parse_reply("not json"), Err(LabError::Malformed(_))));
    }

    #[test]
    fn prompt_embeds_module_and_parameters() {
        let state = SimulationState {
            phi: 2.25,
            s_total: 7.5,
            qubits: 12,
            coupling: 0.75,
            decoherence: 0.05,
            ..Default::default()
        };
        let prompt = build_prompt(&state, find_module("ASTRALΩ"));
        for needle in [
            "ASTRALΩ",
            "Entropie dynamique et navigation subtile",
            "33550336",
            "Phi Factor: 2.25",
            "Total S (Modulation): 7.5",
            "Qubits: 12",
            "Coupling (J): 0.75",
            "Decoherence: 0.05",
            "\"harmonicState\"",
        ] {
            assert!(prompt.contains(needle), "prompt missing {needle}");
        }
    }

    #[test]
    fn schema_names_three_string_fields() {
        let schema = response_schema();
        let props = schema["properties"].as_object().unwrap();
        assert_eq!(props.len(), 3);
        assert!(props.values().all(|p| p["type"] == "STRING"));
    }

    #[test]
    fn reply_text_joins_first_candidate_parts() {
        let reply: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(reply_text(reply).unwrap(), "{\"a\":1}");

        let empty: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(reply_text(empty), Err(LabError::EmptyReply)));
    }

    #[test]
    fn request_body_shape() {
        let schema = response_schema();
        let request = GenerateRequest {
            contents: vec![Content { parts: vec![TextPart { text: "hi" }] }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &schema,
            },
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn generator_url_drops_trailing_slash() {
        let generator = GeminiGenerator::new("https://example.test/v1beta/", "m-1", "k");
        assert_eq!(generator.url(), "https://example.test/v1beta/models/m-1:generateContent");
    }
}
