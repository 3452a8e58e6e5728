use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::content;
use crate::filter::WeaknessFilter;
use crate::models::{AnalysisResult, BusinessProfile};
use crate::recovery::recover_json;

/// Black-box generative model: text prompt in, text response out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Gemini `generateContent` REST client.
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("No Gemini API key configured"))?;
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            http_client,
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct GeminiRequest {
            contents: Vec<GeminiContent>,
            #[serde(rename = "generationConfig")]
            generation_config: GeminiGenerationConfig,
        }

        #[derive(Serialize)]
        struct GeminiContent {
            parts: Vec<GeminiPart>,
        }

        #[derive(Serialize)]
        struct GeminiPart {
            text: String,
        }

        #[derive(Serialize)]
        struct GeminiGenerationConfig {
            temperature: f32,
            #[serde(rename = "maxOutputTokens")]
            max_output_tokens: u32,
            response_mime_type: String,
        }

        #[derive(Deserialize)]
        struct GeminiResponse {
            candidates: Vec<GeminiCandidate>,
        }

        #[derive(Deserialize)]
        struct GeminiCandidate {
            content: GeminiResponseContent,
        }

        #[derive(Deserialize)]
        struct GeminiResponseContent {
            parts: Vec<GeminiResponsePart>,
        }

        #[derive(Deserialize)]
        struct GeminiResponsePart {
            text: String,
        }

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
                response_mime_type: "application/json".to_string(),
            },
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API request failed: {}", error_text));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        gemini_response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.clone())
            .ok_or_else(|| anyhow!("Empty response from Gemini"))
    }
}

/// Turns a business profile into a scored analysis by prompting the model
/// once, recovering the JSON payload, normalizing the lists and dropping
/// hallucinated weaknesses.
pub struct Analyzer {
    filter: WeaknessFilter,
}

impl Analyzer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            filter: WeaknessFilter::new()?,
        })
    }

    pub async fn analyze(
        &self,
        model: &dyn ModelClient,
        profile: &BusinessProfile,
        location: &str,
    ) -> Result<AnalysisResult> {
        let prompt = build_analysis_prompt(profile, location);
        debug!(business = %profile.name, "requesting analysis from model");

        let raw = model.generate(&prompt).await?;
        Ok(self.from_response(&raw, profile.review_count))
    }

    /// Map a raw model response to an `AnalysisResult`. An unrecoverable
    /// payload degrades to score 0 with empty lists, never an error.
    pub fn from_response(&self, raw: &str, review_count: u32) -> AnalysisResult {
        let parsed = recover_json(raw);
        if parsed.as_object().map_or(true, |map| map.is_empty()) {
            warn!("model response carried no analysis payload");
        }

        let score = extract_score(&parsed);
        let strengths = content::detail_items(parsed.get("forces").unwrap_or(&Value::Null));
        let weaknesses = content::detail_items(parsed.get("faiblesses").unwrap_or(&Value::Null));
        let weaknesses = self.filter.apply(weaknesses, review_count);

        AnalysisResult {
            score,
            strengths,
            weaknesses,
            message: None,
        }
    }
}

/// Lossy score extraction clamped to 0..=100. Accepts integers, floats and
/// numeric strings; anything else falls back to zero.
fn extract_score(parsed: &Value) -> u8 {
    let raw = match parsed.get("score") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    raw.clamp(0.0, 100.0) as u8
}

fn build_analysis_prompt(profile: &BusinessProfile, location: &str) -> String {
    let review_count = profile.review_count;
    let website = profile.website.as_deref().unwrap_or("non renseigné");

    format!(
        r#"Tu es un expert SEO local. Tu dois répondre UNIQUEMENT avec un JSON valide dans ce format exact :

{{
  "score": 85,
  "forces": [
    {{"title": "Titre de la force", "description": "Description détaillée"}},
    {{"title": "Autre force", "description": "Autre description"}}
  ],
  "faiblesses": [
    {{"title": "Titre de la faiblesse", "description": "Description détaillée"}}
  ]
}}

RÈGLES CRITIQUES :
1. CE COMMERCE A {review_count} AVIS CLIENTS - C'EST UN FAIT ABSOLU
2. INTERDICTION TOTALE de mentionner l'absence, le manque ou l'insuffisance d'avis
3. INTERDICTION d'utiliser les mots : "zéro avis", "aucun avis", "pas d'avis", "absence d'avis", "manque d'avis"
4. Si des avis existent ({review_count} > 0), concentre-toi sur : optimisation technique, contenu local, concurrence, structure du site
5. Évite toute référence négative aux avis clients quand ils existent

FOCUS SUR : SEO technique, contenu local, Google My Business, concurrence, mots-clés locaux, structure du site.

Analyse ce commerce local pour le SEO :
- Nom: {name}
- Localisation: {location}
- Site web: {website}
- Catégorie: {category}
- Note moyenne: {rating}
- Nombre d'avis: {review_count}
Donne 2-3 forces et 2-3 faiblesses.

Réponds UNIQUEMENT avec ce JSON, rien d'autre."#,
        review_count = review_count,
        name = profile.name,
        location = location,
        website = website,
        category = profile.category.as_deref().unwrap_or("inconnue"),
        rating = profile.rating,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analyzer() -> Analyzer {
        Analyzer::new().unwrap()
    }

    #[test]
    fn maps_full_response() {
        let raw = json!({
            "score": 72,
            "forces": [{"title": "Fiche complète", "description": "NAP cohérent"}],
            "faiblesses": [{"title": "Pas de blog", "description": ""}]
        })
        .to_string();

        let result = analyzer().from_response(&raw, 5);
        assert_eq!(result.score, 72);
        assert_eq!(result.strengths.len(), 1);
        assert_eq!(result.weaknesses.len(), 1);
        assert!(result.message.is_none());
    }

    #[test]
    fn clamps_out_of_range_scores() {
        let result = analyzer().from_response("{\"score\": 250}", 0);
        assert_eq!(result.score, 100);
        let result = analyzer().from_response("{\"score\": -3}", 0);
        assert_eq!(result.score, 0);
        let result = analyzer().from_response("{\"score\": \"85\"}", 0);
        assert_eq!(result.score, 85);
    }

    #[test]
    fn unparseable_response_degrades_to_empty_analysis() {
        let result = analyzer().from_response("the model rambled instead", 3);
        assert_eq!(result.score, 0);
        assert!(result.strengths.is_empty());
        assert!(result.weaknesses.is_empty());
        // Missing payload is not the degenerate outcome: no terminal message.
        assert!(result.message.is_none());
    }

    #[test]
    fn review_hallucinations_are_filtered_in_mapping() {
        let raw = json!({
            "score": 60,
            "faiblesses": [
                {"title": "Absence d'avis clients", "description": ""},
                {"title": "Maillage interne faible", "description": ""}
            ]
        })
        .to_string();

        let result = analyzer().from_response(&raw, 12);
        assert_eq!(result.weaknesses.len(), 1);
        assert_eq!(result.weaknesses[0].title, "Maillage interne faible");
    }
}
