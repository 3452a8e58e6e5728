use serde_json::{json, Value};
use tracing::warn;

use crate::analyzer::ModelClient;
use crate::content;
use crate::models::{ActionPlan, AnalysisResult};

/// Derives the three-horizon action plan from a validated analysis.
///
/// Plan synthesis is best-effort: one model call, one recovery parse, and on
/// any failure an empty plan. It never fails the pipeline.
pub struct ActionPlanner;

impl ActionPlanner {
    pub fn new() -> Self {
        Self
    }

    pub async fn synthesize(&self, model: &dyn ModelClient, analysis: &AnalysisResult) -> ActionPlan {
        let prompt = match build_plan_prompt(analysis) {
            Ok(prompt) => prompt,
            Err(err) => {
                warn!(error = %err, "could not serialize analysis for plan prompt");
                return ActionPlan::default();
            }
        };

        let raw = match model.generate(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "action plan generation failed");
                return ActionPlan::default();
            }
        };

        plan_from_response(&raw)
    }
}

impl Default for ActionPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a raw model response to an `ActionPlan`; unusable payloads yield
/// empty horizon lists.
pub fn plan_from_response(raw: &str) -> ActionPlan {
    let parsed = crate::recovery::recover_json(raw);

    ActionPlan {
        short_term: content::detail_items(parsed.get("short_term").unwrap_or(&Value::Null)),
        mid_term: content::detail_items(parsed.get("mid_term").unwrap_or(&Value::Null)),
        long_term: content::detail_items(parsed.get("long_term").unwrap_or(&Value::Null)),
    }
}

fn build_plan_prompt(analysis: &AnalysisResult) -> serde_json::Result<String> {
    let example = json!({
        "short_term": [
            {"titre": "Améliorer la fiche Google", "description": "Ajouter des photos récentes et optimisées."}
        ],
        "mid_term": [
            {"titre": "Collecter plus d'avis", "description": "Mettre en place une stratégie d'incitation aux avis clients."}
        ],
        "long_term": [
            {"titre": "Optimiser le SEO local", "description": "Créer du contenu ciblé pour la région et les services."}
        ]
    });

    Ok(format!(
        "En te basant sur l'analyse JSON ci-dessous, génère un plan d'action au format JSON STRICT.\n\
         Format attendu EXACTEMENT comme l'exemple :\n{}\n\n\
         ANALYSE : {}\n\n\
         Donne 2-3 recommandations par période. Ne retourne rien d'autre que ce JSON.",
        serde_json::to_string_pretty(&example)?,
        serde_json::to_string(analysis)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_three_horizons_with_titre_alias() {
        let raw = json!({
            "short_term": [{"titre": "Fiche Google", "description": "photos"}],
            "mid_term": ["Collecter des avis"],
            "long_term": [{"title": "Contenu local"}, {"description": "sans titre"}]
        })
        .to_string();

        let plan = plan_from_response(&raw);
        assert_eq!(plan.short_term.len(), 1);
        assert_eq!(plan.short_term[0].title, "Fiche Google");
        assert_eq!(plan.mid_term[0].title, "Collecter des avis");
        // The untitled entry is dropped, not defaulted.
        assert_eq!(plan.long_term.len(), 1);
    }

    #[test]
    fn garbage_response_yields_empty_plan() {
        let plan = plan_from_response("sorry, I cannot help with that");
        assert!(plan.is_empty());
    }
}
