use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

use crate::analyzer::{Analyzer, ModelClient};
use crate::config::ReportStyle;
use crate::error::AuditError;
use crate::models::{
    ActionItem, ActionPlan, AnalysisResult, AuditRequest, BusinessProfile, Horizon,
};
use crate::planner::ActionPlanner;
use crate::report::{ReportData, ReportEngine};
use crate::scraper::{ProfileFetcher, WebsiteProbe};
use crate::store::{AuditDraft, AuditStore};

/// Message carried by the degenerate outcome when the business has no
/// usable website.
pub const NO_WEBSITE_MESSAGE: &str =
    "Site web non fourni ou inaccessible, analyse impossible.";

/// Message carried when the analysis model call itself failed.
pub const ANALYSIS_UNAVAILABLE_MESSAGE: &str =
    "Analyse indisponible : le service d'analyse n'a pas répondu.";

/// What one pipeline run produces for the caller.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Analysis deliberately skipped: nothing persisted, nothing rendered.
    Degenerate {
        profile: BusinessProfile,
        analysis: AnalysisResult,
    },
    /// Record saved; the report reference is null when only rendering failed.
    Completed(Box<CompletedAudit>),
}

#[derive(Debug, Serialize)]
pub struct CompletedAudit {
    pub id: i64,
    pub api_key: String,
    pub profile: BusinessProfile,
    pub analysis: AnalysisResult,
    pub short_term: Vec<ActionItem>,
    pub mid_term: Vec<ActionItem>,
    pub long_term: Vec<ActionItem>,
    pub report: Option<ReportRef>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRef {
    pub filename: String,
    pub path: PathBuf,
}

/// Sequences one audit: fetch -> probe -> analyze -> plan -> persist ->
/// render. Collaborators are injected as trait objects so every outbound
/// call can be doubled in tests.
pub struct AuditPipeline {
    fetcher: Box<dyn ProfileFetcher>,
    probe: Box<dyn WebsiteProbe>,
    model: Box<dyn ModelClient>,
    store: Box<dyn AuditStore>,
    analyzer: Analyzer,
    planner: ActionPlanner,
    engine: ReportEngine,
    reports_dir: PathBuf,
}

impl AuditPipeline {
    pub fn new(
        fetcher: Box<dyn ProfileFetcher>,
        probe: Box<dyn WebsiteProbe>,
        model: Box<dyn ModelClient>,
        store: Box<dyn AuditStore>,
        style: ReportStyle,
        reports_dir: PathBuf,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            probe,
            model,
            store,
            analyzer: Analyzer::new()?,
            planner: ActionPlanner::new(),
            engine: ReportEngine::new(style),
            reports_dir,
        })
    }

    pub async fn run(
        &self,
        request: &AuditRequest,
        owner: Option<&str>,
    ) -> Result<AuditOutcome, AuditError> {
        // 1. Profile lookup.
        let profile = self
            .fetcher
            .fetch(&request.name, &request.location)
            .await
            .map_err(|e| AuditError::LookupFailed(e.to_string()))?
            .ok_or_else(|| AuditError::ProfileNotFound {
                name: request.name.clone(),
                location: request.location.clone(),
            })?;
        info!(business = %profile.name, reviews = profile.review_count, "profile fetched");

        // 2. Reachability gate. A business whose site cannot be confirmed
        // live is never sent to the model.
        let website_ok = match &profile.website {
            Some(url) => self.probe.is_reachable(url).await,
            None => false,
        };
        if !website_ok {
            info!(business = %profile.name, "website unusable, degenerate outcome");
            return Ok(AuditOutcome::Degenerate {
                analysis: AnalysisResult::degenerate(NO_WEBSITE_MESSAGE),
                profile,
            });
        }

        // 3. Analysis. A failed model call degrades to the terminal message
        // instead of failing the run.
        let (analysis, plan) = match self
            .analyzer
            .analyze(self.model.as_ref(), &profile, &request.location)
            .await
        {
            Ok(analysis) => {
                // 4. Plan synthesis, best effort.
                let plan = self.planner.synthesize(self.model.as_ref(), &analysis).await;
                (analysis, plan)
            }
            Err(err) => {
                warn!(error = %err, "analysis model call failed");
                (
                    AnalysisResult::degenerate(ANALYSIS_UNAVAILABLE_MESSAGE),
                    ActionPlan::default(),
                )
            }
        };

        // 5. Persistence. The one failure that stays terminal: without a
        // saved record there is no id or api-key to hand back.
        let draft = AuditDraft {
            name: request.name.clone(),
            location: request.location.clone(),
            score: analysis.score,
            strengths: analysis.strengths.clone(),
            weaknesses: analysis.weaknesses.clone(),
            plan: plan.clone(),
            owner: owner.map(str::to_string),
            business: Some(profile.clone()),
        };
        let record = self
            .store
            .save(draft)
            .await
            .map_err(|e| AuditError::StorageUnavailable(e.to_string()))?;
        info!(id = record.id, "audit saved");

        // 6. Render. Failure here is a partial success, never a rollback.
        let report = match self.render_report(&profile, &analysis, &plan).await {
            Ok(report) => Some(report),
            Err(err) => {
                warn!(error = %err, "report rendering failed, returning partial outcome");
                None
            }
        };

        Ok(AuditOutcome::Completed(Box::new(CompletedAudit {
            id: record.id,
            api_key: record.api_key,
            profile,
            analysis,
            short_term: plan.flatten(Horizon::ShortTerm),
            mid_term: plan.flatten(Horizon::MidTerm),
            long_term: plan.flatten(Horizon::LongTerm),
            report,
            created_at: record.created_at,
        })))
    }

    async fn render_report(
        &self,
        profile: &BusinessProfile,
        analysis: &AnalysisResult,
        plan: &ActionPlan,
    ) -> Result<ReportRef, AuditError> {
        let rendered = self.engine.render(&ReportData {
            profile,
            analysis,
            plan,
        })?;

        fs::create_dir_all(&self.reports_dir)
            .await
            .map_err(|e| AuditError::RenderFailed(e.to_string()))?;
        let path = self.reports_dir.join(&rendered.filename);
        fs::write(&path, &rendered.bytes)
            .await
            .map_err(|e| AuditError::RenderFailed(e.to_string()))?;

        info!(path = %path.display(), bytes = rendered.bytes.len(), "report written");
        Ok(ReportRef {
            filename: rendered.filename,
            path,
        })
    }
}
