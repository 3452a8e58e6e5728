use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::analyzer::GeminiClient;
use crate::cli::{Commands, OutputFormat};
use crate::config::Config;
use crate::models::{ActionItem, AuditRequest, StoredAudit};
use crate::pipeline::{AuditOutcome, AuditPipeline};
use crate::scraper::{HttpProbe, SerpApiFetcher};
use crate::store::{AuditStore, JsonFileStore};

pub struct App {
    config: Config,
}

impl App {
    pub async fn new() -> Result<Self> {
        let config = Config::load().await?;
        Ok(Self { config })
    }

    pub async fn run_command(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Audit {
                name,
                location,
                owner,
                reports_dir,
                format,
            } => {
                self.run_audit(name, location, owner, reports_dir, format)
                    .await
            }
            Commands::Show {
                id,
                api_key,
                format,
            } => self.show_audit(id, api_key, format).await,
            Commands::List { name } => self.list_audits(name).await,
            Commands::Delete { id } => self.delete_audit(id).await,
            Commands::Config {
                gemini_key,
                serpapi_key,
                model,
                show,
            } => self.update_config(gemini_key, serpapi_key, model, show).await,
        }
    }

    async fn run_audit(
        &self,
        name: String,
        location: String,
        owner: Option<String>,
        reports_dir: Option<PathBuf>,
        format: Option<OutputFormat>,
    ) -> Result<()> {
        if !self.config.is_llm_configured() {
            return Err(anyhow!(
                "No model configured. Run `localaudit config --gemini-key <KEY>` first."
            ));
        }

        let reports_dir = reports_dir.unwrap_or_else(|| self.config.storage.reports_dir.clone());
        let pipeline = AuditPipeline::new(
            Box::new(SerpApiFetcher::new(&self.config.lookup)?),
            Box::new(HttpProbe::new(std::time::Duration::from_secs(
                self.config.probe.timeout,
            ))?),
            Box::new(GeminiClient::new(&self.config.llm)?),
            Box::new(self.store()?),
            self.config.report.clone(),
            reports_dir,
        )?;

        let request = AuditRequest { name, location };
        let outcome = pipeline.run(&request, owner.as_deref()).await?;

        match format.unwrap_or(OutputFormat::Plain) {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
            OutputFormat::Plain => print_outcome(&outcome),
        }
        Ok(())
    }

    async fn show_audit(
        &self,
        id: Option<i64>,
        api_key: Option<String>,
        format: Option<OutputFormat>,
    ) -> Result<()> {
        let store = self.store()?;
        let record = match (id, api_key) {
            (Some(id), _) => store.fetch_by_id(id).await?,
            (None, Some(key)) => store.fetch_by_api_key(&key).await?,
            (None, None) => return Err(anyhow!("Pass --id or --api-key")),
        };

        let audit = record
            .map(|r| r.projection())
            .ok_or_else(|| anyhow!("Audit not found"))?;

        match format.unwrap_or(OutputFormat::Json) {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&audit)?),
            OutputFormat::Plain => print_stored(&audit),
        }
        Ok(())
    }

    async fn list_audits(&self, name: Option<String>) -> Result<()> {
        let store = self.store()?;
        let records = store.list(name.as_deref()).await?;
        if records.is_empty() {
            println!("No audits stored.");
            return Ok(());
        }
        for record in records {
            println!(
                "#{:<4} {:<30} {:<20} score {:>3}  {}",
                record.id,
                record.name,
                record.location,
                record.score,
                record.created_at.format("%Y-%m-%d %H:%M")
            );
        }
        Ok(())
    }

    async fn delete_audit(&self, id: i64) -> Result<()> {
        let store = self.store()?;
        if store.delete(id).await? {
            println!("Audit #{} deleted.", id);
            Ok(())
        } else {
            Err(anyhow!("Audit not found"))
        }
    }

    async fn update_config(
        &mut self,
        gemini_key: Option<String>,
        serpapi_key: Option<String>,
        model: Option<String>,
        show: bool,
    ) -> Result<()> {
        let mut changed = false;
        if let Some(key) = gemini_key {
            self.config.set_llm_api_key(key);
            changed = true;
        }
        if let Some(key) = serpapi_key {
            self.config.set_lookup_api_key(key);
            changed = true;
        }
        if let Some(model) = model {
            self.config.set_model(model);
            changed = true;
        }
        if changed {
            self.config.save().await?;
            println!("Configuration saved to {}", Config::config_path()?.display());
        }
        if show || !changed {
            println!("model:       {}", self.config.llm.model);
            println!(
                "gemini key:  {}",
                if self.config.llm.api_key.is_some() {
                    "configured"
                } else {
                    "missing"
                }
            );
            println!(
                "serpapi key: {}",
                if self.config.lookup.api_key.is_some() {
                    "configured"
                } else {
                    "missing"
                }
            );
            println!("reports dir: {}", self.config.storage.reports_dir.display());
        }
        Ok(())
    }

    fn store(&self) -> Result<JsonFileStore> {
        Ok(JsonFileStore::new(self.config.data_dir()?))
    }
}

fn print_outcome(outcome: &AuditOutcome) {
    match outcome {
        AuditOutcome::Degenerate { profile, analysis } => {
            println!("{} - {}", profile.name, profile.address);
            if let Some(message) = &analysis.message {
                println!("{}", message);
            }
        }
        AuditOutcome::Completed(audit) => {
            println!("{} - {}", audit.profile.name, audit.profile.address);
            println!("Audit #{} (api-key {})", audit.id, audit.api_key);
            println!("Score : {}/100", audit.analysis.score);

            print_items("Forces", audit.analysis.strengths.iter().map(|i| (&i.title, &i.description)));
            print_items("Faiblesses", audit.analysis.weaknesses.iter().map(|i| (&i.title, &i.description)));
            print_actions("Court terme", &audit.short_term);
            print_actions("Moyen terme", &audit.mid_term);
            print_actions("Long terme", &audit.long_term);

            match &audit.report {
                Some(report) => println!("\nRapport : {}", report.path.display()),
                None => println!("\nRapport indisponible (le rendu a échoué, audit sauvegardé)."),
            }
        }
    }
}

fn print_items<'a>(title: &str, items: impl Iterator<Item = (&'a String, &'a String)>) {
    println!("\n{} :", title);
    let mut any = false;
    for (item_title, description) in items {
        any = true;
        if description.is_empty() {
            println!("  - {}", item_title);
        } else {
            println!("  - {} : {}", item_title, description);
        }
    }
    if !any {
        println!("  (aucune)");
    }
}

fn print_actions(title: &str, actions: &[ActionItem]) {
    println!("\n{} :", title);
    if actions.is_empty() {
        println!("  (aucune recommandation)");
    }
    for action in actions {
        if action.description.is_empty() {
            println!("  - {}", action.title);
        } else {
            println!("  - {} : {}", action.title, action.description);
        }
    }
}

fn print_stored(audit: &StoredAudit) {
    println!("#{} {} - {}", audit.id, audit.name, audit.location);
    println!("Score : {}/100", audit.score);
    print_items("Forces", audit.strengths.iter().map(|i| (&i.title, &i.description)));
    print_items("Faiblesses", audit.weaknesses.iter().map(|i| (&i.title, &i.description)));
}
