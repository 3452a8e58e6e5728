use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "localaudit")]
#[command(about = "AI-powered local SEO audit for a business profile")]
#[command(long_about = "LocalAudit fetches a business profile, scores its local SEO with a \
generative model and renders a paginated PDF report.

QUICK START:
  localaudit audit \"Cafe Test\" \"Lyon\"          # Run a full audit
  localaudit show --id 3                          # Re-read a stored audit
  localaudit show --api-key <KEY>                 # Same record, public key
  localaudit config --gemini-key \"...\"          # Configure the model

EXAMPLES:
  localaudit audit \"Boulangerie Martin\" \"Bordeaux\" --owner marie --format json
  localaudit list --name martin
  localaudit delete --id 3")]
#[command(version = "1.0.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run a full audit for a business")]
    #[command(long_about = "Fetch the business profile, check the website is live, score the \
profile with the model, derive the three-horizon action plan, save the audit and render the PDF.

A business without a reachable website produces a zero-score outcome without \
calling the model. A failed PDF render still returns the saved audit.

EXAMPLES:
  localaudit audit \"Cafe Test\" \"Lyon\"
  localaudit audit \"Cafe Test\" \"Lyon\" --owner marie --reports-dir ./out --format json")]
    Audit {
        #[arg(help = "Business name")]
        name: String,

        #[arg(help = "Business location (city or area)")]
        location: String,

        #[arg(long, help = "Identity to attach to the audit; anonymous when omitted")]
        owner: Option<String>,

        #[arg(long, help = "Directory for the rendered PDF (overrides configuration)")]
        reports_dir: Option<PathBuf>,

        #[arg(long, help = "Output format", value_enum)]
        format: Option<OutputFormat>,
    },

    #[command(about = "Display a stored audit by id or api-key")]
    Show {
        #[arg(long, help = "Surrogate id of the audit")]
        id: Option<i64>,

        #[arg(long, help = "Public api-key of the audit")]
        api_key: Option<String>,

        #[arg(long, help = "Output format", value_enum)]
        format: Option<OutputFormat>,
    },

    #[command(about = "List stored audits")]
    List {
        #[arg(long, help = "Only audits whose business name contains this text")]
        name: Option<String>,
    },

    #[command(about = "Delete a stored audit")]
    Delete {
        #[arg(long, help = "Surrogate id of the audit to delete")]
        id: i64,
    },

    #[command(about = "Manage configuration")]
    #[command(long_about = "Configure API keys and the model.

CONFIGURATION FILE: ~/.localaudit/config.yml
Environment variables GEMINI_API_KEY and SERPAPI_KEY override stored keys.

EXAMPLES:
  localaudit config --gemini-key \"...\" --serpapi-key \"...\"
  localaudit config --model gemini-2.5-flash
  localaudit config --show")]
    Config {
        #[arg(long, help = "Set the Gemini API key")]
        gemini_key: Option<String>,

        #[arg(long, help = "Set the SerpApi key")]
        serpapi_key: Option<String>,

        #[arg(long, help = "Set the model name")]
        model: Option<String>,

        #[arg(long, help = "Display current configuration values")]
        show: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Plain,
}
