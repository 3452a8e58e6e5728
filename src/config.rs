use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub lookup: LookupConfig,
    pub probe: ProbeConfig,
    pub report: ReportStyle,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    pub timeout: u64,
}

fn default_language() -> String {
    "fr".to_string()
}

/// Website reachability check settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub timeout: u64,
}

/// Presentation policy of the rendered report. One layout engine consumes
/// this instead of shipping one hardcoded variant per color scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStyle {
    /// RGB accent used for the page header.
    pub accent: [u8; 3],
    pub bullet: String,
    #[serde(default = "default_sections")]
    pub sections: Vec<Section>,
    /// Character budget for one wrapped line of body text.
    pub wrap_width: usize,
    /// Hard cap for a single line; longer text is truncated with an ellipsis.
    pub max_line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Company,
    Score,
    Strengths,
    Weaknesses,
    Plan,
}

fn default_sections() -> Vec<Section> {
    vec![
        Section::Company,
        Section::Score,
        Section::Strengths,
        Section::Weaknesses,
        Section::Plan,
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the audit store file. Defaults next to the config.
    pub data_dir: Option<PathBuf>,
    /// Directory rendered reports are written to.
    pub reports_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: std::env::var("GEMINI_API_KEY").ok(),
                model: "gemini-2.5-flash".to_string(),
                max_tokens: 4096,
                temperature: 0.7,
                timeout: 60,
            },
            lookup: LookupConfig {
                api_key: std::env::var("SERPAPI_KEY").ok(),
                language: "fr".to_string(),
                timeout: 30,
            },
            probe: ProbeConfig { timeout: 5 },
            report: ReportStyle::default(),
            storage: StorageConfig {
                data_dir: None,
                reports_dir: PathBuf::from("reports"),
            },
        }
    }
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            accent: [255, 140, 0],
            bullet: "-".to_string(),
            sections: default_sections(),
            wrap_width: 95,
            max_line: 110,
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".localaudit").join("config.yml"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".localaudit"))
    }

    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path).await?;
            let mut config: Config = serde_yaml::from_str(&content)?;

            // Environment variables win over stored keys so CI and servers
            // never need keys on disk.
            if let Ok(key) = std::env::var("GEMINI_API_KEY") {
                config.llm.api_key = Some(key);
            }
            if let Ok(key) = std::env::var("SERPAPI_KEY") {
                config.lookup.api_key = Some(key);
            }

            Ok(config)
        } else {
            let config = Config::default();
            config.save().await?;
            Ok(config)
        }
    }

    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(&config_path, content).await?;

        Ok(())
    }

    pub fn set_llm_api_key(&mut self, api_key: String) {
        self.llm.api_key = Some(api_key);
    }

    pub fn set_lookup_api_key(&mut self, api_key: String) {
        self.lookup.api_key = Some(api_key);
    }

    pub fn set_model(&mut self, model: String) {
        self.llm.model = model;
    }

    pub fn is_llm_configured(&self) -> bool {
        self.llm.api_key.is_some() && !self.llm.model.is_empty()
    }
}
