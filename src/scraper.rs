use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::LookupConfig;
use crate::models::{BusinessProfile, GeoPoint};

/// External business-profile lookup. `None` means the business could not be
/// found; transport failures are errors.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch(&self, name: &str, location: &str) -> Result<Option<BusinessProfile>>;
}

/// Website reachability probe. A business whose site cannot be confirmed
/// live is never sent to the model for analysis.
#[async_trait]
pub trait WebsiteProbe: Send + Sync {
    async fn is_reachable(&self, url: &str) -> bool;
}

/// Profile lookup against the SerpApi Google-Maps engine.
pub struct SerpApiFetcher {
    client: Client,
    api_key: String,
    language: String,
}

impl SerpApiFetcher {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("SerpApi key is not configured"))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            api_key,
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl ProfileFetcher for SerpApiFetcher {
    async fn fetch(&self, name: &str, location: &str) -> Result<Option<BusinessProfile>> {
        let query = format!("{} {}", name, location);
        let response = self
            .client
            .get("https://serpapi.com/search")
            .query(&[
                ("engine", "google_maps"),
                ("q", query.as_str()),
                ("api_key", self.api_key.as_str()),
                ("hl", self.language.as_str()),
                ("type", "search"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;

        let business = if let Some(local) = data
            .get("local_results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
        {
            local
        } else if let Some(place) = data.get("place_results").filter(|p| p.is_object()) {
            place
        } else {
            return Ok(None);
        };

        Ok(Some(profile_from_result(business)))
    }
}

fn profile_from_result(business: &Value) -> BusinessProfile {
    // The "type" field is sometimes a list, sometimes a bare string.
    let category = match business.get("type") {
        Some(Value::Array(types)) => types.first().and_then(Value::as_str).map(str::to_string),
        Some(Value::String(t)) => Some(t.clone()),
        _ => None,
    };

    let gps_coordinates = business.get("gps_coordinates").and_then(|gps| {
        Some(GeoPoint {
            latitude: gps.get("latitude")?.as_f64()?,
            longitude: gps.get("longitude")?.as_f64()?,
        })
    });

    BusinessProfile {
        name: string_field(business, "title"),
        address: string_field(business, "address"),
        website: optional_field(business, "website"),
        phone: optional_field(business, "phone"),
        rating: business
            .get("rating")
            .and_then(Value::as_f64)
            .unwrap_or(0.0) as f32,
        review_count: business
            .get("reviews")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32,
        category,
        photos: business
            .get("thumbnail")
            .and_then(Value::as_str)
            .map(|t| vec![t.to_string()])
            .unwrap_or_default(),
        gps_coordinates,
        place_id: optional_field(business, "place_id"),
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn optional_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// HEAD probe with an explicit timeout and redirect following. Any non-2xx/3xx
/// status or network error counts as unreachable.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebsiteProbe for HttpProbe {
    async fn is_reachable(&self, url: &str) -> bool {
        if url.trim().is_empty() {
            return false;
        }

        let url = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        };

        match self.client.head(&url).send().await {
            Ok(response) => {
                let ok = response.status().as_u16() < 400;
                debug!(%url, status = %response.status(), reachable = ok, "website probe");
                ok
            }
            Err(err) => {
                debug!(%url, error = %err, "website probe failed");
                false
            }
        }
    }
}
