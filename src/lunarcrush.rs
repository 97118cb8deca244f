use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::time::Duration;

use viralcast::config::LunarCrushConfig;
use viralcast::CreatorProfile;

#[derive(Clone)]
pub struct LunarCrushClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

#[derive(Debug)]
pub enum LookupError {
    NotFound,
    RateLimited,
    Unauthorized,
    Unknown(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound => write!(f, "creator not found"),
            LookupError::RateLimited => write!(f, "creator lookup rate limited"),
            LookupError::Unauthorized => write!(f, "creator lookup unauthorized"),
            LookupError::Unknown(detail) => write!(f, "creator lookup failed: {}", detail),
        }
    }
}

impl LunarCrushClient {
    pub fn from_env(config: &LunarCrushConfig) -> Option<Self> {
        let api_key = env::var("LUNARCRUSH_API_KEY").ok()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok()?;
        Some(Self {
            client,
            api_base: config.api_base.clone(),
            api_key,
        })
    }

    pub async fn lookup(&self, network: &str, handle: &str) -> Result<CreatorProfile, LookupError> {
        let handle = handle.trim_start_matches('@');
        let url = format!(
            "{}/public/creator/{}/{}/v1",
            self.api_base.trim_end_matches('/'),
            network,
            urlencoding::encode(handle)
        );

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|err| LookupError::Unknown(format!("request failed: {}", err)))?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => return Err(LookupError::NotFound),
            StatusCode::TOO_MANY_REQUESTS => return Err(LookupError::RateLimited),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LookupError::Unauthorized)
            }
            _ => {}
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(LookupError::Unknown(status.to_string()));
            }
            return Err(LookupError::Unknown(format!("{} {}", status, detail)));
        }

        let body: CreatorResponse = response
            .json()
            .await
            .map_err(|err| LookupError::Unknown(format!("response parse failed: {}", err)))?;

        let data = body
            .data
            .ok_or_else(|| LookupError::Unknown("response missing creator data".to_string()))?;

        Ok(CreatorProfile::new(
            data.creator_name.unwrap_or_else(|| handle.to_string()),
            data.creator_followers.unwrap_or(0),
            data.interactions_24h.unwrap_or(0),
            false,
        ))
    }
}

#[derive(Deserialize)]
struct CreatorResponse {
    data: Option<CreatorData>,
}

#[derive(Deserialize)]
struct CreatorData {
    creator_name: Option<String>,
    creator_followers: Option<u64>,
    interactions_24h: Option<u64>,
}
