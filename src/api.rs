use serde::{Deserialize, Serialize};
use viralcast::{
    ContentType, CreatorProfile, LlmTrace, Platform, PostInput, Recommendation, ScoreResult,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPredictionRequest {
    pub post_data: Option<ApiPostData>,
    #[serde(default)]
    pub options: ApiPredictionOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPostData {
    pub text: Option<String>,
    pub platform: Option<String>,
    pub content_type: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub media_count: Option<u32>,
    pub creator_handle: Option<String>,
    pub creator: Option<ApiCreatorData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCreatorData {
    pub handle: Option<String>,
    pub follower_count: u64,
    pub engagement_count: Option<u64>,
    pub verified: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPredictionOptions {
    pub enrich_with_lunar_crush: Option<bool>,
    pub use_ai: Option<bool>,
    pub request_id: Option<String>,
}

impl ApiPredictionRequest {
    /// Validates the payload into estimator inputs. Only malformed caller
    /// input errors here; missing optional data selects the fallback path.
    pub fn into_input(self) -> Result<(PostInput, Option<CreatorProfile>, Option<String>), String> {
        let post_data = self.post_data.ok_or_else(|| "postData is required".to_string())?;

        let text = post_data.text.unwrap_or_default().trim().to_string();
        if text.is_empty() {
            return Err("postData.text is required".to_string());
        }

        let mut input = PostInput::default();
        input.text = text;

        if let Some(platform) = post_data.platform.as_deref() {
            input.platform = Platform::from_str(platform)
                .ok_or_else(|| format!("invalid platform: {}", platform))?;
        }
        if let Some(content_type) = post_data.content_type.as_deref() {
            input.content_type = ContentType::from_str(content_type)
                .ok_or_else(|| format!("invalid content type: {}", content_type))?;
        }
        if let Some(hashtags) = post_data.hashtags {
            input.hashtags = hashtags
                .into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect();
        }
        if let Some(media_count) = post_data.media_count {
            input.media_count = media_count;
        }

        let handle = post_data.creator_handle.clone();
        let creator = post_data.creator.map(|creator| {
            CreatorProfile::new(
                creator
                    .handle
                    .or_else(|| handle.clone())
                    .unwrap_or_else(|| "creator".to_string()),
                creator.follower_count,
                creator.engagement_count.unwrap_or(0),
                creator.verified.unwrap_or(false),
            )
        });

        Ok((input, creator, handle))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPredictionResponse {
    pub prediction: ApiPrediction,
    pub metadata: ApiMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrediction {
    pub viral_probability: u8,
    pub confidence: u8,
    pub category: String,
    pub expected_reach: Option<u64>,
    pub key_factors: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetadata {
    pub request_id: String,
    pub source: String,
    pub post_fingerprint: String,
    pub creator: Option<CreatorProfile>,
    pub llm_trace: Option<LlmTrace>,
    pub warnings: Vec<String>,
}

impl ApiPredictionResponse {
    pub fn from_result(
        result: ScoreResult,
        request_id: String,
        post_fingerprint: String,
        creator: Option<CreatorProfile>,
        llm_trace: Option<LlmTrace>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            prediction: ApiPrediction {
                viral_probability: result.viral_probability,
                confidence: result.confidence,
                category: result.category.label().to_string(),
                expected_reach: result.expected_reach,
                key_factors: result.key_factors,
                recommendations: result.recommendations,
            },
            metadata: ApiMetadata {
                request_id,
                source: result.source.label().to_string(),
                post_fingerprint,
                creator,
                llm_trace,
                warnings,
            },
        }
    }
}

/// Error body shape: `{ "error": kind, "message": detail }`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            error: "invalid_input".to_string(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            error: "configuration_error".to_string(),
            message: message.into(),
        }
    }
}
