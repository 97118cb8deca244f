use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};

use viralcast::config::GeminiConfig;
use viralcast::scoring::parse_analysis_text;
use viralcast::{CreatorProfile, LlmAnalysis, LlmTrace, PostInput, TrendingTopic};

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

pub struct LlmOutcome {
    pub analysis: LlmAnalysis,
    pub trace: LlmTrace,
}

impl GeminiClient {
    pub fn from_env(config: &GeminiConfig, model_override: Option<String>) -> Option<Self> {
        let api_key = env::var("GEMINI_API_KEY").ok()?;
        let model = model_override.unwrap_or_else(|| config.model.clone());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok()?;
        Some(Self {
            client,
            api_key,
            api_base: config.api_base.clone(),
            model,
        })
    }

    pub async fn analyze(
        &self,
        post: &PostInput,
        creator: Option<&CreatorProfile>,
        trending: &[TrendingTopic],
    ) -> Result<LlmOutcome, String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        );
        let prompt = build_prompt(post, creator, trending);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig { temperature: 0.2 },
        };

        let started = Instant::now();
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("Gemini request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(format!("Gemini API error: {}", status));
            }
            return Err(format!("Gemini API error: {} {}", status, detail));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| format!("Gemini response parse failed: {}", err))?;

        let content = body
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.trim().to_string())
            .ok_or_else(|| "Gemini response missing candidates".to_string())?;

        // Tolerates prose, markdown fences, and missing JSON.
        let analysis = parse_analysis_text(&content);

        let trace = LlmTrace {
            model: self.model.clone(),
            latency_ms: started.elapsed().as_millis(),
            prompt,
            raw_response: content,
        };

        Ok(LlmOutcome { analysis, trace })
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

fn build_prompt(
    post: &PostInput,
    creator: Option<&CreatorProfile>,
    trending: &[TrendingTopic],
) -> String {
    let mut prompt = String::from(
        r#"You are a strict JSON-only analyst of social post virality.
Return a single JSON object with these fields:
- viral_probability (integer 0..100)
- confidence (integer 0..100)
- key_factors (array of 3-5 short strings)
- summary (one sentence)
Rules:
- Output JSON only, no markdown or commentary.
"#,
    );

    prompt.push_str(&format!(
        "\nPost ({}, {}):\n{}\n",
        post.platform.label(),
        post.content_type.label(),
        post.text
    ));
    if !post.hashtags.is_empty() {
        prompt.push_str(&format!("Hashtags: {}\n", post.hashtags.join(", ")));
    }
    if let Some(profile) = creator {
        prompt.push_str(&format!(
            "Creator: @{} with {} followers, verified: {}\n",
            profile.handle, profile.follower_count, profile.verified
        ));
    }
    if !trending.is_empty() {
        let names: Vec<&str> = trending.iter().map(|topic| topic.name.as_str()).collect();
        prompt.push_str(&format!("Currently trending: {}\n", names.join(", ")));
    }

    prompt
}
