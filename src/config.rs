use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::TrendingTopic;

/// Point values for the additive scoring model. Category thresholds (75/60/40)
/// are fixed invariants and deliberately not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringParams {
    pub base_no_creator: i64,
    pub tier_base_micro: i64,
    pub tier_base_mid: i64,
    pub tier_base_macro: i64,
    pub tier_base_mega: i64,
    pub verified_bonus: i64,
    pub urgency_bonus: i64,
    pub numeral_bonus: i64,
    pub emoji_bonus_cap: i64,
    pub hashtag_bonus_per_tag: i64,
    pub hashtag_bonus_cap: i64,
    pub question_bonus: i64,
    pub cta_bonus: i64,
    pub media_bonus_cap: i64,
    pub trending_bonus_per_match: i64,
    pub trending_bonus_cap: i64,
    pub creator_data_bonus: i64,
    pub trending_data_bonus: i64,
    pub llm_data_bonus: i64,
    pub llm_weight: f64,
    pub reach_divisor: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            base_no_creator: 35,
            tier_base_micro: 42,
            tier_base_mid: 50,
            tier_base_macro: 58,
            tier_base_mega: 65,
            verified_bonus: 6,
            urgency_bonus: 6,
            numeral_bonus: 4,
            emoji_bonus_cap: 5,
            hashtag_bonus_per_tag: 2,
            hashtag_bonus_cap: 6,
            question_bonus: 3,
            cta_bonus: 5,
            media_bonus_cap: 6,
            trending_bonus_per_match: 8,
            trending_bonus_cap: 16,
            creator_data_bonus: 8,
            trending_data_bonus: 4,
            llm_data_bonus: 8,
            llm_weight: 0.45,
            reach_divisor: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingConfig {
    pub topics: Vec<TrendingTopic>,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            topics: default_trending_topics(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_base: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_ms: 20_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LunarCrushConfig {
    pub api_base: String,
    pub timeout_ms: u64,
}

impl Default for LunarCrushConfig {
    fn default() -> Self {
        Self {
            api_base: "https://lunarcrush.com/api4".to_string(),
            timeout_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EstimatorConfig {
    #[serde(default)]
    pub scoring: ScoringParams,
    #[serde(default)]
    pub trending: TrendingConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub lunarcrush: LunarCrushConfig,
}

impl EstimatorConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                EstimatorConfig::default()
            }
        } else {
            EstimatorConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base) = env::var("GEMINI_API_BASE") {
            if !base.trim().is_empty() {
                self.gemini.api_base = base;
            }
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                self.gemini.model = model;
            }
        }
        if let Ok(timeout) = env::var("GEMINI_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.gemini.timeout_ms = value;
            }
        }
        if let Ok(base) = env::var("LUNARCRUSH_API_BASE") {
            if !base.trim().is_empty() {
                self.lunarcrush.api_base = base;
            }
        }
        if let Ok(timeout) = env::var("LUNARCRUSH_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.lunarcrush.timeout_ms = value;
            }
        }
        if let Ok(weight) = env::var("LLM_BLEND_WEIGHT") {
            if let Ok(value) = weight.parse::<f64>() {
                self.scoring.llm_weight = value.clamp(0.0, 1.0);
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("ESTIMATOR_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/estimator.toml")))
}

fn default_trending_topics() -> Vec<TrendingTopic> {
    let seed: [(&str, f64, u64, f64); 6] = [
        ("Bitcoin", 0.62, 412_000, 9.4),
        ("OpenAI", 0.48, 268_000, 6.1),
        ("Champions League", 0.55, 350_000, 11.2),
        ("Climate Change", -0.21, 140_000, 2.7),
        ("Election", -0.33, 520_000, 14.8),
        ("Taylor Swift", 0.71, 610_000, 7.9),
    ];

    seed.iter()
        .map(|(name, sentiment, mentions, change)| TrendingTopic {
            name: name.to_string(),
            sentiment: *sentiment,
            mention_count: *mentions,
            change_percent: *change,
        })
        .collect()
}
