pub mod config;
pub mod scoring;

use serde::{Deserialize, Serialize};

use crate::config::ScoringParams;
use crate::scoring::blend::{self, merge_key_factors};
use crate::scoring::content::{self, TextFeatures};
use crate::scoring::creator::{self, CreatorTier};
use crate::scoring::trending;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Twitter,
    Instagram,
    Tiktok,
    Linkedin,
    Other,
}

impl Platform {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "twitter" | "x" => Some(Platform::Twitter),
            "instagram" | "ig" => Some(Platform::Instagram),
            "tiktok" => Some(Platform::Tiktok),
            "linkedin" => Some(Platform::Linkedin),
            "other" => Some(Platform::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::Linkedin => "linkedin",
            Platform::Other => "other",
        }
    }

    /// Network segment used by the creator lookup API.
    pub fn network(self) -> &'static str {
        self.label()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Image,
    Video,
    Thread,
    Poll,
}

impl ContentType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "text" | "none" => Some(ContentType::Text),
            "image" | "photo" | "pic" => Some(ContentType::Image),
            "video" | "vid" | "reel" => Some(ContentType::Video),
            "thread" => Some(ContentType::Thread),
            "poll" => Some(ContentType::Poll),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::Thread => "thread",
            ContentType::Poll => "poll",
        }
    }

    /// Richness points relative to a plain text post.
    pub fn richness_points(self) -> i64 {
        match self {
            ContentType::Text => 0,
            ContentType::Image => 2,
            ContentType::Poll => 3,
            ContentType::Thread => 3,
            ContentType::Video => 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostInput {
    pub text: String,
    pub platform: Platform,
    pub content_type: ContentType,
    pub hashtags: Vec<String>,
    pub media_count: u32,
}

impl Default for PostInput {
    fn default() -> Self {
        Self {
            text: String::new(),
            platform: Platform::Twitter,
            content_type: ContentType::Text,
            hashtags: Vec::new(),
            media_count: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfile {
    pub handle: String,
    pub follower_count: u64,
    pub engagement_count: u64,
    pub verified: bool,
    pub authority_score: f64,
}

impl CreatorProfile {
    pub fn new(handle: String, follower_count: u64, engagement_count: u64, verified: bool) -> Self {
        let authority_score = creator::authority_score(follower_count, engagement_count, verified);
        Self {
            handle,
            follower_count,
            engagement_count,
            verified,
            authority_score,
        }
    }

    pub fn tier(&self) -> CreatorTier {
        CreatorTier::from_followers(self.follower_count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub name: String,
    pub sentiment: f64,
    pub mention_count: u64,
    pub change_percent: f64,
}

/// Normalized form of a free-text LLM analysis. Fields are `None` when the
/// response did not contain a usable number for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmAnalysis {
    pub viral_probability: Option<u8>,
    pub confidence: Option<u8>,
    pub key_factors: Vec<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmTrace {
    pub model: String,
    pub latency_ms: u128,
    pub prompt: String,
    pub raw_response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    UltraHigh,
    High,
    Moderate,
    Low,
}

impl Category {
    pub fn from_probability(probability: u8) -> Self {
        if probability >= 75 {
            Category::UltraHigh
        } else if probability >= 60 {
            Category::High
        } else if probability >= 40 {
            Category::Moderate
        } else {
            Category::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::UltraHigh => "Ultra High",
            Category::High => "High",
            Category::Moderate => "Moderate",
            Category::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    Heuristic,
    Blended,
}

impl AnalysisSource {
    pub fn label(self) -> &'static str {
        match self {
            AnalysisSource::Heuristic => "heuristic",
            AnalysisSource::Blended => "blended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub viral_probability: u8,
    pub confidence: u8,
    pub category: Category,
    pub expected_reach: Option<u64>,
    pub key_factors: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub source: AnalysisSource,
}

/// Estimate with the on-disk config and its default trending table, no LLM.
pub fn estimate_with_defaults(post: &PostInput, creator: Option<&CreatorProfile>) -> ScoreResult {
    let config = config::EstimatorConfig::load(None)
        .map(|(config, _)| config)
        .unwrap_or_default();
    estimate(
        post,
        creator,
        Some(&config.trending.topics),
        None,
        &config.scoring,
    )
}

/// Pure, single-shot viral probability estimate. Deterministic over its
/// inputs; never touches the network.
pub fn estimate(
    post: &PostInput,
    creator: Option<&CreatorProfile>,
    trending: Option<&[TrendingTopic]>,
    llm: Option<&LlmAnalysis>,
    params: &ScoringParams,
) -> ScoreResult {
    let features = content::extract_text_features(&post.text);
    let signal_points = content::signal_points(post, &features, params);

    let base = creator::base_confidence(creator, params);
    let verification_points = creator::verification_bonus(creator, params);

    let matched_topics = trending
        .map(|topics| trending::matching_topics(post, topics))
        .unwrap_or_default();
    let trending_points = trending::alignment_points(matched_topics.len(), params);

    let rule_probability =
        clamp_score(base + signal_points + trending_points + verification_points);

    // Confidence tracks data coverage, not content strength.
    let mut confidence_raw = base;
    if creator.is_some() {
        confidence_raw += params.creator_data_bonus;
    }
    if trending.map(|topics| !topics.is_empty()).unwrap_or(false) {
        confidence_raw += params.trending_data_bonus;
    }

    let mut key_factors = build_key_factors(post, creator, &features, &matched_topics, params);

    let mut viral_probability = rule_probability;
    let mut source = AnalysisSource::Heuristic;

    if let Some(analysis) = llm {
        if let Some(llm_probability) = analysis.viral_probability {
            viral_probability =
                blend::blend_score(rule_probability, llm_probability, params.llm_weight);
            confidence_raw = match analysis.confidence {
                Some(llm_confidence) => i64::from(blend::blend_score(
                    clamp_score(confidence_raw),
                    llm_confidence,
                    params.llm_weight,
                )),
                None => confidence_raw + params.llm_data_bonus,
            };
            source = AnalysisSource::Blended;
        }
        merge_key_factors(&mut key_factors, &analysis.key_factors);
    }

    let confidence = clamp_score(confidence_raw);
    let category = Category::from_probability(viral_probability);
    let expected_reach = creator.map(|profile| {
        let factor = f64::from(viral_probability) / params.reach_divisor;
        (profile.follower_count as f64 * factor).round() as u64
    });

    let recommendations =
        build_recommendations(post, &features, &matched_topics, trending.is_some());

    ScoreResult {
        viral_probability,
        confidence,
        category,
        expected_reach,
        key_factors,
        recommendations,
        source,
    }
}

fn build_key_factors(
    post: &PostInput,
    creator: Option<&CreatorProfile>,
    features: &TextFeatures,
    matched_topics: &[&TrendingTopic],
    params: &ScoringParams,
) -> Vec<String> {
    let mut factors = Vec::new();

    match creator {
        Some(profile) => {
            factors.push(format!(
                "{} creator ({} followers)",
                profile.tier().label(),
                format_number(profile.follower_count as f64)
            ));
            if profile.verified {
                factors.push("Verified creator".to_string());
            }
        }
        None => factors.push("No creator data; baseline estimate".to_string()),
    }

    if features.urgency_hits > 0 {
        factors.push("Urgency language".to_string());
    }
    if features.digit_count > 0 {
        factors.push("Concrete numbers".to_string());
    }
    if features.emoji_count > 0 {
        factors.push("Emoji usage".to_string());
    }
    let hashtag_total = post.hashtags.len() + features.inline_hashtags;
    if hashtag_total > 0 {
        factors.push(format!("{} hashtags", hashtag_total));
    }
    if features.question_marks > 0 {
        factors.push("Asks a question".to_string());
    }
    if features.has_cta {
        factors.push("Call to action".to_string());
    }
    if content::media_points(post, params) > 0 {
        factors.push(format!("Rich media ({})", post.content_type.label()));
    }

    for topic in matched_topics.iter().take(3) {
        factors.push(format!("Trending alignment: {}", topic.name));
    }

    factors
}

fn build_recommendations(
    post: &PostInput,
    features: &TextFeatures,
    matched_topics: &[&TrendingTopic],
    trending_supplied: bool,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let mut push = |title: &str, description: &str| {
        recommendations.push(Recommendation {
            title: title.to_string(),
            description: description.to_string(),
        });
    };

    if features.char_count < 50 || features.word_count < 8 {
        push(
            "Add context",
            "Very short posts rarely carry a hook; aim for 80-200 characters.",
        );
    }
    if features.char_count > 280 {
        push(
            "Tighten the copy",
            "Trim to under ~280 characters so the first screen carries the message.",
        );
    }
    let hashtag_total = post.hashtags.len() + features.inline_hashtags;
    if hashtag_total == 0 {
        push(
            "Add a hashtag",
            "One or two relevant hashtags widen discovery without looking spammy.",
        );
    }
    if hashtag_total > 5 {
        push(
            "Trim hashtags",
            "More than five hashtags reads as spam and suppresses engagement.",
        );
    }
    if features.question_marks == 0 {
        push(
            "Invite replies",
            "A direct question gives readers an easy way to respond.",
        );
    }
    if !features.has_cta {
        push(
            "Add a call to action",
            "Asking readers to share or weigh in lifts amplification.",
        );
    }
    if post.media_count == 0 && post.content_type == ContentType::Text {
        push(
            "Attach media",
            "An image or short video raises dwell time and share intent.",
        );
    }
    if trending_supplied && matched_topics.is_empty() {
        push(
            "Tap a trending topic",
            "Referencing a topic people already follow boosts early velocity.",
        );
    }
    if features.uppercase_ratio > 0.3 {
        push(
            "Ease off ALL CAPS",
            "Heavy capitalization reads as shouting and invites mutes.",
        );
    }
    if features.urgency_hits == 0 {
        push(
            "Add timeliness",
            "Words that anchor the post to right now make it feel urgent to share.",
        );
    }

    recommendations.truncate(8);
    recommendations
}

pub fn clamp_score(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// Stable fingerprint of a post draft, used to correlate repeat estimates of
/// the same text across requests.
pub fn post_fingerprint(text: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    format!("post_{:x}", u64::from_be_bytes(bytes))
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}
