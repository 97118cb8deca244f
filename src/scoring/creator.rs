use crate::config::ScoringParams;
use crate::CreatorProfile;

/// Follower-count bucket used to anchor the base confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatorTier {
    Micro,
    Mid,
    Macro,
    Mega,
}

impl CreatorTier {
    pub fn from_followers(follower_count: u64) -> Self {
        if follower_count > 1_000_000 {
            CreatorTier::Mega
        } else if follower_count > 100_000 {
            CreatorTier::Macro
        } else if follower_count >= 10_000 {
            CreatorTier::Mid
        } else {
            CreatorTier::Micro
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CreatorTier::Micro => "Micro-tier",
            CreatorTier::Mid => "Mid-tier",
            CreatorTier::Macro => "Macro-tier",
            CreatorTier::Mega => "Mega-tier",
        }
    }
}

/// Base confidence: the fallback constant without creator data, otherwise the
/// tier offset. Tier bases must be non-decreasing micro through mega.
pub fn base_confidence(creator: Option<&CreatorProfile>, params: &ScoringParams) -> i64 {
    match creator {
        None => params.base_no_creator,
        Some(profile) => match profile.tier() {
            CreatorTier::Micro => params.tier_base_micro,
            CreatorTier::Mid => params.tier_base_mid,
            CreatorTier::Macro => params.tier_base_macro,
            CreatorTier::Mega => params.tier_base_mega,
        },
    }
}

pub fn verification_bonus(creator: Option<&CreatorProfile>, params: &ScoringParams) -> i64 {
    if creator.map(|profile| profile.verified).unwrap_or(false) {
        params.verified_bonus
    } else {
        0
    }
}

/// Derived 0..1 authority score from follower and engagement magnitudes.
pub fn authority_score(follower_count: u64, engagement_count: u64, verified: bool) -> f64 {
    let follower_part = clamp01((log10_safe(follower_count as f64 + 1.0) - 2.0) / 4.0);
    let engagement_part = clamp01(log10_safe(engagement_count as f64 + 1.0) / 6.0);
    let verified_part = if verified { 1.0 } else { 0.0 };

    clamp01(0.7 * follower_part + 0.2 * engagement_part + 0.1 * verified_part)
}

fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(1.0)
}

fn log10_safe(value: f64) -> f64 {
    if value <= 0.0 {
        0.0
    } else {
        value.log10()
    }
}
