use crate::config::ScoringParams;
use crate::PostInput;

#[derive(Debug, Clone)]
pub struct TextFeatures {
    pub char_count: usize,
    pub word_count: usize,
    pub inline_hashtags: usize,
    pub question_marks: usize,
    pub exclamations: usize,
    pub emoji_count: usize,
    pub digit_count: usize,
    pub uppercase_ratio: f64,
    pub urgency_hits: usize,
    pub has_cta: bool,
}

pub fn extract_text_features(text: &str) -> TextFeatures {
    let mut inline_hashtags = 0usize;
    let mut question_marks = 0usize;
    let mut exclamations = 0usize;
    let mut emoji_count = 0usize;
    let mut digit_count = 0usize;
    let mut uppercase = 0usize;
    let mut letters = 0usize;

    for ch in text.chars() {
        match ch {
            '#' => inline_hashtags += 1,
            '?' => question_marks += 1,
            '!' => exclamations += 1,
            _ => {
                if ch as u32 > 0x7f {
                    emoji_count += 1;
                }
            }
        }

        if ch.is_ascii_digit() {
            digit_count += 1;
        }
        if ch.is_ascii_alphabetic() {
            letters += 1;
            if ch.is_ascii_uppercase() {
                uppercase += 1;
            }
        }
    }

    let uppercase_ratio = if letters == 0 {
        0.0
    } else {
        uppercase as f64 / letters as f64
    };

    let lowercase = text.to_lowercase();
    let urgency_words = [
        "breaking", "urgent", "alert", "just", "now", "today", "live", "finally", "hurry",
        "last chance",
    ];
    // Repeated exclamation marks read as urgency even without the vocabulary.
    let urgency_hits = urgency_words
        .iter()
        .filter(|word| lowercase.contains(*word))
        .count()
        + usize::from(exclamations >= 2);

    let cta_phrases = [
        "retweet", "repost", "share", "follow", "comment", "tag a", "link in bio",
        "what do you think", "thoughts", "drop a", "let me know",
    ];
    let has_cta = cta_phrases.iter().any(|phrase| lowercase.contains(phrase));

    TextFeatures {
        char_count: text.chars().count(),
        word_count: text.split_whitespace().count(),
        inline_hashtags,
        question_marks,
        exclamations,
        emoji_count,
        digit_count,
        uppercase_ratio,
        urgency_hits,
        has_cta,
    }
}

/// Content-signal contribution: each signal adds a small fixed or capped
/// increment on top of the creator base.
pub fn signal_points(post: &PostInput, features: &TextFeatures, params: &ScoringParams) -> i64 {
    let mut points = 0i64;

    if features.urgency_hits > 0 {
        points += params.urgency_bonus;
    }
    if features.digit_count > 0 {
        points += params.numeral_bonus;
    }
    points += (features.emoji_count as i64).min(params.emoji_bonus_cap);

    let hashtag_total = (post.hashtags.len() + features.inline_hashtags) as i64;
    points += (hashtag_total * params.hashtag_bonus_per_tag).min(params.hashtag_bonus_cap);

    if features.question_marks > 0 {
        points += params.question_bonus;
    }
    if features.has_cta {
        points += params.cta_bonus;
    }

    points += media_points(post, params);

    points
}

pub fn media_points(post: &PostInput, params: &ScoringParams) -> i64 {
    let attachment_points = i64::from(post.media_count.min(2));
    (post.content_type.richness_points() + attachment_points).min(params.media_bonus_cap)
}
