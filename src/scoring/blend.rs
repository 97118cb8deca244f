use serde::Deserialize;
use std::collections::HashSet;

use crate::{clamp_score, LlmAnalysis};

const MAX_KEY_FACTORS: usize = 10;

/// Raw shape of the JSON object the model is prompted to return. Aliases cover
/// the spellings seen in real responses.
#[derive(Deserialize)]
struct RawAnalysis {
    #[serde(
        default,
        alias = "viralProbability",
        alias = "probability",
        alias = "score"
    )]
    viral_probability: Option<serde_json::Value>,
    #[serde(default)]
    confidence: Option<serde_json::Value>,
    #[serde(default, alias = "keyFactors", alias = "factors")]
    key_factors: Vec<String>,
    #[serde(default, alias = "reasoning")]
    summary: Option<String>,
}

/// Normalize a free-text LLM response into an `LlmAnalysis`. Never fails: a
/// response with no embedded JSON falls back to keyword-anchored number
/// extraction, and a response with nothing usable yields empty fields, which
/// the estimator treats as "keep the rule-based numbers".
pub fn parse_analysis_text(text: &str) -> LlmAnalysis {
    if let Some(json) = extract_json(text) {
        if let Ok(raw) = serde_json::from_str::<RawAnalysis>(&json) {
            return LlmAnalysis {
                viral_probability: raw.viral_probability.as_ref().and_then(coerce_score),
                confidence: raw.confidence.as_ref().and_then(coerce_score),
                key_factors: raw
                    .key_factors
                    .into_iter()
                    .map(|factor| factor.trim().to_string())
                    .filter(|factor| !factor.is_empty())
                    .take(6)
                    .collect(),
                summary: raw
                    .summary
                    .map(|summary| summary.trim().to_string())
                    .filter(|summary| !summary.is_empty()),
            };
        }
    }

    LlmAnalysis {
        viral_probability: scan_metric(text, &["viral probability", "probability", "viral score"]),
        confidence: scan_metric(text, &["confidence"]),
        key_factors: Vec::new(),
        summary: None,
    }
}

/// Weighted average of the rule-based and LLM scores, clamped to [0,100].
pub fn blend_score(rule: u8, llm: u8, weight: f64) -> u8 {
    let weight = if weight.is_nan() {
        0.0
    } else {
        weight.clamp(0.0, 1.0)
    };
    let blended = f64::from(rule) * (1.0 - weight) + f64::from(llm) * weight;
    clamp_score(blended.round() as i64)
}

pub fn merge_key_factors(base: &mut Vec<String>, extras: &[String]) {
    let mut seen: HashSet<String> = base.iter().map(|factor| normalize_text(factor)).collect();
    for factor in extras {
        let normalized = normalize_text(factor);
        if normalized.is_empty() || seen.contains(&normalized) {
            continue;
        }
        base.push(factor.clone());
        seen.insert(normalized);
    }
    if base.len() > MAX_KEY_FACTORS {
        base.truncate(MAX_KEY_FACTORS);
    }
}

fn extract_json(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    Some(text[start..=end].to_string())
}

/// Accepts numbers, fractional scores (0.72 -> 72), and numeric strings.
fn coerce_score(value: &serde_json::Value) -> Option<u8> {
    let number = match value {
        serde_json::Value::Number(number) => number.as_f64()?,
        serde_json::Value::String(text) => first_number(text)?,
        _ => return None,
    };
    normalize_number(number)
}

/// Keyword-anchored extraction: the first number within a short window after
/// any of the anchors, case-insensitive.
fn scan_metric(text: &str, anchors: &[&str]) -> Option<u8> {
    let lowercase = text.to_lowercase();
    for anchor in anchors {
        if let Some(position) = lowercase.find(anchor) {
            let window: String = lowercase[position + anchor.len()..].chars().take(24).collect();
            if let Some(number) = first_number(&window) {
                return normalize_number(number);
            }
        }
    }
    None
}

fn first_number(text: &str) -> Option<f64> {
    let mut token = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() || (ch == '.' && !token.is_empty()) {
            token.push(ch);
        } else if !token.is_empty() {
            break;
        }
    }
    token.trim_end_matches('.').parse::<f64>().ok()
}

fn normalize_number(number: f64) -> Option<u8> {
    if number.is_nan() || number < 0.0 {
        return None;
    }
    let scaled = if number <= 1.0 { number * 100.0 } else { number };
    Some(clamp_score(scaled.round() as i64))
}

fn normalize_text(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
