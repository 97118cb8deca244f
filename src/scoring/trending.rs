use crate::config::ScoringParams;
use crate::{PostInput, TrendingTopic};

/// Topics whose name appears in the post text or hashtags, case-insensitive
/// substring match. Results keep the busiest topics first so the top matches
/// surface as key factors.
pub fn matching_topics<'a>(post: &PostInput, topics: &'a [TrendingTopic]) -> Vec<&'a TrendingTopic> {
    let text = post.text.to_lowercase();
    let hashtags: Vec<String> = post
        .hashtags
        .iter()
        .map(|tag| tag.trim_start_matches('#').to_lowercase())
        .collect();

    let mut matched: Vec<&TrendingTopic> = topics
        .iter()
        .filter(|topic| {
            let name = topic.name.to_lowercase();
            if name.is_empty() {
                return false;
            }
            text.contains(&name) || hashtags.iter().any(|tag| tag.contains(&name))
        })
        .collect();

    matched.sort_by(|a, b| b.mention_count.cmp(&a.mention_count));
    matched
}

pub fn alignment_points(match_count: usize, params: &ScoringParams) -> i64 {
    (match_count as i64 * params.trending_bonus_per_match).min(params.trending_bonus_cap)
}
