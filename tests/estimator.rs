use viralcast::config::ScoringParams;
use viralcast::scoring::{blend_score, parse_analysis_text};
use viralcast::{
    estimate, AnalysisSource, Category, ContentType, CreatorProfile, LlmAnalysis, PostInput,
    TrendingTopic,
};

fn params() -> ScoringParams {
    ScoringParams::default()
}

fn post(text: &str) -> PostInput {
    let mut input = PostInput::default();
    input.text = text.to_string();
    input
}

fn creator(followers: u64, verified: bool) -> CreatorProfile {
    CreatorProfile::new("tester".to_string(), followers, 1_200, verified)
}

fn topic(name: &str) -> TrendingTopic {
    TrendingTopic {
        name: name.to_string(),
        sentiment: 0.5,
        mention_count: 100_000,
        change_percent: 4.2,
    }
}

#[test]
fn scores_stay_in_bounds_for_maxed_input() {
    let mut input = post(
        "🚀🔥💥 BREAKING: 5 facts just dropped today! What do you think? Retweet and share now! #viral #facts",
    );
    input.content_type = ContentType::Video;
    input.media_count = 4;
    input.hashtags = vec!["crypto".to_string(), "news".to_string()];

    let mega = creator(5_000_000, true);
    let topics = vec![topic("Bitcoin"), topic("facts"), topic("crypto")];
    let result = estimate(&input, Some(&mega), Some(&topics), None, &params());

    assert!(result.viral_probability <= 100);
    assert!(result.confidence <= 100);
    assert_eq!(result.category, Category::UltraHigh);
}

#[test]
fn empty_text_still_yields_bounded_scores() {
    let result = estimate(&post(""), None, None, None, &params());
    assert!(result.viral_probability <= 100);
    assert!(result.confidence <= 100);
    assert_eq!(result.category, Category::Low);
}

#[test]
fn category_thresholds_are_exact() {
    assert_eq!(Category::from_probability(100), Category::UltraHigh);
    assert_eq!(Category::from_probability(75), Category::UltraHigh);
    assert_eq!(Category::from_probability(74), Category::High);
    assert_eq!(Category::from_probability(60), Category::High);
    assert_eq!(Category::from_probability(59), Category::Moderate);
    assert_eq!(Category::from_probability(40), Category::Moderate);
    assert_eq!(Category::from_probability(39), Category::Low);
    assert_eq!(Category::from_probability(0), Category::Low);
}

#[test]
fn category_is_monotonic_in_probability() {
    let mut previous = Category::from_probability(0);
    let rank = |category: Category| match category {
        Category::Low => 0,
        Category::Moderate => 1,
        Category::High => 2,
        Category::UltraHigh => 3,
    };
    for probability in 0..=100u8 {
        let current = Category::from_probability(probability);
        assert!(rank(current) >= rank(previous));
        previous = current;
    }
}

#[test]
fn estimate_is_deterministic_without_llm() {
    let input = post("Shipping a new release today! #rustlang");
    let profile = creator(42_000, false);
    let topics = vec![topic("Rustlang")];

    let first = estimate(&input, Some(&profile), Some(&topics), None, &params());
    let second = estimate(&input, Some(&profile), Some(&topics), None, &params());

    assert_eq!(first.viral_probability, second.viral_probability);
    assert_eq!(first.confidence, second.confidence);
    assert_eq!(first.key_factors, second.key_factors);
    assert_eq!(first.expected_reach, second.expected_reach);
}

#[test]
fn missing_creator_data_anchors_confidence_at_fallback_base() {
    let result = estimate(&post("Good morning"), None, None, None, &params());

    assert_eq!(i64::from(result.confidence), params().base_no_creator);
    assert!(result.confidence >= 20 && result.confidence <= 50);
    assert!(result.expected_reach.is_none());
    assert!(result
        .key_factors
        .iter()
        .any(|factor| factor.contains("No creator data")));
}

#[test]
fn default_entry_point_matches_explicit_default_config() {
    let config = viralcast::config::EstimatorConfig::default();
    let input = post("Morning thoughts on shipping software");

    let via_defaults = viralcast::estimate_with_defaults(&input, None);
    let explicit = estimate(
        &input,
        None,
        Some(&config.trending.topics),
        None,
        &config.scoring,
    );

    assert_eq!(via_defaults.viral_probability, explicit.viral_probability);
    assert_eq!(via_defaults.confidence, explicit.confidence);
}

#[test]
fn fallback_example_with_default_trending_stays_in_documented_range() {
    let config = viralcast::config::EstimatorConfig::default();
    let result = estimate(
        &post("Good morning"),
        None,
        Some(&config.trending.topics),
        None,
        &config.scoring,
    );

    assert!(result.confidence >= 20 && result.confidence <= 50);
}

#[test]
fn mid_tier_example_stays_in_documented_range() {
    let config = viralcast::config::EstimatorConfig::default();
    let profile = creator(75_000, false);
    let result = estimate(
        &post("🚀 Bitcoin just hit $100K!"),
        Some(&profile),
        Some(&config.trending.topics),
        None,
        &config.scoring,
    );

    assert!(result.confidence >= 40 && result.confidence <= 70);
    assert!(result.viral_probability > 50);
}

#[test]
fn tier_bases_are_monotonically_non_decreasing() {
    let input = post("Same post for every tier");
    let tiers = [5_000u64, 50_000, 500_000, 5_000_000];

    let mut last_probability = 0u8;
    let mut last_confidence = 0u8;
    for followers in tiers {
        let profile = creator(followers, false);
        let result = estimate(&input, Some(&profile), None, None, &params());
        assert!(result.viral_probability >= last_probability);
        assert!(result.confidence >= last_confidence);
        last_probability = result.viral_probability;
        last_confidence = result.confidence;
    }
}

#[test]
fn verification_adds_fixed_bonus() {
    let input = post("Launching our new product");
    let unverified = estimate(&input, Some(&creator(50_000, false)), None, None, &params());
    let verified = estimate(&input, Some(&creator(50_000, true)), None, None, &params());

    let expected =
        i64::from(unverified.viral_probability) + params().verified_bonus;
    assert_eq!(i64::from(verified.viral_probability), expected);
}

#[test]
fn trending_alignment_raises_probability() {
    let topics = vec![topic("Bitcoin")];
    let aligned = estimate(
        &post("Bitcoin is moving fast"),
        None,
        Some(&topics),
        None,
        &params(),
    );
    let unaligned = estimate(
        &post("My cat is moving fast"),
        None,
        Some(&topics),
        None,
        &params(),
    );

    assert!(aligned.viral_probability > unaligned.viral_probability);
    assert!(aligned
        .key_factors
        .iter()
        .any(|factor| factor.contains("Trending alignment: Bitcoin")));
}

#[test]
fn trending_matches_hashtags_case_insensitively() {
    let topics = vec![topic("OpenAI")];
    let mut input = post("big model news");
    input.hashtags = vec!["#openai".to_string()];

    let result = estimate(&input, None, Some(&topics), None, &params());
    assert!(result
        .key_factors
        .iter()
        .any(|factor| factor.contains("Trending alignment: OpenAI")));
}

#[test]
fn expected_reach_scales_with_followers_and_probability() {
    let profile = creator(75_000, false);
    let result = estimate(&post("Quick update"), Some(&profile), None, None, &params());

    let expected =
        (75_000.0 * f64::from(result.viral_probability) / params().reach_divisor).round() as u64;
    assert_eq!(result.expected_reach, Some(expected));
}

#[test]
fn blend_is_a_weighted_average() {
    assert_eq!(blend_score(40, 90, 0.45), 63);
    assert_eq!(blend_score(40, 90, 0.0), 40);
    assert_eq!(blend_score(40, 90, 1.0), 90);
    // Out-of-range weights clamp instead of extrapolating.
    assert_eq!(blend_score(40, 90, 7.0), 90);
}

#[test]
fn llm_analysis_blends_and_marks_source() {
    let analysis = LlmAnalysis {
        viral_probability: Some(90),
        confidence: Some(80),
        key_factors: vec!["Strong emotional hook".to_string()],
        summary: None,
    };
    let rule_only = estimate(&post("A modest update"), None, None, None, &params());
    let blended = estimate(&post("A modest update"), None, None, Some(&analysis), &params());

    assert_eq!(rule_only.source, AnalysisSource::Heuristic);
    assert_eq!(blended.source, AnalysisSource::Blended);
    assert!(blended.viral_probability > rule_only.viral_probability);
    assert!(blended.viral_probability < 90);
    assert!(blended
        .key_factors
        .iter()
        .any(|factor| factor == "Strong emotional hook"));
}

#[test]
fn llm_analysis_without_numbers_keeps_rule_based_path() {
    let analysis = LlmAnalysis {
        viral_probability: None,
        confidence: None,
        key_factors: vec!["Niche appeal".to_string()],
        summary: Some("hard to say".to_string()),
    };
    let rule_only = estimate(&post("A modest update"), None, None, None, &params());
    let with_llm = estimate(&post("A modest update"), None, None, Some(&analysis), &params());

    assert_eq!(with_llm.source, AnalysisSource::Heuristic);
    assert_eq!(with_llm.viral_probability, rule_only.viral_probability);
    assert_eq!(with_llm.confidence, rule_only.confidence);
    // Factors still merge even when no numbers were usable.
    assert!(with_llm.key_factors.iter().any(|factor| factor == "Niche appeal"));
}

#[test]
fn parses_clean_json_response() {
    let analysis = parse_analysis_text(
        r#"{"viral_probability": 72, "confidence": 64, "key_factors": ["Timely topic"], "summary": "Solid post."}"#,
    );

    assert_eq!(analysis.viral_probability, Some(72));
    assert_eq!(analysis.confidence, Some(64));
    assert_eq!(analysis.key_factors, vec!["Timely topic".to_string()]);
    assert_eq!(analysis.summary, Some("Solid post.".to_string()));
}

#[test]
fn parses_json_wrapped_in_markdown_and_prose() {
    let analysis = parse_analysis_text(
        "Here is my assessment:\n```json\n{\"viralProbability\": 0.58, \"confidence\": \"61\"}\n```\nHope that helps!",
    );

    assert_eq!(analysis.viral_probability, Some(58));
    assert_eq!(analysis.confidence, Some(61));
}

#[test]
fn extracts_numbers_from_free_text_when_json_is_missing() {
    let analysis = parse_analysis_text(
        "I'd put the viral probability around 68% for this one. Confidence: 55 out of 100.",
    );

    assert_eq!(analysis.viral_probability, Some(68));
    assert_eq!(analysis.confidence, Some(55));
}

#[test]
fn malformed_llm_text_never_fails() {
    let garbage = parse_analysis_text("}{ not json at all ###");
    assert_eq!(garbage.viral_probability, None);
    assert_eq!(garbage.confidence, None);
    assert!(garbage.key_factors.is_empty());

    // Feeding the empty analysis through the estimator is a no-op.
    let result = estimate(&post("hello world"), None, None, Some(&garbage), &params());
    assert_eq!(result.source, AnalysisSource::Heuristic);
}

#[test]
fn out_of_range_llm_numbers_are_clamped() {
    let analysis = parse_analysis_text(r#"{"viral_probability": 150, "confidence": 120}"#);
    assert_eq!(analysis.viral_probability, Some(100));
    assert_eq!(analysis.confidence, Some(100));
}
