pub mod blend;
pub mod content;
pub mod creator;
pub mod trending;

pub use blend::{blend_score, merge_key_factors, parse_analysis_text};
pub use content::{extract_text_features, signal_points, TextFeatures};
pub use creator::{authority_score, CreatorTier};
pub use trending::{alignment_points, matching_topics};
