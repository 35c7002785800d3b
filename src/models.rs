use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One review row handed in by the ingestion layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    pub id: usize, // sequence index within the submitted corpus
    pub original_text: String,
    pub metadata: BTreeMap<String, String>, // remaining columns of the source row
}

impl RawItem {
    /// Build the ordered item list from row-maps plus the name of the
    /// column holding review text. Rows with a missing or empty text cell
    /// still produce an item; they classify as zero-confidence neutral
    /// downstream rather than being dropped.
    pub fn from_rows(rows: &[BTreeMap<String, String>], text_column: &str) -> Vec<RawItem> {
        rows.iter()
            .enumerate()
            .map(|(id, row)| {
                let original_text = row.get(text_column).cloned().unwrap_or_default();
                let metadata = row
                    .iter()
                    .filter(|(k, _)| k.as_str() != text_column)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                RawItem {
                    id,
                    original_text,
                    metadata,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiHit {
    pub emoji: String,
    pub count: usize,
    pub sentiment: f64, // table score in [-1, 1]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagHit {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentWordHit {
    pub word: String,
    pub base_score: f64,
    pub position: usize, // token index in the processed text
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntensifierHit {
    pub word: String,
    pub multiplier: f64, // negative multiplier denotes negation
    pub position: usize,
}

/// Signals extracted from a single item's raw text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub original_length: usize,
    pub emojis: Vec<EmojiHit>,
    pub emoticons: Vec<EmojiHit>,
    pub hashtags: Vec<TagHit>,
    pub mentions: Vec<TagHit>,
    pub sentiment_words: Vec<SentimentWordHit>,
    pub intensifiers: Vec<IntensifierHit>,
}

/// An item after feature extraction: the normalized token stream plus its
/// FeatureSet, carried through scoring and vectorization.
#[derive(Debug, Clone)]
pub struct ProcessedItem {
    pub id: usize,
    pub original_text: String,
    pub processed_text: String,
    pub tokens: Vec<String>,
    pub features: FeatureSet,
    pub metadata: BTreeMap<String, String>,
}

/// 7-point ordered sentiment scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    VeryNegative,
    Negative,
    SlightlyNegative,
    Neutral,
    SlightlyPositive,
    Positive,
    VeryPositive,
}

impl SentimentLabel {
    /// Collapse to the 3-category view used by corpus percentages. The
    /// two "slightly" labels fold into their side; only Neutral stays
    /// neutral.
    pub fn simplified(self) -> SimpleSentiment {
        match self {
            SentimentLabel::VeryPositive
            | SentimentLabel::Positive
            | SentimentLabel::SlightlyPositive => SimpleSentiment::Positive,
            SentimentLabel::Neutral => SimpleSentiment::Neutral,
            SentimentLabel::SlightlyNegative
            | SentimentLabel::Negative
            | SentimentLabel::VeryNegative => SimpleSentiment::Negative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleSentiment {
    Positive,
    Neutral,
    Negative,
}

/// Per-signal contribution to a composite score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub lexical: f64,
    pub emoji: f64,
    pub model: Option<f64>, // absent when the external model was disabled or failed
    pub composite: f64,
}

/// Final sentiment verdict for one item. Exactly one per RawItem;
/// `score` and `confidence` are always clamped to their ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentRecord {
    pub item_id: usize,
    pub text: String,
    pub label: SentimentLabel,
    pub score: f64,      // [-1, 1]
    pub confidence: f64, // [0, 1]
    pub breakdown: ScoreBreakdown,
    pub features: FeatureSet,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeKeyword {
    pub word: String,
    pub weight: f64, // summed member TF-IDF
    pub frequency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTheme {
    pub name: String,
    pub keywords: Vec<String>,
    pub member_count: usize,
    pub examples: Vec<String>,
}

/// Percentage split of member sentiment inside one theme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSentimentSplit {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

/// One topical cluster of the corpus. Themes partition the analyzed
/// items: member id sets never overlap across themes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String, // stable hash of the defining terms
    pub name: String,
    pub member_item_ids: Vec<usize>,
    pub size: usize,
    pub percentage: f64, // share of analyzed items
    pub keywords: Vec<ThemeKeyword>,
    pub examples: Vec<String>,
    pub sentiment_net: f64, // (positive - negative) / size, in [-1, 1]
    pub sentiment_distribution: ThemeSentimentSplit,
    pub dominant_sentiment: SimpleSentiment,
    pub average_score: f64,
    pub coherence: f64, // mean pairwise Jaccard of member term sets, [0, 1]
    pub quality: f64,   // display-only heuristic, [0, 100]
    pub emojis: Vec<EmojiHit>,
    pub hashtags: Vec<TagHit>,
    pub mentions: Vec<TagHit>,
    pub sub_themes: Vec<SubTheme>,
}

/// Theme partition plus corpus-level rollups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSet {
    pub themes: Vec<Theme>,
    pub total_themes: usize,
    pub coverage: f64, // percent of analyzed items inside a theme
    pub quality_score: f64,
}

/// Stable output boundary consumed by the rendering/report collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: AnalysisSummary,
    pub sentiments: Vec<SentimentRecord>,
    pub themes: ThemeSet,
    pub metrics: crate::metrics::CorpusMetrics,
    pub insights: Vec<crate::insights::Insight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_reviews: usize,
    pub processed_reviews: usize,
    pub text_column: String,
    pub analysis_date: chrono::DateTime<chrono::Utc>,
    pub processing_ms: u64,
}
