//! Corpus-level statistical summarization: sentiment distributions,
//! thematic diversity/concentration, polarization, and the composite
//! quality/health scores.
//!
//! The quality-score rules are policy thresholds, not derived
//! quantities; they are kept exactly as calibrated.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{SentimentRecord, SimpleSentiment, ThemeSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryValues {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentMetrics {
    pub total: usize,
    pub counts: CategoryCounts,
    pub percentages: CategoryValues,
    /// Mean score of positive rows, mean |score| of negative rows; the
    /// neutral slot reports mean confidence since neutral rows carry no
    /// magnitude.
    pub average_scores: CategoryValues,
    pub global_score: f64,
    pub avg_confidence: f64,
    pub sentiment_net: f64, // (positive - negative) / total
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeBucket {
    pub range: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionMetrics {
    pub score_ranges: Vec<RangeBucket>,
    pub confidence_ranges: Vec<RangeBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeShare {
    pub name: String,
    pub size: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeMetrics {
    pub total_themes: usize,
    pub total_texts: usize,
    pub average_theme_size: f64,
    pub shares: Vec<ThemeShare>,
    pub dominant_theme: Option<ThemeShare>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub average_confidence: f64,
    pub high_confidence_percentage: f64, // confidence >= 0.7
    pub low_confidence_percentage: f64,  // confidence < 0.5
    pub average_text_length: f64,
    pub short_texts_percentage: f64, // original text < 20 chars
    /// Data-health heuristic in [0, 100]: 70% confidence, 30% text
    /// length adequacy.
    pub data_health: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    pub sentiment: String,
    pub diversity: String,
    pub polarization: String,
    pub quality: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusMetrics {
    pub sentiment: SentimentMetrics,
    pub themes: ThemeMetrics,
    pub distribution: DistributionMetrics,
    pub quality: QualityMetrics,
    /// Shannon entropy (log2) of the theme-size distribution.
    pub diversity: f64,
    /// Herfindahl index: sum of squared theme shares.
    pub concentration: f64,
    /// Standard deviation of the per-item scores.
    pub polarization: f64,
    /// Bounded [0, 100] corpus quality heuristic.
    pub quality_score: f64,
    pub interpretation: Interpretation,
}

/// `-Σ p·log2(p)` over the probability slots; zero-probability slots
/// contribute nothing.
pub fn shannon_entropy(probabilities: &[f64]) -> f64 {
    -probabilities
        .iter()
        .filter(|p| **p > 0.0)
        .map(|p| p * p.log2())
        .sum::<f64>()
}

/// Sum of squared shares.
pub fn herfindahl(probabilities: &[f64]) -> f64 {
    probabilities.iter().map(|p| p * p).sum()
}

pub fn std_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        0.0
    } else {
        collected.iter().sum::<f64>() / collected.len() as f64
    }
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn sentiment_metrics(records: &[SentimentRecord]) -> SentimentMetrics {
    let total = records.len();
    let mut counts = CategoryCounts::default();
    for r in records {
        match r.label.simplified() {
            SimpleSentiment::Positive => counts.positive += 1,
            SimpleSentiment::Negative => counts.negative += 1,
            SimpleSentiment::Neutral => counts.neutral += 1,
        }
    }

    let average_scores = CategoryValues {
        positive: mean(
            records
                .iter()
                .filter(|r| r.label.simplified() == SimpleSentiment::Positive)
                .map(|r| r.score),
        ),
        negative: mean(
            records
                .iter()
                .filter(|r| r.label.simplified() == SimpleSentiment::Negative)
                .map(|r| r.score.abs()),
        ),
        neutral: mean(
            records
                .iter()
                .filter(|r| r.label.simplified() == SimpleSentiment::Neutral)
                .map(|r| r.confidence),
        ),
    };

    let global_score = mean(records.iter().map(|r| r.score));
    let avg_confidence = mean(records.iter().map(|r| r.confidence));
    let sentiment_net = if total == 0 {
        0.0
    } else {
        (counts.positive as f64 - counts.negative as f64) / total as f64
    };

    SentimentMetrics {
        total,
        percentages: CategoryValues {
            positive: pct(counts.positive, total),
            negative: pct(counts.negative, total),
            neutral: pct(counts.neutral, total),
        },
        counts,
        average_scores,
        global_score,
        avg_confidence,
        sentiment_net,
        interpretation: interpret_sentiment(global_score).to_string(),
    }
}

fn distribution_metrics(records: &[SentimentRecord]) -> DistributionMetrics {
    let total = records.len();

    let score_buckets: [(&str, f64); 7] = [
        ("very positive (0.7..1.0)", 0.7),
        ("positive (0.3..0.7)", 0.3),
        ("slightly positive (0.1..0.3)", 0.1),
        ("neutral (-0.1..0.1)", -0.1),
        ("slightly negative (-0.3..-0.1)", -0.3),
        ("negative (-0.7..-0.3)", -0.7),
        ("very negative (-1.0..-0.7)", f64::NEG_INFINITY),
    ];
    let mut score_counts = [0usize; 7];
    for r in records {
        let idx = score_buckets
            .iter()
            .position(|(_, floor)| r.score >= *floor)
            .unwrap_or(6);
        score_counts[idx] += 1;
    }

    let confidence_buckets: [(&str, f64); 5] = [
        ("very high (0.9..1.0)", 0.9),
        ("high (0.7..0.9)", 0.7),
        ("medium (0.5..0.7)", 0.5),
        ("low (0.3..0.5)", 0.3),
        ("very low (0.0..0.3)", f64::NEG_INFINITY),
    ];
    let mut confidence_counts = [0usize; 5];
    for r in records {
        let idx = confidence_buckets
            .iter()
            .position(|(_, floor)| r.confidence >= *floor)
            .unwrap_or(4);
        confidence_counts[idx] += 1;
    }

    DistributionMetrics {
        score_ranges: score_buckets
            .iter()
            .zip(score_counts)
            .map(|((range, _), count)| RangeBucket {
                range: range.to_string(),
                count,
                percentage: pct(count, total),
            })
            .collect(),
        confidence_ranges: confidence_buckets
            .iter()
            .zip(confidence_counts)
            .map(|((range, _), count)| RangeBucket {
                range: range.to_string(),
                count,
                percentage: pct(count, total),
            })
            .collect(),
    }
}

fn theme_metrics(themes: &ThemeSet) -> ThemeMetrics {
    let total_texts: usize = themes.themes.iter().map(|t| t.size).sum();
    let shares: Vec<ThemeShare> = themes
        .themes
        .iter()
        .map(|t| ThemeShare {
            name: t.name.clone(),
            size: t.size,
            percentage: pct(t.size, total_texts),
        })
        .collect();

    ThemeMetrics {
        total_themes: themes.total_themes,
        total_texts,
        average_theme_size: if themes.themes.is_empty() {
            0.0
        } else {
            total_texts as f64 / themes.themes.len() as f64
        },
        dominant_theme: shares.first().cloned(),
        shares,
    }
}

fn quality_metrics(records: &[SentimentRecord]) -> QualityMetrics {
    let total = records.len();
    let average_confidence = mean(records.iter().map(|r| r.confidence));
    let high = records.iter().filter(|r| r.confidence >= 0.7).count();
    let low = records.iter().filter(|r| r.confidence < 0.5).count();
    let short = records
        .iter()
        .filter(|r| r.text.chars().count() < 20)
        .count();
    let short_ratio = if total == 0 {
        0.0
    } else {
        short as f64 / total as f64
    };

    QualityMetrics {
        average_confidence,
        high_confidence_percentage: pct(high, total),
        low_confidence_percentage: pct(low, total),
        average_text_length: mean(records.iter().map(|r| r.text.chars().count() as f64)),
        short_texts_percentage: short_ratio * 100.0,
        data_health: average_confidence * 70.0 + (1.0 - short_ratio) * 30.0,
    }
}

/// Corpus quality heuristic. Fixed additive/subtractive policy rules,
/// clamped to [0, 100].
fn corpus_quality_score(
    avg_confidence: f64,
    total_themes: usize,
    entropy: f64,
    polarization: f64,
) -> f64 {
    let mut score: f64 = 50.0;
    if avg_confidence > 0.7 {
        score += 20.0;
    }
    if avg_confidence < 0.5 {
        score -= 15.0;
    }
    if total_themes > 3 {
        score += 10.0;
    }
    if entropy > 2.0 {
        score += 10.0;
    }
    if polarization < 0.3 {
        score += 10.0;
    }
    if polarization > 0.7 {
        score -= 10.0;
    }
    score.clamp(0.0, 100.0)
}

fn interpret_sentiment(score: f64) -> &'static str {
    if score > 0.3 {
        "very positive"
    } else if score > 0.1 {
        "positive"
    } else if score > -0.1 {
        "neutral"
    } else if score > -0.3 {
        "negative"
    } else {
        "very negative"
    }
}

fn interpret_diversity(entropy: f64) -> &'static str {
    if entropy > 2.5 {
        "very diverse"
    } else if entropy > 2.0 {
        "diverse"
    } else if entropy > 1.5 {
        "moderately diverse"
    } else {
        "low diversity"
    }
}

fn interpret_polarization(polarization: f64) -> &'static str {
    if polarization > 0.6 {
        "highly polarized"
    } else if polarization > 0.4 {
        "polarized"
    } else if polarization > 0.2 {
        "moderately polarized"
    } else {
        "low polarization"
    }
}

fn interpret_quality(quality: f64) -> &'static str {
    if quality > 80.0 {
        "excellent"
    } else if quality > 60.0 {
        "good"
    } else if quality > 40.0 {
        "average"
    } else {
        "poor"
    }
}

/// Compute the full metrics record for one analysis run. Computed once,
/// never mutated afterward.
pub fn aggregate(records: &[SentimentRecord], themes: &ThemeSet) -> CorpusMetrics {
    let sentiment = sentiment_metrics(records);
    let theme_block = theme_metrics(themes);
    let distribution = distribution_metrics(records);
    let quality = quality_metrics(records);

    let total_texts: f64 = theme_block.total_texts as f64;
    let probabilities: Vec<f64> = if total_texts > 0.0 {
        themes
            .themes
            .iter()
            .map(|t| t.size as f64 / total_texts)
            .collect()
    } else {
        Vec::new()
    };
    let diversity = shannon_entropy(&probabilities);
    let concentration = herfindahl(&probabilities);

    let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
    let polarization = std_deviation(&scores);

    let quality_score = corpus_quality_score(
        sentiment.avg_confidence,
        theme_block.total_themes,
        diversity,
        polarization,
    );

    debug!(
        "Metrics aggregated - items={}, themes={}, diversity={:.3}, concentration={:.3}, polarization={:.3}, quality={:.0}",
        records.len(),
        theme_block.total_themes,
        diversity,
        concentration,
        polarization,
        quality_score
    );

    CorpusMetrics {
        interpretation: Interpretation {
            sentiment: interpret_sentiment(sentiment.global_score).to_string(),
            diversity: interpret_diversity(diversity).to_string(),
            polarization: interpret_polarization(polarization).to_string(),
            quality: interpret_quality(quality_score).to_string(),
        },
        sentiment,
        themes: theme_block,
        distribution,
        quality,
        diversity,
        concentration,
        polarization,
        quality_score,
    }
}
