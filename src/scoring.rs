//! Sentiment scoring: the lexical and emoji scorers, and the composite
//! that merges them with an optional external-model signal into one
//! SentimentRecord per item.
//!
//! All scorers share the same capability contract: they produce a
//! `SignalScore { value, confidence }`. The composite combines whichever
//! signals are present, renormalizing its weights over the present ones.

use serde::{Deserialize, Serialize};

use crate::config::{clamp_confidence, clamp_score, AnalysisConfig};
use crate::lexicon;
use crate::models::{ProcessedItem, ScoreBreakdown, SentimentLabel, SentimentRecord};

/// One scorer's verdict: a polarity value in [-1, 1] and its confidence
/// in [0, 1].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SignalScore {
    pub value: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct LexicalSignal {
    pub score: f64,
    pub confidence: f64,
    pub match_count: usize,
}

/// Score a token stream against the bundled lexicon.
///
/// Only the single token immediately preceding a matched word is
/// inspected for an intensifier: the base score is multiplied by the
/// absolute multiplier, and the sign flips when the multiplier is
/// negative (negation). Matched scores are averaged and clamped.
pub fn score_lexical(tokens: &[String]) -> LexicalSignal {
    let mut total = 0.0;
    let mut match_count = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let Some(base) = lexicon::word_score(token) else {
            continue;
        };
        let mut adjusted = base;
        if i > 0 {
            if let Some(multiplier) = lexicon::intensifier_multiplier(&tokens[i - 1]) {
                adjusted = base * multiplier.abs();
                if multiplier < 0.0 {
                    adjusted = -adjusted;
                }
            }
        }
        total += adjusted;
        match_count += 1;
    }

    let score = if match_count > 0 {
        clamp_score(total / match_count as f64)
    } else {
        0.0
    };
    LexicalSignal {
        score,
        confidence: (0.3 + match_count as f64 * 0.1).min(0.9),
        match_count,
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmojiSignal {
    pub score: f64,
    pub confidence: f64,
    pub count: usize,
}

/// Mean per-item emoji sentiment, weighted by occurrence count.
/// Emoticons participate on the same footing as emoji codepoints.
pub fn score_emoji(item: &ProcessedItem) -> EmojiSignal {
    let mut total = 0.0;
    let mut count = 0usize;
    for hit in item.features.emojis.iter().chain(item.features.emoticons.iter()) {
        total += hit.sentiment * hit.count as f64;
        count += hit.count;
    }
    if count == 0 {
        return EmojiSignal::default();
    }
    EmojiSignal {
        score: clamp_score(total / count as f64),
        confidence: (0.2 + count as f64 * 0.05).min(0.8),
        count,
    }
}

/// Classify a composite score onto the 7-point scale.
pub fn classify(score: f64) -> SentimentLabel {
    if score > 0.6 {
        SentimentLabel::VeryPositive
    } else if score > 0.2 {
        SentimentLabel::Positive
    } else if score > 0.05 {
        SentimentLabel::SlightlyPositive
    } else if score > -0.05 {
        SentimentLabel::Neutral
    } else if score > -0.2 {
        SentimentLabel::SlightlyNegative
    } else if score > -0.6 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::VeryNegative
    }
}

fn composite_score(
    lexical: &LexicalSignal,
    emoji: &EmojiSignal,
    model: Option<SignalScore>,
    cfg: &AnalysisConfig,
) -> f64 {
    // Combine whichever signals are actually present and renormalize
    // their weights, so an absent signal (no lexicon match, no emoji,
    // model failed or opted out) never drags the composite toward zero.
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    if lexical.match_count > 0 {
        weighted += lexical.score * cfg.lexical_weight;
        total_weight += cfg.lexical_weight;
    }
    if emoji.count > 0 {
        weighted += emoji.score * cfg.emoji_weight;
        total_weight += cfg.emoji_weight;
    }
    if let Some(m) = model {
        weighted += m.value * cfg.model_weight;
        total_weight += cfg.model_weight;
    }
    if total_weight == 0.0 {
        return 0.0;
    }
    clamp_score(weighted / total_weight)
}

/// Confidence model: a small base plus bonuses for lexical matches,
/// emoji count, text length, and cross-signal sign agreement, capped to
/// avoid overconfidence.
fn composite_confidence(
    lexical: &LexicalSignal,
    emoji: &EmojiSignal,
    model: Option<SignalScore>,
    processed_len: usize,
) -> f64 {
    let mut confidence = 0.2;

    if lexical.match_count > 0 {
        confidence += (lexical.match_count as f64 * 0.1).min(0.4);
    }
    if emoji.count > 0 {
        confidence += (emoji.count as f64 * 0.05).min(0.2);
    }
    if processed_len > 20 {
        confidence += 0.1;
    }

    let mut signals = vec![lexical.score, emoji.score];
    if let Some(m) = model {
        signals.push(m.value);
    }
    let non_trivial: Vec<f64> = signals.into_iter().filter(|s| s.abs() > 0.1).collect();
    if non_trivial.len() > 1 {
        let all_positive = non_trivial.iter().all(|s| *s > 0.0);
        let all_negative = non_trivial.iter().all(|s| *s < 0.0);
        if all_positive || all_negative {
            confidence += 0.2;
        }
    }

    clamp_confidence(confidence.min(0.95))
}

/// Build the final SentimentRecord for one item.
///
/// An item with no tokens and no emoji/emoticon signal is the degenerate
/// empty-input case: it classifies neutral at zero confidence instead of
/// erroring.
pub fn score_item(
    item: &ProcessedItem,
    model: Option<SignalScore>,
    cfg: &AnalysisConfig,
) -> SentimentRecord {
    let lexical = score_lexical(&item.tokens);
    let emoji = score_emoji(item);

    let empty_input = item.tokens.is_empty() && emoji.count == 0;
    let (score, confidence) = if empty_input {
        (0.0, 0.0)
    } else {
        (
            composite_score(&lexical, &emoji, model, cfg),
            composite_confidence(&lexical, &emoji, model, item.processed_text.chars().count()),
        )
    };

    SentimentRecord {
        item_id: item.id,
        text: item.original_text.clone(),
        label: classify(score),
        score,
        confidence,
        breakdown: ScoreBreakdown {
            lexical: lexical.score,
            emoji: emoji.score,
            model: model.map(|m| m.value),
            composite: score,
        },
        features: item.features.clone(),
        metadata: item.metadata.clone(),
    }
}
