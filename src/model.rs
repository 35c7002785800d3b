//! Optional external-model sentiment signal.
//!
//! The engine treats the model as one more scorer strategy behind the
//! `SignalScore` contract. Calls run in bounded batches; a failure for
//! one item degrades that item to the lexical+emoji composite and the
//! batch continues.

use anyhow::{Context, Result};
use futures::future::{join_all, BoxFuture};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::models::ProcessedItem;
use crate::scoring::SignalScore;

/// Texts at or below this length carry too little signal to be worth a
/// network round-trip; they are skipped without being counted as
/// failures.
const MIN_MODEL_TEXT_LEN: usize = 5;

pub trait ModelScorer: Send + Sync {
    fn score<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<SignalScore>>;

    fn name(&self) -> &str;
}

/// One classification row as returned by a transformer inference
/// endpoint: a label plus the winning class probability.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelPrediction {
    pub label: String,
    pub score: f64,
}

/// Map a model prediction onto the engine's [-1, 1] scale. Model output
/// is moderated by 0.8 so the lexical signal stays dominant even when
/// the model is certain.
pub fn parse_prediction(predictions: &[ModelPrediction]) -> SignalScore {
    let Some(top) = predictions.first() else {
        return SignalScore {
            value: 0.0,
            confidence: 0.1,
        };
    };
    let value = match top.label.to_ascii_uppercase().as_str() {
        "POSITIVE" | "LABEL_2" => top.score * 0.8,
        "NEGATIVE" | "LABEL_0" => -top.score * 0.8,
        _ => 0.0,
    };
    SignalScore {
        value,
        confidence: if top.score > 0.0 { top.score } else { 0.1 },
    }
}

/// Client for a remote sentiment-inference endpoint speaking the
/// `{"text": ...}` -> `[{"label": ..., "score": ...}]` convention.
pub struct HttpModelScorer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpModelScorer {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("building model HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl ModelScorer for HttpModelScorer {
    fn score<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<SignalScore>> {
        Box::pin(async move {
            let start = std::time::Instant::now();
            let resp = self
                .client
                .post(&self.endpoint)
                .json(&serde_json::json!({ "text": text }))
                .send()
                .await
                .with_context(|| format!("model request to {}", self.endpoint))?
                .error_for_status()
                .with_context(|| format!("model HTTP error from {}", self.endpoint))?;
            let predictions: Vec<ModelPrediction> = resp
                .json()
                .await
                .with_context(|| format!("decoding model response from {}", self.endpoint))?;
            debug!(
                "Model call completed - duration={:.2}s, predictions={}",
                start.elapsed().as_secs_f32(),
                predictions.len()
            );
            Ok(parse_prediction(&predictions))
        })
    }

    fn name(&self) -> &str {
        "http-model"
    }
}

/// Score every item through the model in bounded batches. Returns one
/// slot per item: `None` marks items that were skipped (too short) or
/// whose call failed and therefore fall back to lexical+emoji.
pub async fn score_in_batches(
    scorer: &dyn ModelScorer,
    items: &[ProcessedItem],
    batch_size: usize,
) -> Vec<Option<SignalScore>> {
    let batch_size = batch_size.max(1);
    let mut signals: Vec<Option<SignalScore>> = Vec::with_capacity(items.len());
    let mut failures = 0usize;

    for batch in items.chunks(batch_size) {
        let futures: Vec<_> = batch
            .iter()
            .map(|item| async move {
                if item.processed_text.chars().count() <= MIN_MODEL_TEXT_LEN {
                    return None;
                }
                match scorer.score(&item.processed_text).await {
                    Ok(signal) => Some(signal),
                    Err(e) => {
                        warn!(
                            "Model scoring failed for item {} - falling back to lexical+emoji: {e:#}",
                            item.id
                        );
                        None
                    }
                }
            })
            .collect();

        let results = join_all(futures).await;
        failures += batch
            .iter()
            .zip(&results)
            .filter(|(item, r)| {
                r.is_none() && item.processed_text.chars().count() > MIN_MODEL_TEXT_LEN
            })
            .count();
        signals.extend(results);
    }

    info!(
        "Model scoring completed - scorer={}, items={}, degraded={}",
        scorer.name(),
        items.len(),
        failures
    );
    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::process_item;
    use crate::models::RawItem;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn prediction(label: &str, score: f64) -> Vec<ModelPrediction> {
        vec![ModelPrediction {
            label: label.to_string(),
            score,
        }]
    }

    #[test]
    fn positive_labels_map_to_moderated_positive_scores() {
        let signal = parse_prediction(&prediction("POSITIVE", 0.95));
        assert!((signal.value - 0.76).abs() < 1e-9);
        let signal = parse_prediction(&prediction("LABEL_2", 0.5));
        assert!((signal.value - 0.4).abs() < 1e-9);
    }

    #[test]
    fn negative_labels_map_to_moderated_negative_scores() {
        let signal = parse_prediction(&prediction("NEGATIVE", 0.9));
        assert!((signal.value + 0.72).abs() < 1e-9);
        let signal = parse_prediction(&prediction("LABEL_0", 1.0));
        assert!((signal.value + 0.8).abs() < 1e-9);
    }

    #[test]
    fn neutral_and_empty_predictions_are_zero() {
        assert_eq!(parse_prediction(&prediction("NEUTRAL", 0.8)).value, 0.0);
        assert_eq!(parse_prediction(&[]).value, 0.0);
    }

    struct FlakyScorer {
        calls: AtomicUsize,
    }

    impl ModelScorer for FlakyScorer {
        fn score<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<SignalScore>> {
            Box::pin(async move {
                let n = self.calls.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    Ok(SignalScore {
                        value: 0.5,
                        confidence: 0.9,
                    })
                } else {
                    anyhow::bail!("inference backend unavailable")
                }
            })
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn items(texts: &[&str]) -> Vec<ProcessedItem> {
        texts
            .iter()
            .enumerate()
            .map(|(id, t)| {
                process_item(&RawItem {
                    id,
                    original_text: t.to_string(),
                    metadata: BTreeMap::new(),
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn failures_degrade_single_items_without_aborting() {
        let scorer = FlakyScorer {
            calls: AtomicUsize::new(0),
        };
        let batch = items(&[
            "service excellent vraiment satisfait",
            "livraison correcte sans surprise",
            "produit décevant emballage abimé",
            "très bon rapport qualité prix",
        ]);
        let signals = score_in_batches(&scorer, &batch, 2).await;
        assert_eq!(signals.len(), 4);
        assert!(signals.iter().any(|s| s.is_some()));
        assert!(signals.iter().any(|s| s.is_none()));
    }

    #[tokio::test]
    async fn short_texts_are_skipped() {
        let scorer = FlakyScorer {
            calls: AtomicUsize::new(0),
        };
        let batch = items(&["ok", ""]);
        let signals = score_in_batches(&scorer, &batch, 8).await;
        assert!(signals.iter().all(|s| s.is_none()));
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    }
}
