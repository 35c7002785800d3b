//! End-to-end analysis pipeline: features -> sentiment -> vectors ->
//! themes -> metrics -> insights.
//!
//! One batch computation per invocation; the caller awaits full
//! completion. Per-item stages run in parallel, while clustering and
//! aggregation wait on the complete per-item result sets.

use chrono::Utc;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::features::process_item;
use crate::model::{score_in_batches, ModelScorer};
use crate::models::{
    AnalysisResult, AnalysisSummary, ProcessedItem, RawItem, SentimentRecord,
};
use crate::scoring::score_item;
use crate::themes::{build_theme_set, fallback_theme_set};
use crate::vectorize::vectorize;
use crate::{cluster, insights, metrics};

/// Documents shorter than this after normalization carry no usable
/// topical signal and are excluded from vectorization.
const MIN_USABLE_TEXT_LEN: usize = 4;

/// Run the full analysis over an ordered list of row-maps.
///
/// The engine itself has no fatal error conditions: malformed rows
/// degrade to neutral records, a missing model degrades to the
/// lexical+emoji composite, and thin corpora fall back to a single
/// general theme.
pub async fn run_analysis(
    rows: &[BTreeMap<String, String>],
    text_column: &str,
    cfg: &AnalysisConfig,
    model: Option<&dyn ModelScorer>,
) -> AnalysisResult {
    let pipeline_start = Instant::now();
    info!(
        "Analysis started - rows={}, text_column={}, model={}",
        rows.len(),
        text_column,
        model.map(|m| m.name()).unwrap_or("disabled")
    );

    let items = RawItem::from_rows(rows, text_column);

    // 1) per-item feature extraction, independent across items
    let extract_start = Instant::now();
    let processed: Vec<ProcessedItem> = items.par_iter().map(process_item).collect();
    debug!(
        "Feature extraction completed - duration={:.2}s, items={}",
        extract_start.elapsed().as_secs_f32(),
        processed.len()
    );

    // 2) optional external-model signal, in bounded batches
    let model_signals = match model {
        Some(scorer) => {
            let model_start = Instant::now();
            let signals = score_in_batches(scorer, &processed, cfg.model_batch_size).await;
            info!(
                "Model stage completed - duration={:.2}s",
                model_start.elapsed().as_secs_f32()
            );
            signals
        }
        None => vec![None; processed.len()],
    };

    // 3) composite sentiment per item
    let scoring_start = Instant::now();
    let sentiments: Vec<SentimentRecord> = processed
        .par_iter()
        .zip(model_signals.par_iter())
        .map(|(item, signal)| score_item(item, *signal, cfg))
        .collect();
    info!(
        "Sentiment scoring completed - duration={:.2}s, records={}",
        scoring_start.elapsed().as_secs_f32(),
        sentiments.len()
    );

    // 4) thematic analysis over the usable subset; barrier on the full
    // per-item set
    let theme_start = Instant::now();
    let usable: Vec<ProcessedItem> = processed
        .iter()
        .filter(|p| p.processed_text.chars().count() >= MIN_USABLE_TEXT_LEN)
        .cloned()
        .collect();
    let themes = if usable.len() < 2 {
        debug!(
            "Too few usable documents for clustering ({}) - using general fallback theme",
            usable.len()
        );
        fallback_theme_set(&usable, items.len())
    } else {
        let vectors = vectorize(&usable, cfg);
        let clusters = cluster::cluster_documents(&vectors, cfg.similarity_threshold);
        build_theme_set(&clusters, &vectors, &usable, items.len(), cfg)
    };
    info!(
        "Theme extraction completed - duration={:.2}s, themes={}",
        theme_start.elapsed().as_secs_f32(),
        themes.total_themes
    );

    // 5) metrics and insights
    let metrics_start = Instant::now();
    let metrics = metrics::aggregate(&sentiments, &themes);
    let insights = insights::generate(&sentiments, &themes, &metrics);
    debug!(
        "Metrics and insights completed - duration={:.2}s, insights={}",
        metrics_start.elapsed().as_secs_f32(),
        insights.len()
    );

    let processing_ms = pipeline_start.elapsed().as_millis() as u64;
    info!(
        "Analysis completed - total_duration={:.2}s, items={}, themes={}, insights={}",
        pipeline_start.elapsed().as_secs_f32(),
        sentiments.len(),
        themes.total_themes,
        insights.len()
    );

    AnalysisResult {
        summary: AnalysisSummary {
            total_reviews: rows.len(),
            processed_reviews: sentiments.len(),
            text_column: text_column.to_string(),
            analysis_date: Utc::now(),
            processing_ms,
        },
        sentiments,
        themes,
        metrics,
        insights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(texts: &[&str]) -> Vec<BTreeMap<String, String>> {
        texts
            .iter()
            .map(|t| {
                BTreeMap::from([
                    ("review".to_string(), t.to_string()),
                    ("source".to_string(), "unit".to_string()),
                ])
            })
            .collect()
    }

    #[tokio::test]
    async fn one_record_per_row() {
        let rows = rows(&["excellent produit", "", "service correct"]);
        let result = run_analysis(&rows, "review", &AnalysisConfig::default(), None).await;
        assert_eq!(result.sentiments.len(), 3);
        assert_eq!(result.summary.processed_reviews, 3);
        for (i, record) in result.sentiments.iter().enumerate() {
            assert_eq!(record.item_id, i);
        }
    }

    #[tokio::test]
    async fn metadata_columns_are_carried_through() {
        let rows = rows(&["bon produit"]);
        let result = run_analysis(&rows, "review", &AnalysisConfig::default(), None).await;
        assert_eq!(
            result.sentiments[0].metadata.get("source").map(String::as_str),
            Some("unit")
        );
        assert!(!result.sentiments[0].metadata.contains_key("review"));
    }

    #[tokio::test]
    async fn missing_text_column_degrades_to_neutral() {
        let rows = rows(&["excellent"]);
        let result = run_analysis(&rows, "absent_column", &AnalysisConfig::default(), None).await;
        assert_eq!(result.sentiments.len(), 1);
        assert_eq!(result.sentiments[0].score, 0.0);
        assert_eq!(result.sentiments[0].confidence, 0.0);
        assert_eq!(result.themes.total_themes, 1);
    }
}
