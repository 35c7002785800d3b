//! Rule-based narrative insights over the aggregated metrics.
//!
//! Insight kinds are a tagged enum: each variant carries only the
//! payload meaningful to it, validated at construction instead of being
//! checked ad hoc by consumers. The final list is ordered by priority;
//! generation order breaks ties.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::debug;

use crate::metrics::CorpusMetrics;
use crate::models::{SentimentRecord, SimpleSentiment, Theme, ThemeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleRef {
    pub text: String,
    pub score: f64,
    pub confidence: f64,
}

/// Theme payload attached to theme-scoped insights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeData {
    pub name: String,
    pub size: usize,
    pub sentiment_net: f64,
    pub keywords: Vec<String>,
}

impl ThemeData {
    fn from_theme(theme: &Theme) -> Self {
        Self {
            name: theme.name.clone(),
            size: theme.size,
            sentiment_net: theme.sentiment_net,
            keywords: theme.keywords.iter().take(5).map(|k| k.word.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum InsightKind {
    Positive {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        examples: Vec<ExampleRef>,
    },
    Warning {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        examples: Vec<ExampleRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        theme_data: Option<ThemeData>,
    },
    Alert {
        theme_data: ThemeData,
        recommendations: Vec<String>,
    },
    Info {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        keywords: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        examples: Vec<String>,
    },
    Summary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(flatten)]
    pub kind: InsightKind,
}

impl Insight {
    fn new(title: impl Into<String>, description: impl Into<String>, priority: Priority, kind: InsightKind) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority,
            kind,
        }
    }
}

/// Most confident examples of one simplified sentiment category.
fn examples_by_category(
    records: &[SentimentRecord],
    category: SimpleSentiment,
    count: usize,
) -> Vec<ExampleRef> {
    let mut matching: Vec<&SentimentRecord> = records
        .iter()
        .filter(|r| r.label.simplified() == category)
        .collect();
    matching.sort_by(|a, b| b.confidence.total_cmp(&a.confidence).then(a.item_id.cmp(&b.item_id)));
    matching
        .into_iter()
        .take(count)
        .map(|r| ExampleRef {
            text: r.text.clone(),
            score: r.score,
            confidence: r.confidence,
        })
        .collect()
}

fn executive_summary(metrics: &CorpusMetrics) -> String {
    let s = &metrics.sentiment;
    format!(
        "Analyzed {} reviews: {:.0}% positive, {:.0}% negative, {:.0}% neutral. \
         Global score {:.2} ({}). {} themes identified.",
        s.total,
        s.percentages.positive,
        s.percentages.negative,
        s.percentages.neutral,
        s.global_score,
        s.interpretation,
        metrics.themes.total_themes,
    )
}

/// Evaluate the fixed thresholds against the aggregated metrics and emit
/// the ordered insight list.
pub fn generate(
    records: &[SentimentRecord],
    themes: &ThemeSet,
    metrics: &CorpusMetrics,
) -> Vec<Insight> {
    let mut insights = Vec::new();
    let s = &metrics.sentiment;

    if s.percentages.positive > 60.0 {
        insights.push(Insight::new(
            "Overall sentiment is positive",
            format!(
                "{:.1}% of reviews are positive with an average score of {:.2}",
                s.percentages.positive, s.average_scores.positive
            ),
            Priority::High,
            InsightKind::Positive {
                examples: examples_by_category(records, SimpleSentiment::Positive, 2),
            },
        ));
    }

    if s.percentages.negative > 30.0 {
        insights.push(Insight::new(
            "Notable share of negative reviews",
            format!(
                "{:.1}% of reviews are negative - improvement areas need attention",
                s.percentages.negative
            ),
            Priority::High,
            InsightKind::Warning {
                examples: examples_by_category(records, SimpleSentiment::Negative, 3),
                theme_data: None,
            },
        ));
    }

    if s.sentiment_net > 0.4 {
        insights.push(Insight::new(
            "Strongly favorable balance",
            format!(
                "Positive reviews outweigh negative ones by a net margin of {:.2}",
                s.sentiment_net
            ),
            Priority::High,
            InsightKind::Positive { examples: Vec::new() },
        ));
    }

    for theme in &themes.themes {
        if theme.sentiment_net < -0.6 && theme.size >= 3 {
            insights.push(Insight::new(
                format!("Critical dissatisfaction in \"{}\"", theme.name),
                format!(
                    "Theme \"{}\" ({} reviews) is overwhelmingly negative (net {:.2})",
                    theme.name, theme.size, theme.sentiment_net
                ),
                Priority::High,
                InsightKind::Alert {
                    theme_data: ThemeData::from_theme(theme),
                    recommendations: vec![
                        format!("Treat \"{}\" feedback as a priority", theme.name),
                        "Review the flagged examples for recurring root causes".to_string(),
                    ],
                },
            ));
        } else if theme.sentiment_net < -0.3 {
            insights.push(Insight::new(
                format!("Negative trend in \"{}\"", theme.name),
                format!(
                    "Theme \"{}\" ({} reviews) leans negative (net {:.2})",
                    theme.name, theme.size, theme.sentiment_net
                ),
                Priority::High,
                InsightKind::Warning {
                    examples: Vec::new(),
                    theme_data: Some(ThemeData::from_theme(theme)),
                },
            ));
        }
    }

    if s.total > 0 && s.avg_confidence < 0.6 {
        insights.push(Insight::new(
            "Moderate analysis confidence",
            format!(
                "Average confidence of {:.1}% - some reviews may be ambiguous",
                s.avg_confidence * 100.0
            ),
            Priority::Medium,
            InsightKind::Info {
                keywords: Vec::new(),
                examples: Vec::new(),
            },
        ));
    }

    if let Some(top) = themes.themes.first().filter(|t| t.size > 0) {
        insights.push(Insight::new(
            "Main theme identified",
            format!(
                "\"{}\" accounts for {:.1}% of reviews ({} mentions)",
                top.name, top.percentage, top.size
            ),
            Priority::Medium,
            InsightKind::Info {
                keywords: top.keywords.iter().take(5).map(|k| k.word.clone()).collect(),
                examples: top.examples.iter().take(2).cloned().collect(),
            },
        ));
    }

    if themes.total_themes > 5 {
        insights.push(Insight::new(
            "High thematic diversity",
            format!(
                "{} distinct themes identified - the feedback covers many subjects",
                themes.total_themes
            ),
            Priority::Low,
            InsightKind::Info {
                keywords: Vec::new(),
                examples: Vec::new(),
            },
        ));
    }

    if metrics.quality.short_texts_percentage > 20.0 {
        insights.push(Insight::new(
            "Short texts detected",
            format!(
                "{:.1}% of reviews are very short (under 20 characters) - reduced precision",
                metrics.quality.short_texts_percentage
            ),
            Priority::Medium,
            InsightKind::Warning {
                examples: Vec::new(),
                theme_data: None,
            },
        ));
    }

    insights.push(Insight::new(
        "Executive summary",
        executive_summary(metrics),
        Priority::High,
        InsightKind::Summary,
    ));

    // Stable: ties keep generation order.
    insights.sort_by_key(|i| Reverse(i.priority));

    debug!("Insights generated - count={}", insights.len());
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::aggregate;
    use crate::models::{FeatureSet, ScoreBreakdown, SentimentLabel};
    use crate::themes::fallback_theme_set;
    use std::collections::BTreeMap;

    fn record(id: usize, score: f64, confidence: f64) -> SentimentRecord {
        SentimentRecord {
            item_id: id,
            text: format!("review {id}"),
            label: crate::scoring::classify(score),
            score,
            confidence,
            breakdown: ScoreBreakdown::default(),
            features: FeatureSet::default(),
            metadata: BTreeMap::new(),
        }
    }

    fn run(records: &[SentimentRecord]) -> Vec<Insight> {
        let themes = fallback_theme_set(&[], records.len());
        let metrics = aggregate(records, &themes);
        generate(records, &themes, &metrics)
    }

    #[test]
    fn always_emits_a_summary() {
        let insights = run(&[]);
        assert!(insights
            .iter()
            .any(|i| matches!(i.kind, InsightKind::Summary)));
    }

    #[test]
    fn positive_corpus_triggers_positive_insight() {
        let records: Vec<SentimentRecord> =
            (0..10).map(|i| record(i, 0.7, 0.8)).collect();
        let insights = run(&records);
        let positive = insights
            .iter()
            .find(|i| matches!(i.kind, InsightKind::Positive { .. }))
            .expect("positive insight");
        assert_eq!(positive.priority, Priority::High);
        if let InsightKind::Positive { examples } = &positive.kind {
            assert_eq!(examples.len(), 2);
        }
    }

    #[test]
    fn negative_share_triggers_warning_with_examples() {
        let mut records: Vec<SentimentRecord> =
            (0..6).map(|i| record(i, -0.5, 0.7)).collect();
        records.extend((6..10).map(|i| record(i, 0.1, 0.5)));
        let insights = run(&records);
        let warning = insights
            .iter()
            .find(|i| matches!(i.kind, InsightKind::Warning { .. }))
            .expect("warning insight");
        if let InsightKind::Warning { examples, .. } = &warning.kind {
            assert_eq!(examples.len(), 3);
            for e in examples {
                assert!(e.score < 0.0);
            }
        }
    }

    #[test]
    fn negative_theme_is_named_in_warning() {
        use crate::models::{SimpleSentiment, Theme, ThemeSentimentSplit, ThemeSet};
        let theme = Theme {
            id: "abc".into(),
            name: "Livraison".into(),
            member_item_ids: vec![0, 1, 2],
            size: 3,
            percentage: 100.0,
            keywords: Vec::new(),
            examples: Vec::new(),
            sentiment_net: -0.4,
            sentiment_distribution: ThemeSentimentSplit::default(),
            dominant_sentiment: SimpleSentiment::Negative,
            average_score: -0.4,
            coherence: 0.5,
            quality: 60.0,
            emojis: Vec::new(),
            hashtags: Vec::new(),
            mentions: Vec::new(),
            sub_themes: Vec::new(),
        };
        let themes = ThemeSet {
            themes: vec![theme],
            total_themes: 1,
            coverage: 100.0,
            quality_score: 60.0,
        };
        let records: Vec<SentimentRecord> = (0..3).map(|i| record(i, -0.4, 0.7)).collect();
        let metrics = aggregate(&records, &themes);
        let insights = generate(&records, &themes, &metrics);
        let named = insights.iter().any(|i| {
            matches!(&i.kind, InsightKind::Warning { theme_data: Some(td), .. } if td.name == "Livraison")
        });
        assert!(named, "expected a warning naming the negative theme");
    }

    #[test]
    fn priorities_are_sorted_high_first() {
        let records: Vec<SentimentRecord> = (0..10).map(|i| record(i, 0.7, 0.4)).collect();
        let insights = run(&records);
        for pair in insights.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
    }

    #[test]
    fn insight_json_carries_the_type_tag() {
        let insight = Insight::new(
            "t",
            "d",
            Priority::High,
            InsightKind::Summary,
        );
        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["type"], "summary");
        assert_eq!(json["priority"], "high");
    }
}
