//! Theme enrichment: turns raw clusters into named Themes with
//! keywords, representative examples, per-theme sentiment, coherence and
//! sub-theme groupings.

use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::cluster::{jaccard, ClusterDraft};
use crate::config::AnalysisConfig;
use crate::lexicon;
use crate::models::{
    EmojiHit, ProcessedItem, SimpleSentiment, SubTheme, TagHit, Theme, ThemeKeyword,
    ThemeSentimentSplit, ThemeSet,
};
use crate::scoring::score_lexical;
use crate::vectorize::DocVector;

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn theme_name(top_terms: &[(String, f64)], index: usize) -> String {
    if top_terms.is_empty() {
        return format!("Theme {}", index + 1);
    }
    top_terms
        .iter()
        .take(3)
        .map(|(term, _)| capitalize(term))
        .join(" & ")
}

fn theme_id(seed: &str) -> String {
    format!("{:016x}", xxh3_64(seed.as_bytes()))
}

/// Weight-descending shared terms, ties broken on the term itself.
fn ranked_terms(shared: &BTreeMap<String, f64>) -> Vec<(String, f64)> {
    let mut terms: Vec<(String, f64)> = shared.iter().map(|(t, w)| (t.clone(), *w)).collect();
    terms.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    terms
}

/// Re-score members with the lexical scorer alone and bucket them into
/// the 3-category split. This is independent of the composite records:
/// the theme view reflects what the member texts themselves say.
fn member_sentiment(members: &[&ProcessedItem]) -> (ThemeSentimentSplit, SimpleSentiment, f64, f64) {
    let total = members.len();
    if total == 0 {
        return (ThemeSentimentSplit::default(), SimpleSentiment::Neutral, 0.0, 0.0);
    }

    let mut positive = 0usize;
    let mut negative = 0usize;
    let mut neutral = 0usize;
    let mut total_score = 0.0;
    for item in members {
        let score = score_lexical(&item.tokens).score;
        total_score += score;
        if score > 0.05 {
            positive += 1;
        } else if score < -0.05 {
            negative += 1;
        } else {
            neutral += 1;
        }
    }

    let split = ThemeSentimentSplit {
        positive: (positive as f64 / total as f64 * 100.0).round(),
        negative: (negative as f64 / total as f64 * 100.0).round(),
        neutral: (neutral as f64 / total as f64 * 100.0).round(),
    };
    let dominant = if positive > negative && positive > neutral {
        SimpleSentiment::Positive
    } else if negative > positive && negative > neutral {
        SimpleSentiment::Negative
    } else {
        SimpleSentiment::Neutral
    };
    let net = (positive as f64 - negative as f64) / total as f64;
    let average = total_score / total as f64;
    (split, dominant, net, average)
}

/// Mean pairwise Jaccard similarity among member term sets; singleton
/// clusters are perfectly coherent.
fn coherence(member_vectors: &[&DocVector]) -> f64 {
    if member_vectors.len() < 2 {
        return 1.0;
    }
    let mut total = 0.0;
    let mut comparisons = 0usize;
    for (a, b) in member_vectors.iter().tuple_combinations() {
        total += jaccard(&a.term_set, &b.term_set);
        comparisons += 1;
    }
    total / comparisons as f64
}

/// Display-only quality heuristic rewarding size, keyword richness and
/// coherence.
fn theme_quality(size: usize, keyword_count: usize, coherence: f64) -> f64 {
    let mut quality = 50.0;
    if size > 5 {
        quality += 10.0;
    }
    if size > 10 {
        quality += 10.0;
    }
    if keyword_count > 10 {
        quality += 15.0;
    }
    if keyword_count > 15 {
        quality += 10.0;
    }
    quality += coherence * 25.0;
    quality.clamp(0.0, 100.0)
}

fn aggregate_context(members: &[&ProcessedItem]) -> (Vec<EmojiHit>, Vec<TagHit>, Vec<TagHit>) {
    let mut emojis: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    let mut hashtags: BTreeMap<String, usize> = BTreeMap::new();
    let mut mentions: BTreeMap<String, usize> = BTreeMap::new();

    for item in members {
        for hit in &item.features.emojis {
            let entry = emojis.entry(hit.emoji.clone()).or_insert((0, hit.sentiment));
            entry.0 += hit.count;
        }
        for hit in &item.features.hashtags {
            *hashtags.entry(hit.tag.clone()).or_insert(0) += hit.count;
        }
        for hit in &item.features.mentions {
            *mentions.entry(hit.tag.clone()).or_insert(0) += hit.count;
        }
    }

    let mut emojis: Vec<EmojiHit> = emojis
        .into_iter()
        .map(|(emoji, (count, sentiment))| EmojiHit {
            emoji,
            count,
            sentiment,
        })
        .collect();
    emojis.sort_by(|a, b| b.count.cmp(&a.count).then(a.emoji.cmp(&b.emoji)));
    emojis.truncate(15);

    let mut hashtags: Vec<TagHit> = hashtags
        .into_iter()
        .map(|(tag, count)| TagHit { tag, count })
        .collect();
    hashtags.sort_by(|a, b| b.count.cmp(&a.count).then(a.tag.cmp(&b.tag)));
    hashtags.truncate(15);

    let mut mentions: Vec<TagHit> = mentions
        .into_iter()
        .map(|(tag, count)| TagHit { tag, count })
        .collect();
    mentions.sort_by(|a, b| b.count.cmp(&a.count).then(a.tag.cmp(&b.tag)));
    mentions.truncate(10);

    (emojis, hashtags, mentions)
}

/// Keyword-pair co-occurrence inside one theme. Pairs of top keywords
/// that appear together in at least two member texts become sub-themes.
fn extract_subthemes(
    keywords: &[ThemeKeyword],
    members: &[&ProcessedItem],
    cfg: &AnalysisConfig,
) -> Vec<SubTheme> {
    let top_keywords: Vec<&str> = keywords.iter().take(8).map(|k| k.word.as_str()).collect();

    let mut pair_counts: BTreeMap<(String, String), (usize, Vec<String>)> = BTreeMap::new();
    for item in members {
        let text = item.original_text.to_lowercase();
        let words: Vec<&str> = text.split_whitespace().collect();
        let present: Vec<&str> = top_keywords
            .iter()
            .filter(|k| words.iter().any(|w| w.contains(*k)))
            .copied()
            .collect();
        if present.len() < 2 {
            continue;
        }
        for (a, b) in present.iter().tuple_combinations() {
            let key = if a <= b {
                (a.to_string(), b.to_string())
            } else {
                (b.to_string(), a.to_string())
            };
            let entry = pair_counts.entry(key).or_insert((0, Vec::new()));
            entry.0 += 1;
            if entry.1.len() < 2 {
                entry.1.push(item.original_text.clone());
            }
        }
    }

    let mut subthemes: Vec<SubTheme> = pair_counts
        .into_iter()
        .filter(|(_, (count, _))| *count >= 2)
        .map(|((a, b), (count, examples))| SubTheme {
            name: format!("{a} + {b}"),
            keywords: vec![a, b],
            member_count: count,
            examples,
        })
        .collect();
    subthemes.sort_by(|a, b| b.member_count.cmp(&a.member_count).then(a.name.cmp(&b.name)));
    subthemes.truncate(cfg.max_subthemes);
    subthemes
}

/// Enrich a cluster partition into the final ThemeSet.
///
/// `items` and `vectors` are the usable-document slice the clusterer ran
/// over; `total_items` is the size of the full analyzed corpus, used for
/// shares and coverage.
pub fn build_theme_set(
    clusters: &[ClusterDraft],
    vectors: &[DocVector],
    items: &[ProcessedItem],
    total_items: usize,
    cfg: &AnalysisConfig,
) -> ThemeSet {
    let mut themes = Vec::with_capacity(clusters.len());

    for (index, cluster) in clusters.iter().enumerate() {
        let member_vectors: Vec<&DocVector> =
            cluster.member_positions.iter().map(|&p| &vectors[p]).collect();
        let members: Vec<&ProcessedItem> = member_vectors
            .iter()
            .map(|v| &items[v.item_index])
            .collect();

        let ranked = ranked_terms(&cluster.shared_terms);
        let name = theme_name(&ranked, index);

        let keywords: Vec<ThemeKeyword> = ranked
            .iter()
            .take(cfg.max_keywords)
            .map(|(word, weight)| {
                let frequency = members
                    .iter()
                    .flat_map(|m| m.tokens.iter())
                    .filter(|t| *t == word)
                    .count();
                ThemeKeyword {
                    word: word.clone(),
                    weight: *weight,
                    frequency,
                }
            })
            .collect();

        // Richest members make the clearest examples.
        let mut by_richness: Vec<&DocVector> = member_vectors.clone();
        by_richness.sort_by(|a, b| {
            b.richness()
                .cmp(&a.richness())
                .then(a.item_index.cmp(&b.item_index))
        });
        let examples: Vec<String> = by_richness
            .iter()
            .take(cfg.max_examples)
            .map(|v| items[v.item_index].original_text.clone())
            .collect();

        let (split, dominant, net, average) = member_sentiment(&members);
        let coherence = coherence(&member_vectors);
        let quality = theme_quality(members.len(), keywords.len(), coherence);
        let (emojis, hashtags, mentions) = aggregate_context(&members);

        let sub_themes = if members.len() >= cfg.subtheme_min_size {
            extract_subthemes(&keywords, &members, cfg)
        } else {
            Vec::new()
        };

        let seed = format!(
            "{}|{}",
            name,
            ranked.iter().take(5).map(|(t, _)| t.as_str()).join(",")
        );
        let size = members.len();

        themes.push(Theme {
            id: theme_id(&seed),
            name,
            member_item_ids: members.iter().map(|m| m.id).collect(),
            size,
            percentage: if total_items > 0 {
                (size as f64 / total_items as f64 * 10000.0).round() / 100.0
            } else {
                0.0
            },
            keywords,
            examples,
            sentiment_net: net,
            sentiment_distribution: split,
            dominant_sentiment: dominant,
            average_score: average,
            coherence,
            quality,
            emojis,
            hashtags,
            mentions,
            sub_themes,
        });
    }

    let covered: usize = themes.iter().map(|t| t.size).sum();
    let quality_score = if themes.is_empty() {
        0.0
    } else {
        themes.iter().map(|t| t.quality).sum::<f64>() / themes.len() as f64
    };

    debug!(
        "Theme set built - themes={}, covered={}/{}",
        themes.len(),
        covered,
        total_items
    );

    ThemeSet {
        total_themes: themes.len(),
        coverage: if total_items > 0 {
            (covered as f64 / total_items as f64 * 100.0).round()
        } else {
            0.0
        },
        quality_score: quality_score.round(),
        themes,
    }
}

/// Fallback for corpora with fewer than two usable documents: one
/// "general" theme holding everything (possibly nothing). Never an
/// error.
pub fn fallback_theme_set(items: &[ProcessedItem], total_items: usize) -> ThemeSet {
    let mut word_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        for token in &item.tokens {
            if token.len() > 2 && !lexicon::STOP_WORDS.contains(token.as_str()) {
                *word_counts.entry(token).or_insert(0) += 1;
            }
        }
    }
    let mut keywords: Vec<ThemeKeyword> = word_counts
        .into_iter()
        .map(|(word, count)| ThemeKeyword {
            word: word.to_string(),
            weight: count as f64,
            frequency: count,
        })
        .collect();
    keywords.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.word.cmp(&b.word)));
    keywords.truncate(10);

    let members: Vec<&ProcessedItem> = items.iter().collect();
    let (split, dominant, net, average) = member_sentiment(&members);
    let size = items.len();

    let theme = Theme {
        id: theme_id("general"),
        name: "General".to_string(),
        member_item_ids: items.iter().map(|m| m.id).collect(),
        size,
        percentage: if size > 0 { 100.0 } else { 0.0 },
        keywords,
        examples: items.iter().take(3).map(|i| i.original_text.clone()).collect(),
        sentiment_net: net,
        sentiment_distribution: split,
        dominant_sentiment: dominant,
        average_score: average,
        coherence: 1.0,
        quality: 60.0,
        emojis: Vec::new(),
        hashtags: Vec::new(),
        mentions: Vec::new(),
        sub_themes: Vec::new(),
    };

    ThemeSet {
        themes: vec![theme],
        total_themes: 1,
        coverage: if total_items > 0 && size > 0 {
            (size as f64 / total_items as f64 * 100.0).round()
        } else {
            0.0
        },
        quality_score: 60.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::cluster_documents;
    use crate::features::process_item;
    use crate::models::RawItem;
    use crate::vectorize::vectorize;
    use std::collections::BTreeMap as Meta;

    fn processed(texts: &[&str]) -> Vec<ProcessedItem> {
        texts
            .iter()
            .enumerate()
            .map(|(id, t)| {
                process_item(&RawItem {
                    id,
                    original_text: t.to_string(),
                    metadata: Meta::new(),
                })
            })
            .collect()
    }

    fn theme_set(texts: &[&str]) -> ThemeSet {
        let cfg = AnalysisConfig::default();
        let items = processed(texts);
        let vectors = vectorize(&items, &cfg);
        let clusters = cluster_documents(&vectors, cfg.similarity_threshold);
        build_theme_set(&clusters, &vectors, &items, items.len(), &cfg)
    }

    #[test]
    fn theme_names_join_top_terms() {
        let set = theme_set(&[
            "livraison rapide excellente",
            "livraison rapide correcte",
            "cuisine recette originale savoureuse",
        ]);
        let top = &set.themes[0];
        assert!(top.name.contains(" & ") || !top.name.is_empty());
        assert!(top.name.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn member_ids_partition_the_corpus() {
        let set = theme_set(&[
            "livraison rapide soignée parfaite",
            "livraison rapide emballage robuste",
            "service client réactif aimable",
            "service client injoignable décevant",
        ]);
        let mut seen = std::collections::BTreeSet::new();
        for theme in &set.themes {
            assert_eq!(theme.size, theme.member_item_ids.len());
            for id in &theme.member_item_ids {
                assert!(seen.insert(*id), "item {id} in two themes");
            }
        }
        assert!(seen.len() <= 4);
    }

    #[test]
    fn sentiment_net_matches_distribution_counts() {
        let set = theme_set(&[
            "produit excellent vraiment parfait",
            "produit excellent très agréable",
            "produit horrible vraiment nul",
        ]);
        for theme in &set.themes {
            assert!((-1.0..=1.0).contains(&theme.sentiment_net));
            assert!((0.0..=1.0).contains(&theme.coherence));
        }
    }

    #[test]
    fn singleton_cluster_is_fully_coherent() {
        let set = theme_set(&[
            "sujet unique très différent isolé",
            "propos communs partagés ensemble réguliers",
            "propos communs partagés ensemble fréquents",
        ]);
        let singleton = set.themes.iter().find(|t| t.size == 1);
        if let Some(t) = singleton {
            assert_eq!(t.coherence, 1.0);
        }
    }

    #[test]
    fn subthemes_only_for_large_themes() {
        // Rotate one term out per document so no term sits in every
        // document (full-corpus terms get zero idf and vanish).
        let terms = ["batterie", "autonomie", "recharge", "chargeur", "capacité"];
        let texts: Vec<String> = (0..6)
            .map(|i| {
                terms
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i % terms.len())
                    .map(|(_, t)| *t)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let set = theme_set(&refs);
        let big = &set.themes[0];
        assert!(big.size >= 5);
        // pairs like "autonomie + batterie" recur across the members
        assert!(!big.sub_themes.is_empty());
        for st in &big.sub_themes {
            assert_eq!(st.keywords.len(), 2);
            assert!(st.member_count >= 2);
            assert!(st.examples.len() <= 2);
        }
    }

    #[test]
    fn fallback_covers_all_items() {
        let items = processed(&["seul avis disponible excellent"]);
        let set = fallback_theme_set(&items, 1);
        assert_eq!(set.total_themes, 1);
        assert_eq!(set.themes[0].size, 1);
        assert_eq!(set.themes[0].name, "General");
        assert_eq!(set.coverage, 100.0);
    }

    #[test]
    fn fallback_on_empty_corpus_has_zero_members() {
        let set = fallback_theme_set(&[], 0);
        assert_eq!(set.total_themes, 1);
        assert_eq!(set.themes[0].size, 0);
        assert_eq!(set.themes[0].sentiment_net, 0.0);
        assert_eq!(set.coverage, 0.0);
    }
}
