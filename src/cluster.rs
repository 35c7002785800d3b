//! Greedy thematic clustering over TF-IDF document vectors.
//!
//! Single pass: documents ordered by vector richness seed clusters in
//! turn; every unassigned document whose retained-term set is similar
//! enough to the seed joins the seed's cluster. The result is an
//! exhaustive, non-overlapping partition ordered by cluster size.

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::vectorize::DocVector;

/// Unweighted Jaccard similarity over retained-term sets.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let inter = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    if union == 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// A cluster before theme enrichment: member positions into the vector
/// slice plus the summed term weights shared across members.
#[derive(Debug, Clone)]
pub struct ClusterDraft {
    pub member_positions: Vec<usize>,
    pub shared_terms: BTreeMap<String, f64>,
}

impl ClusterDraft {
    pub fn size(&self) -> usize {
        self.member_positions.len()
    }
}

/// Partition the corpus into clusters of similar documents.
///
/// Candidates are scanned in parallel per seed; assignment itself stays
/// sequential so the partition is deterministic for a given input order.
pub fn cluster_documents(vectors: &[DocVector], threshold: f64) -> Vec<ClusterDraft> {
    debug!(
        "Clustering started - documents={}, threshold={}",
        vectors.len(),
        threshold
    );

    // Richness-descending seed order; ties keep corpus order.
    let mut order: Vec<usize> = (0..vectors.len()).collect();
    order.sort_by(|&a, &b| {
        vectors[b]
            .richness()
            .cmp(&vectors[a].richness())
            .then(vectors[a].item_index.cmp(&vectors[b].item_index))
    });

    let mut assigned = vec![false; vectors.len()];
    let mut clusters: Vec<ClusterDraft> = Vec::new();
    let total = vectors.len();

    for (processed, &seed) in order.iter().enumerate() {
        if processed % 50 == 0 && processed > 0 {
            let pct = (processed as f32 / total as f32 * 100.0) as u32;
            info!(
                "Clustering progress - processed={}/{} ({}%), clusters={}",
                processed,
                total,
                pct,
                clusters.len()
            );
        }
        if assigned[seed] {
            continue;
        }

        let mut member_positions = vec![seed];
        assigned[seed] = true;

        let unassigned: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&j| !assigned[j])
            .collect();

        // The pairwise similarity scan is the hot loop; parallelize it.
        let seed_terms = &vectors[seed].term_set;
        let similar: Vec<usize> = unassigned
            .par_iter()
            .filter(|&&j| jaccard(&vectors[j].term_set, seed_terms) > threshold)
            .copied()
            .collect();

        for j in similar {
            assigned[j] = true;
            member_positions.push(j);
        }

        let mut shared_terms: BTreeMap<String, f64> = BTreeMap::new();
        for &pos in &member_positions {
            for (term, weight) in &vectors[pos].top_terms {
                *shared_terms.entry(term.clone()).or_insert(0.0) += weight;
            }
        }

        clusters.push(ClusterDraft {
            member_positions,
            shared_terms,
        });
    }

    clusters.sort_by(|a, b| b.size().cmp(&a.size()));

    if !clusters.is_empty() {
        let sizes: Vec<usize> = clusters.iter().map(ClusterDraft::size).collect();
        let max = sizes.iter().max().copied().unwrap_or(0);
        let min = sizes.iter().min().copied().unwrap_or(0);
        let avg = sizes.iter().sum::<usize>() as f32 / sizes.len() as f32;
        debug!(
            "Cluster size distribution - clusters={}, min={}, max={}, avg={:.1}",
            clusters.len(),
            min,
            max,
            avg
        );
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::features::process_item;
    use crate::models::RawItem;
    use crate::vectorize::vectorize;
    use std::collections::BTreeMap as Meta;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn jaccard_basics() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 1.0);
        assert_eq!(jaccard(&set(&["a"]), &set(&[])), 0.0);
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["a", "b"])), 1.0);
        assert!((jaccard(&set(&["a", "b", "c"]), &set(&["b", "c", "d"])) - 0.5).abs() < 1e-9);
    }

    fn vectors_for(texts: &[&str]) -> Vec<DocVector> {
        let items: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(id, t)| {
                process_item(&RawItem {
                    id,
                    original_text: t.to_string(),
                    metadata: Meta::new(),
                })
            })
            .collect();
        vectorize(&items, &AnalysisConfig::default())
    }

    #[test]
    fn produces_a_partition() {
        let vectors = vectors_for(&[
            "livraison rapide colis intact",
            "livraison lente colis endommagé",
            "livraison correcte colis complet",
            "interface application confuse navigation pénible",
            "interface application fluide navigation agréable",
        ]);
        let clusters = cluster_documents(&vectors, 0.15);

        let mut seen = BTreeSet::new();
        let mut total = 0usize;
        for c in &clusters {
            for &pos in &c.member_positions {
                assert!(seen.insert(pos), "document assigned twice");
                total += 1;
            }
        }
        assert_eq!(total, vectors.len());
    }

    #[test]
    fn similar_documents_cluster_together() {
        let vectors = vectors_for(&[
            "livraison rapide colis soigné transporteur sérieux",
            "livraison rapide colis propre transporteur aimable",
            "livraison rapide colis conforme transporteur ponctuel",
            "recette cuisine épices saveurs automne",
        ]);
        let clusters = cluster_documents(&vectors, 0.15);
        assert!(clusters[0].size() >= 3);
        assert_eq!(clusters.last().unwrap().size(), 1);
    }

    #[test]
    fn clusters_ordered_by_size_descending() {
        let vectors = vectors_for(&[
            "thème majeur sujet récurrent discussion fréquente",
            "thème majeur sujet récurrent discussion animée",
            "thème majeur sujet récurrent discussion calme",
            "question isolée remarque unique",
        ]);
        let clusters = cluster_documents(&vectors, 0.15);
        for pair in clusters.windows(2) {
            assert!(pair[0].size() >= pair[1].size());
        }
    }

    #[test]
    fn shared_terms_sum_member_weights() {
        let vectors = vectors_for(&[
            "batterie autonomie excellente recharge rapide",
            "batterie autonomie moyenne recharge lente",
            "tout autre sujet sans rapport aucun",
        ]);
        let clusters = cluster_documents(&vectors, 0.15);
        let big = &clusters[0];
        if big.size() >= 2 {
            let solo_weight: f64 = vectors[big.member_positions[0]]
                .top_terms
                .iter()
                .find(|(t, _)| t == "batterie")
                .map(|(_, w)| *w)
                .unwrap_or(0.0);
            let summed = big.shared_terms.get("batterie").copied().unwrap_or(0.0);
            assert!(summed > solo_weight);
        }
    }

    #[test]
    fn empty_corpus_clusters_to_nothing() {
        let clusters = cluster_documents(&[], 0.15);
        assert!(clusters.is_empty());
    }
}
