//! Corpus-wide TF-IDF vectorization. Each usable document is reduced to
//! its top-K highest-weighted terms; the retained-term sets drive the
//! thematic clusterer.

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::lexicon;
use crate::models::ProcessedItem;

/// One document's retained TF-IDF terms, weight-descending.
#[derive(Debug, Clone)]
pub struct DocVector {
    /// Index into the processed-item slice this vector was built from.
    pub item_index: usize,
    pub top_terms: Vec<(String, f64)>,
    pub term_set: BTreeSet<String>,
}

impl DocVector {
    /// Vector richness: how many terms survived the epsilon cut.
    pub fn richness(&self) -> usize {
        self.top_terms.len()
    }
}

fn is_vocabulary_term(token: &str) -> bool {
    token.len() > 2
        && !lexicon::STOP_WORDS.contains(token)
        && !lexicon::is_placeholder_token(token)
        && !token.chars().all(|c| c.is_ascii_digit())
}

/// Build TF-IDF vectors for the given documents.
///
/// `tf = count / doc_length` over vocabulary tokens, `idf = ln(N / df)`;
/// scores below the configured epsilon are dropped and the top-K terms
/// per document are retained. Ties break on the term itself so repeated
/// runs produce identical vectors.
pub fn vectorize(items: &[ProcessedItem], cfg: &AnalysisConfig) -> Vec<DocVector> {
    let doc_tokens: Vec<Vec<&str>> = items
        .iter()
        .map(|item| {
            item.tokens
                .iter()
                .map(String::as_str)
                .filter(|t| is_vocabulary_term(t))
                .collect()
        })
        .collect();

    // Document frequency over the filtered vocabulary.
    let mut df: HashMap<&str, usize> = HashMap::new();
    for tokens in &doc_tokens {
        let unique: BTreeSet<&str> = tokens.iter().copied().collect();
        for term in unique {
            *df.entry(term).or_insert(0) += 1;
        }
    }
    let doc_count = items.len() as f64;
    debug!(
        "Vectorizing corpus - documents={}, vocabulary={}",
        items.len(),
        df.len()
    );

    doc_tokens
        .par_iter()
        .enumerate()
        .map(|(item_index, tokens)| {
            let mut tf: BTreeMap<&str, usize> = BTreeMap::new();
            for t in tokens {
                *tf.entry(t).or_insert(0) += 1;
            }
            let doc_len = tokens.len() as f64;

            let mut scored: Vec<(String, f64)> = tf
                .into_iter()
                .filter_map(|(term, count)| {
                    let term_tf = count as f64 / doc_len;
                    let term_idf = (doc_count / df[term] as f64).ln();
                    let score = term_tf * term_idf;
                    (score > cfg.tfidf_epsilon).then(|| (term.to_string(), score))
                })
                .collect();
            scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            scored.truncate(cfg.top_terms_per_doc);

            let term_set = scored.iter().map(|(t, _)| t.clone()).collect();
            DocVector {
                item_index,
                top_terms: scored,
                term_set,
            }
        })
        .collect()
}
