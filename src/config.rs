use serde::{Deserialize, Serialize};

/// Tunable heuristics for one analysis run.
///
/// The defaults are the values the engine was calibrated with; they are
/// plain named fields so callers can override any of them instead of
/// re-tuning constants buried in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Jaccard similarity a document must reach against a cluster seed
    /// to join that cluster.
    pub similarity_threshold: f64,
    /// Retained TF-IDF terms per document vector.
    pub top_terms_per_doc: usize,
    /// TF-IDF scores below this are treated as noise and dropped.
    pub tfidf_epsilon: f64,
    /// Minimum member count before a theme is mined for sub-themes.
    pub subtheme_min_size: usize,
    /// Keyword pairs kept as sub-themes per theme.
    pub max_subthemes: usize,
    /// Keywords retained per theme.
    pub max_keywords: usize,
    /// Representative example texts retained per theme.
    pub max_examples: usize,
    /// Items per bounded batch when an external model scorer is attached.
    pub model_batch_size: usize,
    /// Composite weight of the lexical signal.
    pub lexical_weight: f64,
    /// Composite weight of the emoji signal.
    pub emoji_weight: f64,
    /// Composite weight of the external-model signal, when present.
    pub model_weight: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.15,
            top_terms_per_doc: 15,
            tfidf_epsilon: 0.01,
            subtheme_min_size: 5,
            max_subthemes: 5,
            max_keywords: 20,
            max_examples: 4,
            model_batch_size: 8,
            lexical_weight: 0.6,
            emoji_weight: 0.3,
            model_weight: 0.1,
        }
    }
}

/// Clamp a score into [-1, 1]. Every numeric sentiment output passes
/// through this before leaving the engine.
pub fn clamp_score(v: f64) -> f64 {
    v.clamp(-1.0, 1.0)
}

/// Clamp a confidence into [0, 1].
pub fn clamp_confidence(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}
