//! Feature extraction: turns one raw review string into a normalized
//! token stream plus the FeatureSet consumed by the scorers and the
//! vectorizer.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;

use crate::lexicon;
use crate::models::{EmojiHit, FeatureSet, IntensifierHit, ProcessedItem, RawItem, SentimentWordHit, TagHit};

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("static regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("static regex"));
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").expect("static regex"));
static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("static regex"));
// Residual punctuation after placeholder substitution. Unicode \w keeps
// accented letters intact.
static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("static regex"));
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

fn sentiment_marker(prefix: &str, score: f64) -> String {
    let polarity = if score > 0.0 {
        "pos"
    } else if score < 0.0 {
        "neg"
    } else {
        "neu"
    };
    format!(" {prefix}_{polarity} ")
}

/// Single-codepoint emoji block membership, for emojis the bundled table
/// does not know. Known table entries (including multi-codepoint
/// sequences) are matched and removed before this check runs.
fn is_emoji_char(c: char) -> bool {
    matches!(u32::from(c),
        0x1F300..=0x1F5FF | 0x1F600..=0x1F64F | 0x1F680..=0x1F6FF | 0x2600..=0x26FF | 0x2700..=0x27BF)
}

/// Extract features and normalize one raw text. Empty or non-text input
/// yields an empty FeatureSet and an empty token stream, never an error.
pub fn extract_features(text: &str) -> (String, Vec<String>, FeatureSet) {
    let mut features = FeatureSet {
        original_length: text.chars().count(),
        ..FeatureSet::default()
    };
    if text.trim().is_empty() {
        return (String::new(), Vec::new(), features);
    }

    let mut working = text.nfc().collect::<String>();

    // Known emojis first: count every table entry, then swap occurrences
    // for a polarity marker so the codepoints survive tokenization.
    let mut emoji_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (&emoji, _) in lexicon::EMOJI_SENTIMENT.iter() {
        let count = working.matches(emoji).count();
        if count > 0 {
            emoji_counts.insert(emoji, count);
        }
    }
    for (emoji, count) in emoji_counts {
        let sentiment = lexicon::emoji_score(emoji).unwrap_or(0.0);
        working = working.replace(emoji, &sentiment_marker("EMOJI", sentiment));
        features.emojis.push(EmojiHit {
            emoji: emoji.to_string(),
            count,
            sentiment,
        });
    }

    // Unknown emojis score 0 but still count toward the feature set.
    let mut unknown: BTreeMap<char, usize> = BTreeMap::new();
    for c in working.chars() {
        if is_emoji_char(c) {
            *unknown.entry(c).or_insert(0) += 1;
        }
    }
    for (c, count) in unknown {
        working = working.replace(c, " ");
        features.emojis.push(EmojiHit {
            emoji: c.to_string(),
            count,
            sentiment: 0.0,
        });
    }

    // Text emoticons, longest pattern first.
    for (pattern, score) in lexicon::EMOTICON_SENTIMENT.iter() {
        let count = working.matches(pattern).count();
        if count > 0 {
            working = working.replace(pattern, &sentiment_marker("EMOTICON", *score));
            features.emoticons.push(EmojiHit {
                emoji: pattern.to_string(),
                count,
                sentiment: *score,
            });
        }
    }

    // URLs and emails are pure placeholders; mentions and hashtags are
    // counted before substitution.
    working = URL_RE.replace_all(&working, " URL ").into_owned();
    working = EMAIL_RE.replace_all(&working, " EMAIL ").into_owned();

    let mut mention_counts: BTreeMap<String, usize> = BTreeMap::new();
    for m in MENTION_RE.find_iter(&working) {
        *mention_counts.entry(m.as_str().to_lowercase()).or_insert(0) += 1;
    }
    features.mentions = mention_counts
        .into_iter()
        .map(|(tag, count)| TagHit { tag, count })
        .collect();
    features.mentions.sort_by(|a, b| b.count.cmp(&a.count).then(a.tag.cmp(&b.tag)));
    working = MENTION_RE.replace_all(&working, " MENTION ").into_owned();

    let mut hashtag_counts: BTreeMap<String, usize> = BTreeMap::new();
    for m in HASHTAG_RE.find_iter(&working) {
        *hashtag_counts.entry(m.as_str().to_lowercase()).or_insert(0) += 1;
    }
    features.hashtags = hashtag_counts
        .into_iter()
        .map(|(tag, count)| TagHit { tag, count })
        .collect();
    features.hashtags.sort_by(|a, b| b.count.cmp(&a.count).then(a.tag.cmp(&b.tag)));
    working = HASHTAG_RE.replace_all(&working, " HASHTAG ").into_owned();

    // Lowercase, strip residual punctuation, collapse whitespace.
    let lowered = working.to_lowercase();
    let cleaned = NON_WORD_RE.replace_all(&lowered, " ");
    let processed = SPACE_RE.replace_all(cleaned.trim(), " ").into_owned();

    let tokens: Vec<String> = processed.split_whitespace().map(str::to_string).collect();

    for (position, token) in tokens.iter().enumerate() {
        if let Some(base_score) = lexicon::word_score(token) {
            features.sentiment_words.push(SentimentWordHit {
                word: token.clone(),
                base_score,
                position,
            });
        }
        if let Some(multiplier) = lexicon::intensifier_multiplier(token) {
            features.intensifiers.push(IntensifierHit {
                word: token.clone(),
                multiplier,
                position,
            });
        }
    }

    (processed, tokens, features)
}

/// Run feature extraction over one RawItem.
pub fn process_item(item: &RawItem) -> ProcessedItem {
    let (processed_text, tokens, features) = extract_features(&item.original_text);
    ProcessedItem {
        id: item.id,
        original_text: item.original_text.clone(),
        processed_text,
        tokens,
        features,
        metadata: item.metadata.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_features() {
        let (processed, tokens, features) = extract_features("");
        assert!(processed.is_empty());
        assert!(tokens.is_empty());
        assert!(features.emojis.is_empty());
        assert!(features.sentiment_words.is_empty());
    }

    #[test]
    fn whitespace_only_input_yields_empty_features() {
        let (processed, tokens, _) = extract_features("   \n\t ");
        assert!(processed.is_empty());
        assert!(tokens.is_empty());
    }

    #[test]
    fn finds_sentiment_words_with_positions() {
        let (_, tokens, features) = extract_features("excellent produit, je recommande vraiment");
        assert_eq!(tokens[0], "excellent");
        let words: Vec<&str> = features.sentiment_words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["excellent", "recommande"]);
        assert_eq!(features.sentiment_words[0].position, 0);
        let intens: Vec<&str> = features.intensifiers.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(intens, vec!["vraiment"]);
    }

    #[test]
    fn counts_emojis_and_replaces_with_markers() {
        let (processed, _, features) = extract_features("super 😍😍 mais bon 😞");
        let love = features.emojis.iter().find(|e| e.emoji == "😍").unwrap();
        assert_eq!(love.count, 2);
        assert!(love.sentiment > 0.8);
        let sad = features.emojis.iter().find(|e| e.emoji == "😞").unwrap();
        assert_eq!(sad.sentiment, -0.5);
        assert!(processed.contains("emoji_pos"));
        assert!(processed.contains("emoji_neg"));
    }

    #[test]
    fn extracts_hashtags_mentions_and_urls() {
        let (processed, _, features) =
            extract_features("Voir https://example.com @Support #Livraison #livraison");
        assert_eq!(features.mentions.len(), 1);
        assert_eq!(features.mentions[0].tag, "@support");
        assert_eq!(features.hashtags.len(), 1);
        assert_eq!(features.hashtags[0].count, 2);
        assert!(processed.contains("url"));
        assert!(processed.contains("mention"));
        assert!(processed.contains("hashtag"));
        assert!(!processed.contains("example"));
    }

    #[test]
    fn emoticons_are_scored() {
        let (_, _, features) = extract_features("bien recu :) mais fragile :(");
        assert_eq!(features.emoticons.len(), 2);
        let smile = features.emoticons.iter().find(|e| e.emoji == ":)").unwrap();
        assert_eq!(smile.sentiment, 0.5);
    }

    #[test]
    fn accented_words_survive_cleaning() {
        let (processed, tokens, _) = extract_features("Très décevant!!!");
        assert_eq!(processed, "très décevant");
        assert_eq!(tokens.len(), 2);
    }
}
