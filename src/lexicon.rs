//! Bundled lexicons: word sentiment tables (French and English),
//! intensifiers/negations, emoji and emoticon sentiment tables, and the
//! stop-word list shared by the vectorizer.
//!
//! Base word scores live in [-1, 1]. Intensifier multipliers scale an
//! adjacent sentiment word; a negative multiplier denotes negation.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

pub static SENTIMENT_LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        // French, strongly positive
        ("excellent", 0.9),
        ("parfait", 0.9),
        ("magnifique", 0.9),
        ("fantastique", 0.9),
        ("exceptionnel", 0.9),
        ("merveilleux", 0.8),
        ("formidable", 0.8),
        ("génial", 0.8),
        ("superbe", 0.8),
        ("remarquable", 0.8),
        ("extraordinaire", 0.9),
        ("incroyable", 0.8),
        ("sensationnel", 0.8),
        ("fabuleux", 0.8),
        ("sublime", 0.9),
        ("délicieux", 0.7),
        // French, positive
        ("bon", 0.6),
        ("bien", 0.5),
        ("agréable", 0.6),
        ("satisfait", 0.6),
        ("content", 0.6),
        ("heureux", 0.7),
        ("plaisant", 0.5),
        ("sympa", 0.5),
        ("cool", 0.5),
        ("top", 0.7),
        ("super", 0.7),
        ("chouette", 0.6),
        ("nickel", 0.6),
        ("parfaitement", 0.7),
        ("recommande", 0.6),
        ("satisfaisant", 0.5),
        ("réussi", 0.6),
        ("efficace", 0.5),
        ("adore", 0.8),
        ("aime", 0.6),
        ("rapide", 0.4),
        ("qualité", 0.4),
        // French, mildly positive
        ("ok", 0.2),
        ("correct", 0.3),
        ("convenable", 0.2),
        ("acceptable", 0.2),
        ("potable", 0.1),
        ("décent", 0.2),
        // French, strongly negative
        ("horrible", -0.9),
        ("catastrophique", -0.9),
        ("épouvantable", -0.9),
        ("affreux", -0.8),
        ("détestable", -0.8),
        ("ignoble", -0.9),
        ("scandaleux", -0.8),
        ("inadmissible", -0.8),
        ("inacceptable", -0.8),
        ("révoltant", -0.8),
        ("dégoûtant", -0.8),
        ("atroce", -0.9),
        ("lamentable", -0.8),
        ("pitoyable", -0.7),
        ("catastrophe", -0.9),
        ("arnaque", -0.8),
        ("déteste", -0.8),
        // French, negative
        ("mauvais", -0.6),
        ("nul", -0.7),
        ("décevant", -0.5),
        ("médiocre", -0.5),
        ("insuffisant", -0.4),
        ("raté", -0.6),
        ("minable", -0.7),
        ("pourri", -0.7),
        ("moche", -0.5),
        ("sale", -0.4),
        ("déçu", -0.5),
        ("énervé", -0.5),
        ("frustrant", -0.5),
        ("lent", -0.4),
        ("cher", -0.3),
        ("panne", -0.5),
        ("problème", -0.4),
        // French, mildly negative
        ("bof", -0.2),
        ("moyen", -0.2),
        ("limite", -0.3),
        ("passable", -0.1),
        // English, strongly positive
        ("perfect", 0.9),
        ("amazing", 0.8),
        ("awesome", 0.8),
        ("fantastic", 0.9),
        ("wonderful", 0.8),
        ("outstanding", 0.8),
        ("impressive", 0.7),
        // English, positive
        ("great", 0.7),
        ("good", 0.6),
        ("nice", 0.5),
        ("love", 0.7),
        ("like", 0.4),
        ("recommend", 0.6),
        ("satisfied", 0.6),
        ("happy", 0.7),
        ("pleased", 0.6),
        ("quality", 0.4),
        ("fast", 0.4),
        ("efficient", 0.5),
        // English, strongly negative
        ("terrible", -0.9),
        ("awful", -0.8),
        ("worst", -0.9),
        ("hate", -0.8),
        ("useless", -0.7),
        // English, negative
        ("bad", -0.6),
        ("dislike", -0.5),
        ("disappointing", -0.5),
        ("frustrated", -0.5),
        ("annoying", -0.5),
        ("problem", -0.4),
        ("issue", -0.3),
        ("slow", -0.4),
        ("expensive", -0.3),
        ("avoid", -0.5),
        ("regret", -0.6),
        ("waste", -0.6),
        ("broken", -0.6),
        ("failed", -0.6),
    ])
});

pub static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        // French amplifiers
        ("très", 1.5),
        ("vraiment", 1.3),
        ("hyper", 1.4),
        ("ultra", 1.5),
        ("extrêmement", 1.6),
        ("incroyablement", 1.5),
        ("absolument", 1.4),
        ("totalement", 1.4),
        ("complètement", 1.3),
        ("énormément", 1.4),
        ("terriblement", 1.3),
        ("particulièrement", 1.2),
        ("spécialement", 1.2),
        ("exceptionnellement", 1.5),
        // French attenuators
        ("assez", 0.8),
        ("plutôt", 0.8),
        ("relativement", 0.7),
        ("moyennement", 0.6),
        ("légèrement", 0.5),
        ("faiblement", 0.4),
        ("peu", 0.6),
        ("guère", 0.5),
        // French negations
        ("pas", -1.0),
        ("non", -1.0),
        ("jamais", -1.2),
        ("aucun", -1.1),
        ("aucune", -1.1),
        ("rien", -1.1),
        ("nullement", -1.3),
        ("aucunement", -1.2),
        ("sans", -0.9),
        ("ne", -0.8),
        // English amplifiers
        ("really", 1.4),
        ("very", 1.5),
        ("extremely", 1.8),
        ("absolutely", 1.5),
        ("totally", 1.4),
        // English negations
        ("not", -1.0),
        ("no", -1.0),
        ("never", -1.2),
        ("nothing", -1.1),
        ("without", -0.9),
    ])
});

pub static EMOJI_SENTIMENT: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        // strongly positive
        ("😍", 0.9),
        ("🥰", 0.9),
        ("😘", 0.8),
        ("💖", 0.8),
        ("❤️", 0.8),
        ("💕", 0.8),
        ("🎉", 0.7),
        ("🥳", 0.7),
        ("🤩", 0.8),
        ("😻", 0.8),
        ("🔥", 0.6),
        ("✨", 0.7),
        ("🌟", 0.7),
        ("💫", 0.7),
        ("🎊", 0.7),
        ("🙌", 0.6),
        ("👏", 0.6),
        ("💪", 0.6),
        // positive
        ("😊", 0.6),
        ("😃", 0.6),
        ("😄", 0.6),
        ("😁", 0.6),
        ("🙂", 0.5),
        ("😌", 0.5),
        ("👍", 0.5),
        ("👌", 0.5),
        ("✅", 0.4),
        ("😉", 0.5),
        ("😋", 0.6),
        ("🤗", 0.6),
        ("💚", 0.6),
        ("💙", 0.6),
        ("💜", 0.6),
        ("🧡", 0.6),
        ("💛", 0.6),
        // mildly positive
        ("🙃", 0.3),
        ("😏", 0.2),
        ("😎", 0.4),
        ("🤠", 0.3),
        ("🥴", 0.1),
        // neutral
        ("😐", 0.0),
        ("😑", 0.0),
        ("🤔", 0.0),
        ("😶", 0.0),
        ("🤷", 0.0),
        ("🫤", -0.1),
        // mildly negative
        ("😕", -0.2),
        ("🙄", -0.3),
        ("😮‍💨", -0.2),
        ("😤", -0.4),
        ("😒", -0.3),
        // negative
        ("😞", -0.5),
        ("😔", -0.5),
        ("😣", -0.6),
        ("👎", -0.5),
        ("😪", -0.4),
        ("😰", -0.6),
        ("😨", -0.5),
        ("😓", -0.4),
        ("😟", -0.5),
        ("😦", -0.4),
        // strongly negative
        ("😢", -0.8),
        ("😭", -0.8),
        ("😡", -0.9),
        ("😠", -0.9),
        ("🤬", -0.9),
        ("💔", -0.8),
        ("😱", -0.7),
        ("🤮", -0.8),
        ("😵", -0.7),
        ("🥺", -0.6),
        ("😩", -0.7),
        ("😫", -0.7),
        ("🤯", -0.7),
    ])
});

/// Text emoticons, checked longest-first so ":-)" wins over ":)".
pub static EMOTICON_SENTIMENT: Lazy<Vec<(&'static str, f64)>> = Lazy::new(|| {
    let mut table = vec![
        (":-)", 0.5),
        (":)", 0.5),
        ("=)", 0.5),
        (":-D", 0.7),
        (":D", 0.7),
        ("=D", 0.7),
        (":-P", 0.4),
        (":P", 0.4),
        ("^_^", 0.6),
        ("^^", 0.5),
        ("<3", 0.8),
        (":*", 0.6),
        (":-(", -0.5),
        (":(", -0.5),
        ("=(", -0.5),
        (">.>", -0.4),
        ("<_<", -0.4),
        (">_<", -0.6),
        (":-|", 0.0),
        (":|", 0.0),
        ("=|", 0.0),
    ];
    table.sort_by_key(|(pat, _)| std::cmp::Reverse(pat.len()));
    table
});

pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        // French
        "le", "de", "et", "à", "un", "il", "être", "avoir", "que", "pour", "dans", "ce", "son",
        "une", "sur", "avec", "ne", "se", "pas", "tout", "plus", "par", "grand", "comme", "autre",
        "voir", "bien", "aussi", "faire", "du", "la", "des", "les", "au", "aux", "je", "tu",
        "nous", "vous", "ils", "elles", "me", "te", "lui", "leur", "leurs", "mon", "ma", "mes",
        "ton", "ta", "tes", "notre", "votre", "vos", "qui", "quoi", "dont", "où", "quand",
        "comment", "pourquoi", "si", "oui", "non", "ou", "ni", "mais", "car", "donc", "alors",
        "cette", "ces", "cet", "celui", "celle", "ceux", "celles", "ici", "là", "déjà", "encore",
        "toujours", "jamais", "souvent", "parfois", "peut", "va", "vient", "doit", "dit", "fait",
        "très", "sont", "même",
        // English
        "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are",
        "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
        "should", "could", "can", "may", "might", "must", "a", "an", "this", "that", "these",
        "those", "i", "you", "he", "she", "it", "we", "they", "him", "her", "us", "them", "my",
        "your", "his", "its", "our", "their", "who", "what", "where", "when", "why", "how",
        "which", "if", "yes", "not", "so", "very", "just", "now", "then", "here", "there", "up",
        "down", "out", "off", "over", "under", "again", "further", "once", "more",
    ])
});

/// Placeholder tokens injected by preprocessing; excluded from the
/// vectorizer vocabulary.
pub fn is_placeholder_token(token: &str) -> bool {
    matches!(token, "url" | "mention" | "hashtag" | "email")
        || token.starts_with("emoji_")
        || token.starts_with("emoticon_")
}

pub fn word_score(word: &str) -> Option<f64> {
    SENTIMENT_LEXICON.get(word).copied()
}

pub fn intensifier_multiplier(word: &str) -> Option<f64> {
    INTENSIFIERS.get(word).copied()
}

pub fn emoji_score(emoji: &str) -> Option<f64> {
    EMOJI_SENTIMENT.get(emoji).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_scores_stay_in_range() {
        for (word, score) in SENTIMENT_LEXICON.iter() {
            assert!(
                (-1.0..=1.0).contains(score),
                "{word} has out-of-range score {score}"
            );
        }
        for (emoji, score) in EMOJI_SENTIMENT.iter() {
            assert!(
                (-1.0..=1.0).contains(score),
                "{emoji} has out-of-range score {score}"
            );
        }
    }

    #[test]
    fn negations_carry_negative_multipliers() {
        for w in ["pas", "non", "jamais", "not", "never"] {
            assert!(intensifier_multiplier(w).unwrap() < 0.0);
        }
        for w in ["très", "vraiment", "very", "extremely"] {
            assert!(intensifier_multiplier(w).unwrap() > 1.0);
        }
    }

    #[test]
    fn emoticons_ordered_longest_first() {
        let lengths: Vec<usize> = EMOTICON_SENTIMENT.iter().map(|(p, _)| p.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by_key(|l| std::cmp::Reverse(*l));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn placeholders_are_recognized() {
        assert!(is_placeholder_token("url"));
        assert!(is_placeholder_token("emoji_pos"));
        assert!(!is_placeholder_token("produit"));
    }
}
