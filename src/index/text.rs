//! Tokenization and query normalization.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}_]+").unwrap());

/// Common English words that carry no retrieval signal.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "before", "being", "between", "both", "but", "by", "can",
    "could", "did", "do", "does", "doing", "done", "down", "during", "each", "few", "for",
    "from", "further", "get", "got", "had", "has", "have", "having", "he", "her", "here",
    "hers", "him", "his", "how", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
    "other", "our", "ours", "out", "over", "own", "said", "same", "say", "says", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "us",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "would", "you", "your", "yours",
];

/// Lowercased words of at least two characters, stop words removed.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.chars().count() >= 2 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Every lowercased word seen in the indexed transcript text.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: HashSet<String>,
}

impl Vocabulary {
    /// Collect words from a set of texts.
    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let words = texts
            .into_iter()
            .flat_map(|t| WORD.find_iter(t).map(|m| m.as_str().to_lowercase()))
            .collect();
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The most similar known word, if its similarity reaches `min_ratio`.
    pub fn best_match(&self, word: &str, min_ratio: f64) -> Option<&str> {
        let len = word.chars().count();
        self.words
            .iter()
            .filter(|candidate| {
                // Similarity can't reach min_ratio if lengths differ too much.
                let c = candidate.chars().count();
                2.0 * c.min(len) as f64 / (c + len) as f64 >= min_ratio
            })
            .map(|candidate| (candidate, similarity(word, candidate)))
            .filter(|(_, ratio)| *ratio >= min_ratio)
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(candidate, _)| candidate.as_str())
    }
}

/// Normalized Indel similarity in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    rapidfuzz::fuzz::ratio(a.chars(), b.chars())
}

/// Minimum similarity for a split compound to be replaced by a known word.
const COMPOUND_MIN_RATIO: f64 = 0.85;

/// Clean up a user query before retrieval.
///
/// Lowercases, strips punctuation and merges adjacent words whose
/// concatenation is a known word ("data set" -> "dataset"). A near miss
/// ("free lancers" -> "freelancer") is only accepted when neither word is
/// known on its own, so "ai recommender" keeps both words.
pub fn normalize_query(query: &str, vocabulary: &Vocabulary) -> String {
    let tokens: Vec<String> = WORD
        .find_iter(&query.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect();

    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if let Some(next) = tokens.get(i + 1) {
            let combined = format!("{}{}", tokens[i], next);
            if vocabulary.contains(&combined) {
                merged.push(combined);
                i += 2;
                continue;
            }
            let both_unknown = !vocabulary.contains(&tokens[i]) && !vocabulary.contains(next);
            if both_unknown {
                if let Some(known) = vocabulary.best_match(&combined, COMPOUND_MIN_RATIO) {
                    merged.push(known.to_string());
                    i += 2;
                    continue;
                }
            }
        }
        merged.push(tokens[i].clone());
        i += 1;
    }

    merged.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("How does the Personalization recommender work?"),
            vec!["personalization", "recommender", "work"]
        );
        assert_eq!(tokenize("A/B testing, 2024!"), vec!["testing", "2024"]);
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert!((similarity("freelancer", "freelancers") - 20.0 / 21.0).abs() < 1e-9);
        assert!(similarity("airecommender", "recommender") >= COMPOUND_MIN_RATIO);
    }

    #[test]
    fn test_normalize_merges_compounds() {
        let vocab = Vocabulary::from_texts(["We built a dataset for the freelancer market."]);

        assert_eq!(normalize_query("Data set?", &vocab), "dataset");
        assert_eq!(
            normalize_query("How do I become a free lancers", &vocab),
            "how do i become a freelancer"
        );
        assert_eq!(normalize_query("what about data", &vocab), "what about data");
    }

    #[test]
    fn test_normalize_keeps_known_words() {
        let vocab = Vocabulary::from_texts(["Our AI team rebuilt the recommender."]);

        assert_eq!(normalize_query("AI recommender", &vocab), "ai recommender");
        assert_eq!(normalize_query("of recommender", &vocab), "of recommender");
        assert_eq!(normalize_query("recomender", &vocab), "recomender");
    }

    #[test]
    fn test_best_match_threshold() {
        let vocab = Vocabulary::from_texts(["recommender"]);
        assert_eq!(vocab.best_match("recomender", 0.85), Some("recommender"));
        assert_eq!(vocab.best_match("recipe", 0.85), None);
    }
}
