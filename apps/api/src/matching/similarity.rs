//! Bag-of-words term vectors and cosine similarity.

use std::collections::HashMap;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "you", "your", "our", "are", "was", "were", "will", "have",
    "has", "had", "this", "that", "these", "those", "from", "into", "about", "who", "what",
    "which", "their", "they", "them", "his", "her", "its", "not", "but", "all", "any", "can",
    "also", "such", "than", "then", "there", "here", "able", "work", "working", "years", "year",
    "experience", "strong", "using", "use", "including", "etc",
];

/// Term frequencies of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    terms: HashMap<String, u32>,
}

impl TermVector {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, term: &str) -> u32 {
        self.terms.get(term).copied().unwrap_or(0)
    }

    fn norm(&self) -> f64 {
        self.terms
            .values()
            .map(|&c| (c as f64) * (c as f64))
            .sum::<f64>()
            .sqrt()
    }
}

/// Lowercased alphanumeric tokens longer than two chars, minus stop words.
pub fn embed(text: &str) -> TermVector {
    let mut terms = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() > 2 && !STOP_WORDS.contains(&t.as_str()))
    {
        *terms.entry(token).or_insert(0) += 1;
    }
    TermVector { terms }
}

/// Cosine similarity in `[0.0, 1.0]`. Returns `0.0` if either vector is empty.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (small, large) = if a.terms.len() <= b.terms.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .terms
        .iter()
        .map(|(term, &count)| count as f64 * large.get(term) as f64)
        .sum();

    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_filters_short_and_stop_words() {
        let v = embed("The Rust engineer and a Rust-based API, with Go");
        assert_eq!(v.get("rust"), 2);
        assert_eq!(v.get("engineer"), 1);
        assert_eq!(v.get("api"), 1);
        assert_eq!(v.get("the"), 0);
        assert_eq!(v.get("go"), 0);
    }

    #[test]
    fn test_identical_documents_score_one() {
        let a = embed("distributed systems rust tokio");
        let sim = cosine_similarity(&a, &a.clone());
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_documents_score_zero() {
        let a = embed("kubernetes terraform");
        let b = embed("watercolor illustration");
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_empty_vector_scores_zero() {
        assert_eq!(cosine_similarity(&embed(""), &embed("rust")), 0.0);
    }

    #[test]
    fn test_partial_overlap_between_bounds() {
        let sim = cosine_similarity(&embed("rust python docker"), &embed("rust java"));
        assert!(sim > 0.0 && sim < 1.0);
    }
}
