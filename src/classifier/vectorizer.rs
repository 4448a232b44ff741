use std::collections::HashMap;

use regex::Regex;

/// Sparse term counts, keyed by vocabulary index.
pub type TermCounts = HashMap<usize, f64>;

/// Word n-gram counter.
///
/// Text is lowercased and split into tokens of two or more word characters;
/// every run of `min_n..=max_n` consecutive tokens becomes one feature.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    min_n: usize,
    max_n: usize,
    vocabulary: HashMap<String, usize>,
    token_pattern: Regex,
}

impl CountVectorizer {
    pub fn new(min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        Self {
            min_n,
            max_n: max_n.max(min_n),
            vocabulary: HashMap::new(),
            token_pattern: Regex::new(r"\b\w\w+\b").expect("token pattern is valid"),
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .collect();

        let mut grams = Vec::new();
        for n in self.min_n..=self.max_n {
            if n > tokens.len() {
                break;
            }
            grams.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        grams
    }

    /// Rebuild the vocabulary from `texts`. Indices follow sorted term order.
    pub fn fit<S: AsRef<str>>(&mut self, texts: &[S]) {
        let mut terms: Vec<String> = texts
            .iter()
            .flat_map(|t| self.analyze(t.as_ref()))
            .collect();
        terms.sort();
        terms.dedup();

        self.vocabulary = terms.into_iter().enumerate().map(|(i, t)| (t, i)).collect();
    }

    /// Count known terms; unseen n-grams are ignored.
    pub fn transform(&self, text: &str) -> TermCounts {
        let mut counts = TermCounts::new();
        for gram in self.analyze(text) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }
        counts
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, texts: &[S]) -> Vec<TermCounts> {
        self.fit(texts);
        texts.iter().map(|t| self.transform(t.as_ref())).collect()
    }
}
