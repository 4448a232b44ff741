use std::sync::Arc;

use regex::Regex;

use crate::models::Sentiment;

use super::Lexicon;

/// Polarity of a sentiment word that follows a negation is scaled by this.
const NEGATION_FACTOR: f64 = -0.5;

/// Lexicon-averaging headline scorer.
///
/// Scoring is a pure function of the text. Text with no lexicon words,
/// including the empty string, scores as [`Sentiment::NEUTRAL`].
#[derive(Debug, Clone)]
pub struct Scorer {
    lexicon: Arc<Lexicon>,
    tokens: Regex,
}

impl Scorer {
    pub fn new(lexicon: Lexicon) -> Self {
        let tokens = Regex::new(r"[\p{L}\p{N}]+(?:'[\p{L}]+)?").expect("token pattern is valid");
        Self {
            lexicon: Arc::new(lexicon),
            tokens,
        }
    }

    pub fn score(&self, text: &str) -> Sentiment {
        let normalized = text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");

        let mut polarities = Vec::new();
        let mut subjectivities = Vec::new();
        let mut negated = false;
        let mut multiplier = 1.0;

        for token in self.tokens.find_iter(&normalized) {
            let word = token.as_str();

            if self.lexicon.is_negation(word) {
                negated = true;
                continue;
            }

            if let Some(m) = self.lexicon.intensifier(word) {
                multiplier = m;
                continue;
            }

            // Modifiers only reach the word directly after them
            if let Some(entry) = self.lexicon.lookup(word) {
                let mut polarity = entry.polarity * multiplier;
                if negated {
                    polarity *= NEGATION_FACTOR;
                }
                polarities.push(polarity.clamp(-1.0, 1.0));
                subjectivities.push((entry.subjectivity * multiplier).min(1.0));
            }
            negated = false;
            multiplier = 1.0;
        }

        if polarities.is_empty() {
            return Sentiment::NEUTRAL;
        }

        let count = polarities.len() as f64;
        Sentiment::clamped(
            polarities.iter().sum::<f64>() / count,
            subjectivities.iter().sum::<f64>() / count,
        )
    }

    /// Score an optional title; a missing title is neutral.
    pub fn score_title(&self, title: Option<&str>) -> Sentiment {
        title.map(|t| self.score(t)).unwrap_or(Sentiment::NEUTRAL)
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(Lexicon::builtin())
    }
}
