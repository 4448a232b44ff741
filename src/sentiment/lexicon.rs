//! Headline sentiment lexicon.
//!
//! Each word carries a polarity in [-1, 1] and a subjectivity in [0, 1].
//! Event words common in news copy ("crash", "rescue") are kept fairly
//! objective; opinion words ("terrible", "wonderful") are highly subjective.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexiconEntry {
    pub polarity: f64,
    pub subjectivity: f64,
}

const POSITIVE: &[(&str, f64, f64)] = &[
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("excellent", 1.0, 1.0),
    ("amazing", 0.6, 0.9),
    ("wonderful", 1.0, 1.0),
    ("happy", 0.8, 1.0),
    ("love", 0.5, 0.6),
    ("hope", 0.3, 0.4),
    ("win", 0.8, 0.4),
    ("victory", 0.6, 0.3),
    ("success", 0.3, 0.1),
    ("successful", 0.75, 0.95),
    ("rescue", 0.4, 0.2),
    ("save", 0.3, 0.2),
    ("heal", 0.4, 0.3),
    ("cure", 0.5, 0.3),
    ("breakthrough", 0.6, 0.3),
    ("celebrate", 0.5, 0.4),
    ("free", 0.4, 0.8),
    ("peace", 0.5, 0.3),
    ("peaceful", 0.5, 0.6),
    ("safe", 0.5, 0.5),
    ("kind", 0.6, 0.9),
    ("help", 0.3, 0.1),
    ("hero", 0.6, 0.4),
    ("brave", 0.8, 1.0),
    ("gain", 0.3, 0.2),
    ("growth", 0.3, 0.2),
    ("rise", 0.2, 0.2),
    ("recover", 0.3, 0.2),
    ("recovery", 0.3, 0.2),
    ("boost", 0.3, 0.2),
    ("strong", 0.4, 0.7),
    ("benefit", 0.3, 0.2),
    ("improve", 0.4, 0.3),
    ("positive", 0.2, 0.5),
    ("joy", 0.8, 0.9),
    ("beautiful", 0.85, 1.0),
    ("fun", 0.3, 0.2),
    ("nice", 0.6, 1.0),
    ("award", 0.4, 0.2),
    ("honor", 0.4, 0.3),
    ("reunite", 0.5, 0.3),
    ("donate", 0.4, 0.2),
    ("generous", 0.6, 0.7),
    ("friendly", 0.4, 0.6),
    ("smile", 0.3, 0.4),
    ("thrive", 0.5, 0.3),
    ("innovative", 0.5, 0.6),
    ("welcome", 0.8, 0.9),
    ("support", 0.2, 0.1),
    ("adopt", 0.2, 0.1),
    ("kindness", 0.6, 0.7),
    ("inspire", 0.5, 0.5),
    ("discover", 0.2, 0.1),
    ("record", 0.1, 0.1),
    ("triumph", 0.7, 0.5),
    ("survive", 0.2, 0.2),
];

const NEGATIVE: &[(&str, f64, f64)] = &[
    ("bad", -0.7, 0.67),
    ("worst", -1.0, 1.0),
    ("worse", -0.4, 0.6),
    ("terrible", -1.0, 1.0),
    ("horrible", -1.0, 1.0),
    ("crash", -0.5, 0.3),
    ("kill", -0.6, 0.3),
    ("dead", -0.2, 0.4),
    ("death", -0.5, 0.2),
    ("die", -0.5, 0.3),
    ("murder", -0.8, 0.4),
    ("attack", -0.5, 0.2),
    ("war", -0.6, 0.3),
    ("bomb", -0.6, 0.3),
    ("shooting", -0.6, 0.3),
    ("crisis", -0.5, 0.2),
    ("disaster", -0.7, 0.4),
    ("flood", -0.4, 0.2),
    ("fail", -0.5, 0.3),
    ("failure", -0.3, 0.3),
    ("loss", -0.4, 0.2),
    ("lose", -0.4, 0.3),
    ("fear", -0.5, 0.4),
    ("threat", -0.4, 0.3),
    ("violence", -0.6, 0.3),
    ("violent", -0.8, 0.9),
    ("injure", -0.4, 0.3),
    ("injury", -0.4, 0.3),
    ("victim", -0.4, 0.3),
    ("fraud", -0.6, 0.4),
    ("scandal", -0.5, 0.4),
    ("corrupt", -0.6, 0.5),
    ("arrest", -0.3, 0.2),
    ("sad", -0.5, 1.0),
    ("angry", -0.5, 1.0),
    ("hate", -0.8, 0.9),
    ("wrong", -0.5, 0.9),
    ("poor", -0.4, 0.6),
    ("plunge", -0.5, 0.3),
    ("collapse", -0.6, 0.3),
    ("fall", -0.2, 0.2),
    ("drop", -0.2, 0.2),
    ("decline", -0.3, 0.2),
    ("recession", -0.5, 0.2),
    ("abuse", -0.7, 0.4),
    ("rape", -0.9, 0.4),
    ("terror", -0.7, 0.4),
    ("terrorist", -0.7, 0.4),
    ("protest", -0.2, 0.2),
    ("warn", -0.3, 0.3),
    ("warning", -0.3, 0.3),
    ("danger", -0.5, 0.3),
    ("dangerous", -0.6, 0.9),
    ("deadly", -0.7, 0.5),
    ("toxic", -0.5, 0.5),
    ("outbreak", -0.4, 0.2),
    ("sick", -0.7, 0.9),
    ("hurt", -0.5, 0.4),
    ("suffer", -0.5, 0.4),
    ("layoff", -0.4, 0.2),
    ("ban", -0.3, 0.2),
    ("slap", -0.3, 0.3),
    ("bleed", -0.5, 0.3),
    ("steal", -0.5, 0.3),
    ("stolen", -0.5, 0.3),
    ("lawsuit", -0.3, 0.2),
    ("chaos", -0.6, 0.5),
    ("panic", -0.6, 0.6),
    ("destroy", -0.6, 0.4),
    ("risk", -0.3, 0.3),
    ("conflict", -0.4, 0.3),
    ("hostage", -0.6, 0.3),
    ("missing", -0.2, 0.05),
    ("missile", -0.3, 0.2),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("really", 1.2),
    ("highly", 1.3),
    ("incredibly", 1.5),
    ("deeply", 1.3),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("barely", 0.5),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "nobody", "nothing", "cannot", "without",
];

/// Inflection suffixes tried, in order, when a word has no exact entry.
/// The second element is appended after stripping ("saving" -> "save").
const SUFFIXES: &[(&str, &str)] = &[
    ("s", ""),
    ("es", ""),
    ("d", ""),
    ("ed", ""),
    ("ing", ""),
    ("ing", "e"),
    ("ies", "y"),
    ("ied", "y"),
];

#[derive(Debug, Clone)]
pub struct Lexicon {
    words: HashMap<String, LexiconEntry>,
    intensifiers: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Lexicon {
    pub fn builtin() -> Self {
        let words = POSITIVE
            .iter()
            .chain(NEGATIVE.iter())
            .map(|&(word, polarity, subjectivity)| {
                (
                    word.to_string(),
                    LexiconEntry {
                        polarity,
                        subjectivity,
                    },
                )
            })
            .collect();

        let intensifiers = INTENSIFIERS
            .iter()
            .map(|&(word, multiplier)| (word.to_string(), multiplier))
            .collect();

        let negations = NEGATIONS.iter().map(|w| w.to_string()).collect();

        Self {
            words,
            intensifiers,
            negations,
        }
    }

    /// Look a lowercase word up, falling back to simple inflection stripping.
    pub fn lookup(&self, word: &str) -> Option<LexiconEntry> {
        if let Some(entry) = self.words.get(word) {
            return Some(*entry);
        }
        SUFFIXES.iter().find_map(|&(suffix, replacement)| {
            let stem = word.strip_suffix(suffix)?;
            if stem.len() < 2 {
                return None;
            }
            self.words.get(&format!("{}{}", stem, replacement)).copied()
        })
    }

    pub fn intensifier(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(word).copied()
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word) || word.ends_with("n't")
    }
}
