use crate::error::{AppError, Result};

use super::vectorizer::{CountVectorizer, TermCounts};

/// Multinomial naive Bayes over term counts with additive smoothing.
#[derive(Debug, Clone)]
pub struct MultinomialNb {
    alpha: f64,
    classes: Vec<i32>,
    class_log_prior: Vec<f64>,
    /// `feature_log_prob[class][feature]` = log P(feature | class)
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            classes: Vec::new(),
            class_log_prior: Vec::new(),
            feature_log_prob: Vec::new(),
        }
    }

    pub fn fit(&mut self, samples: &[TermCounts], labels: &[i32], n_features: usize) -> Result<()> {
        if samples.is_empty() || samples.len() != labels.len() {
            return Err(AppError::Training(format!(
                "need matching, non-empty samples and labels (got {} and {})",
                samples.len(),
                labels.len()
            )));
        }

        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let mut class_counts = vec![0usize; classes.len()];
        let mut feature_counts = vec![vec![0.0; n_features]; classes.len()];

        for (sample, label) in samples.iter().zip(labels) {
            let c = classes
                .binary_search(label)
                .map_err(|_| AppError::Training(format!("unknown label {}", label)))?;
            class_counts[c] += 1;
            for (&feature, &count) in sample {
                if feature < n_features {
                    feature_counts[c][feature] += count;
                }
            }
        }

        let total = samples.len() as f64;
        self.class_log_prior = class_counts
            .iter()
            .map(|&n| (n as f64 / total).ln())
            .collect();

        let smoothing = self.alpha * n_features as f64;
        self.feature_log_prob = feature_counts
            .into_iter()
            .map(|counts| {
                let class_total: f64 = counts.iter().sum::<f64>() + smoothing;
                counts
                    .into_iter()
                    .map(|count| ((count + self.alpha) / class_total).ln())
                    .collect()
            })
            .collect();
        self.classes = classes;
        Ok(())
    }

    /// Most likely class. Ties go to the lower label.
    pub fn predict(&self, sample: &TermCounts) -> Option<i32> {
        self.classes
            .iter()
            .enumerate()
            .map(|(c, &label)| {
                let log_prob = self.class_log_prior[c]
                    + sample
                        .iter()
                        .filter_map(|(&feature, &count)| {
                            self.feature_log_prob[c].get(feature).map(|p| p * count)
                        })
                        .sum::<f64>();
                (label, log_prob)
            })
            .fold(None, |best: Option<(i32, f64)>, (label, log_prob)| match best {
                Some((_, best_log_prob)) if best_log_prob >= log_prob => best,
                _ => Some((label, log_prob)),
            })
            .map(|(label, _)| label)
    }
}

impl Default for MultinomialNb {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Vectorizer and classifier trained together.
#[derive(Debug, Clone)]
pub struct Pipeline {
    vectorizer: CountVectorizer,
    classifier: MultinomialNb,
}

impl Pipeline {
    pub fn new(max_ngram: usize) -> Self {
        Self {
            vectorizer: CountVectorizer::new(1, max_ngram),
            classifier: MultinomialNb::default(),
        }
    }

    pub fn fit<S: AsRef<str>>(&mut self, texts: &[S], labels: &[i32]) -> Result<()> {
        let counts = self.vectorizer.fit_transform(texts);
        self.classifier
            .fit(&counts, labels, self.vectorizer.vocabulary_len())
    }

    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Vec<i32> {
        texts
            .iter()
            .map(|t| {
                let counts = self.vectorizer.transform(t.as_ref());
                self.classifier.predict(&counts).unwrap_or_default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{NEGATIVE, POSITIVE};

    #[test]
    fn learns_disjoint_vocabularies() {
        let texts = [
            "puppy adopted by kind family",
            "community celebrates kind volunteers",
            "markets crash as war spreads",
            "war leaves city in ruins",
        ];
        let labels = [POSITIVE, POSITIVE, NEGATIVE, NEGATIVE];

        let mut pipeline = Pipeline::new(2);
        pipeline.fit(&texts, &labels).unwrap();

        assert_eq!(
            pipeline.predict(&["kind puppy", "war and crash"]),
            vec![POSITIVE, NEGATIVE]
        );
    }

    #[test]
    fn unseen_text_falls_back_to_prior() {
        let mut pipeline = Pipeline::new(1);
        pipeline
            .fit(&["good news", "more good news", "bad news"], &[POSITIVE, POSITIVE, NEGATIVE])
            .unwrap();
        assert_eq!(pipeline.predict(&["zebra"]), vec![POSITIVE]);
    }

    #[test]
    fn rejects_empty_or_mismatched_input() {
        let mut nb = MultinomialNb::default();
        assert!(matches!(nb.fit(&[], &[], 0), Err(AppError::Training(_))));
        assert!(matches!(
            nb.fit(&[TermCounts::new()], &[POSITIVE, NEGATIVE], 0),
            Err(AppError::Training(_))
        ));
    }
}
