use std::fmt;
use std::ops::Range;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{AppError, Result};

use super::{Pipeline, NEGATIVE, POSITIVE};

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub text: String,
    pub label: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidationReport {
    pub total: usize,
    pub folds: usize,
    pub mean_f1: f64,
    /// Rows are the actual label, columns the prediction, both `[NEGATIVE, POSITIVE]`.
    pub confusion: [[usize; 2]; 2],
}

impl fmt::Display for CrossValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total headlines classified: {}", self.total)?;
        writeln!(f, "Folds: {}", self.folds)?;
        writeln!(f, "Score: {:.4}", self.mean_f1)?;
        writeln!(f, "Confusion matrix:")?;
        writeln!(f, "[[{} {}]", self.confusion[0][0], self.confusion[0][1])?;
        write!(f, " [{} {}]]", self.confusion[1][0], self.confusion[1][1])
    }
}

/// Read one headline per line from each file, decoding bytes as Latin-1.
pub fn load_training_set(positive: &Path, negative: &Path) -> Result<Vec<Sample>> {
    let mut samples = read_headlines(positive, POSITIVE)?;
    samples.extend(read_headlines(negative, NEGATIVE)?);
    Ok(samples)
}

fn read_headlines(path: &Path, label: i32) -> Result<Vec<Sample>> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::Training(format!("cannot read training file {}: {}", path.display(), e))
    })?;
    let text: String = bytes.iter().map(|&b| b as char).collect();

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Sample {
            text: line.to_string(),
            label,
        })
        .collect())
}

/// Shuffle, then score with contiguous k-fold splits.
pub fn cross_validate<R: Rng + ?Sized>(
    mut samples: Vec<Sample>,
    folds: usize,
    max_ngram: usize,
    rng: &mut R,
) -> Result<CrossValidationReport> {
    samples.shuffle(rng);
    k_fold(&samples, folds, max_ngram)
}

fn k_fold(samples: &[Sample], folds: usize, max_ngram: usize) -> Result<CrossValidationReport> {
    if folds < 2 || folds > samples.len() {
        return Err(AppError::Training(format!(
            "cannot split {} samples into {} folds",
            samples.len(),
            folds
        )));
    }

    let mut confusion = [[0usize; 2]; 2];
    let mut scores = Vec::with_capacity(folds);

    for test_range in fold_ranges(samples.len(), folds) {
        let mut train = Vec::new();
        let mut test = Vec::new();
        for (i, sample) in samples.iter().enumerate() {
            if test_range.contains(&i) {
                test.push(sample);
            } else {
                train.push(sample);
            }
        }

        let train_text: Vec<&str> = train.iter().map(|s| s.text.as_str()).collect();
        let train_labels: Vec<i32> = train.iter().map(|s| s.label).collect();
        let mut pipeline = Pipeline::new(max_ngram);
        pipeline.fit(&train_text, &train_labels)?;

        let test_text: Vec<&str> = test.iter().map(|s| s.text.as_str()).collect();
        let actual: Vec<i32> = test.iter().map(|s| s.label).collect();
        let predicted = pipeline.predict(&test_text);

        for (&a, &p) in actual.iter().zip(&predicted) {
            confusion[label_index(a)][label_index(p)] += 1;
        }
        scores.push(f1_score(&actual, &predicted, POSITIVE));
    }

    Ok(CrossValidationReport {
        total: samples.len(),
        folds,
        mean_f1: scores.iter().sum::<f64>() / scores.len() as f64,
        confusion,
    })
}

/// Contiguous test ranges; the first `n % k` folds get one extra sample.
fn fold_ranges(n: usize, k: usize) -> Vec<Range<usize>> {
    let base = n / k;
    let extra = n % k;
    let mut start = 0;
    (0..k)
        .map(|i| {
            let len = base + usize::from(i < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

fn label_index(label: i32) -> usize {
    usize::from(label == POSITIVE)
}

/// F1 for one label; 0.0 when it is neither present nor predicted.
pub fn f1_score(actual: &[i32], predicted: &[i32], positive: i32) -> f64 {
    let mut tp = 0.0;
    let mut fp = 0.0;
    let mut fn_ = 0.0;
    for (&a, &p) in actual.iter().zip(predicted) {
        match (a == positive, p == positive) {
            (true, true) => tp += 1.0,
            (false, true) => fp += 1.0,
            (true, false) => fn_ += 1.0,
            (false, false) => {}
        }
    }
    let denominator = 2.0 * tp + fp + fn_;
    if denominator == 0.0 {
        0.0
    } else {
        2.0 * tp / denominator
    }
}
