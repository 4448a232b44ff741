//! Offline bag-of-words headline classifier.
//!
//! Trains a multinomial naive-Bayes model on hand-labelled headlines and
//! reports k-fold cross-validation scores. Nothing here feeds the server.

mod evaluation;
mod naive_bayes;
mod vectorizer;

pub use evaluation::{cross_validate, load_training_set};
use naive_bayes::Pipeline;

pub const POSITIVE: i32 = 1;
pub const NEGATIVE: i32 = -1;
