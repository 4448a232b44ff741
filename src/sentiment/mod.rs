mod lexicon;
mod scorer;

use lexicon::Lexicon;
pub use scorer::Scorer;
