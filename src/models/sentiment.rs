use serde::{Deserialize, Serialize};

/// Polarity and subjectivity of a piece of text, always produced together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// -1.0 is fully negative, 1.0 fully positive.
    pub polarity: f64,
    /// 0.0 is fully objective, 1.0 fully subjective.
    pub subjectivity: f64,
}

impl Sentiment {
    pub const NEUTRAL: Sentiment = Sentiment {
        polarity: 0.0,
        subjectivity: 0.0,
    };

    /// Clamp both scores into range; anything non-finite collapses to neutral.
    pub fn clamped(polarity: f64, subjectivity: f64) -> Self {
        if !polarity.is_finite() || !subjectivity.is_finite() {
            return Self::NEUTRAL;
        }
        Self {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        }
    }
}

impl Default for Sentiment {
    fn default() -> Self {
        Self::NEUTRAL
    }
}
