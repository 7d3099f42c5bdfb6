use std::{fmt, str::FromStr};

/// How aggressively near duplicates are dropped. Two frames count as the same
/// picture when their similarity exceeds `100 - threshold`, so a small
/// threshold is strict and a large one removes more.
#[derive(Clone, Copy, Debug, PartialOrd, PartialEq)]
pub struct Threshold(f64);

#[derive(thiserror::Error, Debug)]
#[error("not a valid threshold, expected a percentage in (0, 100]")]
pub struct ThresholdError;

impl Threshold {
    pub const DEFAULT: Self = Threshold(5.0);

    pub fn new(float: f64) -> Result<Self, ThresholdError> {
        if float.is_finite() && float > 0.0 && float <= 100.0 {
            Ok(Threshold(float))
        } else {
            Err(ThresholdError)
        }
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Whether a similarity percentage is close enough to count as a
    /// duplicate.
    pub fn is_duplicate(self, similarity_percent: f64) -> bool {
        similarity_percent > 100.0 - self.0
    }
}

impl From<Threshold> for f64 {
    fn from(value: Threshold) -> Self {
        value.as_f64()
    }
}

impl TryFrom<f64> for Threshold {
    type Error = ThresholdError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Threshold {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_suffix('%').unwrap_or(s);
        let num: f64 = s.parse().map_err(|_| ThresholdError)?;
        Self::new(num)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
