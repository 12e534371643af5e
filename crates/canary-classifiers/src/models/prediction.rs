use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};

/// Verdict for a row that matches the baseline.
pub const NORMAL: i32 = 1;
/// Verdict for a row flagged as anomalous.
pub const ANOMALY: i32 = -1;

/// Which deviations from the baseline count as bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Only values above the baseline are bad (flag 0).
    Higher,
    /// Only values below the baseline are bad (flag 1).
    Lower,
    /// Deviations either way are bad (flag 2).
    #[default]
    Both,
}

impl Direction {
    pub fn from_flag(flag: u8) -> Result<Self> {
        match flag {
            0 => Ok(Direction::Higher),
            1 => Ok(Direction::Lower),
            2 => Ok(Direction::Both),
            other => Err(ClassifierError::InvalidDirection(other)),
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            Direction::Higher => 0,
            Direction::Lower => 1,
            Direction::Both => 2,
        }
    }

    /// Project a signed deviation (`value - reference`) onto the bad
    /// direction. Positive results point the bad way; deviations in an
    /// allowed direction come out negative.
    pub fn magnitude(self, deviation: f64) -> f64 {
        match self {
            Direction::Higher => deviation,
            Direction::Lower => -deviation,
            Direction::Both => deviation.abs(),
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = ClassifierError;

    fn try_from(flag: u8) -> Result<Self> {
        Direction::from_flag(flag)
    }
}

/// Outcome of one `predict` call: a verdict per test row and the share of
/// rows judged normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub verdicts: Vec<i32>,
    pub score: f64,
}

impl Prediction {
    pub fn from_verdicts(verdicts: Vec<i32>) -> Self {
        let score = if verdicts.is_empty() {
            1.0
        } else {
            verdicts.iter().filter(|&&v| v == NORMAL).count() as f64 / verdicts.len() as f64
        };
        Prediction { verdicts, score }
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Indices of the rows flagged anomalous.
    pub fn anomalies(&self) -> Vec<usize> {
        self.verdicts
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| if v == ANOMALY { Some(i) } else { None })
            .collect()
    }

    pub fn all_normal(&self) -> bool {
        self.verdicts.iter().all(|&v| v == NORMAL)
    }
}
