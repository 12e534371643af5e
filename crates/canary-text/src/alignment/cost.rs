use serde::{Deserialize, Serialize};

use crate::error::{Result, TextError};

/// Penalties of the alignment cost model. The wildcard always costs 0 to
/// insert or delete, so `base_penalty` must be positive.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentCost {
    pub base_penalty: u32,
}

impl Default for AlignmentCost {
    fn default() -> Self {
        AlignmentCost { base_penalty: 10 }
    }
}

impl AlignmentCost {
    pub fn new(base_penalty: u32) -> Result<Self> {
        let cost = AlignmentCost { base_penalty };
        cost.validate()?;
        Ok(cost)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_penalty == 0 {
            return Err(TextError::InvalidCost {
                base_penalty: self.base_penalty,
                reason: "must be greater than the wildcard cost of 0",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_penalty_is_rejected() {
        assert!(AlignmentCost::new(0).is_err());
        assert_eq!(AlignmentCost::new(7).unwrap().base_penalty, 7);
        assert_eq!(AlignmentCost::default().base_penalty, 10);
    }
}
