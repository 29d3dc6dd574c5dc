//! Snapshot-compare termination for iterative loops.

use crate::error::{AllocationError, Result};

/// Detects when a loop stops changing its state.
///
/// Each round hands in a snapshot of the state it iterates over. The loop
/// has converged once two consecutive snapshots are equal. A hard ceiling
/// turns a regression into [`AllocationError::NoConvergence`] instead of a
/// hang.
///
/// # Example
///
/// ```
/// use marketforge_solver::FixedPoint;
///
/// let mut remaining = 10usize;
/// let mut fixed_point = FixedPoint::new("halving", 100);
/// while !fixed_point.converged(remaining).unwrap() {
///     remaining /= 2;
/// }
/// assert_eq!(remaining, 0);
/// ```
#[derive(Debug, Clone)]
pub struct FixedPoint<T> {
    name: &'static str,
    limit: usize,
    iterations: usize,
    previous: Option<T>,
}

impl<T: PartialEq> FixedPoint<T> {
    pub fn new(name: &'static str, limit: usize) -> Self {
        Self {
            name,
            limit,
            iterations: 0,
            previous: None,
        }
    }

    /// Records a snapshot and returns true if it equals the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::NoConvergence`] once more than `limit`
    /// snapshots have been taken without convergence.
    pub fn converged(&mut self, snapshot: T) -> Result<bool> {
        if self.previous.as_ref() == Some(&snapshot) {
            return Ok(true);
        }
        self.iterations += 1;
        if self.iterations > self.limit {
            return Err(AllocationError::NoConvergence {
                loop_name: self.name,
                iterations: self.limit,
            });
        }
        self.previous = Some(snapshot);
        Ok(false)
    }

    /// Rounds run so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_on_repeat() {
        let mut fp = FixedPoint::new("test", 10);
        assert!(!fp.converged(3).unwrap());
        assert!(!fp.converged(2).unwrap());
        assert!(fp.converged(2).unwrap());
        assert_eq!(fp.iterations(), 2);
    }

    #[test]
    fn test_ceiling_reports_no_convergence() {
        let mut fp = FixedPoint::new("runaway", 3);
        let mut result = Ok(false);
        for i in 0..10 {
            result = fp.converged(i);
            if result.is_err() {
                break;
            }
        }
        match result {
            Err(AllocationError::NoConvergence {
                loop_name,
                iterations,
            }) => {
                assert_eq!(loop_name, "runaway");
                assert_eq!(iterations, 3);
            }
            other => panic!("expected NoConvergence, got {other:?}"),
        }
    }
}
