//! Validation gate for roster replacement.
//!
//! Prevents data loss by refusing to replace the stored roster when the
//! upstream response looks degraded. Checks run in order and stop at the
//! first failure:
//!
//! 1. The fetched roster must not be empty.
//! 2. It must hold at least `min_roster_size` records.
//! 3. When a previous roster exists, its size must not move by more than
//!    `max_change_percent` in either direction.

use crate::error::{AppError, Result};
use crate::models::SafetyConfig;

/// Result of a gate check.
#[derive(Debug, Clone, PartialEq)]
pub enum GateResult {
    /// Safe to proceed with the replacement
    Safe {
        current_count: usize,
        previous_count: usize,
        change_percent: f64,
    },
    /// No previous roster; the change check does not apply
    FirstRun { current_count: usize },
    /// Upstream returned nothing
    EmptyResult,
    /// Upstream returned fewer records than required
    BelowMinimum { current_count: usize, minimum: usize },
    /// Roster size moved too far
    ExcessiveChange {
        current_count: usize,
        previous_count: usize,
        change_percent: f64,
    },
}

impl GateResult {
    /// Whether the pipeline may continue.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Safe { .. } | Self::FirstRun { .. })
    }
}

/// Absolute size change between two rosters, in percent of the previous size.
pub fn change_percent(previous_count: usize, current_count: usize) -> f64 {
    if previous_count == 0 {
        return 0.0;
    }
    let delta = previous_count.abs_diff(current_count);
    delta as f64 * 100.0 / previous_count as f64
}

/// Safety checks that must pass before the store is replaced.
#[derive(Debug, Clone)]
pub struct ValidationGate {
    config: SafetyConfig,
}

impl ValidationGate {
    /// Create a gate with the given thresholds.
    pub fn new(config: SafetyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SafetyConfig {
        &self.config
    }

    /// Classify a fetched roster size against the previous one.
    pub fn check(&self, current_count: usize, previous_count: usize) -> GateResult {
        if current_count == 0 {
            return GateResult::EmptyResult;
        }

        if current_count < self.config.min_roster_size {
            return GateResult::BelowMinimum {
                current_count,
                minimum: self.config.min_roster_size,
            };
        }

        if previous_count == 0 {
            return GateResult::FirstRun { current_count };
        }

        let change_percent = change_percent(previous_count, current_count);
        if change_percent > self.config.max_change_percent {
            return GateResult::ExcessiveChange {
                current_count,
                previous_count,
                change_percent,
            };
        }

        GateResult::Safe {
            current_count,
            previous_count,
            change_percent,
        }
    }

    /// Return Ok if the replacement may proceed, or the matching gate error.
    pub fn validate(&self, current_count: usize, previous_count: usize) -> Result<()> {
        match self.check(current_count, previous_count) {
            GateResult::Safe {
                current_count,
                previous_count,
                change_percent,
            } => {
                log::info!(
                    "Validation gate: SAFE ({} records, was {}, {:.1}% change)",
                    current_count,
                    previous_count,
                    change_percent
                );
                Ok(())
            }
            GateResult::FirstRun { current_count } => {
                log::info!(
                    "Validation gate: FIRST RUN ({} records, no previous roster)",
                    current_count
                );
                Ok(())
            }
            GateResult::EmptyResult => {
                log::error!("Validation gate: EMPTY RESULT - aborting");
                Err(AppError::EmptyUpstreamData)
            }
            GateResult::BelowMinimum {
                current_count,
                minimum,
            } => {
                log::error!(
                    "Validation gate: BELOW MINIMUM ({} records < {} required)",
                    current_count,
                    minimum
                );
                Err(AppError::BelowMinimumThreshold {
                    actual: current_count,
                    expected: minimum,
                })
            }
            GateResult::ExcessiveChange {
                current_count,
                previous_count,
                change_percent,
            } => {
                log::error!(
                    "Validation gate: TRIGGERED! {} → {} records ({:.1}% change > {}% threshold)",
                    previous_count,
                    current_count,
                    change_percent,
                    self.config.max_change_percent
                );
                Err(AppError::ExcessiveChange {
                    percent: change_percent,
                    threshold: self.config.max_change_percent,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(min_roster_size: usize, max_change_percent: f64) -> ValidationGate {
        ValidationGate::new(SafetyConfig {
            min_roster_size,
            max_change_percent,
        })
    }

    #[test]
    fn test_empty_rejected_regardless_of_thresholds() {
        for g in [gate(0, 100.0), gate(0, f64::MAX), gate(400, 30.0)] {
            assert_eq!(g.check(0, 0), GateResult::EmptyResult);
            assert_eq!(g.check(0, 1000), GateResult::EmptyResult);
            assert!(matches!(
                g.validate(0, 0),
                Err(AppError::EmptyUpstreamData)
            ));
        }
    }

    #[test]
    fn test_below_minimum() {
        let g = gate(400, 30.0);
        assert_eq!(
            g.check(399, 0),
            GateResult::BelowMinimum {
                current_count: 399,
                minimum: 400
            }
        );
        assert!(matches!(
            g.validate(120, 410),
            Err(AppError::BelowMinimumThreshold {
                actual: 120,
                expected: 400
            })
        ));
        assert!(g.check(400, 0).is_pass());
    }

    #[test]
    fn test_forty_percent_drop_rejected() {
        let g = gate(400, 30.0);
        match g.validate(600, 1000) {
            Err(AppError::ExcessiveChange { percent, threshold }) => {
                assert!((percent - 40.0).abs() < 1e-9);
                assert_eq!(threshold, 30.0);
            }
            other => panic!("expected excessive change, got {other:?}"),
        }
    }

    #[test]
    fn test_twenty_five_percent_drop_accepted() {
        let g = gate(400, 30.0);
        assert!(g.validate(750, 1000).is_ok());
        assert!(matches!(
            g.check(750, 1000),
            GateResult::Safe { change_percent, .. } if (change_percent - 25.0).abs() < 1e-9
        ));
    }

    #[test]
    fn test_growth_counts_as_change() {
        let g = gate(400, 30.0);
        assert!(matches!(
            g.check(1400, 1000),
            GateResult::ExcessiveChange { .. }
        ));
        assert!(g.check(1300, 1000).is_pass());
    }

    #[test]
    fn test_exact_threshold_is_allowed() {
        let g = gate(1, 30.0);
        assert!(g.check(700, 1000).is_pass());
        assert!(!g.check(699, 1000).is_pass());
    }

    #[test]
    fn test_first_run_skips_change_check() {
        let g = gate(1, 0.0);
        assert_eq!(
            g.check(5, 0),
            GateResult::FirstRun { current_count: 5 }
        );
        assert_eq!(
            gate(0, 30.0).check(100_000, 0),
            GateResult::FirstRun {
                current_count: 100_000
            }
        );
    }

    #[test]
    fn test_change_percent() {
        assert_eq!(change_percent(0, 10), 0.0);
        assert_eq!(change_percent(200, 150), 25.0);
        assert_eq!(change_percent(200, 250), 25.0);
        assert_eq!(change_percent(10, 10), 0.0);
    }
}
