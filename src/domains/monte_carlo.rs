//! Monte Carlo driver for descent studies.
//!
//! Runs `N` independent trials (sample inputs, simulate, record) and
//! reduces them to a [`MonteCarloSummary`].
//!
//! # Determinism
//!
//! The summary is a pure function of the [`StudyConfig`]. The sequential
//! strategy threads one [`SimRng`] through all trials. The partitioned
//! strategy jumps a copy of the master stream to the first draw of each
//! contiguous trial range, so every trial sees the same inputs under both
//! strategies; results are concatenated in trial order before reduction,
//! so neither the worker count nor thread scheduling shows up in the
//! output.
//!
//! # Convergence
//!
//! The safe-fraction estimate has standard error `sqrt(p(1-p)/n)`, so its
//! confidence interval narrows at O(n^{-1/2}).

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ExecutionStrategy, InvalidSamplePolicy, StudyConfig};
use crate::descent::{DescentSimulator, TerminationReason, TrialInputs, TrialResult};
use crate::engine::rng::SimRng;
use crate::error::{DescentError, DescentResult, InvalidTrial};

use super::sampler::{ParameterSampler, DRAWS_PER_SAMPLE};

/// z-value of a two-sided 95% normal interval.
const Z_95: f64 = 1.96;

/// A trial that was excluded from the statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvalidTrialRecord {
    /// Zero-based trial index.
    pub trial: usize,
    /// Why it could not be simulated.
    pub reason: InvalidTrial,
    /// The offending sample.
    pub inputs: TrialInputs,
}

/// Descriptive statistics of one per-trial quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Number of observations.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator, 0 for fewer than two).
    pub std_dev: f64,
    /// Smallest observation.
    pub min: f64,
    /// Largest observation.
    pub max: f64,
}

/// Counts of each termination reason among valid trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationCounts {
    /// Touchdowns after engine cutoff.
    pub normal_touchdown: usize,
    /// Surface reached with the engine still firing.
    pub impact_during_braking: usize,
}

impl TerminationCounts {
    fn record(&mut self, reason: TerminationReason) {
        match reason {
            TerminationReason::NormalTouchdown => self.normal_touchdown += 1,
            TerminationReason::ImpactDuringBraking => self.impact_during_braking += 1,
        }
    }
}

/// Aggregate outcome of a Monte Carlo run.
///
/// All statistics and sequences cover valid trials only, in trial order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    /// Trials requested.
    pub trials: usize,
    /// Trials that produced a result.
    pub valid_trials: usize,
    /// Valid trials meeting both human-rating limits.
    pub safe_count: usize,
    /// `safe_count / valid_trials`, 0 when no trial was valid.
    pub safe_fraction: f64,
    /// 95% normal-approximation interval on the safe fraction, clamped to [0, 1].
    pub safe_fraction_ci: (f64, f64),
    /// Touchdown speed statistics (m/s).
    pub touchdown_speed: FieldStats,
    /// Maximum crew load statistics (Earth g).
    pub max_g_load: FieldStats,
    /// Touchdown time statistics (s).
    pub touchdown_time: FieldStats,
    /// Termination reason counts.
    pub terminations: TerminationCounts,
    /// Per-trial touchdown speeds.
    pub touchdown_speeds: Vec<f64>,
    /// Per-trial maximum crew loads.
    pub max_g_loads: Vec<f64>,
    /// Per-trial sampled inputs.
    pub inputs: Vec<TrialInputs>,
    /// Excluded trials.
    pub invalid_trials: Vec<InvalidTrialRecord>,
}

impl MonteCarloSummary {
    /// Number of excluded trials.
    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.invalid_trials.len()
    }

    /// Mean touchdown speed (m/s).
    #[must_use]
    pub const fn mean_touchdown_speed(&self) -> f64 {
        self.touchdown_speed.mean
    }

    /// Mean maximum crew load (Earth g).
    #[must_use]
    pub const fn mean_max_g_load(&self) -> f64 {
        self.max_g_load.mean
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> DescentResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DescentError::serialization(e.to_string()))
    }

    /// BLAKE3 hash of the compact JSON encoding, as hex.
    ///
    /// Two runs with the same configuration produce the same fingerprint.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn fingerprint(&self) -> DescentResult<String> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| DescentError::serialization(e.to_string()))?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

/// Welford running moments plus extrema.
#[derive(Debug, Clone, Copy)]
struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStats {
    fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn finish(&self) -> FieldStats {
        if self.count == 0 {
            return FieldStats::default();
        }
        let variance = if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        };
        FieldStats {
            count: self.count,
            mean: self.mean,
            std_dev: variance.sqrt(),
            min: self.min,
            max: self.max,
        }
    }
}

/// Incremental builder for a [`MonteCarloSummary`].
///
/// Trials must be pushed in trial order.
#[derive(Debug, Clone, Default)]
pub struct SummaryAccumulator {
    safe_count: usize,
    touchdown_speed: RunningStats,
    max_g_load: RunningStats,
    touchdown_time: RunningStats,
    terminations: TerminationCounts,
    touchdown_speeds: Vec<f64>,
    max_g_loads: Vec<f64>,
    inputs: Vec<TrialInputs>,
    invalid_trials: Vec<InvalidTrialRecord>,
}

impl SummaryAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accumulator with room for `trials` results.
    #[must_use]
    pub fn with_capacity(trials: usize) -> Self {
        Self {
            touchdown_speeds: Vec::with_capacity(trials),
            max_g_loads: Vec::with_capacity(trials),
            inputs: Vec::with_capacity(trials),
            ..Self::default()
        }
    }

    /// Record a valid trial.
    pub fn push(&mut self, inputs: TrialInputs, result: &TrialResult) {
        if result.safe {
            self.safe_count += 1;
        }
        self.touchdown_speed.update(result.touchdown_speed);
        self.max_g_load.update(result.max_g_load);
        self.touchdown_time.update(result.touchdown_time);
        self.terminations.record(result.termination);
        self.touchdown_speeds.push(result.touchdown_speed);
        self.max_g_loads.push(result.max_g_load);
        self.inputs.push(inputs);
    }

    /// Record an excluded trial.
    pub fn push_invalid(&mut self, record: InvalidTrialRecord) {
        self.invalid_trials.push(record);
    }

    /// Valid trials recorded so far.
    #[must_use]
    pub const fn valid_trials(&self) -> usize {
        self.touchdown_speed.count
    }

    /// Finalize into a summary over `trials` requested trials.
    #[must_use]
    pub fn finish(self, trials: usize) -> MonteCarloSummary {
        let valid_trials = self.valid_trials();
        let (safe_fraction, safe_fraction_ci) = if valid_trials == 0 {
            (0.0, (0.0, 0.0))
        } else {
            let n = valid_trials as f64;
            let p = self.safe_count as f64 / n;
            let half = Z_95 * (p * (1.0 - p) / n).sqrt();
            (p, ((p - half).max(0.0), (p + half).min(1.0)))
        };

        MonteCarloSummary {
            trials,
            valid_trials,
            safe_count: self.safe_count,
            safe_fraction,
            safe_fraction_ci,
            touchdown_speed: self.touchdown_speed.finish(),
            max_g_load: self.max_g_load.finish(),
            touchdown_time: self.touchdown_time.finish(),
            terminations: self.terminations,
            touchdown_speeds: self.touchdown_speeds,
            max_g_loads: self.max_g_loads,
            inputs: self.inputs,
            invalid_trials: self.invalid_trials,
        }
    }
}

/// Per-trial record before reduction.
#[derive(Debug, Clone, Copy)]
struct TrialRecord {
    trial: usize,
    inputs: TrialInputs,
    outcome: Result<TrialResult, InvalidTrial>,
}

/// Monte Carlo driver.
///
/// # Example
///
/// ```rust
/// use lunar_descent::config::StudyConfig;
/// use lunar_descent::domains::monte_carlo::MonteCarloDriver;
///
/// let config = StudyConfig::builder().trials(50).seed(7).build();
/// let summary = MonteCarloDriver::new(config).unwrap().run().unwrap();
/// assert_eq!(summary.trials, 50);
/// ```
#[derive(Debug, Clone)]
pub struct MonteCarloDriver {
    config: StudyConfig,
    simulator: DescentSimulator,
    sampler: ParameterSampler,
}

impl MonteCarloDriver {
    /// Validate the configuration and build a driver.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first violated parameter.
    pub fn new(config: StudyConfig) -> DescentResult<Self> {
        config.ensure_valid()?;
        let simulator = DescentSimulator::new(config.simulation)?;
        let sampler = ParameterSampler::new(config.sampler);
        Ok(Self {
            config,
            simulator,
            sampler,
        })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// Run all trials and reduce them to a summary.
    ///
    /// # Errors
    ///
    /// Returns [`DescentError::InvalidTrial`] for the first non-physical
    /// trial when the policy is [`InvalidSamplePolicy::Abort`].
    pub fn run(&self) -> DescentResult<MonteCarloSummary> {
        let mc = &self.config.monte_carlo;
        debug!(
            trials = mc.trials,
            seed = mc.seed,
            execution = ?mc.execution,
            "Starting Monte Carlo run"
        );

        let records = match mc.execution {
            ExecutionStrategy::Sequential => self.run_range(0..mc.trials),
            ExecutionStrategy::Partitioned { workers } => self.run_partitioned(workers),
        };

        let mut acc = SummaryAccumulator::with_capacity(mc.trials);
        for record in records {
            match record.outcome {
                Ok(result) => acc.push(record.inputs, &result),
                Err(reason) => {
                    if mc.invalid_policy == InvalidSamplePolicy::Abort {
                        return Err(DescentError::InvalidTrial {
                            trial: record.trial,
                            reason,
                        });
                    }
                    warn!(
                        trial = record.trial,
                        kind = reason.label(),
                        %reason,
                        "Excluding invalid trial"
                    );
                    acc.push_invalid(InvalidTrialRecord {
                        trial: record.trial,
                        reason,
                        inputs: record.inputs,
                    });
                }
            }
        }

        let summary = acc.finish(mc.trials);
        if summary.valid_trials == 0 {
            warn!(trials = mc.trials, "No valid trials; statistics are empty");
        }
        info!(
            trials = summary.trials,
            valid = summary.valid_trials,
            invalid = summary.invalid_count(),
            safe_fraction = summary.safe_fraction,
            mean_touchdown_speed = summary.mean_touchdown_speed(),
            mean_max_g_load = summary.mean_max_g_load(),
            "Monte Carlo run complete"
        );
        Ok(summary)
    }

    /// Contiguous trial ranges for `workers` partitions.
    ///
    /// The first `trials % workers` ranges are one trial longer. Empty
    /// ranges are dropped.
    #[must_use]
    pub fn partition(trials: usize, workers: usize) -> Vec<Range<usize>> {
        let workers = workers.max(1);
        let base = trials / workers;
        let extra = trials % workers;
        let mut ranges = Vec::with_capacity(workers);
        let mut start = 0;
        for worker in 0..workers {
            let len = base + usize::from(worker < extra);
            if len > 0 {
                ranges.push(start..start + len);
            }
            start += len;
        }
        ranges
    }

    fn run_partitioned(&self, workers: usize) -> Vec<TrialRecord> {
        let ranges = Self::partition(self.config.monte_carlo.trials, workers);
        debug!(partitions = ranges.len(), "Partitioned trial ranges");

        #[cfg(feature = "parallel")]
        let chunks: Vec<Vec<TrialRecord>> = {
            use rayon::iter::{IntoParallelIterator, ParallelIterator};
            ranges
                .into_par_iter()
                .map(|range| self.run_range(range))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let chunks: Vec<Vec<TrialRecord>> = ranges
            .into_iter()
            .map(|range| self.run_range(range))
            .collect();

        chunks.into_iter().flatten().collect()
    }

    /// Run one contiguous range on its own stream.
    ///
    /// Under the abort policy the range stops at its first invalid trial.
    fn run_range(&self, range: Range<usize>) -> Vec<TrialRecord> {
        let abort = self.config.monte_carlo.invalid_policy == InvalidSamplePolicy::Abort;
        let mut rng = SimRng::at_draw(
            self.config.monte_carlo.seed,
            range.start as u64 * DRAWS_PER_SAMPLE,
        );
        let mut records = Vec::with_capacity(range.len());

        for trial in range {
            let inputs = self.sampler.sample(&mut rng);
            let outcome = self.simulator.simulate(&inputs);
            let failed = outcome.is_err();
            records.push(TrialRecord {
                trial,
                inputs,
                outcome,
            });
            if failed && abort {
                break;
            }
        }

        records
    }
}
