//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs
//! - Schema validation via `serde` (`deny_unknown_fields`) and `validator`
//! - Semantic validation that names the offending parameter
//!
//! Everything here is checked before the first trial runs; a bad
//! configuration never produces partial results.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{DescentError, DescentResult};

/// Lunar surface gravity (m/s²).
pub const LUNAR_GRAVITY: f64 = 1.62;
/// Earth surface gravity used to express g-loads (m/s²).
pub const EARTH_GRAVITY: f64 = 9.81;
/// Human-rating touchdown speed limit (m/s).
pub const TOUCHDOWN_SPEED_LIMIT: f64 = 3.0;
/// Human-rating crew load limit (Earth g).
pub const MAX_G_LIMIT: f64 = 5.0;
/// Nominal braking thrust (N), three lunar weights of the nominal vehicle.
pub const NOMINAL_THRUST: f64 = 72_900.0;

/// Top-level study configuration.
///
/// Loaded from YAML files with full schema validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    /// Physical and numerical constants of the descent model.
    #[validate(nested)]
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Input distributions for the parameter sampler.
    #[validate(nested)]
    #[serde(default)]
    pub sampler: SamplerConfig,

    /// Trial count, seed and execution policy.
    #[validate(nested)]
    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,
}

impl StudyConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> DescentResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> DescentResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.ensure_valid()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> DescentResult<String> {
        serde_yaml::to_string(self).map_err(|e| DescentError::serialization(e.to_string()))
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> StudyConfigBuilder {
        StudyConfigBuilder::default()
    }

    /// Run schema and semantic validation on every section.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn ensure_valid(&self) -> DescentResult<()> {
        self.simulation.ensure_valid()?;
        self.sampler.ensure_valid()?;
        self.monte_carlo.ensure_valid()?;
        self.validate()?;
        Ok(())
    }
}

/// Configuration builder for programmatic construction.
///
/// Mirrors the knobs exposed on the command line.
#[derive(Debug, Default)]
pub struct StudyConfigBuilder {
    trials: Option<usize>,
    seed: Option<u64>,
    speed_mean: Option<f64>,
    thrust_multiplier: Option<f64>,
    dt: Option<f64>,
    v_target: Option<f64>,
    invalid_policy: Option<InvalidSamplePolicy>,
    execution: Option<ExecutionStrategy>,
}

impl StudyConfigBuilder {
    /// Set the number of Monte Carlo trials.
    #[must_use]
    pub const fn trials(mut self, trials: usize) -> Self {
        self.trials = Some(trials);
        self
    }

    /// Set the random seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the mean burn-start speed (m/s, downward).
    #[must_use]
    pub const fn speed_mean(mut self, speed: f64) -> Self {
        self.speed_mean = Some(speed);
        self
    }

    /// Set the multiplier applied to nominal thrust.
    #[must_use]
    pub const fn thrust_multiplier(mut self, multiplier: f64) -> Self {
        self.thrust_multiplier = Some(multiplier);
        self
    }

    /// Set the integration timestep in seconds.
    #[must_use]
    pub const fn timestep(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Set the engine cutoff speed.
    #[must_use]
    pub const fn v_target(mut self, v_target: f64) -> Self {
        self.v_target = Some(v_target);
        self
    }

    /// Set the invalid-sample policy.
    #[must_use]
    pub const fn invalid_policy(mut self, policy: InvalidSamplePolicy) -> Self {
        self.invalid_policy = Some(policy);
        self
    }

    /// Set the execution strategy.
    #[must_use]
    pub const fn execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = Some(execution);
        self
    }

    /// Build the configuration. Validation happens where it is consumed.
    #[must_use]
    pub fn build(self) -> StudyConfig {
        let mut config = StudyConfig::default();

        if let Some(trials) = self.trials {
            config.monte_carlo.trials = trials;
        }
        if let Some(seed) = self.seed {
            config.monte_carlo.seed = seed;
        }
        if let Some(speed) = self.speed_mean {
            config.sampler.speed_mean = speed;
        }
        if let Some(multiplier) = self.thrust_multiplier {
            config.sampler.thrust_multiplier = multiplier;
        }
        if let Some(dt) = self.dt {
            config.simulation.dt = dt;
        }
        if let Some(v_target) = self.v_target {
            config.simulation.v_target = v_target;
        }
        if let Some(policy) = self.invalid_policy {
            config.monte_carlo.invalid_policy = policy;
        }
        if let Some(execution) = self.execution {
            config.monte_carlo.execution = execution;
        }

        config
    }
}

/// Immutable physical and numerical constants of one descent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Lunar gravity magnitude (m/s²).
    pub gravity: f64,
    /// Earth gravity used to convert proper acceleration to g-load (m/s²).
    pub g_earth: f64,
    /// Integration timestep (s).
    pub dt: f64,
    /// Downward speed at which the braking burn is cut (m/s).
    #[validate(range(min = 0.0))]
    pub v_target: f64,
    /// Maximum touchdown speed for a safe landing (m/s).
    pub touchdown_speed_limit: f64,
    /// Maximum crew load for a safe landing (Earth g).
    pub max_g_limit: f64,
    /// Simulated-time cap for a single trial (s).
    pub max_time: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: LUNAR_GRAVITY,
            g_earth: EARTH_GRAVITY,
            dt: 0.02,
            v_target: 0.0,
            touchdown_speed_limit: TOUCHDOWN_SPEED_LIMIT,
            max_g_limit: MAX_G_LIMIT,
            max_time: 600.0,
        }
    }
}

impl SimulationConfig {
    /// Validate schema and physical constraints.
    ///
    /// # Errors
    ///
    /// Returns [`DescentError::Config`] naming the violated parameter.
    pub fn ensure_valid(&self) -> DescentResult<()> {
        require_positive("simulation.dt", self.dt)?;
        require_positive("simulation.gravity", self.gravity)?;
        require_positive("simulation.g_earth", self.g_earth)?;
        require_non_negative("simulation.v_target", self.v_target)?;
        require_positive("simulation.touchdown_speed_limit", self.touchdown_speed_limit)?;
        require_positive("simulation.max_g_limit", self.max_g_limit)?;
        require_positive("simulation.max_time", self.max_time)?;
        self.validate()?;
        Ok(())
    }

    /// Safety predicate shared by every termination path.
    #[must_use]
    pub fn is_safe(&self, touchdown_speed: f64, max_g_load: f64) -> bool {
        touchdown_speed <= self.touchdown_speed_limit && max_g_load <= self.max_g_limit
    }
}

/// Gaussian input distributions for the parameter sampler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct SamplerConfig {
    /// Mean vehicle mass (kg).
    pub mass_mean: f64,
    /// Mass standard deviation (kg).
    #[validate(range(min = 0.0))]
    pub mass_sigma: f64,
    /// Mean burn-start altitude (m).
    pub altitude_mean: f64,
    /// Altitude standard deviation (m).
    #[validate(range(min = 0.0))]
    pub altitude_sigma: f64,
    /// Mean burn-start downward speed (m/s).
    pub speed_mean: f64,
    /// Speed standard deviation (m/s).
    #[validate(range(min = 0.0))]
    pub speed_sigma: f64,
    /// Nominal thrust (N).
    pub thrust_nominal: f64,
    /// Multiplier applied to nominal thrust to get the thrust mean.
    #[validate(range(min = 0.0))]
    pub thrust_multiplier: f64,
    /// Thrust standard deviation as a fraction of the thrust mean.
    #[validate(range(min = 0.0))]
    pub thrust_sigma_fraction: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            mass_mean: 15_000.0,
            mass_sigma: 500.0,
            altitude_mean: 1_000.0,
            altitude_sigma: 50.0,
            speed_mean: 25.0,
            speed_sigma: 5.0,
            thrust_nominal: NOMINAL_THRUST,
            thrust_multiplier: 1.0,
            thrust_sigma_fraction: 0.10,
        }
    }
}

impl SamplerConfig {
    /// Distribution with every spread set to zero around the given means.
    #[must_use]
    pub fn degenerate(mass: f64, altitude: f64, speed: f64, thrust: f64) -> Self {
        Self {
            mass_mean: mass,
            mass_sigma: 0.0,
            altitude_mean: altitude,
            altitude_sigma: 0.0,
            speed_mean: speed,
            speed_sigma: 0.0,
            thrust_nominal: thrust,
            thrust_multiplier: 1.0,
            thrust_sigma_fraction: 0.0,
        }
    }

    /// Mean of the thrust distribution (N).
    #[must_use]
    pub fn thrust_mean(&self) -> f64 {
        self.thrust_nominal * self.thrust_multiplier
    }

    /// Standard deviation of the thrust distribution (N).
    #[must_use]
    pub fn thrust_sigma(&self) -> f64 {
        self.thrust_mean() * self.thrust_sigma_fraction
    }

    /// Validate distribution parameters.
    ///
    /// Tails are not truncated, so only the parameters themselves are
    /// checked here; non-physical draws are handled per trial.
    ///
    /// # Errors
    ///
    /// Returns [`DescentError::Config`] naming the violated parameter.
    pub fn ensure_valid(&self) -> DescentResult<()> {
        require_positive("sampler.mass_mean", self.mass_mean)?;
        require_non_negative("sampler.mass_sigma", self.mass_sigma)?;
        require_positive("sampler.altitude_mean", self.altitude_mean)?;
        require_non_negative("sampler.altitude_sigma", self.altitude_sigma)?;
        require_non_negative("sampler.speed_mean", self.speed_mean)?;
        require_non_negative("sampler.speed_sigma", self.speed_sigma)?;
        require_non_negative("sampler.thrust_nominal", self.thrust_nominal)?;
        require_non_negative("sampler.thrust_multiplier", self.thrust_multiplier)?;
        require_non_negative("sampler.thrust_sigma_fraction", self.thrust_sigma_fraction)?;
        self.validate()?;
        Ok(())
    }
}

/// What the driver does with a trial whose sample is non-physical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidSamplePolicy {
    /// Record the trial as invalid, exclude it from statistics, keep going.
    #[default]
    Exclude,
    /// Stop the run with [`DescentError::InvalidTrial`].
    Abort,
}

/// How trials are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum ExecutionStrategy {
    /// One random stream, trials in index order.
    #[default]
    Sequential,
    /// Contiguous trial ranges, one stream per range.
    Partitioned {
        /// Number of ranges (and workers with the `parallel` feature).
        workers: usize,
    },
}

/// Monte Carlo run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct MonteCarloConfig {
    /// Number of trials.
    #[validate(range(min = 1))]
    pub trials: usize,
    /// Master seed.
    pub seed: u64,
    /// Policy for non-physical samples.
    pub invalid_policy: InvalidSamplePolicy,
    /// Execution strategy.
    pub execution: ExecutionStrategy,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: 1_000,
            seed: 1,
            invalid_policy: InvalidSamplePolicy::Exclude,
            execution: ExecutionStrategy::Sequential,
        }
    }
}

impl MonteCarloConfig {
    /// Validate trial count and execution strategy.
    ///
    /// # Errors
    ///
    /// Returns [`DescentError::Config`] naming the violated parameter.
    pub fn ensure_valid(&self) -> DescentResult<()> {
        if self.trials == 0 {
            return Err(DescentError::config(
                "monte_carlo.trials must be a positive integer, got 0",
            ));
        }
        if let ExecutionStrategy::Partitioned { workers } = self.execution {
            if workers == 0 {
                return Err(DescentError::config(
                    "monte_carlo.execution.workers must be at least 1, got 0",
                ));
            }
        }
        self.validate()?;
        Ok(())
    }
}

fn require_positive(name: &str, value: f64) -> DescentResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DescentError::config(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

fn require_non_negative(name: &str, value: f64) -> DescentResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DescentError::config(format!(
            "{name} must be non-negative and finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = StudyConfig::default();

        assert_eq!(config.monte_carlo.trials, 1_000);
        assert_eq!(config.monte_carlo.seed, 1);
        assert!((config.simulation.gravity - 1.62).abs() < f64::EPSILON);
        assert!((config.simulation.touchdown_speed_limit - 3.0).abs() < f64::EPSILON);
        assert!((config.simulation.max_g_limit - 5.0).abs() < f64::EPSILON);
        assert!((config.sampler.mass_mean - 15_000.0).abs() < f64::EPSILON);
        assert!((config.sampler.mass_sigma - 500.0).abs() < f64::EPSILON);
        assert!((config.sampler.altitude_mean - 1_000.0).abs() < f64::EPSILON);
        assert!((config.sampler.speed_mean - 25.0).abs() < f64::EPSILON);
        assert!((config.sampler.thrust_mean() - 72_900.0).abs() < f64::EPSILON);
        assert!(config.ensure_valid().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StudyConfig::builder()
            .trials(250)
            .seed(12345)
            .speed_mean(30.0)
            .thrust_multiplier(1.5)
            .timestep(0.05)
            .build();

        assert_eq!(config.monte_carlo.trials, 250);
        assert_eq!(config.monte_carlo.seed, 12345);
        assert!((config.sampler.speed_mean - 30.0).abs() < f64::EPSILON);
        assert!((config.sampler.thrust_mean() - 109_350.0).abs() < 1e-9);
        assert!((config.sampler.thrust_sigma() - 10_935.0).abs() < 1e-9);
        assert!((config.simulation.dt - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_yaml_parse() {
        let yaml = r"
simulation:
  dt: 0.05
sampler:
  speed_mean: 40.0
monte_carlo:
  trials: 500
  seed: 7
  invalid_policy: abort
  execution:
    mode: partitioned
    workers: 4
";
        let config = StudyConfig::from_yaml(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.unwrap_or_default();
        assert!((config.simulation.dt - 0.05).abs() < f64::EPSILON);
        assert!((config.simulation.gravity - LUNAR_GRAVITY).abs() < f64::EPSILON);
        assert!((config.sampler.speed_mean - 40.0).abs() < f64::EPSILON);
        assert!((config.sampler.mass_mean - 15_000.0).abs() < f64::EPSILON);
        assert_eq!(config.monte_carlo.trials, 500);
        assert_eq!(config.monte_carlo.invalid_policy, InvalidSamplePolicy::Abort);
        assert_eq!(
            config.monte_carlo.execution,
            ExecutionStrategy::Partitioned { workers: 4 }
        );
    }

    #[test]
    fn test_config_yaml_roundtrip_through_builder() {
        let config = StudyConfig::builder().trials(42).seed(9).build();
        let yaml = config.to_yaml().unwrap_or_default();
        let parsed = StudyConfig::from_yaml(&yaml);
        assert!(parsed.is_ok());
        let parsed = parsed.unwrap_or_default();
        assert_eq!(parsed.monte_carlo, config.monte_carlo);
        assert_eq!(parsed.simulation, config.simulation);
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let yaml = r"
simulation:
  drag_coefficient: 0.3
";
        assert!(StudyConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_config_validation_fails_zero_trials() {
        let yaml = r"
monte_carlo:
  trials: 0
";
        let err = StudyConfig::from_yaml(yaml);
        assert!(err.is_err());
        let msg = err.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(msg.contains("trials"), "{msg}");
    }

    #[test]
    fn test_config_validation_fails_negative_trials() {
        let yaml = r"
monte_carlo:
  trials: -5
";
        assert!(StudyConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_config_validation_fails_non_positive_timestep() {
        for dt in [0.0, -0.01] {
            let mut config = StudyConfig::default();
            config.simulation.dt = dt;
            let err = config.ensure_valid();
            assert!(err.is_err());
            let msg = err.err().map(|e| e.to_string()).unwrap_or_default();
            assert!(msg.contains("simulation.dt"), "{msg}");
        }
    }

    #[test]
    fn test_config_accepts_coarse_timestep() {
        for dt in [1.0, 2.0, 10.0] {
            let mut config = StudyConfig::default();
            config.simulation.dt = dt;
            assert!(config.ensure_valid().is_ok(), "dt = {dt}");
        }
    }

    #[test]
    fn test_config_validation_fails_non_positive_mass() {
        let mut config = StudyConfig::default();
        config.sampler.mass_mean = 0.0;
        let msg = config.ensure_valid().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(msg.contains("sampler.mass_mean"), "{msg}");
    }

    #[test]
    fn test_config_validation_fails_negative_v_target() {
        let mut config = StudyConfig::default();
        config.simulation.v_target = -1.0;
        assert!(config.ensure_valid().is_err());
    }

    #[test]
    fn test_config_validation_fails_nan_limit() {
        let mut config = StudyConfig::default();
        config.simulation.max_g_limit = f64::NAN;
        assert!(config.ensure_valid().is_err());
    }

    #[test]
    fn test_config_validation_fails_zero_workers() {
        let config = StudyConfig::builder()
            .execution(ExecutionStrategy::Partitioned { workers: 0 })
            .build();
        let msg = config.ensure_valid().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(msg.contains("workers"), "{msg}");
    }

    #[test]
    fn test_zero_thrust_is_valid() {
        let mut config = StudyConfig::default();
        config.sampler.thrust_nominal = 0.0;
        assert!(config.ensure_valid().is_ok());
    }

    #[test]
    fn test_safety_predicate_boundaries() {
        let sim = SimulationConfig::default();
        assert!(sim.is_safe(3.0, 5.0));
        assert!(sim.is_safe(0.0, 0.0));
        assert!(!sim.is_safe(3.0001, 1.0));
        assert!(!sim.is_safe(1.0, 5.0001));
        assert!(!sim.is_safe(f64::NAN, 1.0));
    }

    #[test]
    fn test_degenerate_sampler() {
        let sampler = SamplerConfig::degenerate(15_000.0, 1_000.0, 25.0, 72_900.0);
        assert!(sampler.thrust_sigma().abs() < f64::EPSILON);
        assert!(sampler.ensure_valid().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir();
        assert!(dir.is_ok());
        let Ok(dir) = dir else { return };
        let path = dir.path().join("study.yaml");
        assert!(std::fs::write(&path, "monte_carlo:\n  trials: 10\n").is_ok());
        let config = StudyConfig::load(&path);
        assert!(config.is_ok());
        assert_eq!(config.map(|c| c.monte_carlo.trials).unwrap_or(0), 10);
    }

    #[test]
    fn test_load_missing_file() {
        let err = StudyConfig::load("/nonexistent/study.yaml");
        assert!(matches!(err, Err(DescentError::Io(_))));
    }
}
