//! ACO configuration.

use crate::error::AcoError;

/// Configuration for [`RouteDiscovery`](super::RouteDiscovery).
///
/// # Examples
///
/// ```
/// use u_aco::aco::AcoConfig;
///
/// let config = AcoConfig::default()
///     .with_alpha(1.0)
///     .with_beta(3.0)
///     .with_remaining_factor(0.6)
///     .with_max_iterations(200)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AcoConfig {
    /// Trail-following strength (pheromone exponent). Non-negative.
    pub alpha: f64,

    /// Greedy cost-avoidance strength (heuristic exponent). Non-negative.
    pub beta: f64,

    /// Value every pheromone entry starts from on initialize and reset.
    pub initial_pheromone: f64,

    /// Fraction of pheromone kept after each evaporation, in (0, 1).
    pub remaining_factor: f64,

    /// Reinforcement scale. Each ant deposits `q / tour_length` per edge.
    pub q: f64,

    /// Probability in [0, 1] that an ant ignores trails and picks
    /// uniformly among unvisited cities.
    pub random_factor: f64,

    /// Iterations executed by [`RouteDiscovery::run`](super::RouteDiscovery::run).
    pub max_iterations: usize,

    /// Ants per iteration. `None` uses one ant per city.
    pub number_of_ants: Option<usize>,

    /// Whether ants construct tours on rayon workers.
    ///
    /// Has no effect unless the `parallel` feature is enabled. Results are
    /// identical either way.
    pub parallel: bool,

    /// Random seed for [`RouteDiscovery::run`](super::RouteDiscovery::run).
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 5.0,
            initial_pheromone: 1.0,
            remaining_factor: 0.5,
            q: 500.0,
            random_factor: 0.01,
            max_iterations: 1000,
            number_of_ants: None,
            parallel: false,
            seed: None,
        }
    }
}

impl AcoConfig {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_initial_pheromone(mut self, value: f64) -> Self {
        self.initial_pheromone = value;
        self
    }

    pub fn with_remaining_factor(mut self, factor: f64) -> Self {
        self.remaining_factor = factor;
        self
    }

    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    /// Sets the exploration probability, clamped to [0, 1].
    pub fn with_random_factor(mut self, p: f64) -> Self {
        self.random_factor = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_number_of_ants(mut self, n: usize) -> Self {
        self.number_of_ants = Some(n);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Ant population for a colony over `cities` cities.
    pub fn ants_for(&self, cities: usize) -> usize {
        self.number_of_ants.unwrap_or(cities)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), AcoError> {
        let invalid = |msg: String| Err(AcoError::InvalidConfig(msg));

        if !(self.alpha >= 0.0 && self.alpha.is_finite()) {
            return invalid(format!("alpha must be finite and non-negative, got {}", self.alpha));
        }
        if !(self.beta >= 0.0 && self.beta.is_finite()) {
            return invalid(format!("beta must be finite and non-negative, got {}", self.beta));
        }
        if !(self.initial_pheromone > 0.0 && self.initial_pheromone.is_finite()) {
            return invalid(format!(
                "initial_pheromone must be finite and positive, got {}",
                self.initial_pheromone
            ));
        }
        if !(self.remaining_factor > 0.0 && self.remaining_factor < 1.0) {
            return invalid(format!(
                "remaining_factor must be in (0, 1), got {}",
                self.remaining_factor
            ));
        }
        if !(self.q > 0.0 && self.q.is_finite()) {
            return invalid(format!("q must be finite and positive, got {}", self.q));
        }
        if !(0.0..=1.0).contains(&self.random_factor) {
            return invalid(format!(
                "random_factor must be in [0, 1], got {}",
                self.random_factor
            ));
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be positive".into());
        }
        if self.number_of_ants == Some(0) {
            return invalid("number_of_ants must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AcoConfig::default();
        assert!((config.alpha - 1.0).abs() < 1e-12);
        assert!((config.beta - 5.0).abs() < 1e-12);
        assert!((config.remaining_factor - 0.5).abs() < 1e-12);
        assert!((config.q - 500.0).abs() < 1e-12);
        assert!((config.random_factor - 0.01).abs() < 1e-12);
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.ants_for(7), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ants_override() {
        let config = AcoConfig::default().with_number_of_ants(3);
        assert_eq!(config.ants_for(10), 3);
    }

    #[test]
    fn test_validate_remaining_factor_bounds() {
        for bad in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let config = AcoConfig::default().with_remaining_factor(bad);
            assert!(
                matches!(config.validate(), Err(AcoError::InvalidConfig(_))),
                "remaining_factor {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_negative_exponents() {
        assert!(AcoConfig::default().with_alpha(-1.0).validate().is_err());
        assert!(AcoConfig::default().with_beta(-0.5).validate().is_err());
        assert!(AcoConfig::default().with_alpha(0.0).validate().is_ok());
    }

    #[test]
    fn test_validate_counts() {
        assert!(AcoConfig::default().with_max_iterations(0).validate().is_err());
        assert!(AcoConfig::default().with_number_of_ants(0).validate().is_err());
    }

    #[test]
    fn test_validate_pheromone_and_q() {
        assert!(AcoConfig::default()
            .with_initial_pheromone(0.0)
            .validate()
            .is_err());
        assert!(AcoConfig::default().with_q(-5.0).validate().is_err());
    }

    #[test]
    fn test_random_factor_clamped() {
        assert_eq!(AcoConfig::default().with_random_factor(2.0).random_factor, 1.0);
        assert_eq!(AcoConfig::default().with_random_factor(-1.0).random_factor, 0.0);
    }
}
