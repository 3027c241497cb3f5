//! A single agent constructing one candidate tour.

use super::config::AcoConfig;
use super::matrix::SquareMatrix;
use super::types::FacetsValue;
use crate::error::AcoError;
use rand::Rng;
use u_numflow::random::create_rng;

/// One ant of the colony.
///
/// Ants live in a pre-sized arena owned by the engine and are reset at the
/// start of every iteration. Each ant only writes its own trail and
/// membership set, so construction can run concurrently against the
/// frozen pheromone and cost matrices.
#[derive(Debug, Clone)]
pub struct Ant {
    trail: Vec<usize>,
    visited: Vec<bool>,
    weights: Vec<f64>,
    tour_length: f64,
    facets: FacetsValue,
    stream_seed: u64,
}

impl Ant {
    pub(crate) fn new(cities: usize, facets: FacetsValue) -> Self {
        Self {
            trail: Vec::with_capacity(cities),
            visited: vec![false; cities],
            weights: vec![0.0; cities],
            tour_length: 0.0,
            facets,
            stream_seed: 0,
        }
    }

    /// Clears the tour and places the ant on `start`.
    ///
    /// `stream_seed` seeds this ant's private random stream for the
    /// coming construction phase.
    pub(crate) fn reset(&mut self, start: usize, stream_seed: u64) {
        self.trail.clear();
        self.visited.fill(false);
        self.tour_length = 0.0;
        self.stream_seed = stream_seed;
        self.visit(start);
    }

    pub(crate) fn visit(&mut self, city: usize) {
        self.trail.push(city);
        self.visited[city] = true;
    }

    /// Whether `city` is already on this ant's trail.
    pub fn is_visited(&self, city: usize) -> bool {
        self.visited[city]
    }

    /// Cities in visiting order.
    pub fn trail(&self) -> &[usize] {
        &self.trail
    }

    /// Cost of the closed tour. Valid once [`is_complete`](Self::is_complete).
    pub fn tour_length(&self) -> f64 {
        self.tour_length
    }

    pub fn is_complete(&self) -> bool {
        self.trail.len() == self.visited.len()
    }

    pub fn facets(&self) -> &FacetsValue {
        &self.facets
    }

    fn current_city(&self) -> usize {
        self.trail[self.trail.len() - 1]
    }

    /// Directed edges of the closed tour, including last → first.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.trail
            .iter()
            .copied()
            .zip(self.trail.iter().copied().cycle().skip(1))
            .take(self.trail.len())
    }

    /// Extends the trail until every city is visited, then computes the
    /// tour length.
    pub(crate) fn construct_tour(
        &mut self,
        pheromones: &SquareMatrix,
        costs: &SquareMatrix,
        config: &AcoConfig,
    ) -> Result<(), AcoError> {
        let mut rng = create_rng(self.stream_seed);
        while !self.is_complete() {
            let next = self.select_next_city(pheromones, costs, config, &mut rng)?;
            self.visit(next);
        }
        self.compute_tour_length(costs);
        Ok(())
    }

    /// Sum of trail edge costs plus the closing edge.
    pub(crate) fn compute_tour_length(&mut self, costs: &SquareMatrix) -> f64 {
        self.tour_length = self.edges().map(|(from, to)| costs.get(from, to)).sum();
        self.tour_length
    }

    /// Picks the next unvisited city.
    ///
    /// With probability `random_factor` the pick is uniform. Otherwise it is
    /// a roulette-wheel draw over
    /// `pheromone[cur][l]^alpha * (cpu / cost[cur][l])^beta`.
    pub(crate) fn select_next_city<R: Rng>(
        &mut self,
        pheromones: &SquareMatrix,
        costs: &SquareMatrix,
        config: &AcoConfig,
        rng: &mut R,
    ) -> Result<usize, AcoError> {
        let current = self.current_city();

        if config.random_factor > 0.0 && rng.random_range(0.0..1.0) < config.random_factor {
            return self.pick_uniform(rng, |_| true);
        }

        let mut total = 0.0;
        let mut unbounded = 0usize;
        for to in 0..self.visited.len() {
            let weight = if self.visited[to] {
                0.0
            } else {
                self.desirability(pheromones.get(current, to), costs.get(current, to), config)
            };
            if weight == f64::INFINITY {
                unbounded += 1;
            }
            self.weights[to] = weight;
            total += weight;
        }

        // Zero-cost destinations dominate everything else.
        if unbounded > 0 {
            let weights = &self.weights;
            return self.pick_uniform(rng, |to| weights[to] == f64::INFINITY);
        }
        if total == 0.0 {
            return self.pick_uniform(rng, |_| true);
        }
        if total == f64::INFINITY {
            let max = self.weights.iter().copied().fold(0.0, f64::max);
            for w in &mut self.weights {
                *w /= max;
            }
            total = self.weights.iter().sum();
        }

        let r = rng.random_range(0.0..1.0) * total;
        let mut cumulative = 0.0;
        for (to, &weight) in self.weights.iter().enumerate() {
            cumulative += weight;
            if weight > 0.0 && cumulative >= r {
                return Ok(to);
            }
        }

        Err(AcoError::ExhaustedSearch {
            current_city: current,
        })
    }

    /// `pheromone^alpha * (cpu / cost)^beta` without NaN for valid facets.
    ///
    /// A zero-cost destination is infinitely desirable whatever its trail
    /// or the CPU weight. A zero trail term is zero whatever the heuristic.
    fn desirability(&self, pheromone: f64, cost: f64, config: &AcoConfig) -> f64 {
        if cost == 0.0 {
            return f64::INFINITY;
        }
        let trail = pheromone.powf(config.alpha);
        if trail == 0.0 {
            return 0.0;
        }
        trail * (self.facets.cpu / cost).powf(config.beta)
    }

    /// Uniform choice among unvisited cities accepted by `keep`.
    ///
    /// Counts the candidates, then walks to the k-th one, so no buffer is
    /// allocated per step.
    fn pick_uniform<R: Rng>(
        &self,
        rng: &mut R,
        keep: impl Fn(usize) -> bool,
    ) -> Result<usize, AcoError> {
        let is_candidate = |c: &usize| !self.visited[*c] && keep(*c);
        let exhausted = AcoError::ExhaustedSearch {
            current_city: self.current_city(),
        };

        let count = (0..self.visited.len()).filter(is_candidate).count();
        if count == 0 {
            return Err(exhausted);
        }
        let k = rng.random_range(0..count);
        (0..self.visited.len())
            .filter(is_candidate)
            .nth(k)
            .ok_or(exhausted)
    }

    #[cfg(test)]
    pub(crate) fn from_trail(trail: &[usize], tour_length: f64) -> Self {
        let mut ant = Self::new(trail.len(), FacetsValue::default());
        for &c in trail {
            ant.visit(c);
        }
        ant.tour_length = tour_length;
        ant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination_costs(latencies: &[f64]) -> SquareMatrix {
        let n = latencies.len();
        let mut m = SquareMatrix::filled(n, 0.0);
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    m.set(i, j, latencies[j]);
                }
            }
        }
        m
    }

    #[test]
    fn test_reset_marks_start_visited() {
        let mut ant = Ant::new(4, FacetsValue::new(1.0, 1.0));
        ant.reset(2, 9);
        assert_eq!(ant.trail(), &[2]);
        assert!(ant.is_visited(2));
        assert!(!ant.is_visited(0));
        assert!(!ant.is_complete());

        ant.visit(0);
        ant.reset(1, 9);
        assert_eq!(ant.trail(), &[1]);
        assert!(!ant.is_visited(0));
    }

    #[test]
    fn test_construct_tour_is_permutation() {
        let costs = destination_costs(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        let pheromones = SquareMatrix::filled(5, 1.0);
        let config = AcoConfig::default();

        let mut ant = Ant::new(5, FacetsValue::new(1.0, 1.0));
        ant.reset(3, 42);
        ant.construct_tour(&pheromones, &costs, &config).unwrap();

        let mut sorted = ant.trail().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
        assert_eq!(ant.trail()[0], 3);
        assert!((ant.tour_length() - 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_tour_length_includes_closing_edge() {
        let mut costs = SquareMatrix::filled(3, 0.0);
        costs.set(0, 1, 2.0);
        costs.set(1, 2, 3.0);
        costs.set(2, 0, 7.0);

        let mut ant = Ant::from_trail(&[0, 1, 2], 0.0);
        assert!((ant.compute_tour_length(&costs) - 12.0).abs() < 1e-12);
        assert_eq!(ant.edges().collect::<Vec<_>>(), vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn test_strong_trail_dominates_selection() {
        let costs = destination_costs(&[1.0, 1.0, 1.0]);
        let mut pheromones = SquareMatrix::filled(3, 1e-6);
        pheromones.set(0, 2, 1e6);
        let config = AcoConfig::default().with_random_factor(0.0);

        let mut rng = create_rng(7);
        for _ in 0..50 {
            let mut ant = Ant::new(3, FacetsValue::new(1.0, 1.0));
            ant.reset(0, 0);
            let next = ant
                .select_next_city(&pheromones, &costs, &config, &mut rng)
                .unwrap();
            assert_eq!(next, 2);
        }
    }

    #[test]
    fn test_never_selects_visited_city() {
        let costs = destination_costs(&[2.0, 2.0, 2.0, 2.0]);
        let pheromones = SquareMatrix::filled(4, 1.0);
        let config = AcoConfig::default().with_random_factor(0.5);

        let mut rng = create_rng(11);
        for _ in 0..100 {
            let mut ant = Ant::new(4, FacetsValue::new(1.0, 1.0));
            ant.reset(1, 0);
            ant.visit(3);
            let next = ant
                .select_next_city(&pheromones, &costs, &config, &mut rng)
                .unwrap();
            assert!(next == 0 || next == 2, "picked visited city {next}");
        }
    }

    #[test]
    fn test_zero_latency_destination_is_preferred() {
        let costs = destination_costs(&[5.0, 0.0, 5.0]);
        let pheromones = SquareMatrix::filled(3, 1.0);
        let config = AcoConfig::default().with_random_factor(0.0);

        let mut rng = create_rng(3);
        let mut ant = Ant::new(3, FacetsValue::new(5.0, 1.0));
        ant.reset(0, 0);
        let next = ant
            .select_next_city(&pheromones, &costs, &config, &mut rng)
            .unwrap();
        assert_eq!(next, 1);
    }

    #[test]
    fn test_zero_latency_with_zero_cpu_is_preferred() {
        let costs = destination_costs(&[5.0, 0.0, 5.0]);
        let pheromones = SquareMatrix::filled(3, 1.0);
        let config = AcoConfig::default().with_random_factor(0.0);

        let mut rng = create_rng(13);
        let mut ant = Ant::new(3, FacetsValue::new(0.0, 0.0));
        ant.reset(0, 0);
        let next = ant
            .select_next_city(&pheromones, &costs, &config, &mut rng)
            .unwrap();
        assert_eq!(next, 1);
    }

    #[test]
    fn test_zero_latency_with_decayed_trail_is_preferred() {
        let costs = destination_costs(&[5.0, 0.0, 5.0]);
        let pheromones = SquareMatrix::filled(3, 0.0);
        let config = AcoConfig::default().with_random_factor(0.0);

        let mut rng = create_rng(17);
        let mut ant = Ant::new(3, FacetsValue::new(5.0, 1.0));
        ant.reset(0, 0);
        let next = ant
            .select_next_city(&pheromones, &costs, &config, &mut rng)
            .unwrap();
        assert_eq!(next, 1);
    }

    #[test]
    fn test_all_zero_facets_complete_tour() {
        let costs = destination_costs(&[0.0, 0.0, 0.0, 0.0]);
        let pheromones = SquareMatrix::filled(4, 0.0);
        let config = AcoConfig::default().with_random_factor(0.0);

        let mut ant = Ant::new(4, FacetsValue::new(0.0, 0.0));
        ant.reset(2, 23);
        ant.construct_tour(&pheromones, &costs, &config).unwrap();

        let mut sorted = ant.trail().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
        assert_eq!(ant.tour_length(), 0.0);
    }

    #[test]
    fn test_uniform_pick_on_complete_trail_is_exhausted() {
        let mut ant = Ant::from_trail(&[0, 1], 0.0);
        let mut rng = create_rng(1);
        let err = ant.pick_uniform(&mut rng, |_| true).unwrap_err();
        assert_eq!(err, AcoError::ExhaustedSearch { current_city: 1 });
        ant.reset(0, 0);
        assert_eq!(ant.pick_uniform(&mut rng, |_| true), Ok(1));
    }

    #[test]
    fn test_zero_cpu_falls_back_to_uniform() {
        let costs = destination_costs(&[1.0, 2.0, 3.0]);
        let pheromones = SquareMatrix::filled(3, 1.0);
        let config = AcoConfig::default().with_random_factor(0.0);

        let mut ant = Ant::new(3, FacetsValue::new(1.0, 0.0));
        ant.reset(0, 5);
        ant.construct_tour(&pheromones, &costs, &config).unwrap();
        assert!(ant.is_complete());
    }

    #[test]
    fn test_nan_weights_report_exhausted_search() {
        let costs = destination_costs(&[1.0, 1.0]);
        let pheromones = SquareMatrix::filled(2, f64::NAN);
        let config = AcoConfig::default().with_random_factor(0.0);

        let mut rng = create_rng(1);
        let mut ant = Ant::new(2, FacetsValue::new(1.0, 1.0));
        ant.reset(0, 0);
        let err = ant
            .select_next_city(&pheromones, &costs, &config, &mut rng)
            .unwrap_err();
        assert_eq!(err, AcoError::ExhaustedSearch { current_city: 0 });
    }
}
