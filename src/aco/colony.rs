//! Colony engine: pheromone bookkeeping and the iteration loop.
//!
//! # Algorithm
//!
//! 1. Reset the ant arena: each ant starts on a random city
//! 2. Every ant extends its trail until all cities are visited
//! 3. Each ant computes the cost of its closed tour
//! 4. Evaporate: every pheromone entry is multiplied by `remaining_factor`
//! 5. Reinforce: each ant adds `q / tour_length` to every edge it used
//! 6. Keep the strictly shortest tour seen so far
//!
//! Steps 4-6 only start once every ant has finished step 3. This is the
//! single point where the pheromone matrix is written.
//!
//! # Reference
//!
//! Dorigo, M., Maniezzo, V. & Colorni, A. (1996). "Ant System: Optimization
//! by a Colony of Cooperating Agents", *IEEE Trans. SMC-B* 26(1), 29-41.

use super::ant::Ant;
use super::config::AcoConfig;
use super::matrix::SquareMatrix;
use super::priority::{extract_priorities, PriorityMap};
use super::types::{FacetsValue, RoutableTask, TaskId};
use crate::error::AcoError;
use rand::Rng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use u_numflow::random::create_rng;

/// Best tour found so far.
#[derive(Debug, Clone, PartialEq)]
pub struct BestTour {
    /// City indices in visiting order.
    pub order: Vec<usize>,
    /// Cost of the closed tour.
    pub cost: f64,
}

/// Result of [`RouteDiscovery::run`].
#[derive(Debug, Clone)]
pub struct AcoResult {
    /// Best tour over city indices.
    pub best: BestTour,

    /// Task identifiers in best-tour order.
    pub best_task_order: Vec<TaskId>,

    /// Dispatch ranks derived from the best tour.
    pub priorities: PriorityMap,

    /// Iterations completed by this run.
    pub iterations: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best cost after each completed iteration.
    pub cost_history: Vec<f64>,
}

/// Ant Colony Optimization engine over a set of tasks.
///
/// Cities are the distinct task identifiers, in first-seen order. Edge
/// cost `i → j` is the latency of task `j`: reaching a task costs its own
/// processing time, wherever the ant comes from.
///
/// # Examples
///
/// ```
/// use u_aco::aco::{AcoConfig, AllocatedTask, FacetsValue, RouteDiscovery};
///
/// let tasks = vec![
///     AllocatedTask::new(1, FacetsValue::new(10.0, 1.0)),
///     AllocatedTask::new(2, FacetsValue::new(1.0, 1.0)),
///     AllocatedTask::new(3, FacetsValue::new(5.0, 1.0)),
/// ];
/// let config = AcoConfig::default().with_max_iterations(50).with_seed(7);
/// let mut colony = RouteDiscovery::new(&tasks, config).unwrap();
/// let result = colony.run().unwrap();
/// assert_eq!(result.priorities.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct RouteDiscovery {
    config: AcoConfig,
    task_ids: Vec<TaskId>,
    facets: Vec<FacetsValue>,
    costs: SquareMatrix,
    pheromones: SquareMatrix,
    ants: Vec<Ant>,
    best: Option<BestTour>,
    iterations: usize,
    cost_history: Vec<f64>,
}

impl RouteDiscovery {
    /// Builds a colony over `tasks`.
    ///
    /// # Errors
    ///
    /// [`AcoError::InvalidInput`] for an empty task set,
    /// [`AcoError::InvalidConfig`] if `config` fails validation.
    pub fn new<T: RoutableTask>(tasks: &[T], config: AcoConfig) -> Result<Self, AcoError> {
        config.validate()?;
        if tasks.is_empty() {
            return Err(AcoError::InvalidInput("task set is empty".into()));
        }

        let mut seen = HashSet::with_capacity(tasks.len());
        let mut task_ids = Vec::with_capacity(tasks.len());
        let mut facets = Vec::with_capacity(tasks.len());
        for task in tasks {
            if seen.insert(task.task_id()) {
                task_ids.push(task.task_id());
                facets.push(*task.facets());
            }
        }

        let cities = task_ids.len();
        let mut costs = SquareMatrix::filled(cities, 0.0);
        for from in 0..cities {
            for (to, f) in facets.iter().enumerate() {
                if from != to {
                    costs.set(from, to, f.latency);
                }
            }
        }

        // Every ant weighs desirability with the same facets.
        let weighting = facets[0];
        let ants = (0..config.ants_for(cities))
            .map(|_| Ant::new(cities, weighting))
            .collect::<Vec<_>>();

        debug!(
            tasks = tasks.len(),
            cities,
            ants = ants.len(),
            duplicates = tasks.len() - cities,
            "route discovery initialized"
        );

        Ok(Self {
            pheromones: SquareMatrix::filled(cities, config.initial_pheromone),
            config,
            task_ids,
            facets,
            costs,
            ants,
            best: None,
            iterations: 0,
            cost_history: Vec::new(),
        })
    }

    /// Replaces the task set, keeping the configuration.
    ///
    /// On error the colony is left exactly as it was.
    pub fn initialize<T: RoutableTask>(&mut self, tasks: &[T]) -> Result<(), AcoError> {
        *self = Self::new(tasks, self.config.clone())?;
        Ok(())
    }

    /// Restores uniform pheromones and forgets the best tour.
    pub fn reset(&mut self) {
        self.pheromones.fill(self.config.initial_pheromone);
        self.best = None;
        self.iterations = 0;
        self.cost_history.clear();
    }

    pub fn config(&self) -> &AcoConfig {
        &self.config
    }

    pub fn number_of_cities(&self) -> usize {
        self.task_ids.len()
    }

    pub fn number_of_ants(&self) -> usize {
        self.ants.len()
    }

    /// Task identifier of each city index.
    pub fn task_ids(&self) -> &[TaskId] {
        &self.task_ids
    }

    /// Facets of each city index.
    pub fn city_facets(&self) -> &[FacetsValue] {
        &self.facets
    }

    pub fn costs(&self) -> &SquareMatrix {
        &self.costs
    }

    pub fn pheromones(&self) -> &SquareMatrix {
        &self.pheromones
    }

    /// Ants of the most recent iteration.
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn best_tour(&self) -> Option<&BestTour> {
        self.best.as_ref()
    }

    /// Iterations completed since construction or the last reset.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Best cost after each completed iteration.
    pub fn cost_history(&self) -> &[f64] {
        &self.cost_history
    }

    /// Priority map derived from the current best tour.
    ///
    /// # Errors
    ///
    /// [`AcoError::NotReady`] before the first completed iteration.
    pub fn best_priority_map(&self) -> Result<PriorityMap, AcoError> {
        let best = self.best.as_ref().ok_or(AcoError::NotReady)?;
        Ok(extract_priorities(&best.order, &self.task_ids))
    }

    /// Runs `config.max_iterations` iterations seeded from `config.seed`.
    pub fn run(&mut self) -> Result<AcoResult, AcoError> {
        self.run_with_cancel(None)
    }

    /// Like [`run`](Self::run), stopping early once `cancel` is set.
    pub fn run_with_cancel(
        &mut self,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AcoResult, AcoError> {
        let mut rng = match self.config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        let history_start = self.cost_history.len();
        let max_iterations = self.config.max_iterations;
        let completed = self.optimize_with_cancel(max_iterations, &mut rng, cancel)?;
        let cancelled = completed < max_iterations;

        let best = self.best.clone().ok_or(AcoError::NotReady)?;
        let priorities = extract_priorities(&best.order, &self.task_ids);
        let best_task_order = best.order.iter().map(|&c| self.task_ids[c]).collect();

        info!(
            iterations = completed,
            best_cost = best.cost,
            cancelled,
            "route discovery finished"
        );

        Ok(AcoResult {
            best,
            best_task_order,
            priorities,
            iterations: completed,
            cancelled,
            cost_history: self.cost_history[history_start..].to_vec(),
        })
    }

    /// Runs `max_iterations` iterations drawing randomness from `rng`.
    ///
    /// Pheromones carry over between calls, so two calls of 50 behave like
    /// one call of 100 on the same random stream.
    ///
    /// # Errors
    ///
    /// [`AcoError::ExhaustedSearch`] aborts the run. The best tour of
    /// earlier iterations stays available and the pheromone matrix is not
    /// touched by the failed iteration.
    pub fn optimize<R: Rng>(&mut self, max_iterations: usize, rng: &mut R) -> Result<(), AcoError> {
        self.optimize_with_cancel(max_iterations, rng, None)
            .map(|_| ())
    }

    /// Like [`optimize`](Self::optimize) with a cancellation flag checked
    /// before every iteration. Returns the number of iterations completed.
    pub fn optimize_with_cancel<R: Rng>(
        &mut self,
        max_iterations: usize,
        rng: &mut R,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<usize, AcoError> {
        for completed in 0..max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    warn!(completed, "route discovery cancelled");
                    return Ok(completed);
                }
            }
            self.iterate(rng)?;
        }
        Ok(max_iterations)
    }

    fn iterate<R: Rng>(&mut self, rng: &mut R) -> Result<(), AcoError> {
        self.setup_ants(rng);
        self.construct_tours()?;
        self.update_trails();
        self.update_best();

        self.iterations += 1;
        let best_cost = self.best.as_ref().map_or(f64::INFINITY, |b| b.cost);
        self.cost_history.push(best_cost);
        trace!(iteration = self.iterations, best_cost, "iteration complete");
        Ok(())
    }

    /// Places every ant on a random city and hands it a private stream seed.
    fn setup_ants<R: Rng>(&mut self, rng: &mut R) {
        let cities = self.number_of_cities();
        for ant in &mut self.ants {
            let start = rng.random_range(0..cities);
            let stream_seed: u64 = rng.random();
            ant.reset(start, stream_seed);
        }
    }

    /// Construction phase. Reads the matrices, writes only ant state.
    fn construct_tours(&mut self) -> Result<(), AcoError> {
        let pheromones = &self.pheromones;
        let costs = &self.costs;
        let config = &self.config;

        #[cfg(feature = "parallel")]
        if config.parallel {
            use rayon::prelude::*;
            return self
                .ants
                .par_iter_mut()
                .try_for_each(|ant| ant.construct_tour(pheromones, costs, config));
        }

        self.ants
            .iter_mut()
            .try_for_each(|ant| ant.construct_tour(pheromones, costs, config))
    }

    /// Evaporation followed by reinforcement, in ant order.
    fn update_trails(&mut self) {
        self.pheromones.scale(self.config.remaining_factor);

        for ant in &self.ants {
            let length = ant.tour_length();
            // A zero-length tour has no cost to reward.
            if length <= 0.0 {
                continue;
            }
            let contribution = self.config.q / length;
            for (from, to) in ant.edges() {
                self.pheromones.add(from, to, contribution);
            }
        }
    }

    fn update_best(&mut self) {
        let Some(shortest) = self
            .ants
            .iter()
            .reduce(|a, b| if b.tour_length() < a.tour_length() { b } else { a })
        else {
            return;
        };

        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| shortest.tour_length() < best.cost);
        if improved {
            debug!(
                iteration = self.iterations + 1,
                cost = shortest.tour_length(),
                "new best tour"
            );
            self.best = Some(BestTour {
                order: shortest.trail().to_vec(),
                cost: shortest.tour_length(),
            });
        }
    }
}

/// Builds a colony over `tasks`, runs it and returns the priority map.
pub fn discover_priorities<T: RoutableTask>(
    tasks: &[T],
    config: &AcoConfig,
) -> Result<PriorityMap, AcoError> {
    let mut colony = RouteDiscovery::new(tasks, config.clone())?;
    Ok(colony.run()?.priorities)
}
