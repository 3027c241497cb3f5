//! Ant Colony Optimization (ACO) route discovery.
//!
//! Treats every distinct task as a city, searches for a short closed tour
//! with a colony of ants guided by pheromone trails and task facets, then
//! turns the best tour into a dispatch priority per task.
//!
//! # Key Types
//!
//! - [`RouteDiscovery`]: Owns the cost and pheromone matrices and runs the colony
//! - [`AcoConfig`]: Algorithm parameters (alpha, beta, evaporation, ...)
//! - [`PriorityMap`]: Task identifier → 1-based rank
//! - [`RoutableTask`]: Input seam, implemented by [`AllocatedTask`]
//!
//! # References
//!
//! - Dorigo, Maniezzo & Colorni (1996), "Ant System: Optimization by a Colony of Cooperating Agents"
//! - Dorigo & Stützle (2004), *Ant Colony Optimization*

mod ant;
mod colony;
mod config;
mod matrix;
mod priority;
mod types;

pub use ant::Ant;
pub use colony::{discover_priorities, AcoResult, BestTour, RouteDiscovery};
pub use config::AcoConfig;
pub use matrix::SquareMatrix;
pub use priority::{extract_priorities, PriorityMap};
pub use types::{AllocatedTask, FacetsValue, RoutableTask, TaskId};
