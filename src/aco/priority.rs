//! Priority extraction: best tour → dispatch rank per task.

use super::types::TaskId;
use std::collections::HashMap;

/// Task identifier → 1-based dispatch rank.
///
/// Rank 1 is the first city of the best tour, rank `N` the last.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PriorityMap {
    ranks: HashMap<TaskId, usize>,
}

impl PriorityMap {
    /// Rank of `task_id`, if it was part of the tour.
    pub fn get(&self, task_id: TaskId) -> Option<usize> {
        self.ranks.get(&task_id).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, usize)> + '_ {
        self.ranks.iter().map(|(&id, &rank)| (id, rank))
    }

    /// Task identifiers ordered by rank.
    pub fn ordered(&self) -> Vec<TaskId> {
        let mut ids: Vec<(TaskId, usize)> = self.iter().collect();
        ids.sort_by_key(|&(_, rank)| rank);
        ids.into_iter().map(|(id, _)| id).collect()
    }

    pub fn into_inner(self) -> HashMap<TaskId, usize> {
        self.ranks
    }
}

/// Assigns ranks `1..=N` to the tasks along `tour`.
///
/// `tour` holds city indices into `task_ids`.
pub fn extract_priorities(tour: &[usize], task_ids: &[TaskId]) -> PriorityMap {
    let ranks = tour
        .iter()
        .enumerate()
        .map(|(position, &city)| (task_ids[city], position + 1))
        .collect();
    PriorityMap { ranks }
}
