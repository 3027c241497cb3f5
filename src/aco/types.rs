//! Task and facet model.
//!
//! Tasks are the "cities" of the tour. The engine only reads them: a
//! stable identifier plus the [`FacetsValue`] that drives the cost model
//! (`latency`) and the ant desirability weighting (`cpu`).

/// Unique task identifier.
pub type TaskId = i64;

/// Scheduling-relevant attributes of a task.
///
/// Values are taken as given. Callers are expected to supply finite,
/// non-negative numbers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FacetsValue {
    /// Network bandwidth available to the task.
    pub bandwidth: f64,
    /// Processing latency. This is the cost of travelling *to* the task.
    pub latency: f64,
    /// CPU weight, used as the greedy numerator in desirability.
    pub cpu: f64,
    /// Number of retries the dispatcher may attempt.
    pub retry_limit: u32,
    /// Execution timeout.
    pub timeout: f64,
}

impl FacetsValue {
    /// Facets with only latency and CPU weight set.
    pub fn new(latency: f64, cpu: f64) -> Self {
        Self {
            latency,
            cpu,
            ..Self::default()
        }
    }

    pub fn with_bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Input seam for the colony engine.
///
/// Implement this for whatever record the task-origination side hands
/// over; [`AllocatedTask`] is the ready-made implementation.
pub trait RoutableTask {
    /// Stable unique identifier. Duplicates collapse to one city.
    fn task_id(&self) -> TaskId;

    /// Facets used by the cost model and ant weighting.
    fn facets(&self) -> &FacetsValue;
}

/// A task handed over by the allocation service.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocatedTask {
    pub task_id: TaskId,
    pub facets: FacetsValue,
    /// Task this one depends on, if any. Carried through, never inspected.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dependant_task_id: Option<TaskId>,
}

impl AllocatedTask {
    pub fn new(task_id: TaskId, facets: FacetsValue) -> Self {
        Self {
            task_id,
            facets,
            dependant_task_id: None,
        }
    }

    pub fn with_dependant(mut self, task_id: TaskId) -> Self {
        self.dependant_task_id = Some(task_id);
        self
    }
}

impl RoutableTask for AllocatedTask {
    fn task_id(&self) -> TaskId {
        self.task_id
    }

    fn facets(&self) -> &FacetsValue {
        &self.facets
    }
}

impl<T: RoutableTask + ?Sized> RoutableTask for &T {
    fn task_id(&self) -> TaskId {
        (**self).task_id()
    }

    fn facets(&self) -> &FacetsValue {
        (**self).facets()
    }
}
