//! Dense square matrix used for edge costs and pheromone trails.

/// Row-major `n × n` matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    /// Creates an `n × n` matrix filled with `value`.
    pub fn filled(n: usize, value: f64) -> Self {
        Self {
            n,
            data: vec![value; n * n],
        }
    }

    /// Side length.
    pub fn dim(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.n + to]
    }

    #[inline]
    pub fn set(&mut self, from: usize, to: usize, value: f64) {
        self.data[from * self.n + to] = value;
    }

    #[inline]
    pub fn add(&mut self, from: usize, to: usize, delta: f64) {
        self.data[from * self.n + to] += delta;
    }

    /// Overwrites every entry with `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Multiplies every entry by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// Row `from` as a slice.
    pub fn row(&self, from: usize) -> &[f64] {
        &self.data[from * self.n..(from + 1) * self.n]
    }

    /// All entries in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.data
    }
}
