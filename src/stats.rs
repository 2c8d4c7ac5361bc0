use conv::ValueFrom;

pub(crate) fn as_f64(value: usize) -> f64 {
    f64::value_from(value).unwrap_or(f64::MAX)
}

/// Running count, sum and sum of squares of a per-call quantity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    count: usize,
    sum: f64,
    sum_squares: f64,
}

impl Moments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: usize) {
        let value = as_f64(value);
        self.count += 1;
        self.sum += value;
        self.sum_squares += value * value;
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    #[must_use]
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / as_f64(self.count)
    }

    #[must_use]
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let average = self.average();
        let variance = self.sum_squares / as_f64(self.count) - average * average;
        variance.max(0.0).sqrt()
    }
}

/// Diagnostics gathered while a tree is built.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BuildStats {
    /// Leaves split by the clusterer.
    pub splits: usize,
    pub total_iterations: usize,
    pub max_iterations: usize,
    /// Distance evaluations spent choosing seeds.
    pub seed_evaluations: usize,
    /// Distance evaluations spent by the Lloyd iteration and the medoid steps.
    pub cluster_evaluations: usize,
}

impl BuildStats {
    #[must_use]
    pub fn average_iterations(&self) -> f64 {
        if self.splits == 0 {
            return 0.0;
        }
        as_f64(self.total_iterations) / as_f64(self.splits)
    }

    pub(crate) fn record_split(&mut self, iterations: usize) {
        self.splits += 1;
        self.total_iterations += iterations;
        self.max_iterations = self.max_iterations.max(iterations);
    }
}
