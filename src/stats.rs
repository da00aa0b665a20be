use serde::Serialize;

/// Mean and variance accumulator.
///
/// The mean is the plain arithmetic mean (sum over count); the variance
/// uses Welford's update.
#[derive(Clone, Default)]
pub struct Accumulator {
    n_vals: usize,
    sum: f64,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Serialize)]
pub struct AccumulatorReport {
    pub n_vals: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;
        self.sum += val;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    /// Mean of the values added so far, or `None` if nothing was added.
    pub fn mean(&self) -> Option<f64> {
        if self.n_vals == 0 {
            return None;
        }
        Some(self.sum / self.n_vals as f64)
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            n_vals: self.n_vals,
            mean: self.mean().unwrap_or(f64::NAN),
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}
