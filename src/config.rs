use crate::model::{Label, RawValue};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Input of the `adjust` command.
///
/// Nothing is checked here: length mismatches are reported by
/// [`crate::adjust::adjust`] itself, and non-finite weights propagate.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct Input {
    /// Observation values; see [`RawValue::coerce`] for missing values.
    pub values: Vec<RawValue>,
    /// Group partitions, one label per value.
    pub groups: Vec<Vec<Label>>,
    /// Weights, one per group partition.
    pub weights: Vec<f64>,
}

impl Input {
    /// Load an [`Input`] from a TOML file.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        read_toml(file)
    }
}

/// Benchmark configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`BenchConfig::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct BenchConfig {
    /// Number of generated values.
    pub n_rows: usize,
    /// Number of timed repetitions per backend.
    pub n_reps: usize,
    /// Probability of a generated value being missing.
    pub prob_missing: f64,

    /// Number of distinct labels of each group partition.
    pub n_labels: Vec<usize>,
    /// Weight of each group partition.
    pub weights: Vec<f64>,

    /// Random number generator seed (OS entropy if absent).
    pub seed: Option<u64>,
}

impl BenchConfig {
    /// Load a [`BenchConfig`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`BenchConfig`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let config: BenchConfig = read_toml(file)?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.n_rows, 1..=100_000_000).context("invalid number of rows")?;
        check_num(self.n_reps, 1..=1000).context("invalid number of repetitions")?;
        check_num(self.prob_missing, 0.0..1.0).context("invalid missing probability")?;

        let n_groups = self.n_labels.len();
        for (i_grp, &n_labels) in self.n_labels.iter().enumerate() {
            check_num(n_labels, 1..=self.n_rows)
                .with_context(|| format!("invalid number of labels of group {i_grp}"))?;
        }
        check_vec(&self.weights, n_groups).context("invalid weights")?;

        Ok(())
    }
}

fn read_toml<T, P>(file: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let file = file.as_ref();
    let contents = fs::read_to_string(file).with_context(|| format!("failed to open {file:?}"))?;
    toml::from_str(&contents).with_context(|| format!("failed to deserialize {file:?}"))
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_vec(vec: &[f64], exp_len: usize) -> Result<()> {
    let len = vec.len();
    if len != exp_len {
        bail!("vector length must be {exp_len}, but is {len}");
    }
    check_weights(vec)
}

fn check_weights(weights: &[f64]) -> Result<()> {
    if let Some(i_wgt) = weights.iter().position(|wgt| !wgt.is_finite()) {
        bail!("weight {i_wgt} must be finite, but is {}", weights[i_wgt]);
    }
    Ok(())
}
