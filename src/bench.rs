use crate::adjust::adjust;
use crate::config::BenchConfig;
use crate::group::Backend;
use crate::stats::{Accumulator, AccumulatorReport};
use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Bernoulli, Normal, Uniform};
use serde::Serialize;
use std::time::Instant;

/// Synthetic benchmark dataset.
pub struct Dataset {
    pub vals: Vec<Option<f64>>,
    pub groups: Vec<Vec<usize>>,
    pub weights: Vec<f64>,
}

/// Timing summary of one backend, in milliseconds.
#[derive(Debug, Serialize)]
pub struct BackendReport {
    pub backend: Backend,
    pub time_ms: AccumulatorReport,
}

impl Dataset {
    /// Generate a random dataset following the given configuration.
    pub fn generate(cfg: &BenchConfig) -> Result<Self> {
        let mut rng = match cfg.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };

        let val_dist = Normal::new(0.0, 1.0)?;
        let missing_dist = Bernoulli::new(cfg.prob_missing)?;
        let vals: Vec<_> = (0..cfg.n_rows)
            .map(|_| {
                let val = val_dist.sample(&mut rng);
                (!missing_dist.sample(&mut rng)).then_some(val)
            })
            .collect();

        let mut groups: Vec<Vec<usize>> = Vec::with_capacity(cfg.n_labels.len());
        for &n_labels in &cfg.n_labels {
            let label_dist = Uniform::new(0, n_labels)?;
            groups.push((0..cfg.n_rows).map(|_| label_dist.sample(&mut rng)).collect());
        }

        Ok(Self {
            vals,
            groups,
            weights: cfg.weights.clone(),
        })
    }
}

/// Time every backend on a generated dataset and check that they agree.
pub fn run_benchmark(cfg: &BenchConfig) -> Result<Vec<BackendReport>> {
    let data = Dataset::generate(cfg).context("failed to generate dataset")?;
    log::info!(
        "generated {} values over {} groups",
        data.vals.len(),
        data.groups.len()
    );

    let reference = adjust(&data.vals, &data.groups, &data.weights, Backend::Hash)
        .context("failed to compute reference")?;

    let mut reports = Vec::with_capacity(Backend::ALL.len());
    for backend in Backend::ALL {
        let mut acc = Accumulator::new();
        for i_rep in 0..cfg.n_reps {
            let start = Instant::now();
            let result = adjust(&data.vals, &data.groups, &data.weights, backend)
                .with_context(|| format!("failed to adjust with {backend:?}"))?;
            acc.add(start.elapsed().as_secs_f64() * 1e3);

            if i_rep == 0 {
                check_agreement(&reference, &result)
                    .with_context(|| format!("{backend:?} disagrees with reference"))?;
            }
        }

        let time_ms = acc.report();
        log::info!(
            "{backend:?}: {:.3} ms +- {:.3} ms ({} reps)",
            time_ms.mean,
            time_ms.std_dev,
            time_ms.n_vals
        );
        reports.push(BackendReport { backend, time_ms });
    }

    Ok(reports)
}

fn check_agreement(reference: &[Option<f64>], result: &[Option<f64>]) -> Result<()> {
    let tol = 1e-9;
    if reference.len() != result.len() {
        bail!(
            "result length must be {}, but is {}",
            reference.len(),
            result.len()
        );
    }
    for (p, (ref_val, val)) in reference.iter().zip(result).enumerate() {
        match (ref_val, val) {
            (Some(ref_val), Some(val)) if (ref_val - val).abs() <= tol => {}
            (None, None) => {}
            _ => bail!("position {p} must be {ref_val:?} (tolerance: {tol}), but is {val:?}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench_config() -> BenchConfig {
        BenchConfig {
            n_rows: 600,
            n_reps: 2,
            prob_missing: 0.2,
            n_labels: vec![1, 3, 40],
            weights: vec![0.2, 0.3, 0.5],
            seed: Some(7),
        }
    }

    #[test]
    fn generated_dataset_follows_config() {
        let cfg = bench_config();
        let data = Dataset::generate(&cfg).expect("failed to generate dataset");

        assert_eq!(data.vals.len(), cfg.n_rows);
        assert_eq!(data.weights, cfg.weights);
        assert_eq!(data.groups.len(), cfg.n_labels.len());
        for (grp, &n_labels) in data.groups.iter().zip(&cfg.n_labels) {
            assert_eq!(grp.len(), cfg.n_rows);
            assert!(grp.iter().all(|&label| label < n_labels));
        }

        let n_missing = data.vals.iter().filter(|val| val.is_none()).count();
        assert!(n_missing > 0 && n_missing < cfg.n_rows);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let cfg = bench_config();
        let data_a = Dataset::generate(&cfg).expect("failed to generate dataset");
        let data_b = Dataset::generate(&cfg).expect("failed to generate dataset");
        assert_eq!(data_a.vals, data_b.vals);
        assert_eq!(data_a.groups, data_b.groups);
    }

    #[test]
    fn benchmark_reports_every_backend() {
        let cfg = bench_config();
        let reports = run_benchmark(&cfg).expect("failed to run benchmark");

        let backends: Vec<_> = reports.iter().map(|report| report.backend).collect();
        assert_eq!(backends, Backend::ALL);
        for report in &reports {
            assert_eq!(report.time_ms.n_vals, cfg.n_reps);
            assert!(report.time_ms.mean >= 0.0);
        }
    }

    #[test]
    fn agreement_check_catches_differences() {
        let reference = [Some(1.0), None];
        assert!(check_agreement(&reference, &[Some(1.0), None]).is_ok());
        assert!(check_agreement(&reference, &[Some(1.1), None]).is_err());
        assert!(check_agreement(&reference, &[Some(1.0), Some(0.0)]).is_err());
        assert!(check_agreement(&reference, &[Some(1.0)]).is_err());
    }
}
