//! Grouped-mean backends.
//!
//! Each backend maps every position of a partition to the mean of the
//! non-missing values sharing its label. All backends accumulate values in
//! position order, so their results are bit-identical.

use crate::stats::Accumulator;
use rayon::prelude::*;
use serde::Serialize;
use std::{collections::HashMap, hash::Hash};

/// Strategy used to compute the per-label means.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One hash map per partition, looked up for every position.
    Hash,
    /// Labels encoded to dense codes, accumulators stored in a vector.
    #[default]
    Categorical,
    /// Categorical encoding with partitions processed on a thread pool.
    Parallel,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Hash, Backend::Categorical, Backend::Parallel];

    /// Compute the row means of every partition, in partition order.
    pub fn row_means<L, G>(self, vals: &[Option<f64>], groups: &[G]) -> Vec<Vec<Option<f64>>>
    where
        L: Eq + Hash + Sync,
        G: AsRef<[L]> + Sync,
    {
        match self {
            Backend::Hash => groups
                .iter()
                .map(|grp| hash_row_means(vals, grp.as_ref()))
                .collect(),
            Backend::Categorical => groups
                .iter()
                .map(|grp| categorical_row_means(vals, grp.as_ref()))
                .collect(),
            Backend::Parallel => groups
                .par_iter()
                .map(|grp| categorical_row_means(vals, grp.as_ref()))
                .collect(),
        }
    }
}

fn hash_row_means<L: Eq + Hash>(vals: &[Option<f64>], labels: &[L]) -> Vec<Option<f64>> {
    let mut acc_map: HashMap<&L, Accumulator> = HashMap::new();
    for (label, val) in labels.iter().zip(vals) {
        let acc = acc_map.entry(label).or_default();
        if let Some(val) = *val {
            acc.add(val);
        }
    }
    log::debug!("hashed {} labels", acc_map.len());

    labels
        .iter()
        .map(|label| acc_map.get(&label).and_then(Accumulator::mean))
        .collect()
}

fn categorical_row_means<L: Eq + Hash>(vals: &[Option<f64>], labels: &[L]) -> Vec<Option<f64>> {
    let (codes, n_codes) = encode_labels(labels);
    log::debug!("encoded {n_codes} labels");

    let mut acc_vec = vec![Accumulator::new(); n_codes];
    for (&code, val) in codes.iter().zip(vals) {
        if let Some(val) = *val {
            acc_vec[code].add(val);
        }
    }
    let means: Vec<_> = acc_vec.iter().map(Accumulator::mean).collect();

    codes.iter().map(|&code| means[code]).collect()
}

/// Encode labels as dense codes in first-seen order.
///
/// Returns the code of every position and the number of distinct labels.
fn encode_labels<L: Eq + Hash>(labels: &[L]) -> (Vec<usize>, usize) {
    let mut code_map: HashMap<&L, usize> = HashMap::new();
    let codes = labels
        .iter()
        .map(|label| {
            let next_code = code_map.len();
            *code_map.entry(label).or_insert(next_code)
        })
        .collect();
    (codes, code_map.len())
}
