use crate::group::Backend;
use std::hash::Hash;
use thiserror::Error;

/// Malformed input to [`adjust`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdjustError {
    #[error("weights must match number of groups ({n_weights} weights, {n_groups} groups)")]
    WeightCountMismatch { n_weights: usize, n_groups: usize },

    #[error("each group must match length of values (group {i_grp} has length {grp_len}, values have length {n_vals})")]
    GroupLengthMismatch {
        i_grp: usize,
        grp_len: usize,
        n_vals: usize,
    },
}

/// Demean `vals` against a weighted blend of group means.
///
/// For every position `p` the result is
/// `vals[p] - sum_i(weights[i] * mean_i(groups[i][p]))`, where `mean_i(label)`
/// is the mean of the non-missing values carrying `label` in partition `i`.
/// A missing value, or a label whose values are all missing, makes the
/// result missing at that position, as does an undefined (NaN) result.
/// Weights are used as given.
///
/// # Errors
/// Returns an error, before computing anything, if the number of weights
/// differs from the number of groups or if a group's length differs from
/// the number of values.
pub fn adjust<L, G>(
    vals: &[Option<f64>],
    groups: &[G],
    weights: &[f64],
    backend: Backend,
) -> Result<Vec<Option<f64>>, AdjustError>
where
    L: Eq + Hash + Sync,
    G: AsRef<[L]> + Sync,
{
    validate(vals.len(), groups, weights.len())?;
    log::debug!(
        "adjusting {} values over {} groups with the {backend:?} backend",
        vals.len(),
        groups.len()
    );

    let row_means_vec = backend.row_means(vals, groups);

    let mut weighted_sum = vec![Some(0.0); vals.len()];
    for (row_means, &weight) in row_means_vec.iter().zip(weights) {
        for (sum, &mean) in weighted_sum.iter_mut().zip(row_means) {
            *sum = sum.zip(mean).map(|(sum, mean)| sum + mean * weight);
        }
    }

    let demeaned = vals
        .iter()
        .zip(&weighted_sum)
        .map(|(&val, &sum)| Some(val? - sum?).filter(|demeaned| !demeaned.is_nan()))
        .collect();

    Ok(demeaned)
}

fn validate<L, G: AsRef<[L]>>(
    n_vals: usize,
    groups: &[G],
    n_weights: usize,
) -> Result<(), AdjustError> {
    let n_groups = groups.len();
    if n_weights != n_groups {
        return Err(AdjustError::WeightCountMismatch { n_weights, n_groups });
    }
    for (i_grp, grp) in groups.iter().enumerate() {
        let grp_len = grp.as_ref().len();
        if grp_len != n_vals {
            return Err(AdjustError::GroupLengthMismatch {
                i_grp,
                grp_len,
                n_vals,
            });
        }
    }
    Ok(())
}
