//! Dynamic time warping scorer.
//!
//! A single rolling row `d[0..S-1]` plus one scalar holding the previous
//! row's `d[j-1]` before it gets overwritten — the standard one-row DTW,
//! following the reference implementation's `dp_array` + `diagonal_value`
//! shape, but maximizing log-likelihoods rather than minimizing distances.

use crate::model::Template;
use crate::utterance::Utterance;

/// Stand-in for negative infinity at DTW cells with no valid predecessor.
const UNREACHABLE: f32 = f32::NEG_INFINITY;

/// Scores `utterance` against `template`'s Gaussian sequence via DTW,
/// returning the calibrated `ll_offset + ll_slope * D[T-1, S-1]`.
/// Returns `f32::NEG_INFINITY` if either sequence is empty (no valid path
/// exists).
pub fn score(utterance: &Utterance, template: &Template) -> f32 {
    let t = utterance.feature_vectors.len();
    let s = template.gaussians.len();
    if t == 0 || s == 0 {
        return f32::NEG_INFINITY;
    }

    let mut row = vec![UNREACHABLE; s];
    for (i, fv) in utterance.feature_vectors.iter().enumerate() {
        let mut diagonal = UNREACHABLE;
        for (j, gauss) in template.gaussians.iter().enumerate() {
            let emission = gauss.log_likelihood(&fv.cepstrum);
            let predecessor = if i == 0 && j == 0 {
                0.0
            } else {
                let vertical = if i > 0 { row[j] } else { UNREACHABLE };
                let horizontal = if j > 0 { row[j - 1] } else { UNREACHABLE };
                let diag = if i > 0 && j > 0 { diagonal } else { UNREACHABLE };
                vertical.max(horizontal).max(diag)
            };
            let new_value = predecessor + emission;
            diagonal = row[j];
            row[j] = new_value;
        }
    }

    let path_cost = row[s - 1];
    template.ll_offset + template.ll_slope * path_cost
}

/// Scores `utterance` against every template in `templates`, returning the
/// calibrated score for each, in the templates' order.
pub fn score_all(utterance: &Utterance, templates: &[Template]) -> Vec<(usize, f32)> {
    templates
        .iter()
        .map(|t| (t.index, score(utterance, t)))
        .collect()
}

/// Picks the template with the maximum calibrated score.
pub fn best_match(utterance: &Utterance, templates: &[Template]) -> Option<(usize, f32)> {
    score_all(utterance, templates)
        .into_iter()
        .fold(None, |best, candidate| match best {
            None => Some(candidate),
            Some((_, best_score)) if candidate.1 > best_score => Some(candidate),
            Some(existing) => Some(existing),
        })
}
