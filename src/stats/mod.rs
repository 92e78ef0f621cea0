// gunc: Chimerism and contamination detection in prokaryotic genomes.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

//! Per-rank statistics.
//!
//! Functions here take plain counts and values so they can be used without
//! building a [TaxLevelGroup](crate::filter::TaxLevelGroup). Empty inputs
//! are valid and produce either 0 or NaN as documented on each function.
//!

pub mod entropy;

/// Required margin of the clade separation score over its expectation.
pub const ADJUSTMENT_MARGIN: f64 = 0.1;

/// Required genes retained index for a nonzero adjustment.
pub const MIN_GENES_RETAINED_INDEX: f64 = 0.4;

/// Adjusted clade separation scores above this are chimeric.
pub const CHIMERIC_THRESHOLD: f64 = 0.4;

/// Inverse Simpson index of `counts` minus one.
///
/// A single taxon gives 0, as does an empty input.
///
/// ## Usage
///
/// ```rust
/// use gunc::stats::n_effective_surplus_clades;
///
/// assert_eq!(n_effective_surplus_clades(&[17]), 0.0);
/// assert!((n_effective_surplus_clades(&[2, 8, 1, 1, 3]) - 1.8481).abs() < 1e-4);
/// ```
///
pub fn n_effective_surplus_clades(
    counts: &[u64],
) -> f64 {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0
    }
    let total = total as f64;
    let simpson: f64 = counts.iter().map(|x| {
        let p = *x as f64 / total;
        p * p
    }).sum();
    1.0 / simpson - 1.0
}

/// Share of hits outside the largest taxon.
///
/// NaN if `counts` is empty or sums to zero.
///
pub fn contamination_portion(
    counts: &[u64],
) -> f64 {
    let total: u64 = counts.iter().sum();
    let max = counts.iter().max().copied().unwrap_or(0);
    1.0 - max as f64 / total as f64
}

/// Arithmetic mean, NaN for an empty slice.
pub fn mean(
    values: &[f64],
) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean percent identity as a fraction, 0 if there are no hits.
pub fn mean_hit_identity(
    identities: &[f64],
) -> f64 {
    if identities.is_empty() {
        return 0.0
    }
    mean(identities) / 100.0
}

/// 0 if there is no contamination, otherwise `completeness`.
pub fn clade_separation_score(
    contamination_portion: f64,
    completeness: f64,
) -> f64 {
    if contamination_portion.is_nan() {
        f64::NAN
    } else if contamination_portion == 0.0 {
        0.0
    } else {
        completeness
    }
}

pub fn proportion_genes_retained(
    n_retained: usize,
    genes_mapped: usize,
) -> f64 {
    n_retained as f64 / genes_mapped as f64
}

/// Fraction of the called genes that mapped and were retained.
pub fn genes_retained_index(
    genes_called: usize,
    genes_mapped: usize,
    n_retained: usize,
) -> f64 {
    (genes_mapped as f64 / genes_called as f64) * proportion_genes_retained(n_retained, genes_mapped)
}

pub fn reference_representation_score(
    genes_retained_index: f64,
    mean_hit_identity: f64,
) -> f64 {
    genes_retained_index * mean_hit_identity
}

/// 1 if the separation is clearly above random and enough genes were retained.
///
/// Any NaN input gives 0.
///
pub fn determine_adjustment(
    clade_separation_score: f64,
    expected_clade_separation_score: f64,
    genes_retained_index: f64,
) -> u8 {
    let separated = clade_separation_score > expected_clade_separation_score + ADJUSTMENT_MARGIN;
    let retained = genes_retained_index > MIN_GENES_RETAINED_INDEX;
    u8::from(separated && retained)
}

pub fn is_chimeric(
    clade_separation_score_adjusted: f64,
) -> bool {
    clade_separation_score_adjusted > CHIMERIC_THRESHOLD
}
