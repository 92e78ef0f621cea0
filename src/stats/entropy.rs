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

//! Entropy based scores over the pairing of contigs and taxon labels.
//!
//! All entropies use the natural logarithm. Label counts are collected in
//! first-seen order so floating point sums are evaluated in the same order
//! on every run.
//!

use indexmap::map::IndexMap;

/// Bucket sizes above this use the taxon entropy instead of the estimate.
pub const MAX_BUCKET_SIZE: usize = 500;

/// Number of occurrences of each label, in first-seen order.
pub fn value_counts<'a>(
    labels: &[&'a str],
) -> IndexMap<&'a str, u64> {
    let mut counts: IndexMap<&'a str, u64> = IndexMap::new();
    labels.iter().for_each(|label| {
        *counts.entry(*label).or_insert(0) += 1;
    });
    counts
}

/// Shannon entropy of a count distribution.
///
/// Zero counts are ignored. Returns 0 if all counts are zero.
///
pub fn entropy(
    counts: &[u64],
) -> f64 {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0
    }
    let total = total as f64;
    -counts.iter().filter(|x| **x > 0).map(|x| {
        let p = *x as f64 / total;
        p * p.ln()
    }).sum::<f64>()
}

/// How completely the hits of each taxon are confined to single contigs.
///
/// Computed as `1 - H(taxon | contig) / H(taxon)` over the pairs
/// `(contigs[i], taxons[i])`. Returns 1.0 if there are no pairs, if there
/// is only one taxon, or if all pairs are on one contig.
///
/// ## Usage
///
/// ```rust
/// use gunc::stats::entropy::completeness_score;
///
/// let contigs = vec!["c1", "c1", "c2", "c2"];
///
/// assert_eq!(completeness_score(&contigs, &["a", "a", "b", "b"]), 1.0);
/// assert_eq!(completeness_score(&contigs, &["a", "b", "a", "b"]), 0.0);
/// ```
///
pub fn completeness_score(
    contigs: &[&str],
    taxons: &[&str],
) -> f64 {
    debug_assert_eq!(contigs.len(), taxons.len());
    if contigs.is_empty() {
        return 1.0
    }

    let taxon_counts = value_counts(taxons).into_values().collect::<Vec<u64>>();
    let taxon_entropy = entropy(&taxon_counts);
    let contig_counts = value_counts(contigs);
    let contig_entropy = entropy(&contig_counts.values().copied().collect::<Vec<u64>>());
    if taxon_entropy == 0.0 || contig_entropy == 0.0 {
        return 1.0
    }

    let mut pair_counts: IndexMap<(&str, &str), u64> = IndexMap::new();
    contigs.iter().zip(taxons.iter()).for_each(|(contig, taxon)| {
        *pair_counts.entry((*contig, *taxon)).or_insert(0) += 1;
    });

    let n = contigs.len() as f64;
    let conditional_entropy = -pair_counts.iter().map(|((contig, _), count)| {
        let count = *count as f64;
        let contig_total = contig_counts[contig] as f64;
        (count / n) * (count / contig_total).ln()
    }).sum::<f64>();

    1.0 - conditional_entropy / taxon_entropy
}

/// Expected entropy of `sample_count` draws from `probabilities`.
///
/// Evaluates
/// `-(1/b) * sum_p sum_{k=1}^{b-1} C(b, k) p^k (1-p)^(b-k) k ln(k/b)`
/// with `b = sample_count`. Returns 0 for `sample_count` 0 or 1.
///
pub fn expected_entropy_estimate(
    probabilities: &[f64],
    sample_count: usize,
) -> f64 {
    if sample_count == 0 {
        return 0.0
    }
    let b = sample_count as f64;

    let mut entropy = 0.0;
    let mut binom_coef = 1.0;
    for k in 1..sample_count {
        binom_coef *= (sample_count - k + 1) as f64 / k as f64;
        let kf = k as f64;
        let split_entropy = kf * (kf / b).ln();
        entropy += probabilities.iter().map(|p| {
            binom_coef * p.powi(k as i32) * (1.0 - p).powi((sample_count - k) as i32) * split_entropy
        }).sum::<f64>();
    }

    -entropy / b
}

/// Completeness expected if the hits were assigned to contigs at random.
///
/// `contigs` and `taxons` pair each hit with its contig and taxon label.
/// Contigs are bucketed by their number of hits and each bucket
/// contributes the [expected_entropy_estimate] for its size, weighted by
/// the share of hits that fall in the bucket. Buckets larger than
/// [MAX_BUCKET_SIZE] contribute the taxon entropy instead.
///
/// Returns 0 if the taxon entropy is 0.
///
pub fn expected_clade_separation_score(
    contigs: &[&str],
    taxons: &[&str],
) -> f64 {
    let taxon_counts = value_counts(taxons).into_values().collect::<Vec<u64>>();
    let taxon_entropy = entropy(&taxon_counts);
    if taxon_entropy == 0.0 {
        return 0.0
    }

    let n_taxons: u64 = taxon_counts.iter().sum();
    let probabilities = taxon_counts.iter().map(|x| *x as f64 / n_taxons as f64).collect::<Vec<f64>>();

    let mut buckets: IndexMap<u64, u64> = IndexMap::new();
    value_counts(contigs).values().for_each(|hits_on_contig| {
        *buckets.entry(*hits_on_contig).or_insert(0) += 1;
    });
    let n_hits: u64 = buckets.iter().map(|(size, n_contigs)| size * n_contigs).sum();

    let total_entropy = buckets.iter().map(|(size, n_contigs)| {
        let contribution = (size * n_contigs) as f64 / n_hits as f64;
        let estimate = if *size as usize > MAX_BUCKET_SIZE {
            taxon_entropy
        } else {
            expected_entropy_estimate(&probabilities, *size as usize)
        };
        contribution * estimate
    }).sum::<f64>();

    1.0 - total_entropy / taxon_entropy
}
