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
use crate::TaxLevel;
use crate::filter::TaxLevelGroup;
use crate::stats;
use crate::stats::entropy::completeness_score;
use crate::stats::entropy::expected_clade_separation_score;
use crate::taxonomy::JoinedHit;

use log::debug;

/// Genome level counts shared by all records of one genome.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenomeStats {
    pub genome: String,
    /// Distinct contigs with at least one hit.
    pub n_contigs: usize,
    pub n_genes_called: usize,
    /// Hits before the taxonomy join.
    pub n_genes_mapped: usize,
}

/// Scores of one genome at one taxonomic rank.
///
/// Fields are in output column order, see [ScoreRecord::COLUMNS].
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreRecord {
    pub genome: String,
    pub n_contigs: usize,
    pub n_genes_called: usize,
    pub n_genes_mapped: usize,
    pub taxonomic_level: TaxLevel,
    pub clade_separation_score: f64,
    pub contamination_portion: f64,
    pub n_effective_surplus_clades: f64,
    pub proportion_genes_retained_in_major_clades: f64,
    pub mean_hit_identity: f64,
    pub mean_random_clade_separation_score: f64,
    pub genes_retained_index: f64,
    pub reference_representation_score: f64,
    pub adjustment: u8,
    pub clade_separation_score_adjusted: f64,
    /// None if the adjusted score is NaN.
    pub chimeric: Option<bool>,
}

impl ScoreRecord {
    pub const COLUMNS: [&'static str; 16] = [
        "genome",
        "n_contigs",
        "n_genes_called",
        "n_genes_mapped",
        "taxonomic_level",
        "clade_separation_score",
        "contamination_portion",
        "n_effective_surplus_clades",
        "proportion_genes_retained_in_major_clades",
        "mean_hit_identity",
        "mean_random_clade_separation_score",
        "genes_retained_index",
        "reference_representation_score",
        "adjustment",
        "clade_separation_score_adjusted",
        "chimeric",
    ];

    /// Copy with every float field rounded to 2 decimals.
    pub fn rounded(&self) -> Self {
        let round = |x: f64| round_half_even(x, 2);
        ScoreRecord{
            clade_separation_score: round(self.clade_separation_score),
            contamination_portion: round(self.contamination_portion),
            n_effective_surplus_clades: round(self.n_effective_surplus_clades),
            proportion_genes_retained_in_major_clades: round(self.proportion_genes_retained_in_major_clades),
            mean_hit_identity: round(self.mean_hit_identity),
            mean_random_clade_separation_score: round(self.mean_random_clade_separation_score),
            genes_retained_index: round(self.genes_retained_index),
            reference_representation_score: round(self.reference_representation_score),
            clade_separation_score_adjusted: round(self.clade_separation_score_adjusted),
            ..self.clone()
        }
    }
}

/// Round `x` to `decimals` places, ties to even. NaN stays NaN.
pub fn round_half_even(
    x: f64,
    decimals: i32,
) -> f64 {
    let scale = 10_f64.powi(decimals);
    (x * scale).round_ties_even() / scale
}

/// Score the hits in `base_data` at `tax_level`.
///
/// Labels with `cutoff` hits or fewer are discarded before scoring. The
/// expected clade separation score is computed from all hits at the rank.
///
pub fn get_scores_for_taxlevel(
    base_data: &[JoinedHit],
    tax_level: TaxLevel,
    cutoff: f64,
    genome: &GenomeStats,
) -> ScoreRecord {
    let all_hits = TaxLevelGroup::new(base_data, tax_level);
    let expected = expected_clade_separation_score(&all_hits.contigs(), &all_hits.taxons());

    let retained = all_hits.retain_abundant(cutoff);
    let counts = retained.counts();
    let n_retained = retained.len();
    debug!("{} of {} hits retained at {}", n_retained, base_data.len(), tax_level);

    let contamination_portion = stats::contamination_portion(&counts);
    let completeness = completeness_score(&retained.contigs(), &retained.taxons());
    let clade_separation_score = stats::clade_separation_score(contamination_portion, completeness);
    let mean_hit_identity = stats::mean_hit_identity(&retained.identities());
    let genes_retained_index = stats::genes_retained_index(genome.n_genes_called, genome.n_genes_mapped, n_retained);
    let adjustment = stats::determine_adjustment(clade_separation_score, expected, genes_retained_index);
    let clade_separation_score_adjusted = clade_separation_score * adjustment as f64;
    let chimeric = if clade_separation_score_adjusted.is_nan() {
        None
    } else {
        Some(stats::is_chimeric(clade_separation_score_adjusted))
    };

    ScoreRecord{
        genome: genome.genome.clone(),
        n_contigs: genome.n_contigs,
        n_genes_called: genome.n_genes_called,
        n_genes_mapped: genome.n_genes_mapped,
        taxonomic_level: tax_level,
        clade_separation_score,
        contamination_portion,
        n_effective_surplus_clades: stats::n_effective_surplus_clades(&counts),
        proportion_genes_retained_in_major_clades: stats::proportion_genes_retained(n_retained, genome.n_genes_mapped),
        mean_hit_identity,
        mean_random_clade_separation_score: expected,
        genes_retained_index,
        reference_representation_score: stats::reference_representation_score(genes_retained_index, mean_hit_identity),
        adjustment,
        clade_separation_score_adjusted,
        chimeric,
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn round_half_even() {
        use super::round_half_even;

        assert_eq!(round_half_even(0.125, 2), 0.12);
        assert_eq!(round_half_even(0.375, 2), 0.38);
        assert_eq!(round_half_even(0.4857142857, 2), 0.49);
        assert_eq!(round_half_even(1.0, 2), 1.0);
        assert!(round_half_even(f64::NAN, 2).is_nan());
    }

    #[test]
    fn rounded_keeps_counts() {
        use super::ScoreRecord;
        use crate::TaxLevel;

        let record = ScoreRecord{
            genome: "g".to_string(),
            n_contigs: 3,
            n_genes_called: 40,
            n_genes_mapped: 30,
            taxonomic_level: TaxLevel::Genus,
            clade_separation_score: 0.8765,
            contamination_portion: 0.3333,
            n_effective_surplus_clades: 0.5,
            proportion_genes_retained_in_major_clades: 1.0,
            mean_hit_identity: 0.9012,
            mean_random_clade_separation_score: 0.1234,
            genes_retained_index: 0.75,
            reference_representation_score: 0.6759,
            adjustment: 1,
            clade_separation_score_adjusted: 0.8765,
            chimeric: Some(true),
        };

        let got = record.rounded();

        assert_eq!(got.n_genes_mapped, 30);
        assert_eq!(got.taxonomic_level, TaxLevel::Genus);
        assert_eq!(got.clade_separation_score, 0.88);
        assert_eq!(got.contamination_portion, 0.33);
        assert_eq!(got.mean_random_clade_separation_score, 0.12);
        assert_eq!(got.reference_representation_score, 0.68);
        assert_eq!(got.chimeric, Some(true));
    }
}
