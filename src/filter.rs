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

//! Grouping hits by lineage and dropping minor lineages.
//!
//! [TaxLevelGroup] stores, for each label at one rank, the positions of the
//! hits with that label as a [RoaringBitmap]. Labels are kept in the order
//! they are first seen, so every summary is deterministic for a given input.
//!

use crate::TaxLevel;
use crate::taxonomy::JoinedHit;

use indexmap::map::IndexMap;
use roaring::bitmap::RoaringBitmap;

/// Minimum lineage size in sensitive mode.
pub const SENSITIVE_CUTOFF: f64 = 10.0;

/// Minimum lineage size as a fraction of the mapped genes.
pub const ABUNDANT_LINEAGE_FRACTION: f64 = 0.02;

/// Lineages with this many hits or fewer are discarded.
pub fn abundant_lineages_cutoff(
    sensitive: bool,
    genes_mapped: usize,
) -> f64 {
    if sensitive {
        SENSITIVE_CUTOFF
    } else {
        ABUNDANT_LINEAGE_FRACTION * genes_mapped as f64
    }
}

/// Hits grouped by their label at one rank.
#[derive(Clone, Debug)]
pub struct TaxLevelGroup<'a> {
    pub tax_level: TaxLevel,
    hits: &'a [JoinedHit<'a>],
    groups: IndexMap<&'a str, RoaringBitmap>,
}

impl<'a> TaxLevelGroup<'a> {
    pub fn new(
        hits: &'a [JoinedHit<'a>],
        tax_level: TaxLevel,
    ) -> Self {
        let mut groups: IndexMap<&'a str, RoaringBitmap> = IndexMap::new();
        hits.iter().enumerate().for_each(|(idx, hit)| {
            groups.entry(hit.label(tax_level)).or_default().insert(idx as u32);
        });
        TaxLevelGroup{ tax_level, hits, groups }
    }

    /// Keep only the labels with strictly more than `cutoff` hits.
    pub fn retain_abundant(
        mut self,
        cutoff: f64,
    ) -> Self {
        self.groups.retain(|_, bits| bits.len() as f64 > cutoff);
        self
    }

    /// Number of hits per label, in first-seen order.
    pub fn counts(&self) -> Vec<u64> {
        self.groups.values().map(|bits| bits.len()).collect()
    }

    pub fn labels(&self) -> Vec<&'a str> {
        self.groups.keys().copied().collect()
    }

    /// Total number of hits in the kept labels.
    pub fn len(&self) -> usize {
        self.groups.values().map(|bits| bits.len() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn retained(&self) -> RoaringBitmap {
        self.groups.values().fold(RoaringBitmap::new(), |acc, bits| acc | bits)
    }

    /// Kept hits in input order.
    pub fn hits(&self) -> Vec<&'a JoinedHit<'a>> {
        let hits = self.hits;
        self.retained().iter().map(|idx| &hits[idx as usize]).collect()
    }

    /// Contig of each kept hit, in input order.
    pub fn contigs(&self) -> Vec<&'a str> {
        self.hits().iter().map(|hit| hit.contig()).collect()
    }

    /// Label of each kept hit, in input order.
    pub fn taxons(&self) -> Vec<&'a str> {
        let tax_level = self.tax_level;
        self.hits().iter().map(|hit| hit.label(tax_level)).collect()
    }

    /// Percent identity of each kept hit, in input order.
    pub fn identities(&self) -> Vec<f64> {
        self.hits().iter().map(|hit| hit.identity()).collect()
    }
}
