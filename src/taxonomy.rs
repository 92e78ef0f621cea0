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

//! Reference taxonomy and joining alignment hits to it.
//!
//! [Taxonomy] maps reference genome names to their [Lineage]. It is loaded
//! once with [read_genome2taxonomy](crate::parser::taxonomy::read_genome2taxonomy),
//! never modified afterwards, and shared by reference between all genomes
//! scored in one run.
//!
//! [create_base_data] performs an inner join of [AlignmentHit] records with
//! the taxonomy. Hits to genomes that are not in the taxonomy are dropped
//! and nothing is reported about them.
//!

use crate::AlignmentHit;
use crate::TaxLevel;

use std::collections::HashMap;

use log::debug;

/// Labels of a reference genome at each [TaxLevel].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lineage {
    labels: [String; 7],
}

impl Lineage {
    /// Labels must be given in [TaxLevel::ALL] order.
    pub fn new(
        labels: [String; 7],
    ) -> Self {
        Lineage{ labels }
    }

    pub fn label(
        &self,
        tax_level: TaxLevel,
    ) -> &str {
        &self.labels[tax_level.index()]
    }
}

#[derive(Clone, Debug, Default)]
pub struct Taxonomy {
    lineages: HashMap<String, Lineage>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Taxonomy{ lineages: HashMap::new() }
    }

    /// Add the lineage of `genome`.
    ///
    /// The first lineage added for a genome is kept. Returns false if
    /// `genome` was already present.
    ///
    pub fn insert(
        &mut self,
        genome: String,
        lineage: Lineage,
    ) -> bool {
        if self.lineages.contains_key(&genome) {
            return false
        }
        self.lineages.insert(genome, lineage);
        true
    }

    pub fn get(
        &self,
        genome: &str,
    ) -> Option<&Lineage> {
        self.lineages.get(genome)
    }

    pub fn len(&self) -> usize {
        self.lineages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
    }
}

/// An alignment hit together with the lineage of the genome it hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JoinedHit<'a> {
    pub hit: &'a AlignmentHit,
    pub lineage: &'a Lineage,
}

impl<'a> JoinedHit<'a> {
    pub fn label(
        &self,
        tax_level: TaxLevel,
    ) -> &'a str {
        self.lineage.label(tax_level)
    }

    pub fn contig(&self) -> &'a str {
        &self.hit.contig
    }

    pub fn identity(&self) -> f64 {
        self.hit.identity
    }
}

/// Attach the lineage from `taxonomy` to each hit.
///
/// Inner join on the reference genome name: hits whose genome is not in
/// `taxonomy` are not included in the output. The order of `hits` is kept.
///
pub fn create_base_data<'a>(
    hits: &'a [AlignmentHit],
    taxonomy: &'a Taxonomy,
) -> Vec<JoinedHit<'a>> {
    let base_data = hits.iter().filter_map(|hit| {
        taxonomy.get(&hit.genome).map(|lineage| JoinedHit{ hit, lineage })
    }).collect::<Vec<JoinedHit>>();

    debug!("Assigned a lineage to {} of {} hits", base_data.len(), hits.len());

    base_data
}
