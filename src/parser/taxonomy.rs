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
use std::io::BufReader;
use std::io::Read;

use bstr::ByteSlice;
use bstr::io::BufReadExt;

use crate::TaxLevel;
use crate::taxonomy::Lineage;
use crate::taxonomy::Taxonomy;

type E = Box<dyn std::error::Error>;

/// Name of the reference genome column in the reference table.
pub const GENOME_COLUMN: &str = "genome";

#[derive(Debug, Clone)]
pub struct MissingTaxonomyColumn {
    pub column: String,
}

impl std::fmt::Display for MissingTaxonomyColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "reference taxonomy has no column '{}'", self.column)
    }
}

impl std::error::Error for MissingTaxonomyColumn {}

#[derive(Debug, Clone)]
pub struct MalformedTaxonomyLine {
    pub line: String,
}

impl std::fmt::Display for MalformedTaxonomyLine {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "malformed reference taxonomy line: '{}'", self.line)
    }
}

impl std::error::Error for MalformedTaxonomyLine {}

fn find_column(
    header: &[&str],
    name: &str,
) -> Result<usize, E> {
    header.iter().position(|column| *column == name).ok_or_else(|| {
        Box::new(MissingTaxonomyColumn{ column: name.to_string() }) as E
    })
}

/// Read the genome to lineage reference table.
///
/// The input is tab-separated with a header line naming the columns. The
/// columns `genome`, `kingdom`, `phylum`, `class`, `order`, `family`,
/// `genus` and `specI` are required and may appear in any order, other
/// columns are ignored.
///
/// If a genome appears on several lines the first one is used.
///
/// ## Errors and panics
///
/// Terminates with [MissingTaxonomyColumn] if a required column is absent
/// and with [MalformedTaxonomyLine] if a line has too few fields.
///
pub fn read_genome2taxonomy<R: Read>(
    conn: &mut R,
) -> Result<Taxonomy, E> {
    let mut lines = BufReader::new(conn).byte_lines();

    let header_bytes = match lines.next() {
        Some(line) => line?,
        None => return Err(Box::new(MissingTaxonomyColumn{ column: GENOME_COLUMN.to_string() })),
    };
    let header: Vec<&str> = header_bytes.to_str()?.split('\t').map(|x| x.trim()).collect();

    let genome_col = find_column(&header, GENOME_COLUMN)?;
    let mut rank_cols: [usize; 7] = [0; 7];
    for tax_level in TaxLevel::ALL {
        rank_cols[tax_level.index()] = find_column(&header, tax_level.as_str())?;
    }

    let mut taxonomy = Taxonomy::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let contents = line.to_str()?;
        let fields: Vec<&str> = contents.split('\t').collect();

        let field = |idx: usize| -> Result<String, E> {
            fields.get(idx).map(|x| x.to_string()).ok_or_else(|| {
                Box::new(MalformedTaxonomyLine{ line: contents.to_string() }) as E
            })
        };

        let genome = field(genome_col)?;
        let mut labels: [String; 7] = Default::default();
        for (label, col) in labels.iter_mut().zip(rank_cols.iter()) {
            *label = field(*col)?;
        }
        taxonomy.insert(genome, Lineage::new(labels));
    }

    Ok(taxonomy)
}
