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

//! gunc is a library and a command-line client for detecting chimerism and
//! contamination in prokaryotic genome assemblies.
//!
//! The genes called from an assembly are aligned against a reference
//! database by an external aligner. gunc then:
//!
//!   - Assigns each aligned gene the lineage of the reference genome it hit.
//!   - Discards minor lineages at each taxonomic rank.
//!   - Scores, for each of the seven ranks, how cleanly the remaining
//!     lineages separate along the contigs of the assembly.
//!   - Calls the assembly chimeric if the separation is clearly stronger
//!     than what random assignment of genes to contigs would produce.
//!
//! The ranks are, from broadest to narrowest, kingdom, phylum, class, order,
//! family, genus and specI (see [TaxLevel]).
//!
//! ## Usage
//!
//! ### Command line
//!
//! The gunc CLI supports the following subcommands:
//!   - `gunc score` score one or more alignment files against a reference taxonomy.
//!
//! The number of genes called from the assembly must be supplied either as a
//! number, as the gene-call FASTA file, or as a JSON file mapping genome
//! names to gene counts.
//!
//! ### Rust API
//!
//! [chim_score] reads the alignment hits of a single genome from something
//! that implements [Read] and returns one [ScoreRecord](scores::ScoreRecord)
//! per taxonomic rank. [score_base_data] does the same starting from hits
//! that have already been joined to the reference taxonomy. The score table
//! can be written in tab-separated format with [write_scores].
//!
//! The reference taxonomy is loaded once with
//! [read_genome2taxonomy](parser::taxonomy::read_genome2taxonomy) and
//! passed by reference to every call, so several genomes can be scored
//! against the same [Taxonomy](taxonomy::Taxonomy).
//!
//! ```rust
//! use gunc::{chim_score, TaxLevel};
//! use gunc::parser::taxonomy::read_genome2taxonomy;
//! use std::io::Cursor;
//!
//! let mut reference_bytes: Vec<u8> = b"genome\tkingdom\tphylum\tclass\torder\tfamily\tgenus\tspecI\n".to_vec();
//! reference_bytes.append(&mut b"g1\tBacteria\tFirmicutes\tBacilli\tLactobacillales\tStreptococcaceae\tStreptococcus\ts1\n".to_vec());
//! reference_bytes.append(&mut b"g2\tBacteria\tProteobacteria\tGammaproteobacteria\tEnterobacterales\tEnterobacteriaceae\tEscherichia\ts2\n".to_vec());
//! let taxonomy = read_genome2taxonomy(&mut Cursor::new(reference_bytes)).unwrap();
//!
//! let mut hits: Vec<u8> = Vec::new();
//! hits.append(&mut b"contig_1_1\tg1\t98.0\n".to_vec());
//! hits.append(&mut b"contig_1_2\tg1\t97.0\n".to_vec());
//! hits.append(&mut b"contig_2_1\tg2\t91.0\n".to_vec());
//!
//! let scores = chim_score(&mut Cursor::new(hits), "assembly", 12, false, &taxonomy).unwrap();
//!
//! assert_eq!(scores.len(), 7);
//! assert_eq!(scores[0].taxonomic_level, TaxLevel::Kingdom);
//! assert_eq!(scores[0].contamination_portion, 0.0);
//! assert_eq!(scores[6].taxonomic_level, TaxLevel::SpecI);
//! ```
//!

use std::io::Read;
use std::io::Write;
use std::path::Path;

use log::debug;
use log::info;
use log::warn;

use filter::abundant_lineages_cutoff;
use parser::get_stats;
use parser::read_diamond_output;
use scores::GenomeStats;
use scores::ScoreRecord;
use scores::get_scores_for_taxlevel;
use taxonomy::JoinedHit;
use taxonomy::Taxonomy;
use taxonomy::create_base_data;

pub mod filter;
pub mod parser;
pub mod printer;
pub mod scores;
pub mod stats;
pub mod taxonomy;

type E = Box<dyn std::error::Error>;

/// Genomes with fewer called genes than this are not scored.
pub const MIN_GENES_CALLED: usize = 10;

#[derive(Debug, Clone)]
pub struct TooFewGenes {
    pub genes_called: usize,
}

impl std::fmt::Display for TooFewGenes {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "less than {} genes called ({})", MIN_GENES_CALLED, self.genes_called)
    }
}

impl std::error::Error for TooFewGenes {}

/// Taxonomic ranks, from broadest to narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaxLevel {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    SpecI,
}

impl TaxLevel {
    /// All ranks in the order they are scored.
    pub const ALL: [TaxLevel; 7] = [
        TaxLevel::Kingdom,
        TaxLevel::Phylum,
        TaxLevel::Class,
        TaxLevel::Order,
        TaxLevel::Family,
        TaxLevel::Genus,
        TaxLevel::SpecI,
    ];

    /// Column name of the rank in the reference table and in the output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxLevel::Kingdom => "kingdom",
            TaxLevel::Phylum => "phylum",
            TaxLevel::Class => "class",
            TaxLevel::Order => "order",
            TaxLevel::Family => "family",
            TaxLevel::Genus => "genus",
            TaxLevel::SpecI => "specI",
        }
    }

    /// Position of the rank in [TaxLevel::ALL].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for TaxLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaxLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kingdom" => Ok(TaxLevel::Kingdom),
            "phylum" => Ok(TaxLevel::Phylum),
            "class" => Ok(TaxLevel::Class),
            "order" => Ok(TaxLevel::Order),
            "family" => Ok(TaxLevel::Family),
            "genus" => Ok(TaxLevel::Genus),
            "specI" => Ok(TaxLevel::SpecI),
            _ => Err(format!("'{}' is not a valid TaxLevel", s)),
        }
    }
}

/// A single alignment of a called gene against a reference genome.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlignmentHit {
    /// Name of the called gene, `<contig>_<index>`.
    pub query: String,
    /// Reference genome the gene aligned to.
    pub genome: String,
    /// Percent identity of the alignment.
    pub identity: f64,
    /// Contig the gene was called from.
    pub contig: String,
}

/// Genome name used in the output for an alignment file.
///
/// Strips the directory, a trailing `.gz` and a trailing `.diamond.out`
/// from `path`.
///
pub fn genome_name_from_path<P: AsRef<Path>>(
    path: P,
) -> String {
    let file_name = path.as_ref().file_name().map(|x| x.to_string_lossy().to_string()).unwrap_or_default();
    let file_name = file_name.strip_suffix(".gz").unwrap_or(&file_name);
    file_name.replace(".diamond.out", "")
}

/// Abort with [TooFewGenes] if fewer than [MIN_GENES_CALLED] genes were called.
pub fn check_genes_called(
    genes_called: usize,
) -> Result<(), E> {
    if genes_called < MIN_GENES_CALLED {
        warn!("Less than {} genes called, exiting...", MIN_GENES_CALLED);
        return Err(Box::new(TooFewGenes{ genes_called }))
    }
    Ok(())
}

/// Score hits that have been joined to the reference taxonomy.
///
/// Returns one [ScoreRecord] per rank in [TaxLevel::ALL] order.
///
/// `genome.n_genes_mapped` is used to determine the abundance cutoff, so it
/// should count the hits before they were joined.
///
/// ## Errors and panics
///
/// Terminates with [TooFewGenes] if `genome.n_genes_called` is below
/// [MIN_GENES_CALLED].
///
pub fn score_base_data(
    base_data: &[JoinedHit],
    genome: &GenomeStats,
    sensitive: bool,
) -> Result<Vec<ScoreRecord>, E> {
    check_genes_called(genome.n_genes_called)?;

    let cutoff = abundant_lineages_cutoff(sensitive, genome.n_genes_mapped);
    info!("Calculating scores for each tax-level:");
    let records = TaxLevel::ALL.iter().map(|tax_level| {
        debug!("{}", tax_level);
        get_scores_for_taxlevel(base_data, *tax_level, cutoff, genome)
    }).collect::<Vec<ScoreRecord>>();

    Ok(records)
}

/// Score the alignment hits of one genome read from `conn`.
///
/// `genes_called` is the number of genes that were called from the genome
/// and given to the aligner. Set `sensitive` to use a fixed abundance
/// cutoff of 10 hits instead of 2% of the aligned genes.
///
/// Hits to reference genomes absent from `taxonomy` are dropped without
/// notice; they still count towards the number of mapped genes.
///
/// ## Errors and panics
///
/// Terminates with [TooFewGenes](crate::TooFewGenes) before reading `conn`
/// if `genes_called` is below [MIN_GENES_CALLED], and with
/// [EmptyAlignment](parser::EmptyAlignment) if `conn` contains no hits.
///
pub fn chim_score<R: Read>(
    conn: &mut R,
    genome_name: &str,
    genes_called: usize,
    sensitive: bool,
    taxonomy: &Taxonomy,
) -> Result<Vec<ScoreRecord>, E> {
    check_genes_called(genes_called)?;

    let hits = read_diamond_output(conn)?;
    let (genes_mapped, contig_count) = get_stats(&hits);
    let base_data = create_base_data(&hits, taxonomy);

    let genome = GenomeStats{
        genome: genome_name.to_string(),
        n_contigs: contig_count,
        n_genes_called: genes_called,
        n_genes_mapped: genes_mapped,
    };

    score_base_data(&base_data, &genome, sensitive)
}

/// Write a score table to `conn` in tab-separated format.
///
/// Writes a header line followed by one line per record, see
/// [printer] for the formatting rules.
///
pub fn write_scores<W: Write>(
    records: &[ScoreRecord],
    conn_out: &mut W,
) -> Result<(), E> {
    let mut iter = records.iter().cloned();
    let mut printer = printer::Printer::new(&mut iter);
    for line in printer.by_ref() {
        conn_out.write_all(&line?)?;
    }
    conn_out.flush()?;
    Ok(())
}

/// Write the lines of a score table to `conn` without the header.
///
/// Used to append the tables of several genomes below a single header
/// written with [printer::format_score_header].
///
pub fn write_score_lines<W: Write>(
    records: &[ScoreRecord],
    conn_out: &mut W,
) -> Result<(), E> {
    for record in records {
        printer::format_score_line(record, conn_out)?;
    }
    conn_out.flush()?;
    Ok(())
}
