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

//! Readers for the plain text inputs.
//!
//! [Parser] reads the tab-separated alignment hits written by the aligner
//! (one hit per line, `query gene <TAB> reference genome <TAB> percent
//! identity`, any further columns are ignored) and returns them one
//! [AlignmentHit] at a time.
//!
//! The reference taxonomy table is read by [taxonomy] and the number of
//! called genes by [gene_counts].
//!
//! ## Usage
//!
//! ```rust
//! use gunc::parser::read_diamond_output;
//! use std::io::Cursor;
//!
//! let mut input = Cursor::new(b"contig_1_1\tgenome_a\t98.5\t120\ncontig_1_2\tgenome_b\t77.0\t98\n".to_vec());
//! let hits = read_diamond_output(&mut input).unwrap();
//!
//! assert_eq!(hits.len(), 2);
//! assert_eq!(hits[1].contig, "contig_1");
//! assert_eq!(hits[1].identity, 77.0);
//! ```
//!

pub mod gene_counts;
pub mod taxonomy;

use crate::AlignmentHit;

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use bstr::ByteSlice;
use bstr::io::BufReadExt;
use bstr::io::ByteLines;

use flate2::read::MultiGzDecoder;

type E = Box<dyn std::error::Error>;

#[derive(Debug, Clone)]
pub struct EmptyAlignment;

impl std::fmt::Display for EmptyAlignment {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "input data produced no alignments to reference")
    }
}

impl std::error::Error for EmptyAlignment {}

#[derive(Debug, Clone)]
pub struct MalformedHitLine {
    pub line: String,
}

impl std::fmt::Display for MalformedHitLine {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "malformed alignment line: '{}'", self.line)
    }
}

impl std::error::Error for MalformedHitLine {}

/// Derive the contig name from a called gene name.
///
/// Gene callers name genes `<contig>_<index>`, so the contig is everything
/// before the last underscore. Returns an empty string if `query` contains
/// no underscore.
///
pub fn contig_from_query(
    query: &str,
) -> &str {
    query.rsplit_once('_').map(|(contig, _)| contig).unwrap_or("")
}

/// Parse a single tab-separated alignment line.
///
/// Only the first three columns are read. Terminates with a
/// [MalformedHitLine] if there are fewer columns or if the third column is
/// not a number.
///
pub fn read_hit_line(
    line: &[u8],
) -> Result<AlignmentHit, E> {
    let malformed = || MalformedHitLine{ line: line.to_str_lossy().to_string() };

    let mut records = line.split_str("\t");
    let (query, genome, identity) = match (records.next(), records.next(), records.next()) {
        (Some(query), Some(genome), Some(identity)) => (query, genome, identity),
        _ => return Err(Box::new(malformed())),
    };

    let query = query.to_str()?.to_string();
    let genome = genome.to_str()?.to_string();
    let identity = identity.to_str()?.trim().parse::<f64>().map_err(|_| malformed())?;
    let contig = contig_from_query(&query).to_string();

    Ok(AlignmentHit{ query, genome, identity, contig })
}

/// Iterator over the hits in a tab-separated alignment file.
///
/// Blank lines are skipped.
pub struct Parser<'a, R: Read> {
    lines: ByteLines<BufReader<&'a mut R>>,
}

impl<'a, R: Read> Parser<'a, R> {
    pub fn new(
        conn: &'a mut R,
    ) -> Self {
        Parser{ lines: BufReader::new(conn).byte_lines() }
    }
}

impl<R: Read> Iterator for Parser<'_, R> {
    type Item = Result<AlignmentHit, E>;

    fn next(
        &mut self,
    ) -> Option<Result<AlignmentHit, E>> {
        for line in self.lines.by_ref() {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(read_hit_line(&line));
        }
        None
    }
}

/// Read all alignment hits from `conn`.
///
/// Terminates with [EmptyAlignment] if `conn` contains no hits.
///
pub fn read_diamond_output<R: Read>(
    conn: &mut R,
) -> Result<Vec<AlignmentHit>, E> {
    let hits = Parser::new(conn).collect::<Result<Vec<AlignmentHit>, E>>()?;
    if hits.is_empty() {
        return Err(Box::new(EmptyAlignment{}))
    }
    Ok(hits)
}

/// Number of hits (genes mapped) and number of distinct contigs in `hits`.
pub fn get_stats(
    hits: &[AlignmentHit],
) -> (usize, usize) {
    let contigs: HashSet<&str> = hits.iter().map(|hit| hit.contig.as_str()).collect();
    (hits.len(), contigs.len())
}

/// Open `path` for reading, decompressing it if the name ends in `.gz`.
pub fn open_input<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn Read>, E> {
    let file = File::open(path.as_ref())?;
    let is_gz = path.as_ref().extension().is_some_and(|ext| ext == "gz");
    if is_gz {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}
