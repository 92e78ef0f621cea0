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

//! Printer for outputting [ScoreRecord] records as a tab-separated table.
//!
//! Can be used to convert any iterator over [ScoreRecord] data to their
//! plain text representation. The first call to next() returns the header
//! line together with the first record, after that 1 line is returned at a
//! time.
//!
//! Floating point values are rounded to 2 decimals (ties to even) and
//! written with at least one decimal. NaN values and a missing `chimeric`
//! call are written as empty fields.
//!
//! ## Usage
//!
//! ```rust
//! use gunc::TaxLevel;
//! use gunc::printer::Printer;
//! use gunc::scores::ScoreRecord;
//! use std::io::Write;
//!
//! let record = ScoreRecord{
//!     genome: "assembly".to_string(), n_contigs: 4, n_genes_called: 35, n_genes_mapped: 20,
//!     taxonomic_level: TaxLevel::Genus, clade_separation_score: 1.0, contamination_portion: 0.45,
//!     n_effective_surplus_clades: 0.9801, proportion_genes_retained_in_major_clades: 1.0,
//!     mean_hit_identity: 0.8567, mean_random_clade_separation_score: 0.1849,
//!     genes_retained_index: 0.5714, reference_representation_score: 0.4886,
//!     adjustment: 1, clade_separation_score_adjusted: 1.0, chimeric: Some(true),
//! };
//!
//! let mut records = vec![record].into_iter();
//! let mut out: Vec<u8> = Vec::new();
//! for line in Printer::new(&mut records) {
//!     out.write_all(&line.unwrap()).unwrap();
//! }
//!
//! let out = String::from_utf8(out).unwrap();
//! assert!(out.starts_with("genome\tn_contigs\t"));
//! assert!(out.ends_with("assembly\t4\t35\t20\tgenus\t1.0\t0.45\t0.98\t1.0\t0.86\t0.18\t0.57\t0.49\t1\t1.0\tTrue\n"));
//! ```
//!

use std::io::Write;

use crate::scores::ScoreRecord;
use crate::scores::round_half_even;

type E = Box<dyn std::error::Error>;

fn format_float(
    x: f64,
) -> String {
    if x.is_nan() {
        return String::new()
    }
    let rounded = round_half_even(x, 2);
    // Avoid printing -0.0
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:?}", rounded)
}

fn format_chimeric(
    chimeric: Option<bool>,
) -> &'static str {
    match chimeric {
        Some(true) => "True",
        Some(false) => "False",
        None => "",
    }
}

/// Write the tab-separated column names to `conn`.
pub fn format_score_header<W: Write>(
    conn: &mut W,
) -> Result<(), E> {
    let mut formatted: String = ScoreRecord::COLUMNS.join("\t");
    formatted += "\n";
    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

/// Format a single score record
///
/// Writes bytes containing the formatted line containing the contents of
/// `record` to `conn`.
///
pub fn format_score_line<W: Write>(
    record: &ScoreRecord,
    conn: &mut W,
) -> Result<(), E> {
    let fields: [String; 16] = [
        record.genome.clone(),
        record.n_contigs.to_string(),
        record.n_genes_called.to_string(),
        record.n_genes_mapped.to_string(),
        record.taxonomic_level.to_string(),
        format_float(record.clade_separation_score),
        format_float(record.contamination_portion),
        format_float(record.n_effective_surplus_clades),
        format_float(record.proportion_genes_retained_in_major_clades),
        format_float(record.mean_hit_identity),
        format_float(record.mean_random_clade_separation_score),
        format_float(record.genes_retained_index),
        format_float(record.reference_representation_score),
        record.adjustment.to_string(),
        format_float(record.clade_separation_score_adjusted),
        format_chimeric(record.chimeric).to_string(),
    ];

    let mut formatted: String = fields.join("\t");
    formatted += "\n";

    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

pub struct Printer<'a, I: Iterator> where I: Iterator<Item=ScoreRecord> {
    records: &'a mut I,
    header_printed: bool,
}

impl<'a, I: Iterator> Printer<'a, I> where I: Iterator<Item=ScoreRecord> {
    pub fn new(
        records: &'a mut I,
    ) -> Self {
        Printer{ records, header_printed: false }
    }
}

impl<I: Iterator> Iterator for Printer<'_, I> where I: Iterator<Item=ScoreRecord> {
    type Item = Result<Vec<u8>, E>;

    fn next(
        &mut self,
    ) -> Option<Result<Vec<u8>, E>> {
        let mut out: Vec<u8> = Vec::new();
        if !self.header_printed {
            self.header_printed = true;
            if let Err(e) = format_score_header(&mut out) {
                return Some(Err(e))
            }
        }

        match self.records.next() {
            Some(record) => {
                if let Err(e) = format_score_line(&record, &mut out) {
                    return Some(Err(e))
                }
                Some(Ok(out))
            },
            None if !out.is_empty() => Some(Ok(out)),
            None => None,
        }
    }
}

// Tests
#[cfg(test)]
mod tests {

    fn record() -> crate::scores::ScoreRecord {
        use crate::TaxLevel;
        use crate::scores::ScoreRecord;

        ScoreRecord{
            genome: "GUT_GENOME000001".to_string(),
            n_contigs: 15,
            n_genes_called: 35,
            n_genes_mapped: 17,
            taxonomic_level: TaxLevel::SpecI,
            clade_separation_score: 1.0,
            contamination_portion: 0.35294117647058826,
            n_effective_surplus_clades: 1.2833333333333332,
            proportion_genes_retained_in_major_clades: 1.0,
            mean_hit_identity: 0.92,
            mean_random_clade_separation_score: 0.9269432911447539,
            genes_retained_index: 0.4857142857142857,
            reference_representation_score: 0.44685714285714284,
            adjustment: 0,
            clade_separation_score_adjusted: 0.0,
            chimeric: Some(false),
        }
    }

    #[test]
    fn format_float() {
        use super::format_float;

        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(-0.0001), "0.0");
        assert_eq!(format_float(0.125), "0.12");
        assert_eq!(format_float(12.3456), "12.35");
        assert_eq!(format_float(f64::NAN), "");
    }

    #[test]
    fn format_score_line() {
        use super::format_score_line;

        let expected: Vec<u8> = b"GUT_GENOME000001\t15\t35\t17\tspecI\t1.0\t0.35\t1.28\t1.0\t0.92\t0.93\t0.49\t0.45\t0\t0.0\tFalse\n".to_vec();

        let mut got: Vec<u8> = Vec::new();
        format_score_line(&record(), &mut got).unwrap();

        assert_eq!(got, expected);
    }

    #[test]
    fn format_score_line_missing_values() {
        use super::format_score_line;

        let mut data = record();
        data.clade_separation_score = f64::NAN;
        data.contamination_portion = f64::NAN;
        data.clade_separation_score_adjusted = f64::NAN;
        data.chimeric = None;
        let expected: Vec<u8> = b"GUT_GENOME000001\t15\t35\t17\tspecI\t\t\t1.28\t1.0\t0.92\t0.93\t0.49\t0.45\t0\t\t\n".to_vec();

        let mut got: Vec<u8> = Vec::new();
        format_score_line(&data, &mut got).unwrap();

        assert_eq!(got, expected);
    }

    #[test]
    fn print_score_table() {
        use super::Printer;
        use crate::TaxLevel;

        use std::io::Cursor;
        use std::io::Write;

        let mut first = record();
        first.taxonomic_level = TaxLevel::Kingdom;
        let data = vec![first, record()];

        let mut cursor: Cursor<Vec<u8>> = Cursor::new(Vec::new());
        let mut data_iter = data.into_iter();
        let mut printer = Printer::new(&mut data_iter);
        let mut n_lines = 0;
        for bytes in printer.by_ref() {
            cursor.write_all(&bytes.unwrap()).unwrap();
            n_lines += 1;
        }

        let got = String::from_utf8(cursor.into_inner()).unwrap();
        let lines: Vec<&str> = got.lines().collect();

        assert_eq!(n_lines, 2);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split('\t').count(), 16);
        assert!(lines[0].starts_with("genome\tn_contigs\tn_genes_called"));
        assert!(lines[0].ends_with("clade_separation_score_adjusted\tchimeric"));
        assert!(lines[1].contains("\tkingdom\t"));
        assert!(lines[2].contains("\tspecI\t"));
    }

    #[test]
    fn print_header_without_records() {
        use super::Printer;
        use crate::scores::ScoreRecord;

        let mut data_iter = Vec::<ScoreRecord>::new().into_iter();
        let got = Printer::new(&mut data_iter).map(|x| x.unwrap()).collect::<Vec<Vec<u8>>>();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0], format!("{}\n", ScoreRecord::COLUMNS.join("\t")).into_bytes());
    }
}
