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

//! Sources for the number of genes called from a genome.
//!
//! The count can be taken from the gene-call FASTA file that was given to
//! the aligner, or from a JSON object mapping genome names to counts.
//!

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use needletail::FastxReader;
use needletail::errors::ParseError;
use needletail::errors::ParseErrorKind;

type E = Box<dyn std::error::Error>;

#[derive(Debug, Clone)]
pub struct MissingGeneCount {
    pub genome: String,
}

impl std::fmt::Display for MissingGeneCount {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "no gene count for genome '{}'", self.genome)
    }
}

impl std::error::Error for MissingGeneCount {}

fn count_records<'a>(
    parsed: Result<Box<dyn FastxReader + 'a>, ParseError>,
) -> Result<usize, E> {
    let mut reader = match parsed {
        Ok(reader) => reader,
        Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => return Ok(0),
        Err(e) => return Err(Box::new(e)),
    };

    let mut n_genes: usize = 0;
    while let Some(record) = reader.next() {
        record?;
        n_genes += 1;
    }
    Ok(n_genes)
}

/// Count the records in a FASTA or FASTQ file read from `conn`.
///
/// Compressed input is decompressed. An empty input has zero genes.
///
pub fn count_gene_calls<R: Read + Send>(
    conn: R,
) -> Result<usize, E> {
    count_records(needletail::parse_fastx_reader(conn))
}

/// Count the records in the FASTA or FASTQ file at `path`.
pub fn count_gene_calls_in_file<P: AsRef<Path>>(
    path: P,
) -> Result<usize, E> {
    count_records(needletail::parse_fastx_file(path))
}

/// Read a JSON object of `genome name: gene count` pairs.
pub fn read_gene_counts<R: Read>(
    conn: &mut R,
) -> Result<HashMap<String, usize>, E> {
    let counts: HashMap<String, usize> = serde_json::from_reader(conn)?;
    Ok(counts)
}

/// Look up the gene count of `genome`.
///
/// Terminates with [MissingGeneCount] if `genome` is not in `counts`.
///
pub fn gene_count_for(
    counts: &HashMap<String, usize>,
    genome: &str,
) -> Result<usize, E> {
    counts.get(genome).copied().ok_or_else(|| {
        Box::new(MissingGeneCount{ genome: genome.to_string() }) as E
    })
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn count_gene_calls() {
        use super::count_gene_calls;
        use std::io::Cursor;

        let mut data: Vec<u8> = b">contig_1_1 # 2 # 310 # 1\nMKVLAAGIVGLPNVGKST*\n".to_vec();
        data.append(&mut b">contig_1_2 # 402 # 980 # -1\nMSEQNTLLKR\nAVELAEKH*\n".to_vec());
        data.append(&mut b">contig_2_1 # 1 # 200 # 1\nMTTRLE*\n".to_vec());

        let got = count_gene_calls(Cursor::new(data)).unwrap();

        assert_eq!(got, 3);
    }

    #[test]
    fn count_gene_calls_empty() {
        use super::count_gene_calls;
        use std::io::Cursor;

        let got = count_gene_calls(Cursor::new(Vec::<u8>::new())).unwrap();

        assert_eq!(got, 0);
    }

    #[test]
    fn count_gene_calls_in_file() {
        use super::count_gene_calls_in_file;
        use std::io::Write;

        let dir = std::env::temp_dir().join(format!("gunc-gene-counts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("genome_1.faa");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b">contig_1_1\nMKVLAAGIVG*\n>contig_1_2\nMSEQNTLLKR*\n>contig_3_1\nMTTRLE*\n>contig_4_1\nMAAK*\n").unwrap();
        drop(file);

        let empty = dir.join("empty.faa");
        std::fs::File::create(&empty).unwrap();

        let got = count_gene_calls_in_file(&path).unwrap();
        let got_empty = count_gene_calls_in_file(&empty).unwrap();
        let got_missing = count_gene_calls_in_file(dir.join("missing.faa"));

        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(got, 4);
        assert_eq!(got_empty, 0);
        assert!(got_missing.is_err());
    }

    #[test]
    fn read_gene_counts() {
        use super::read_gene_counts;
        use super::gene_count_for;
        use super::MissingGeneCount;
        use std::io::Cursor;

        let data: Vec<u8> = br#"{"genome_1.fa": 2311, "genome_2.fa": 4102}"#.to_vec();

        let got = read_gene_counts(&mut Cursor::new(data)).unwrap();

        assert_eq!(got.len(), 2);
        assert_eq!(gene_count_for(&got, "genome_2.fa").unwrap(), 4102);
        let err = gene_count_for(&got, "genome_3.fa").unwrap_err();
        assert_eq!(err.downcast_ref::<MissingGeneCount>().unwrap().genome, "genome_3.fa");
    }

    #[test]
    fn error_if_gene_counts_not_numbers() {
        use super::read_gene_counts;
        use std::io::Cursor;

        let data: Vec<u8> = br#"{"genome_1.fa": "many"}"#.to_vec();

        let got = read_gene_counts(&mut Cursor::new(data));

        assert!(got.is_err());
    }
}
