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
use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser, Subcommand};

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // Score alignments against the reference taxonomy
    #[command(group(ArgGroup::new("genes").required(true).args(["genes_called", "gene_calls", "gene_counts"])))]
    Score {
        // Input alignment file(s)
        #[arg(group = "input", required = true, help = "Alignment file(s), plain or gzipped")]
        input_files: Vec<PathBuf>,

        // Genome to lineage table
        #[arg(long = "taxonomy", env = "GUNC_TAXONOMY", required = true)]
        taxonomy: PathBuf,

        // Number of genes called, same for all inputs
        #[arg(long = "genes-called")]
        genes_called: Option<usize>,

        // Gene-call fasta for each input, in input order
        #[arg(long = "gene-calls", action = ArgAction::Append, num_args = 1, value_delimiter = ',', help = "Gene-call fasta per input file, repeat the flag or separate with ','")]
        gene_calls: Vec<PathBuf>,

        // JSON file with gene counts per genome
        #[arg(long = "gene-counts")]
        gene_counts: Option<PathBuf>,

        // Fixed abundance cutoff
        #[arg(long = "sensitive", default_value_t = false, help = "Discard lineages with 10 or fewer hits")]
        sensitive: bool,

        // Output directory, defaults to the input's directory
        #[arg(short = 'o', long = "out-dir", required = false)]
        out_dir: Option<PathBuf>,

        // Write to stdout
        #[arg(short = 'c', long = "stdout", default_value_t = false, help = "Write all scores to stdout as one table")]
        write_to_stdout: bool,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },
}
