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
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;

use clap::CommandFactory;
use clap::Parser;

use log::error;
use log::info;

use gunc::parser::gene_counts::count_gene_calls_in_file;
use gunc::parser::gene_counts::gene_count_for;
use gunc::parser::gene_counts::read_gene_counts;
use gunc::parser::open_input;
use gunc::parser::taxonomy::read_genome2taxonomy;
use gunc::printer::format_score_header;
use gunc::scores::ScoreRecord;
use gunc::taxonomy::Taxonomy;

mod cli;

type E = Box<dyn std::error::Error>;

#[derive(Debug, Clone)]
struct GeneCallsMismatch {
    n_inputs: usize,
    n_gene_calls: usize,
}

impl std::fmt::Display for GeneCallsMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "got {} alignment files but {} gene-call files", self.n_inputs, self.n_gene_calls)
    }
}

impl std::error::Error for GeneCallsMismatch {}

/// Where the number of called genes comes from.
enum GenesCalled {
    Fixed(usize),
    GeneCalls(Vec<PathBuf>),
    GeneCounts(HashMap<String, usize>),
}

impl GenesCalled {
    fn get(
        &self,
        file_idx: usize,
        genome_name: &str,
    ) -> Result<usize, E> {
        match self {
            GenesCalled::Fixed(n) => Ok(*n),
            GenesCalled::GeneCalls(files) => count_gene_calls_in_file(&files[file_idx]),
            GenesCalled::GeneCounts(counts) => gene_count_for(counts, genome_name),
        }
    }
}

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    let _ = stderrlog::new()
    .module(module_path!())
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(stderrlog::Timestamp::Off)
    .init();
}

fn out_path(
    input_file: &Path,
    genome_name: &str,
    out_dir: &Option<PathBuf>,
) -> PathBuf {
    let dir = match out_dir {
        Some(dir) => dir.clone(),
        None => input_file.parent().map(|x| x.to_path_buf()).unwrap_or_default(),
    };
    dir.join(format!("{}.diamond.out.chimerism_scores", genome_name))
}

fn score_file(
    input_file: &Path,
    genome_name: &str,
    genes_called: usize,
    sensitive: bool,
    taxonomy: &Taxonomy,
) -> Result<Vec<ScoreRecord>, E> {
    info!("Scoring {}", genome_name);
    let mut conn_in = open_input(input_file)?;
    gunc::chim_score(&mut conn_in, genome_name, genes_called, sensitive, taxonomy)
}

#[allow(clippy::too_many_arguments)]
fn run_score(
    input_files: &[PathBuf],
    taxonomy_file: &Path,
    genes_called: &Option<usize>,
    gene_calls: &[PathBuf],
    gene_counts: &Option<PathBuf>,
    sensitive: bool,
    out_dir: &Option<PathBuf>,
    write_to_stdout: bool,
) -> Result<(), E> {
    let genes = if let Some(n) = genes_called {
        GenesCalled::Fixed(*n)
    } else if let Some(file) = gene_counts {
        let mut conn = open_input(file)?;
        GenesCalled::GeneCounts(read_gene_counts(&mut conn)?)
    } else {
        if gene_calls.len() != input_files.len() {
            return Err(Box::new(GeneCallsMismatch{ n_inputs: input_files.len(), n_gene_calls: gene_calls.len() }))
        }
        GenesCalled::GeneCalls(gene_calls.to_vec())
    };

    info!("Reading reference taxonomy from {}", taxonomy_file.display());
    let mut conn_tax = open_input(taxonomy_file)?;
    let taxonomy = read_genome2taxonomy(&mut conn_tax)?;

    // All genomes share one header on stdout
    let mut stdout = if write_to_stdout {
        let mut conn_out = BufWriter::new(std::io::stdout().lock());
        format_score_header(&mut conn_out)?;
        Some(conn_out)
    } else {
        None
    };

    for (idx, file) in input_files.iter().enumerate() {
        let genome_name = gunc::genome_name_from_path(file);
        let n_genes = genes.get(idx, &genome_name)?;
        let records = score_file(file, &genome_name, n_genes, sensitive, &taxonomy)?;

        if let Some(conn_out) = stdout.as_mut() {
            gunc::write_score_lines(&records, conn_out)?;
        } else {
            let path = out_path(file, &genome_name, out_dir);
            let mut conn_out = BufWriter::new(File::create(&path)?);
            gunc::write_scores(&records, &mut conn_out)?;
            info!("Wrote scores to {}", path.display());
        }
    }

    Ok(())
}

fn main() {
    let cli = cli::Cli::parse();

    // Subcommands:
    match &cli.command {
        // Score
        Some(cli::Commands::Score {
            input_files,
            taxonomy,
            genes_called,
            gene_calls,
            gene_counts,
            sensitive,
            out_dir,
            write_to_stdout,
            verbose,
        }) => {
            init_log(if *verbose { 2 } else { 1 });

            if let Err(e) = run_score(input_files, taxonomy, genes_called, gene_calls, gene_counts, *sensitive, out_dir, *write_to_stdout) {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            let _ = cli::Cli::command().print_help();
        },
    }
}
