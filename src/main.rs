use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use log::{info, warn};

use readmap::io::{FastaRecord, read_fasta, read_fastq};
use readmap::{Error, FmIndex};

/// FM-Index based approximate read mapper.
///
/// Reports every location where a read occurs in the genome with at most
/// the given number of edits, as tab-separated records of read name,
/// reference name, 1-based position, CIGAR and read sequence.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Preprocess the genome: build the index and persist it next to the
    /// genome file with extension .dat.
    #[arg(short = 'p')]
    preprocess: bool,

    /// Maximum edit distance of reported alignments.
    #[arg(short = 'd', value_name = "INT", default_value_t = 1)]
    max_edit_distance: usize,

    /// Simple-FASTA file containing the genome.
    genome: PathBuf,

    /// Simple-FASTQ file containing the reads.
    reads: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let genome_file = File::open(&cli.genome)
        .with_context(|| format!("failed to open genome file {}", cli.genome.display()))?;
    let references = read_fasta(BufReader::new(genome_file))?;

    if cli.preprocess {
        build_and_persist(&references, &cli.genome)?;
        return Ok(());
    }

    let Some(reads_path) = &cli.reads else {
        bail!("a reads file is required unless -p is given");
    };

    let indexes = load_or_build(&references, &cli.genome)?;

    let reads_file = File::open(reads_path)
        .with_context(|| format!("failed to open reads file {}", reads_path.display()))?;
    let reads = read_fastq(BufReader::new(reads_file))?;

    let mut records = Vec::new();

    for (reference, index) in references.iter().zip(&indexes) {
        if reference.sequence.is_empty() {
            continue;
        }

        for read in &reads {
            if read.sequence.is_empty() {
                continue;
            }

            for hit in index.approx_matches(&read.sequence, cli.max_edit_distance) {
                records.push((
                    read.name.clone(),
                    reference.name.clone(),
                    hit.position,
                    hit.cigar.to_string(),
                    String::from_utf8_lossy(&read.sequence).into_owned(),
                ));
            }
        }
    }

    records.sort();

    let mut out = BufWriter::new(std::io::stdout().lock());
    for (read_name, reference_name, position, cigar, sequence) in records {
        writeln!(out, "{read_name}\t{reference_name}\t{position}\t{cigar}\t{sequence}")?;
    }
    out.flush()?;

    Ok(())
}

fn build_and_persist(references: &[FastaRecord], genome: &Path) -> anyhow::Result<Vec<FmIndex>> {
    let indexes: Vec<FmIndex> =
        FmIndex::build_many(references.iter().map(|reference| &reference.sequence))?;

    let path = index_file_path(genome);
    FmIndex::save_many_to_file(&indexes, &path)
        .map_err(|error| anyhow::anyhow!("failed to write index file {}: {error}", path.display()))?;

    info!(
        "built and persisted {} reference indexes to {}",
        indexes.len(),
        path.display()
    );

    Ok(indexes)
}

fn load_or_build(references: &[FastaRecord], genome: &Path) -> anyhow::Result<Vec<FmIndex>> {
    let path = index_file_path(genome);

    if path.is_file() {
        match FmIndex::load_many_from_file(&path) {
            Ok(indexes) if indexes.len() == references.len() => {
                info!(
                    "loaded {} reference indexes from {}",
                    indexes.len(),
                    path.display()
                );
                return Ok(indexes);
            }
            Ok(indexes) => {
                let error = Error::IndexUnreadable {
                    path: path.clone(),
                    detail: format!(
                        "it holds {} references but the genome has {}",
                        indexes.len(),
                        references.len()
                    ),
                };
                warn!("{error}; rebuilding");
            }
            Err(error) => {
                let error = Error::IndexUnreadable {
                    path: path.clone(),
                    detail: error.to_string(),
                };
                warn!("{error}; rebuilding");
            }
        }
    }

    build_and_persist(references, genome)
}

// <genome>.dat, next to the genome file
fn index_file_path(genome: &Path) -> PathBuf {
    let mut file_name = genome.file_name().unwrap_or_default().to_os_string();
    file_name.push(".dat");

    genome.with_file_name(file_name)
}
