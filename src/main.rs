#![forbid(unsafe_code)]
//! # Tail Analysis CLI
//!
//! Command-line interface for the `tail_analysis` crate. Input documents are
//! JSON lines of dependency-parsed documents (optionally gzipped).
//!
//! ## Commands
//! - `pmi`: rank co-occurring word pairs by PMI.
//! - `tails`: group rare words by dependency head/child with LIWC categories.
//! - `distribution`: POS share overall, in the low-frequency tail and among hapaxes.
//! - `categories`: LIWC category counts per text of a TSV file.
//!
//! ## Example
//! ```bash
//! cargo run --release -- tails reviews.jsonl.gz --dictionary LIWC2015.dic --pos NOUN --pos ADJ --export-format csv
//! ```
//!
//! Set `RUST_LOG=info` for progress output.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use tail_analysis::{
    AnalysisError, CategoryDictionary, ExportFormat, PmiCooc, Result, TailOptions,
    build_tail_report, doc_term_sets, export, lemma_pos_tf_index, pmi_rows, pos_tail_distribution,
    read_documents, read_json_lines, read_tsv, render_rows, save_file,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Output {
    /// Output format (txt, csv, tsv, json)
    #[arg(long, default_value = "txt")]
    export_format: ExportFormat,

    /// Write the result to a timestamped file in this directory instead of stdout
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Rank co-occurring word pairs by pointwise mutual information
    Pmi {
        /// Annotated documents (.jsonl or .jsonl.gz)
        input: PathBuf,

        /// Input holds one JSON array of terms per line instead of documents
        #[arg(long, default_value_t = false)]
        token_sets: bool,

        /// Count lemmas instead of surface forms
        #[arg(long, default_value_t = false)]
        use_lemma: bool,

        /// Only score pairs whose terms are both listed in this file (one per line)
        #[arg(long)]
        filter: Option<PathBuf>,

        /// Show the top N pairs (the N-th index is included)
        #[arg(long)]
        top: Option<usize>,

        #[command(flatten)]
        output: Output,
    },
    /// Group rare words by their dependency head or child
    Tails {
        /// Annotated documents (.jsonl or .jsonl.gz)
        input: PathBuf,

        /// LIWC dictionary file (.dic)
        #[arg(long)]
        dictionary: PathBuf,

        /// POS tags of the rare words (repeatable)
        #[arg(long = "pos", required = true)]
        token_pos: Vec<String>,

        /// POS tags accepted for heads and children (repeatable)
        #[arg(long = "dependency-pos")]
        dependency_pos: Vec<String>,

        /// Highest frequency still counted as tail [default: 5]
        #[arg(long, conflicts_with = "no_max_threshold")]
        max_threshold: Option<u64>,

        /// Lowest frequency still counted as tail [default: 0]
        #[arg(long, conflicts_with = "no_min_threshold")]
        min_threshold: Option<u64>,

        /// Do not bound the tail frequency from above
        #[arg(long, default_value_t = false)]
        no_max_threshold: bool,

        /// Do not bound the tail frequency from below
        #[arg(long, default_value_t = false)]
        no_min_threshold: bool,

        /// Index pronouns by surface form instead of lemma
        #[arg(long, default_value_t = false)]
        keep_pron: bool,

        /// Characters used to bucket wildcard dictionary entries
        #[arg(long, default_value_t = tail_analysis::DEFAULT_PREFIX_SIZE)]
        prefix_size: usize,

        #[command(flatten)]
        output: Output,
    },
    /// POS distribution of the frequency tail
    Distribution {
        /// Annotated documents (.jsonl or .jsonl.gz)
        input: PathBuf,

        /// Frequencies up to this value count as low
        #[arg(long, default_value_t = 5)]
        low_threshold: u64,

        #[command(flatten)]
        output: Output,
    },
    /// LIWC category counts per text
    Categories {
        /// Tab-separated file with a header row (.tsv or .tsv.gz)
        input: PathBuf,

        /// LIWC dictionary file (.dic)
        #[arg(long)]
        dictionary: PathBuf,

        #[arg(long, default_value = "review_id")]
        id_column: String,

        #[arg(long, default_value = "review_text")]
        text_column: String,

        /// Characters used to bucket wildcard dictionary entries
        #[arg(long, default_value_t = tail_analysis::DEFAULT_PREFIX_SIZE)]
        prefix_size: usize,

        #[command(flatten)]
        output: Output,
    },
}

fn file_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "results".to_string());
    name.split('.').next().unwrap_or("results").to_string()
}

fn emit(content: String, input: &Path, table: &str, output: &Output) -> Result<()> {
    match &output.out_dir {
        Some(dir) => {
            let path = save_file(&content, dir, &file_stem(input), table, output.export_format)?;
            info!("wrote {}", path.display());
            println!("Saved {} to {}", table, path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Pmi {
            input,
            token_sets,
            use_lemma,
            filter,
            top,
            output,
        } => {
            let sets: Vec<Vec<String>> = if token_sets {
                read_json_lines(&input)?
            } else {
                doc_term_sets(&read_documents(&input)?, use_lemma)
            };
            let allowed: Option<HashSet<String>> = match filter {
                Some(path) => Some(
                    fs::read_to_string(path)?
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(String::from)
                        .collect(),
                ),
                None => None,
            };
            let pmi = PmiCooc::new(&sets, allowed.as_ref())?;
            let rows = pmi_rows(&pmi, top);
            emit(render_rows(&rows, output.export_format)?, &input, "pmi", &output)
        }
        Command::Tails {
            input,
            dictionary,
            token_pos,
            dependency_pos,
            max_threshold,
            min_threshold,
            no_max_threshold,
            no_min_threshold,
            keep_pron,
            prefix_size,
            output,
        } => {
            let dict = CategoryDictionary::from_dic_file(&dictionary, prefix_size)?;
            let docs = read_documents(&input)?;
            let index = lemma_pos_tf_index(&docs, keep_pron);
            let mut options = TailOptions::default();
            if max_threshold.is_some() || no_max_threshold {
                options.max_threshold = max_threshold;
            }
            if min_threshold.is_some() || no_min_threshold {
                options.min_threshold = min_threshold;
            }
            if !dependency_pos.is_empty() {
                options.dependency_pos = dependency_pos;
            }
            info!(
                "tail thresholds: max {:?}, min {:?}",
                options.max_threshold, options.min_threshold
            );
            let rows = build_tail_report(&docs, &index, token_pos.as_slice(), &dict, &options);
            emit(render_rows(&rows, output.export_format)?, &input, "tails", &output)
        }
        Command::Distribution {
            input,
            low_threshold,
            output,
        } => {
            let docs = read_documents(&input)?;
            let rows = pos_tail_distribution(&lemma_pos_tf_index(&docs, false), low_threshold);
            emit(
                render_rows(&rows, output.export_format)?,
                &input,
                "distribution",
                &output,
            )
        }
        Command::Categories {
            input,
            dictionary,
            id_column,
            text_column,
            prefix_size,
            output,
        } => {
            let dict = CategoryDictionary::from_dic_file(&dictionary, prefix_size)?;
            let mut texts = Vec::new();
            for row in read_tsv(&input)? {
                match (row.get(&id_column), row.get(&text_column)) {
                    (Some(id), Some(text)) => texts.push((id.clone(), text.clone())),
                    _ => {
                        return Err(AnalysisError::InvalidConfig(format!(
                            "missing column {id_column:?} or {text_column:?} in {}",
                            input.display()
                        )));
                    }
                }
            }
            let table = dict.category_table(texts);
            emit(
                export::render_category_table(&table, output.export_format)?,
                &input,
                "categories",
                &output,
            )
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("Error: {}", e);
        process::exit(1);
    }
}
