use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use murmur::config::Config;
use murmur::output::export::{self, ExportFormat};
use murmur::output::terminal;
use murmur::pipeline::corpus::{self, CorpusTable};
use murmur::pipeline::{Mode, PipelineOutput, TopicPipeline};
use murmur::store::{FileModelStore, ModelStore};
use murmur::topics::names::TopicNames;
use murmur::topics::spelling::SymSpell;

/// Edit distance for a user-supplied spelling dictionary.
const SPELL_EDIT_DISTANCE: usize = 2;

/// Murmur: discover the topics people write about in short responses.
///
/// Clusters short texts with a Dirichlet-multinomial mixture, reconstructs
/// readable keywords for each cluster, and labels every response.
#[derive(Parser)]
#[command(name = "murmur", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new topic model on a CSV corpus and label it
    Fit {
        /// Input CSV with a text column (see MURMUR_TEXT_COLUMN)
        input: PathBuf,

        /// Directory for the topic table and labeled corpus
        #[arg(long, default_value = "out")]
        output_dir: PathBuf,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
    },

    /// Label a CSV corpus with the saved topic model and curated names
    Apply {
        /// Input CSV with a text column (see MURMUR_TEXT_COLUMN)
        input: PathBuf,

        /// Directory for the topic table and labeled corpus
        #[arg(long, default_value = "out")]
        output_dir: PathBuf,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
    },

    /// Store a curated topic-name table (columns `topic number`, `topic`)
    Names {
        /// The edited topic table
        table: PathBuf,
    },

    /// Show metadata of the saved topic model
    Inspect,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("murmur=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let store = FileModelStore::new(&config.model_dir);

    match cli.command {
        Commands::Fit {
            input,
            output_dir,
            format,
        } => {
            let table = read_corpus(&config, &input)?;
            println!(
                "Fitting {} topics on {} records...",
                config.k,
                table.documents.len()
            );

            let pipeline = build_pipeline(&config, &store)?;
            let pb = ProgressBar::new(config.iterations as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Gibbs [{bar:30}] {pos}/{len} {msg} ({eta})")
                    .context("Invalid progress bar template")?,
            );
            let output = pipeline.run_with_progress(Mode::Fit, &table.documents, |pass| {
                pb.set_message(format!(
                    "{} moved, {} clusters",
                    pass.transfers, pass.populated_clusters
                ));
                pb.inc(1);
            })?;
            pb.finish_and_clear();

            finish(&output, &table, &output_dir, format)?;
            println!(
                "\n{} Saved model to {}",
                "Done.".bold(),
                store.root().join(&config.model_key).display()
            );
            if format == ExportFormat::Csv {
                println!(
                    "Fill in the topic column of {} and run `murmur names <file>` before applying.",
                    output_dir.join(format!("{}.csv", export::TOPICS_FILE_STEM)).display()
                );
            }
        }

        Commands::Apply {
            input,
            output_dir,
            format,
        } => {
            let table = read_corpus(&config, &input)?;
            println!("Labeling {} records...", table.documents.len());

            let pipeline = build_pipeline(&config, &store)?;
            let output = pipeline.run(Mode::Apply, &table.documents)?;
            finish(&output, &table, &output_dir, format)?;
        }

        Commands::Names { table } => {
            let bytes = std::fs::read(&table)
                .with_context(|| format!("Failed to read {}", table.display()))?;
            // Reject a malformed table now rather than at the next apply run.
            let names = TopicNames::from_csv(bytes.as_slice())?;
            store.put(&config.topic_names_key, &bytes)?;
            info!(key = %config.topic_names_key, names = names.len(), "Stored topic names");
            println!("{} {} topic names stored.", "✓".green(), names.len());
        }

        Commands::Inspect => {
            let bytes = store
                .get(&config.model_key)?
                .ok_or_else(|| murmur::PipelineError::ModelNotFound(config.model_key.clone()))?;
            let info = murmur::cluster::inspect(&bytes)?;
            terminal::display_model_info(&config.model_key, &info);
        }
    }

    Ok(())
}

fn read_corpus(config: &Config, input: &Path) -> Result<CorpusTable> {
    let table = corpus::read_csv_path(input, &config.id_column, &config.text_column)?;
    info!(path = %input.display(), records = table.documents.len(), "Read corpus");
    Ok(table)
}

/// Build the pipeline, with the configured spelling dictionary if there is one.
fn build_pipeline<'a>(config: &'a Config, store: &'a dyn ModelStore) -> Result<TopicPipeline<'a>> {
    let pipeline = TopicPipeline::new(config, store);
    let Some(path) = &config.spell_dictionary else {
        return Ok(pipeline);
    };
    let file = File::open(path)
        .with_context(|| format!("Failed to open spelling dictionary {}", path.display()))?;
    let dictionary = SymSpell::from_reader(BufReader::new(file), SPELL_EDIT_DISTANCE)?;
    info!(path = %path.display(), words = dictionary.len(), "Loaded spelling dictionary");
    Ok(pipeline.with_corrector(Box::new(dictionary)))
}

/// Show the topic table and write both output files.
fn finish(
    output: &PipelineOutput,
    table: &CorpusTable,
    output_dir: &Path,
    format: ExportFormat,
) -> Result<()> {
    terminal::display_topics(&output.topics, output.considered);

    let written = export::export_all(output_dir, format, &output.topics, table, &output.documents)?;
    for path in written {
        println!("  Wrote {}", path.display());
    }

    let unlabeled = output.documents.iter().filter(|d| d.cluster.is_none()).count();
    if unlabeled > 0 {
        println!(
            "  {}",
            format!("{unlabeled} records had no usable text and stay unlabeled").dimmed()
        );
    }
    Ok(())
}
