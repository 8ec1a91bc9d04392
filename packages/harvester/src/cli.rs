//! Command-line interface for the harvester.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::client::ColecticaClient;
use crate::config::{
    validate_agency, validate_identifier, RegistryConfig, ENV_HOST, ENV_ITEM_TYPES, ENV_PASSWORD,
    ENV_USERNAME,
};
use crate::error::{HarvesterError, Result};
use crate::harvester::{
    fetch_item, harvest_question, item_info_set, item_set_table, save_question_tables,
};
use crate::pipeline::PipelineOptions;
use crate::resolver::ResolvedItem;

/// DDI Harvester - Extract DDI-Lifecycle metadata from a Colectica registry.
#[derive(Parser)]
#[command(name = "ddi-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Registry connection flags. Each falls back to its environment variable.
#[derive(Args, Debug, Default)]
pub struct RegistryArgs {
    /// Registry host, e.g. discovery.closer.ac.uk [env: COLECTICA_HOST]
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// [env: COLECTICA_USERNAME]
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// [env: COLECTICA_PASSWORD]
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// JSON file mapping item type labels to type codes [env: COLECTICA_ITEM_TYPES]
    #[arg(long, global = true)]
    pub item_types: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one item and print its decoded metadata.
    Item {
        /// Agency identifier (e.g., uk.cls.nextsteps)
        agency: String,

        /// Item identifier (UUID)
        identifier: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// List the members of an item's set as CSV.
    Set {
        agency: String,
        identifier: String,

        /// Item version (default: the item's current version)
        #[arg(long)]
        version: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the question and category tables for a question.
    Question {
        agency: String,
        identifier: String,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File name prefix (default: the question item name)
        #[arg(long)]
        stem: Option<String>,

        /// Category fetches to run in parallel [env: COLECTICA_FETCH_CONCURRENCY]
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Item {
            agency,
            identifier,
            format,
        } => item_command(&cli.registry, &agency, &identifier, format),
        Commands::Set {
            agency,
            identifier,
            version,
            output,
        } => set_command(
            &cli.registry,
            &agency,
            &identifier,
            version.as_deref(),
            output.as_deref(),
        ),
        Commands::Question {
            agency,
            identifier,
            output,
            stem,
            concurrency,
        } => question_command(
            &cli.registry,
            &agency,
            &identifier,
            output.as_deref(),
            stem.as_deref(),
            concurrency,
        ),
    }
}

/// Build registry settings: flags first, then the environment.
pub fn registry_config(args: &RegistryArgs) -> Result<RegistryConfig> {
    registry_config_with(args, |key| std::env::var(key).ok())
}

fn registry_config_with(
    args: &RegistryArgs,
    env: impl Fn(&str) -> Option<String>,
) -> Result<RegistryConfig> {
    RegistryConfig::from_lookup(|key| {
        let flag = match key {
            ENV_HOST => args.host.clone(),
            ENV_USERNAME => args.username.clone(),
            ENV_PASSWORD => args.password.clone(),
            ENV_ITEM_TYPES => args.item_types.as_ref().map(|p| p.display().to_string()),
            _ => None,
        };
        flag.or_else(|| env(key))
    })
}

fn connect(args: &RegistryArgs) -> Result<(RegistryConfig, ColecticaClient)> {
    let config = registry_config(args)?;
    let client = ColecticaClient::connect(&config)?;
    Ok((config, client))
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Clear the spinner whatever the outcome.
fn finish<T>(pb: ProgressBar, result: Result<T>) -> Result<T> {
    pb.finish_and_clear();
    result
}

fn item_command(
    args: &RegistryArgs,
    agency: &str,
    identifier: &str,
    format: OutputFormat,
) -> Result<()> {
    validate_agency(agency)?;
    validate_identifier(identifier)?;
    let (_, client) = connect(args)?;

    let pb = spinner("Fetching item...");
    let item = finish(pb, fetch_item(&client, agency, identifier))?;

    println!("{}", render_item(&item, format)?);
    Ok(())
}

/// Serialize a resolved item for printing.
pub fn render_item(item: &ResolvedItem, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(item)?),
        OutputFormat::Yaml => Ok(serde_yaml_ng::to_string(item)?),
    }
}

fn set_command(
    args: &RegistryArgs,
    agency: &str,
    identifier: &str,
    version: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    validate_agency(agency)?;
    validate_identifier(identifier)?;
    let (_, client) = connect(args)?;

    let pb = spinner("Fetching set...");
    let result = match version {
        Some(version) => item_set_table(&client, agency, identifier, version),
        None => item_info_set(&client, agency, identifier).map(|(table, _)| table),
    };
    let table = finish(pb, result)?;

    match output {
        Some(path) => {
            table.save_csv(path)?;
            eprintln!(
                "{} {} ({} items)",
                style("Saved to:").green().bold(),
                path.display(),
                table.len()
            );
        }
        None => table.write_csv(io::stdout().lock())?,
    }
    Ok(())
}

fn question_command(
    args: &RegistryArgs,
    agency: &str,
    identifier: &str,
    output: Option<&Path>,
    stem: Option<&str>,
    concurrency: Option<usize>,
) -> Result<()> {
    validate_agency(agency)?;
    validate_identifier(identifier)?;

    // Validate output directory before fetching anything
    let output_dir = output.unwrap_or_else(|| Path::new("."));
    if !output_dir.is_dir() {
        return Err(HarvesterError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Output directory does not exist: {}", output_dir.display()),
        )));
    }

    let (config, client) = connect(args)?;
    let options = PipelineOptions::default()
        .with_fetch_concurrency(concurrency.unwrap_or(config.fetch_concurrency));

    eprintln!(
        "{} {} {}",
        style("Assembling question").bold(),
        style(agency).cyan(),
        style(identifier).cyan()
    );

    let pb = spinner("Fetching question and responses...");
    let (question, categories) =
        finish(pb, harvest_question(&client, agency, identifier, &options))?;

    let stem = stem
        .or_else(|| question.cell(0, "QuestionItemName"))
        .unwrap_or(identifier);
    let (question_path, categories_path) =
        save_question_tables(&question, &categories, output_dir, stem)?;

    eprintln!(
        "  Response type: {}",
        style(question.cell(0, "response_type").unwrap_or("none")).green()
    );
    eprintln!("  Categories: {}", categories.len());
    eprintln!(
        "{} {}, {}",
        style("Saved to:").green().bold(),
        question_path.display(),
        categories_path.display()
    );
    Ok(())
}
