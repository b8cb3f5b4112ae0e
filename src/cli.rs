//! command-line interface for generating seeders from the records stored in
//! the database.
//!
//! # Example
//!
//! ```rust,ignore
//! use model_seeder::cli;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> model_seeder::Result<()> {
//!     cli::main().await
//! }
//! ```
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use fs_err as fs;
use tracing::Instrument;

use crate::{
    config,
    db::{self, DbRecordSource},
    discovery::SourcePaths,
    environment::{resolve_from_env, Environment, DEFAULT_ENVIRONMENT},
    generate::{collect_messages, generate, GenerateOptions, OutputMode},
    logger,
    record::Ordering,
    registry::ModelRegistry,
};

/// Configuration folder, relative to the project root.
pub const DEFAULT_CONFIG_FOLDER: &str = "config/seeder";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Folder with models, relative to the project root, or `auto` to
    /// discover model folders [default: configured `models_path`]
    #[arg(long)]
    path: Option<String>,

    /// Folder for the seeders, relative to the project root, or `auto` to
    /// write next to each model's `database` folder [default: configured
    /// `output_path`]
    #[arg(long)]
    output: Option<String>,

    /// Keep model events firing while seeding
    #[arg(long)]
    with_events: bool,

    /// Only generate seeders for these model classes
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// Order records by this column
    #[arg(long, alias = "orderBy")]
    order_by: Option<String>,

    /// Order records by this column, descending
    #[arg(long, alias = "orderByDesc")]
    order_by_desc: Option<String>,

    /// Do not generate join table seeders
    #[arg(long)]
    no_pivots: bool,

    /// Project root
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Configuration folder [default: <root>/config/seeder]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Specify the environment
    #[arg(short, long, help = &format!("Specify the environment [default: {}]", DEFAULT_ENVIRONMENT))]
    environment: Option<String>,
}

impl Cli {
    /// Configured options with the command line flags applied on top.
    fn generate_options(&self, root: &Path, config: &config::Seeder) -> GenerateOptions {
        let mut options = GenerateOptions::from_config(root, config);
        if let Some(path) = &self.path {
            options.source = SourcePaths::parse(path);
        }
        if let Some(output) = &self.output {
            options.output = OutputMode::parse(Some(output));
        }
        options.with_events = self.with_events;
        options.only = self
            .only
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        options.order = Ordering {
            by: self.order_by.clone(),
            by_desc: self.order_by_desc.clone(),
        };
        options.pivots = !self.no_pivots;
        options
    }
}

fn create_root_span(environment: &Environment) -> tracing::Span {
    tracing::span!(tracing::Level::DEBUG, "seeder", environment = %environment)
}

/// Parse the command line and generate seeders.
///
/// # Errors
///
/// When configuration cannot be loaded, the database cannot be reached, or
/// generation fails
pub async fn main() -> crate::Result<()> {
    let cli = Cli::parse();
    let environment: Environment = cli.environment.clone().unwrap_or_else(resolve_from_env).into();

    let root = fs::canonicalize(&cli.root)?;
    let config_folder = cli
        .config
        .clone()
        .unwrap_or_else(|| root.join(DEFAULT_CONFIG_FOLDER));
    let config = environment.load_from_folder(&config_folder)?;

    logger::init(&config.logger)?;

    let registry = ModelRegistry::from_config(&config);
    let options = cli.generate_options(&root, &config.seeder);

    let db = db::connect(&config.database).await?;
    let source = DbRecordSource::new(db);

    let results = generate(&source, &registry, &options)
        .instrument(create_root_span(&environment))
        .await?;

    print!("{}", collect_messages(&results));
    println!("{}", "Database seeders created!".green());
    Ok(())
}
