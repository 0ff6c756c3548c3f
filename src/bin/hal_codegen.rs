//! hal-codegen CLI
//!
//! Crawls a HAL/ALPS API and writes TypeScript client sources.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hal_codegen::codegen::write_files;
use hal_codegen::{CodegenConfig, CodegenError, MetadataClient, Pipeline, Result};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hal-codegen")]
#[command(about = "Generate typed clients from HAL/ALPS API metadata")]
#[command(version)]
struct Cli {
    /// Configuration file, layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the API and write client sources
    Generate {
        /// Profile document URL
        #[arg(long)]
        profile_url: Option<String>,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// List the files that would be written without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Crawl the API and print the resolved catalog as JSON
    Inspect {
        /// Profile document URL
        #[arg(long)]
        profile_url: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default configuration file
    Init {
        #[arg(default_value = "hal-codegen.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("❌ {} failed: {}", e.stage(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref().map(|p| p.to_string_lossy().into_owned());

    match cli.command {
        Commands::Generate {
            profile_url,
            out,
            dry_run,
        } => {
            let mut config = CodegenConfig::load_from(config_path.as_deref())?;
            if let Some(url) = profile_url {
                config.server.profile_url = url;
            }
            if let Some(dir) = out {
                config.output.dir = dir;
            }

            println!("🔍 Crawling {}", config.server.profile_url);
            let client = MetadataClient::connect(&config.server, &config.auth).await?;
            let (output, files) = Pipeline::new(&client, &config).generate().await?;

            println!("  {} entities resolved", output.catalog.len());
            for cycle in &output.cycles {
                println!("  ⚠️  reference cycle: {}", cycle.join(" -> "));
            }

            if dry_run {
                for file in &files {
                    println!("  would write {}", config.output.dir.join(&file.path).display());
                }
                return Ok(());
            }

            write_files(&config.output.dir, &files)?;
            println!("✅ Wrote {} files to {}", files.len(), config.output.dir.display());
            Ok(())
        }

        Commands::Inspect { profile_url } => {
            let mut config = CodegenConfig::load_from(config_path.as_deref())?;
            if let Some(url) = profile_url {
                config.server.profile_url = url;
            }

            let client = MetadataClient::connect(&config.server, &config.auth).await?;
            let output = Pipeline::new(&client, &config).run().await?;
            println!("{}", serde_json::to_string_pretty(&output.summary())?);
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => init_config(&path, force),
            ConfigAction::Show => {
                let config = CodegenConfig::load_from(config_path.as_deref())?;
                print!("{}", config.to_toml()?);
                Ok(())
            }
        },
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CodegenError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists (use --force to overwrite)", path.display()),
        )));
    }
    CodegenConfig::default().save(&path.to_string_lossy())?;
    println!("✅ Wrote default configuration to {}", path.display());
    Ok(())
}
