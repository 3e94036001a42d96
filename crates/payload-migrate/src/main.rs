//! Payload CMS migration CLI
//!
//! Moves collections and media between two Payload CMS backends.
//! Pedantic lints relaxed for CLI ergonomics.

// CLI tool - relax pedantic lints for ergonomics
#![allow(clippy::pedantic)]

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use payload_migrate::{
    discover_manifests, Authenticator, EndpointConfig, FileSessionStore, Manifest,
    MigrationOptions, Pipeline, Role,
};

#[derive(Parser)]
#[command(name = "payload-migrate")]
#[command(version)]
#[command(about = "Migrate collections and media between Payload CMS backends", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Manifest file or directory of manifests
    #[arg(short, long, value_name = "PATH")]
    manifest: Option<PathBuf>,

    /// Restrict the run to these collections (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    collections: Vec<String>,

    /// Fetch and count documents without writing to the sink
    #[arg(long)]
    dry_run: bool,

    /// Session cache directory
    #[arg(long, env = "MIGRATE_SESSION_DIR", default_value = "tmp")]
    session_dir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a migration from a manifest file or directory
    Run {
        /// Manifest file or directory of manifests
        #[arg(short, long, value_name = "PATH")]
        manifest: PathBuf,
    },

    /// Validate a manifest file
    Validate {
        /// Manifest file path
        #[arg(short, long, value_name = "FILE")]
        manifest: PathBuf,
    },

    /// Generate an example manifest
    Init {
        /// Output file path
        #[arg(short, long, default_value = "collections/example.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = MigrationOptions {
        collections: cli.collections,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Some(Commands::Run { manifest }) => {
            run_migration(&manifest, &cli.session_dir, options).await?;
        }
        Some(Commands::Validate { manifest }) => {
            validate_manifest(&manifest)?;
        }
        Some(Commands::Init { output }) => {
            generate_manifest(&output)?;
        }
        None => {
            // Default: run migration if a manifest was provided
            if let Some(manifest) = cli.manifest {
                run_migration(&manifest, &cli.session_dir, options).await?;
            } else {
                eprintln!("Usage: payload-migrate --manifest <PATH> or payload-migrate <COMMAND>");
                eprintln!("Try 'payload-migrate --help' for more information.");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn run_migration(
    manifest: &Path,
    session_dir: &Path,
    options: MigrationOptions,
) -> anyhow::Result<()> {
    let manifests = if manifest.is_dir() {
        discover_manifests(manifest)?
    } else {
        vec![manifest.to_path_buf()]
    };
    if manifests.is_empty() {
        warn!("no manifest files found in {:?}", manifest);
        return Ok(());
    }

    let source_config = EndpointConfig::from_env(Role::Source)?;
    let sink_config = EndpointConfig::from_env(Role::Sink)?;

    let mut source_auth = Authenticator::new(
        Role::Source,
        source_config,
        Box::new(FileSessionStore::new(session_dir)),
    );
    let mut sink_auth = Authenticator::new(
        Role::Sink,
        sink_config,
        Box::new(FileSessionStore::new(session_dir)),
    );

    source_auth.login().await?;
    sink_auth.login().await?;
    info!("authenticated against source [{}]", source_auth.endpoint());
    info!("authenticated against sink [{}]", sink_auth.endpoint());

    let pipeline = Pipeline::new(&source_auth, &sink_auth, options);

    for path in manifests {
        info!("running manifest {:?}", path);
        match pipeline.run_file(&path).await {
            Ok(stats) => {
                println!("\nMigration complete: {}", path.display());
                println!("   Collections: {}", stats.collections);
                println!("   Fetched:     {}", stats.fetched);
                println!("   Posted:      {}", stats.posted);
                println!("   Failed:      {}", stats.failed);
                println!("   Duration:    {:.2}s", stats.duration_secs);
                println!("   Throughput:  {:.0} documents/sec", stats.throughput());
            }
            Err(e) => error!("manifest {:?} failed: {}", path, e),
        }
    }

    Ok(())
}

fn validate_manifest(path: &Path) -> anyhow::Result<()> {
    let manifest = Manifest::from_file(path)?;

    println!("Manifest is valid: {}", path.display());
    for spec in &manifest.collections {
        if spec.upload_fields.is_empty() {
            println!("   - {}", spec.name);
        } else {
            println!(
                "   - {} (uploads: {})",
                spec.name,
                spec.upload_fields.join(", ")
            );
        }
    }

    Ok(())
}

fn generate_manifest(output: &Path) -> anyhow::Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, MANIFEST_TEMPLATE)?;

    println!("Generated manifest: {}", output.display());
    println!(
        "   Edit the file and run: payload-migrate run --manifest {}",
        output.display()
    );

    Ok(())
}

const MANIFEST_TEMPLATE: &str = r#"{
  "collections": [
    { "name": "donors", "upload_fields": ["logo"] },
    { "name": "partners", "upload_fields": ["logo"] },
    { "name": "articles", "upload_fields": [] }
  ]
}
"#;
