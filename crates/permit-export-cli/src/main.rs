use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use permit_export_catalog::{duplicate_keys, ForeignSchemaSource, JsonSchemaSource, SchemaMapper};
use permit_export_core::{Config, ExportScope, ResourceDefinition, WarningCollector};
use permit_export_engine::{
    render_resources, ExportOptions, ExportOrchestrator, ExportOutcome, ExportProgress,
    ExportStatus,
};
use permit_export_state::{PolicyStateClient, SnapshotClient};

/// Config file looked up in the working directory when --config is absent
const DEFAULT_CONFIG_FILE: &str = "permit-export.toml";

/// Permit export - Terraform export of Permit.io authorization models
#[derive(Parser)]
#[command(name = "permit-export")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: permit-export.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export an environment's policy state as Terraform HCL
    Export {
        /// Policy state snapshot (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Environment identifier for the document header
        #[arg(long)]
        environment: Option<String>,

        /// Project identifier for the document header
        #[arg(long)]
        project: Option<String>,

        /// Organization identifier for the document header
        #[arg(long)]
        organization: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// API key embedded in the provider block
        #[arg(long, env = "PERMIT_API_KEY", hide_env_values = true)]
        api_key: String,
    },

    /// Map a query-engine schema snapshot to resource definitions
    MapSchema {
        /// Foreign schema snapshot (JSON)
        schema: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Hcl)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a config file with default settings
    InitConfig {
        /// Where to write the config
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Hcl,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Export {
            snapshot,
            environment,
            project,
            organization,
            output,
            api_key,
        } => {
            let scope = resolve_scope(environment, project, organization, &config);
            export_command(&config, &snapshot, &scope, &api_key, output.as_deref(), cli.verbose).await
        }
        Commands::MapSchema {
            schema,
            format,
            output,
        } => map_schema_command(&config, &schema, format, output.as_deref(), cli.verbose).await,
        Commands::InitConfig { path, force } => init_config_command(&path, force),
    }
}

/// Log to stderr; RUST_LOG overrides the default level
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = if let Some(config_path) = path {
        Config::from_file(config_path)?
    } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG_FILE))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if verbose {
        eprintln!("{} {}", "Using API endpoint:".cyan(), config.api_url);
    }

    Ok(config)
}

/// Command-line identifiers win over the config's scope defaults
fn resolve_scope(
    environment: Option<String>,
    project: Option<String>,
    organization: Option<String>,
    config: &Config,
) -> ExportScope {
    ExportScope {
        environment_id: environment,
        project_id: project,
        organization_id: organization,
    }
    .or(&config.scope)
}

/// Export command - render live policy state as HCL
async fn export_command(
    config: &Config,
    snapshot: &Path,
    scope: &ExportScope,
    api_key: &str,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Loading policy snapshot from:".cyan(), snapshot.display());
    }

    let client = SnapshotClient::from_file(snapshot).await?;
    let outcome = export_state(Arc::new(client), config, scope, api_key).await?;

    write_output(output, outcome.document.as_str())?;
    if let Some(path) = output {
        eprintln!("{} {}", "Terraform configuration saved to:".green(), path.display());
    }

    print_warnings(&outcome.warnings);
    eprintln!("{} {}", "SHA-256:".bold(), outcome.document.sha256());

    Ok(())
}

/// Export everything `client` serves, reporting progress on stderr
async fn export_state(
    client: Arc<dyn PolicyStateClient>,
    config: &Config,
    scope: &ExportScope,
    api_key: &str,
) -> Result<ExportOutcome> {
    client
        .test_connection()
        .await
        .context("Policy state is not reachable")?;

    // Ctrl-C stops the export before the next stage
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::SeqCst);
        }
    });

    let progress = |progress: &ExportProgress| match progress.status {
        ExportStatus::Running(_) => eprintln!("{}", progress.message.cyan()),
        ExportStatus::Done => eprintln!("{}", format!("✓ {}", progress.message).green()),
        ExportStatus::Failed(_) => eprintln!("{}", format!("✗ {}", progress.message).red()),
    };

    let orchestrator = ExportOrchestrator::new(client, ExportOptions::from_config(config))
        .with_observer(Arc::new(progress))
        .with_cancellation(cancelled);

    Ok(orchestrator.export(api_key, scope).await?)
}

/// Map-schema command - import a query-engine schema as resources
async fn map_schema_command(
    config: &Config,
    schema_path: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let source = JsonSchemaSource::new(schema_path);
    let (resources, warnings) = map_schema(&source, config, verbose).await?;

    let rendered = render_mapped(&resources, format, &warnings)?;
    write_output(output, &rendered)?;
    if let Some(path) = output {
        eprintln!("{} {}", "Resources saved to:".green(), path.display());
    }

    print_warnings(&warnings.drain());

    Ok(())
}

/// Fetch a schema and map it; duplicate keys are reported as warnings
async fn map_schema(
    source: &dyn ForeignSchemaSource,
    config: &Config,
    verbose: bool,
) -> Result<(Vec<ResourceDefinition>, WarningCollector)> {
    let schema = source.fetch_schema().await?;

    let mapper = SchemaMapper::new(config.mapper.domain.clone());
    let resources = mapper.map(&schema);

    if verbose {
        eprintln!(
            "{} {} resources from {} columns",
            "Mapped".cyan(),
            resources.len(),
            schema.column_count()
        );
    }

    let warnings = WarningCollector::new();
    for key in duplicate_keys(&resources) {
        warnings.add(format!(
            "Resource key '{}' occurs more than once (overloaded routine?)",
            key
        ));
    }

    Ok((resources, warnings))
}

fn render_mapped(
    resources: &[ResourceDefinition],
    format: OutputFormat,
    warnings: &WarningCollector,
) -> Result<String> {
    match format {
        OutputFormat::Hcl => Ok(render_resources(resources, warnings)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(resources)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Init-config command - write the default configuration
fn init_config_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save_to_file(path)?;
    println!("{} {}", "Config written to:".green(), path.display());

    Ok(())
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }

    eprintln!();
    eprintln!("{}", format!("⚠ {} warnings:", warnings.len()).yellow().bold());
    for warning in warnings {
        eprintln!("  - {}", warning);
    }
}
