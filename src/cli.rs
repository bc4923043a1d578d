use crate::config::ExtensionConfig;
use crate::config::constants::DEFAULT_CONFIG_FILE;
use crate::pipeline::{
    Action, ExecutorConfig, PipelineRequest, ProcessChainExecutor, StageResult,
    pointer_extensions, verify_chain, verify_output,
};
use crate::util::file::{copy_file_to, fingerprint_file, open_input, open_output};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

type CommandResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Where extension declarations come from
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// JSON extension declaration file
    #[clap(short = 'c', long, conflicts_with = "git")]
    pub config: Option<PathBuf>,
    /// Read lfs.extension.* entries from git config
    #[clap(short = 'g', long)]
    pub git: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// File name substituted for %f in extension arguments
    #[clap(short = 'f', long = "file")]
    pub file_name: String,
    #[command(flatten)]
    pub source: SourceArgs,
    /// Input path (stdin when omitted)
    #[clap(short = 'i', long)]
    pub input: Option<PathBuf>,
    /// Output path (stdout when omitted)
    #[clap(short = 'o', long)]
    pub output: Option<PathBuf>,
    /// Write the fingerprint chain as JSON to this path
    #[clap(short = 'r', long)]
    pub results: Option<PathBuf>,
    /// Directory for the intermediate output file
    #[clap(long)]
    pub temp_dir: Option<PathBuf>,
    /// Directory the extensions run in (the current directory when omitted)
    #[clap(short = 'w', long)]
    pub work_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
#[command(version, about, long_about = None)]
pub enum Commands {
    /// Run the clean filters (working tree to storage)
    Clean(FilterArgs),

    /// Run the smudge filters (storage to working tree)
    Smudge(FilterArgs),

    /// List configured extensions in stage order
    List(SourceArgs),

    /// Check a recorded fingerprint chain against its original input
    Verify {
        /// Results file written by clean or smudge
        #[clap(short = 'r', long)]
        results: PathBuf,
        /// Original input the chain was recorded from
        #[clap(short = 'i', long)]
        input: PathBuf,
        /// Final content, checked against the last recorded stage
        #[clap(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

/// lfs-ext Command
#[derive(Parser)]
#[command(about = None)]
pub struct Cli {
    /// Log debug output to the console
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,
    /// Directory for the debug log file
    #[clap(long, global = true)]
    pub log_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Fingerprint chain of one pipeline run, as written by `--results`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub action: Action,
    pub file_name: String,
    /// Pointer file extension lines
    pub pointer: Vec<String>,
    pub results: Vec<StageResult>,
}

async fn load_extensions(source: &SourceArgs) -> Result<ExtensionConfig, crate::ConfigError> {
    let config = if source.git {
        ExtensionConfig::from_git(None).await?
    } else {
        let path = source
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        ExtensionConfig::load(&path).await?
    };

    if config.is_empty() {
        warn!("No extensions configured");
    }
    Ok(config)
}

/// Run a clean or smudge pipeline
pub async fn filter_command(action: Action, args: FilterArgs) -> CommandResult {
    let config = load_extensions(&args.source).await?;
    let extensions = config.stages(action)?;

    let executor = ProcessChainExecutor::with_config(ExecutorConfig {
        temp_dir: args.temp_dir.clone(),
        working_dir: args.work_dir.clone(),
        ..ExecutorConfig::default()
    });

    let input = open_input(args.input.as_deref()).await?;
    let response = executor
        .run(PipelineRequest::new(
            action,
            input,
            &args.file_name,
            extensions.clone(),
        ))
        .await?;

    let mut output = open_output(args.output.as_deref()).await?;
    let bytes = copy_file_to(response.output.path(), &mut output).await?;
    debug!("Wrote {} bytes of {} output", bytes, action);

    let record = AuditRecord {
        action,
        file_name: args.file_name,
        pointer: pointer_extensions(&extensions, &response.results),
        results: response.results,
    };

    match args.results {
        Some(path) => write_record(&path, &record).await?,
        None => {
            for line in &record.pointer {
                info!("{}", line);
            }
        }
    }

    Ok(())
}

async fn write_record(path: &Path, record: &AuditRecord) -> CommandResult {
    let json = serde_json::to_vec_pretty(record)?;
    tokio::fs::write(path, json).await?;
    debug!("Fingerprint chain written to {:?}", path);
    Ok(())
}

/// Print configured extensions in stage order
pub async fn list_command(source: SourceArgs) -> CommandResult {
    let config = load_extensions(&source).await?;
    for ext in config.sorted()? {
        println!("Extension: {}", ext.name);
        println!("    clean = {}", ext.clean);
        println!("    smudge = {}", ext.smudge);
        println!("    priority = {}", ext.priority);
    }
    Ok(())
}

/// Verify a results file against the original input and, when given, the
/// final output
pub async fn verify_command(
    results: PathBuf,
    input: PathBuf,
    output: Option<PathBuf>,
) -> CommandResult {
    let content = tokio::fs::read_to_string(&results).await?;
    let record: AuditRecord = serde_json::from_str(&content)?;
    let original = fingerprint_file(&input).await?;

    verify_chain(&original, &record.results)?;
    if let Some(path) = output {
        let produced = fingerprint_file(&path).await?;
        verify_output(&original, &record.results, &produced)?;
        debug!("Output {:?} matches the last stage", path);
    }

    info!(
        "Fingerprint chain of {} stage(s) for '{}' is intact",
        record.results.len(),
        record.file_name
    );
    Ok(())
}
