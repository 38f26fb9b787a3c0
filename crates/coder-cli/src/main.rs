//! Coder agent CLI
//!
//! The `coder` command runs the resilient pipelines against an
//! OpenAI-compatible endpoint and prints the outcome as JSON.
//!
//! ## Commands
//!
//! - `plan`: Break a requirement into components and search queries
//! - `exemplars`: Pick reference code sections for a requirement
//! - `docs`: Generate a documentation bundle
//! - `run`: Plan, select exemplars and document in one go

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use coder_core::{
    CodeSection, CoderAgent, DocRequest, Exemplar, PipelineConfig, RunInput, TextGenerator,
};
use llm_gateway::{ChatClient, GatewayConfig};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "coder")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Plan, find exemplars and document code with a language model", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    gateway: GatewayArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Connection settings for the text-generation endpoint
#[derive(Args, Debug, Clone)]
struct GatewayArgs {
    /// Base URL of the OpenAI-compatible API
    #[arg(long, global = true, env = "CODER_LLM_BASE_URL", default_value = llm_gateway::DEFAULT_BASE_URL)]
    base_url: String,

    /// Model name sent with each request
    #[arg(long, global = true, env = "CODER_LLM_MODEL", default_value = llm_gateway::DEFAULT_MODEL)]
    model: String,

    /// Bearer token (falls back to OPENAI_API_KEY)
    #[arg(long, global = true, env = "CODER_LLM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "120")]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Break a requirement into components and search queries
    Plan {
        /// What to build
        #[arg(short, long)]
        requirement: String,

        /// Kind of project the code belongs to
        #[arg(short, long, default_value = "generic")]
        project_type: String,
    },

    /// Pick exemplar sections for a requirement
    Exemplars {
        /// What to build
        #[arg(short, long)]
        requirement: String,

        /// JSON array of code sections
        #[arg(short, long)]
        sections: PathBuf,

        /// Maximum exemplars to return (default: CODER_MAX_EXEMPLARS or 3)
        #[arg(short = 'n', long)]
        max: Option<usize>,
    },

    /// Generate a documentation bundle
    Docs {
        /// What the code does
        #[arg(short, long)]
        requirement: String,

        /// Kind of project the code belongs to
        #[arg(short, long, default_value = "generic")]
        project_type: String,

        /// Source file to document
        #[arg(short, long)]
        code: Option<PathBuf>,

        /// JSON array of exemplars, as printed by `coder exemplars`
        #[arg(short, long)]
        exemplars: Option<PathBuf>,

        /// JSON object of team knowledge
        #[arg(short, long)]
        knowledge: Option<PathBuf>,
    },

    /// Plan, select exemplars, then document
    Run {
        /// What to build
        #[arg(short, long)]
        requirement: String,

        /// Kind of project the code belongs to
        #[arg(short, long, default_value = "generic")]
        project_type: String,

        /// JSON array of code sections
        #[arg(short, long)]
        sections: Option<PathBuf>,

        /// Source file to document
        #[arg(short, long)]
        code: Option<PathBuf>,

        /// JSON object of team knowledge
        #[arg(short, long)]
        knowledge: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    coder_core::init_tracing(cli.json, level);

    let agent = build_agent(&cli.gateway)?;

    match cli.command {
        Commands::Plan {
            requirement,
            project_type,
        } => cmd_plan(&agent, &requirement, &project_type).await,
        Commands::Exemplars {
            requirement,
            sections,
            max,
        } => cmd_exemplars(&agent, &requirement, &sections, max).await,
        Commands::Docs {
            requirement,
            project_type,
            code,
            exemplars,
            knowledge,
        } => {
            cmd_docs(
                &agent,
                &requirement,
                &project_type,
                code.as_deref(),
                exemplars.as_deref(),
                knowledge.as_deref(),
            )
            .await
        }
        Commands::Run {
            requirement,
            project_type,
            sections,
            code,
            knowledge,
        } => {
            cmd_run(
                &agent,
                requirement,
                project_type,
                sections.as_deref(),
                code.as_deref(),
                knowledge.as_deref(),
            )
            .await
        }
    }
}

fn gateway_config(args: &GatewayArgs) -> GatewayConfig {
    let mut config =
        GatewayConfig::new(&args.base_url, &args.model).with_timeout_secs(args.timeout_secs);
    let key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok());
    if let Some(key) = key {
        config = config.with_api_key(&key);
    }
    config
}

fn build_agent(args: &GatewayArgs) -> Result<CoderAgent> {
    let client = ChatClient::new(gateway_config(args)).context("Failed to build HTTP client")?;
    let config = PipelineConfig::from_env().context("Invalid pipeline configuration")?;
    Ok(agent_with(Arc::new(client), config))
}

fn agent_with(generator: Arc<dyn TextGenerator>, config: PipelineConfig) -> CoderAgent {
    CoderAgent::new(generator).with_config(config)
}

async fn cmd_plan(agent: &CoderAgent, requirement: &str, project_type: &str) -> Result<()> {
    let outcome = agent.plan(requirement, project_type).await;
    report_degraded("plan", outcome.is_degraded());
    print_json(&outcome)
}

async fn cmd_exemplars(
    agent: &CoderAgent,
    requirement: &str,
    sections: &Path,
    max: Option<usize>,
) -> Result<()> {
    let sections = read_sections(sections)?;
    let max = max.unwrap_or(agent.config().max_exemplars);
    let outcome = agent.select_exemplars(requirement, &sections, max).await;
    report_degraded("exemplars", outcome.is_degraded());
    print_json(&outcome)
}

async fn cmd_docs(
    agent: &CoderAgent,
    requirement: &str,
    project_type: &str,
    code: Option<&Path>,
    exemplars: Option<&Path>,
    knowledge: Option<&Path>,
) -> Result<()> {
    let mut request = DocRequest::new(requirement, project_type);
    if let Some(path) = code {
        request = request.with_code(read_text(path)?);
    }
    if let Some(path) = exemplars {
        request = request.with_exemplars(read_exemplars(path)?);
    }
    if let Some(path) = knowledge {
        request = request.with_tribal_knowledge(read_knowledge(path)?);
    }

    let outcome = agent.document(&request).await;
    report_degraded("documentation", outcome.is_degraded());
    print_json(&outcome)
}

async fn cmd_run(
    agent: &CoderAgent,
    requirement: String,
    project_type: String,
    sections: Option<&Path>,
    code: Option<&Path>,
    knowledge: Option<&Path>,
) -> Result<()> {
    let input = RunInput {
        requirement,
        project_type,
        code: code.map(read_text).transpose()?.unwrap_or_default(),
        sections: sections.map(read_sections).transpose()?.unwrap_or_default(),
        tribal_knowledge: knowledge.map(read_knowledge).transpose()?.unwrap_or_default(),
    };

    info!(sections = input.sections.len(), "starting run");
    let report = agent.run(input).await;
    report_degraded("run", report.is_degraded());
    print_json(&report)
}

fn report_degraded(stage: &str, degraded: bool) {
    if degraded {
        warn!(stage, "model output was repaired or replaced with defaults");
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_text(path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn read_sections(path: &Path) -> Result<Vec<CodeSection>> {
    read_json_file(path)
}

fn read_exemplars(path: &Path) -> Result<Vec<Exemplar>> {
    // Accept both a bare array and the `coder exemplars` outcome wrapper.
    let value: Value = read_json_file(path)?;
    let list = match value {
        Value::Object(mut obj) if obj.contains_key("value") => obj.remove("value").unwrap_or_default(),
        other => other,
    };
    serde_json::from_value(list).with_context(|| format!("Expected exemplar list in {:?}", path))
}

fn read_knowledge(path: &Path) -> Result<Map<String, Value>> {
    match read_json_file(path)? {
        Value::Object(map) => Ok(map),
        other => bail!(
            "Knowledge file {:?} must hold a JSON object, found {}",
            path,
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
