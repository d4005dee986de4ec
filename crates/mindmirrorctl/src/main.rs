//! MindMirror control CLI.
//!
//! Thin host around the resolution engine: loads config, runs the pipeline
//! or a single capability, prints the result as JSON. No resolution logic
//! lives here.

use anyhow::Result;
use clap::{Parser, Subcommand};
use mindmirror_common::{Capability, CapabilityRequest};
use mindmirror_engine::config::CONFIG_PATH;
use mindmirror_engine::{EngineConfig, ResponseCache, SafetyInterceptor};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "mindmirrorctl")]
#[command(about = "MindMirror - resilient mood reflection engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a journal entry
    Run {
        /// Journal entry text
        text: String,

        /// Overall wall-clock budget in seconds
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// Also synthesize the reflection as speech
        #[arg(long)]
        speech: bool,
    },

    /// Resolve a single capability
    Resolve {
        /// One of: emotion, reflection, art, transcription, speech
        capability: String,

        /// Input text (base64 audio for transcription)
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = EngineConfig::load(&cli.config);

    match cli.command {
        Commands::Run {
            text,
            deadline_secs,
            speech,
        } => {
            if speech {
                config.pipeline.enable_speech = true;
            }
            let orchestrator = config.build_orchestrator();
            let result = orchestrator
                .run_with_deadline(
                    &text,
                    BTreeMap::new(),
                    deadline_secs.map(Duration::from_secs),
                )
                .await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Resolve { capability, text } => {
            let capability: Capability = capability
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let resolver = config.build_resolver(
                capability,
                Arc::new(ResponseCache::new(config.cache.size_bound)),
                Arc::new(SafetyInterceptor::new()),
            );
            let result = resolver
                .resolve(&CapabilityRequest::new(text, capability))
                .await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
