mod lobby;
mod log_sink;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use meshcall_core::{AudioConstraints, IceServerConfig, Role};
use meshcall_peer::MeshConfig;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshcall", version, about = "Peer-to-peer video mesh participant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a session through its relay and call everyone once the game starts.
    Join(JoinArgs),
}

#[derive(Args, Clone)]
pub struct JoinArgs {
    #[arg(long, default_value = "ws://localhost:5000")]
    pub url: String,

    /// Display name; prompted for when omitted.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Mark ourselves ready right after joining.
    #[arg(long)]
    pub ready: bool,

    /// JSON file with a mesh configuration; flags override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Join without capture.
    #[arg(long)]
    pub no_camera: bool,

    #[arg(long)]
    pub audio: bool,

    /// Keep the host out of the mesh.
    #[arg(long)]
    pub exclude_host: bool,

    /// Candidate-gathering server URL; may be repeated.
    #[arg(long = "ice-server")]
    pub ice_servers: Vec<String>,
}

impl JoinArgs {
    pub fn mesh_config(&self) -> Result<MeshConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                MeshConfig::from_json(&text)
                    .with_context(|| format!("Invalid mesh configuration in {}", path.display()))?
            }
            None => MeshConfig::default(),
        };

        if self.audio {
            config.media.audio = AudioConstraints::Enabled(true);
        }
        if self.exclude_host {
            config = config.excluding(Role::Host);
        }
        if !self.ice_servers.is_empty() {
            config.transport.ice_servers = vec![IceServerConfig {
                urls: self.ice_servers.clone(),
                username: None,
                credential: None,
            }];
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Join(args) => lobby::run(args).await,
    }
}
