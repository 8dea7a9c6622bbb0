use crate::JoinArgs;
use crate::log_sink::LogSink;
use anyhow::Result;
use colored::*;
use dialoguer::Input;
use meshcall_core::{ParticipantId, RelayMessage, RelayRequest, Roster, Signal};
use meshcall_peer::{
    MediaDevices, MeshEvent, MeshHandle, MeshParts, NoDevices, RelayFrame, RtcConnector,
    SyntheticDevices, WsRelay,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

enum Flow {
    Continue,
    Leave,
}

/// Lobby state between joining and leaving.
struct Lobby {
    args: JoinArgs,
    name: String,
    relay: WsRelay,
    local_id: Option<ParticipantId>,
    roster: Option<Roster>,
    early_signals: Vec<(ParticipantId, Signal)>,
    mesh: Option<MeshHandle>,
    events: Option<mpsc::UnboundedReceiver<MeshEvent>>,
}

pub async fn run(args: JoinArgs) -> Result<()> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None => Input::<String>::new()
            .with_prompt("Your name")
            .interact_text()?,
    };

    println!("{}", format!("🔌 Connecting to {}...", args.url).cyan());
    let (relay, mut frames) = WsRelay::connect(&args.url).await?;
    relay.request(&RelayRequest::Join { name: name.clone() })?;

    let mut lobby = Lobby {
        args,
        name,
        relay,
        local_id: None,
        roster: None,
        early_signals: Vec::new(),
        mesh: None,
        events: None,
    };

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            frame = frames.recv() => {
                match frame {
                    Some(RelayFrame::Text(text)) => {
                        if let Flow::Leave = lobby.on_text(&text).await? {
                            break;
                        }
                    }
                    Some(RelayFrame::Closed) | None => {
                        println!("{}", "⚠️  Relay connection lost".yellow().bold());
                        if let Some(mesh) = &lobby.mesh {
                            let _ = mesh.relay_closed().await;
                        }
                        break;
                    }
                }
            }

            Some(event) = next_event(&mut lobby.events) => print_event(event),

            _ = &mut ctrl_c => {
                println!("{}", "👋 Leaving...".cyan());
                break;
            }
        }
    }

    if let Some(mesh) = lobby.mesh.take() {
        mesh.teardown().await?;
        println!("{}", "✨ Mesh closed, capture released".green());
    }
    Ok(())
}

async fn next_event(events: &mut Option<mpsc::UnboundedReceiver<MeshEvent>>) -> Option<MeshEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

impl Lobby {
    async fn on_text(&mut self, text: &str) -> Result<Flow> {
        let message = match RelayMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping relay message: {}", e);
                return Ok(Flow::Continue);
            }
        };

        match message {
            RelayMessage::JoinedAsHost { id } => {
                println!("{}", format!("👑 Joined as host (id {id})").green().bold());
                self.local_id = Some(id);
            }
            RelayMessage::JoinedAsPlayer { id } => {
                println!("{}", format!("🎮 Joined as player (id {id})").green().bold());
                self.local_id = Some(id);
                if self.args.ready {
                    self.relay.request(&RelayRequest::SetReady { ready: true })?;
                }
            }
            RelayMessage::PlayersUpdate {
                players,
                ready_count,
            } => {
                print_roster(&players, ready_count, self.local_id.as_ref());
                if let Some(mesh) = &self.mesh {
                    mesh.roster_update(players.clone()).await?;
                }
                self.roster = Some(players);
            }
            RelayMessage::Signal { from_id, signal } => match &self.mesh {
                Some(mesh) => mesh.signal(from_id, signal).await?,
                None => {
                    debug!("Holding {} from {} until the game starts", signal.kind(), from_id);
                    self.early_signals.push((from_id, signal));
                }
            },
            RelayMessage::GameStarted => self.start_mesh().await?,
            RelayMessage::HostLeft => {
                println!("{}", "🚪 The host left the session".red().bold());
                return Ok(Flow::Leave);
            }
            RelayMessage::Error { message } => {
                println!("{} {}", "❌ Relay error:".red().bold(), message);
            }
            RelayMessage::Unknown => debug!("Ignoring unknown relay message"),
        }

        Ok(Flow::Continue)
    }

    async fn start_mesh(&mut self) -> Result<()> {
        if self.mesh.is_some() {
            return Ok(());
        }
        let Some(local_id) = self.local_id.clone() else {
            warn!("Game started before the relay assigned us an id");
            return Ok(());
        };

        println!("{}", "🚀 Game started, calling everyone...".green().bold());
        let config = self.args.mesh_config()?;
        let devices: Arc<dyn MediaDevices> = if self.args.no_camera {
            Arc::new(NoDevices)
        } else {
            Arc::new(SyntheticDevices::new(self.name.clone()))
        };
        let parts = MeshParts {
            devices,
            connector: Arc::new(RtcConnector::new(config.transport.clone())),
            relay: Arc::new(self.relay.clone()),
            render: Arc::new(LogSink::new()),
        };

        let (mesh, events) = MeshHandle::spawn(local_id, config, parts);
        if let Some(roster) = &self.roster {
            mesh.roster_update(roster.clone()).await?;
        }
        for (from, signal) in self.early_signals.drain(..) {
            mesh.signal(from, signal).await?;
        }

        self.mesh = Some(mesh);
        self.events = Some(events);
        Ok(())
    }
}

fn print_roster(roster: &Roster, ready_count: usize, local_id: Option<&ParticipantId>) {
    println!(
        "{}",
        format!("👥 {} participant(s), {} ready", roster.len(), ready_count).cyan()
    );
    for participant in roster.participants() {
        let me = if Some(&participant.id) == local_id { " (you)" } else { "" };
        let ready = if participant.ready { "✔".green() } else { "·".normal() };
        println!(
            "   {} {} [{:?}] id {}{}",
            ready, participant.name, participant.role, participant.id, me
        );
    }
}

fn print_event(event: MeshEvent) {
    match event {
        MeshEvent::LinkState { remote_id, state } => {
            println!("   🔗 {} {}", remote_id, state.to_string().dimmed());
        }
        MeshEvent::ConnectionState { remote_id, state } => {
            println!("   📶 {} {}", remote_id, state.to_string().bold());
        }
        MeshEvent::NegotiationFailed { remote_id, reason } => {
            println!("{} {}: {}", "   ❌ Link failed with".red(), remote_id, reason);
        }
        MeshEvent::CameraUnavailable { reason } => {
            println!("{} ({})", "📷 Camera unavailable, joining without video".yellow(), reason);
        }
        MeshEvent::RelayDisconnected => {
            println!("{}", "⚠️  Relay disconnected".yellow());
        }
    }
}
