use crate::error::RelayError;
use crate::signaling::signal_relay::SignalRelay;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use meshcall_core::{RelayRequest, SignalEnvelope};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Inbound traffic of a relay connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayFrame {
    Text(String),
    Closed,
}

/// WebSocket client for the roster/signal relay.
///
/// Writes go through an unbounded queue drained by a sender task, so
/// `request` never blocks the caller.
#[derive(Clone)]
pub struct WsRelay {
    outgoing: mpsc::UnboundedSender<Message>,
}

impl WsRelay {
    /// Connects and returns the relay plus its inbound frame stream. The
    /// stream yields `RelayFrame::Closed` once when the socket ends.
    pub async fn connect(url: &str) -> Result<(Self, mpsc::UnboundedReceiver<RelayFrame>)> {
        let (ws_stream, _) = connect_async(url)
            .await
            .with_context(|| format!("failed to connect to relay at {url}"))?;
        info!("Connected to relay at {}", url);

        let (mut sink, mut stream) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        let mut send_task = tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if let Err(e) = sink.send(msg).await {
                    warn!("Relay write failed: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let frames = in_tx.clone();
        let mut recv_task = tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if frames.send(RelayFrame::Text(text)).is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay read failed: {}", e);
                        break;
                    }
                }
            }
        });

        tokio::spawn(async move {
            tokio::select! {
                _ = (&mut send_task) => recv_task.abort(),
                _ = (&mut recv_task) => send_task.abort(),
            };
            info!("Relay connection closed");
            let _ = in_tx.send(RelayFrame::Closed);
        });

        Ok((Self { outgoing: out_tx }, in_rx))
    }

    pub fn request(&self, request: &RelayRequest) -> Result<(), RelayError> {
        let json = request.to_json()?;
        debug!("-> relay: {}", json);
        self.outgoing
            .send(Message::Text(json))
            .map_err(|_| RelayError::Closed)
    }
}

#[async_trait]
impl SignalRelay for WsRelay {
    async fn send(&self, envelope: SignalEnvelope) -> Result<(), RelayError> {
        self.request(&RelayRequest::from(envelope))
    }
}
