//! Client-Connection – Verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Eingehende Text-Frames werden dekodiert und inline
//! dispatcht, ausgehende Events kommen aus der Broadcaster-Queue.
//!
//! ## Keepalive
//! - Server sendet alle `keepalive_sek` einen Ping
//! - Kommt innerhalb von `verbindungs_timeout_sek` kein Frame, wird getrennt

use axum::extract::ws::{Message, WebSocket};
use fluester_core::ConnectionId;
use fluester_protocol::FrameCodec;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::broadcast::EventBroadcaster;
use crate::dispatcher::MessageDispatcher;
use crate::server_state::SignalingState;

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct ClientConnection {
    state: Arc<SignalingState<EventBroadcaster>>,
    id: ConnectionId,
    peer_addr: SocketAddr,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection mit frischer ID
    pub fn neu(state: Arc<SignalingState<EventBroadcaster>>, peer_addr: SocketAddr) -> Self {
        Self {
            state,
            id: ConnectionId::new(),
            peer_addr,
        }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis der Client trennt, der Keepalive ablaeuft oder ein
    /// Shutdown-Signal eingeht. Danach wird der Zustand der Verbindung
    /// genau einmal bereinigt.
    pub async fn verarbeiten(self, socket: WebSocket, mut shutdown_rx: watch::Receiver<bool>) {
        let id = self.id;
        let peer_addr = self.peer_addr;
        let config = Arc::clone(&self.state.config);
        let keepalive_intervall = Duration::from_secs(config.keepalive_sek.max(1));
        let timeout_dauer = Duration::from_secs(config.verbindungs_timeout_sek);

        tracing::info!(verbindung = %id, peer = %peer_addr, "Neue Verbindung");

        let (mut sink, mut stream) = socket.split();
        let mut sende_rx = self.state.transport.client_registrieren(id);
        let codec = FrameCodec::with_max_size(config.max_nachricht_bytes);
        let dispatcher = MessageDispatcher::neu(Arc::clone(&self.state));

        let mut letzter_empfang = Instant::now();
        let mut keepalive = tokio::time::interval_at(
            tokio::time::Instant::now() + keepalive_intervall,
            keepalive_intervall,
        );

        loop {
            tokio::select! {
                // Eingehender Frame vom Client
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            letzter_empfang = Instant::now();
                            match codec.dekodieren(&text) {
                                Ok(event) => dispatcher.dispatch(event, id).await,
                                Err(e) => {
                                    tracing::debug!(
                                        verbindung = %id,
                                        fehler = %e,
                                        "Frame verworfen"
                                    );
                                }
                            }
                        }
                        Some(Ok(Message::Binary(_))) => {
                            letzter_empfang = Instant::now();
                            tracing::trace!(verbindung = %id, "Binaer-Frame ignoriert");
                        }
                        Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                            letzter_empfang = Instant::now();
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!(verbindung = %id, "Verbindung vom Client getrennt");
                            break;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(verbindung = %id, fehler = %e, "Frame-Lesefehler");
                            break;
                        }
                    }
                }

                // Ausgehendes Event aus dem Broadcaster
                Some(ausgehend) = sende_rx.recv() => {
                    let text = match codec.kodieren(&ausgehend) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!(
                                verbindung = %id,
                                event = ausgehend.name(),
                                fehler = %e,
                                "Event nicht kodierbar"
                            );
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        tracing::warn!(verbindung = %id, fehler = %e, "Senden fehlgeschlagen");
                        break;
                    }
                }

                // Keepalive-Ping
                _ = keepalive.tick() => {
                    if letzter_empfang.elapsed() > timeout_dauer {
                        tracing::warn!(verbindung = %id, peer = %peer_addr, "Verbindungs-Timeout");
                        break;
                    }
                    if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                        tracing::warn!(verbindung = %id, fehler = %e, "Ping-Senden fehlgeschlagen");
                        break;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(
                            verbindung = %id,
                            "Shutdown-Signal – Verbindung wird getrennt"
                        );
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }

        // Erst den Kern bereinigen, dann die Verbindung vergessen, damit
        // session_ended noch an alle Raum-Mitglieder geht.
        dispatcher.verbindung_getrennt(id);
        self.state.transport.client_entfernen(&id);

        tracing::info!(verbindung = %id, peer = %peer_addr, "Verbindungs-Task beendet");
    }
}
