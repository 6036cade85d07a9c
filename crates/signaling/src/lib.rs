//! fluester-signaling – Rendezvous, Code-Pruefung und Relay
//!
//! Dieser Crate implementiert den Signaling-Service fuer Fluester. Ein Host
//! eroeffnet einen benannten Channel mit einem geheimen Code, Empfaenger
//! treten mit demselben Code bei. Danach leitet der Server Schluessel und
//! verschluesselte Texte weiter, ohne sie je zu lesen.
//!
//! ## Architektur
//!
//! ```text
//! axum Router (SignalingServer)
//!     |
//!     v
//! ClientConnection (pro WebSocket ein Task)
//!     |
//!     v
//! MessageDispatcher
//!     |
//!     +-- SessionHandler   (host_session, join_attempt)
//!     +-- RelayHandler     (receiver_hello, sender_offer, update_text)
//!     +-- LifecycleHandler (Verbindungsende)
//!
//! SessionRegistry  – Lebende Channels mit Code-Hash und Host
//! EventBroadcaster – Transport: Queues pro Verbindung und Raeume
//! ```

pub mod broadcast;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod server_state;
pub mod transport;
pub mod ws;

// Bequeme Re-Exporte
pub use broadcast::EventBroadcaster;
pub use connection::ClientConnection;
pub use dispatcher::MessageDispatcher;
pub use error::{SignalingError, SignalingResult};
pub use registry::SessionRegistry;
pub use server_state::{SignalingConfig, SignalingState};
pub use transport::Transport;
pub use ws::SignalingServer;
