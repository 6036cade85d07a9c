//! fluester-protocol – Event-Definitionen und Wire-Format
//!
//! Dieses Crate definiert alle Events, die zwischen Browser-Client und
//! Server ausgetauscht werden, sowie die Kodierung als JSON-Textframe.
//! Die eigentlichen Nutzdaten (Schluessel, verschluesselter Text) sind fuer
//! den Server opak und werden unveraendert durchgereicht.

pub mod error;
pub mod events;
pub mod wire;

pub use error::{ProtocolError, ProtocolResult};
pub use events::{ClientEvent, Payload, ServerEvent};
pub use wire::FrameCodec;
