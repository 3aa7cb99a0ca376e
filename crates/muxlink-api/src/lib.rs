// muxlink-api: Async Rust client for the Muxlab KVM matrix secure API

pub mod client;
pub mod error;
pub mod protocol;
pub mod transport;

pub use client::{ApplianceClient, Credentials};
pub use error::Error;
pub use protocol::{CommandKind, Reply, ReplyStatus, RequestEnvelope};
pub use transport::{HttpTransport, RawResponse, Transport, TransportConfig};
