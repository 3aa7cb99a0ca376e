// muxlink-core: Device registry, command dispatch and polling session
// between muxlink-api and hosts (CLI).

pub mod command;
pub mod config;
pub mod error;
pub mod log;
pub mod model;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandOutcome, DeviceAttribute, PresetId};
pub use config::{DEFAULT_POLL_INTERVAL, SessionConfig};
pub use error::CoreError;
pub use log::{LogEntry, LogLevel};
pub use session::{Session, SessionStatus};
pub use store::{DeviceRegistry, MergeSummary};

pub use model::{
    Choice, DeviceRecord, DeviceRole, MacAddress, NO_SELECTION_ID, SelectionList, SelectionLists,
    classify,
};
