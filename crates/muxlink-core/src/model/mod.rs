// ── Domain model ──

pub mod device;
pub mod mac;
pub mod selection;

pub use device::{DeviceRecord, DeviceRole, classify};
pub use mac::MacAddress;
pub use selection::{Choice, NO_SELECTION_ID, SelectionList, SelectionLists};
