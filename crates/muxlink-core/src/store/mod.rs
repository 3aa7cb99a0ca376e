// ── Device registry store ──
//
// Ordered endpoint storage with push-based list regeneration.

mod refresh;
mod registry;

pub use registry::{DeviceRegistry, MergeSummary};
