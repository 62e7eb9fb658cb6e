// Debounced autosave: coalesces bursts of editor changes into one write per quiet period.

pub mod coordinator;
pub mod registry;

pub use coordinator::{AutosaveStatus, CompletionMode, DEFAULT_QUIET_PERIOD};
pub use registry::AutosaveRegistry;
