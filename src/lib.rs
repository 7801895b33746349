
pub mod display;
pub mod mode;
pub mod phase_table;
pub mod sync;
pub mod tracing_init;
pub mod transform;

pub use display::{DisplaySink, SnapshotBuffer};
pub use mode::{DabMode, ModeError, ModeParams};
pub use phase_table::PhaseTable;
pub use sync::{CarrierOffset, SyncEngine, SyncError, TimingLock};
pub use transform::SpectrumTransform;
