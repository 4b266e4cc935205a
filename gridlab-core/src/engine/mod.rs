//! Grid engine: per-tick orchestration and the replay driver around it.
//!
//! The engine consumes one bar plus its precomputed indicator reading per
//! tick and runs, in order: duplicate and sanity checks, session anchoring,
//! warmup check, classification, exits, one entry, re-anchoring. The replay
//! driver precomputes indicators for a whole history and streams exposure to
//! an `AllocationSink`.

pub mod grid_engine;
pub mod precompute;
pub mod replay;
pub mod state;

pub use grid_engine::{EntryOutcome, GridEngine, TickReport, TickStatus};
pub use precompute::GridIndicators;
pub use replay::{replay, Allocation, AllocationSink, ReplayResult};
pub use state::{EngineState, SessionAnchor};
