//! Client-side synchronization engine for the activity directory.
//!
//! The engine keeps a rendered view consistent with server state by always
//! refetching the full directory and rebuilding the view from scratch after
//! a successful mutation. Nothing is patched locally.

pub mod context;
pub mod coordinator;
pub mod error;
pub mod loader;
pub mod render;
pub mod routes;
pub mod surface;

pub use context::{ApplyOutcome, ReloadOrdering, ViewContext};
pub use coordinator::{MutationCoordinator, SyncEvent, SyncOptions, NOTICE_DISPLAY_WINDOW};
pub use error::{LoadFailure, MutationError};
pub use loader::{SnapshotLoader, SnapshotSource};
pub use render::{
    ActivityCard, EnrollSelector, ParticipantList, ParticipantRow, RenderedView, ViewRenderer,
    WithdrawControl,
};
pub use routes::{EndpointError, Endpoints};
pub use surface::{Notice, NoticeId, NoticeTone, ViewSurface};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
