use std::{
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use shared::domain::Directory;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    error::LoadFailure,
    render::{RenderedView, ViewRenderer},
    surface::ViewSurface,
};

/// How results of overlapping reloads are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadOrdering {
    /// Every result is mounted as it is processed; the last one processed
    /// wins, even if it was requested earlier than the one on screen.
    #[default]
    ArrivalOrder,
    /// Results requested before the one currently mounted are discarded.
    Sequenced,
}

impl fmt::Display for ReloadOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReloadOrdering::ArrivalOrder => "arrival",
            ReloadOrdering::Sequenced => "sequenced",
        })
    }
}

impl FromStr for ReloadOrdering {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "arrival" | "arrival_order" => Ok(ReloadOrdering::ArrivalOrder),
            "sequenced" | "sequence" => Ok(ReloadOrdering::Sequenced),
            other => Err(format!(
                "unknown reload ordering '{other}' (expected 'arrival' or 'sequenced')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Mounted { seq: u64 },
    Discarded { seq: u64, latest: u64 },
}

#[derive(Default)]
struct ViewState {
    directory: Option<Directory>,
    view: Option<RenderedView>,
    last_mounted_seq: u64,
}

/// The single owned cell holding the live snapshot and its rendered
/// projection. Both are only ever replaced together, under one lock.
pub struct ViewContext {
    surface: Arc<dyn ViewSurface>,
    renderer: ViewRenderer,
    ordering: ReloadOrdering,
    next_seq: AtomicU64,
    state: Mutex<ViewState>,
}

impl ViewContext {
    pub fn new(surface: Arc<dyn ViewSurface>, ordering: ReloadOrdering) -> Self {
        Self {
            surface,
            renderer: ViewRenderer,
            ordering,
            next_seq: AtomicU64::new(1),
            state: Mutex::new(ViewState::default()),
        }
    }

    pub fn surface(&self) -> &Arc<dyn ViewSurface> {
        &self.surface
    }

    /// Reserves the sequence number for a reload about to be issued.
    pub fn begin_reload(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Renders `result` and mounts it in place of the current view, unless the
    /// ordering policy marks it as stale.
    pub async fn apply(&self, seq: u64, result: Result<Directory, LoadFailure>) -> ApplyOutcome {
        let mut state = self.state.lock().await;

        if self.ordering == ReloadOrdering::Sequenced && seq < state.last_mounted_seq {
            warn!(
                "sync: discarding stale reload seq={seq} latest={}",
                state.last_mounted_seq
            );
            return ApplyOutcome::Discarded {
                seq,
                latest: state.last_mounted_seq,
            };
        }

        let view = self.renderer.render(&result);
        self.surface.mount(&view);

        match &result {
            Ok(directory) => info!(
                "sync: view mounted seq={seq} activities={}",
                directory.len()
            ),
            Err(err) => warn!("sync: failure view mounted seq={seq}: {err}"),
        }

        state.directory = result.ok();
        state.view = Some(view);
        state.last_mounted_seq = state.last_mounted_seq.max(seq);
        ApplyOutcome::Mounted { seq }
    }

    pub async fn directory(&self) -> Option<Directory> {
        self.state.lock().await.directory.clone()
    }

    pub async fn view(&self) -> Option<RenderedView> {
        self.state.lock().await.view.clone()
    }

    pub async fn last_mounted_seq(&self) -> u64 {
        self.state.lock().await.last_mounted_seq
    }
}
