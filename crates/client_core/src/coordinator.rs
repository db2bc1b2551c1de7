use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use reqwest::{Client, Method};
use shared::{
    domain::{MutationKind, PendingMutation},
    error::{ErrorDetail, ServerRejection},
    protocol::{SignupConfirmation, SignupQuery},
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    context::{ApplyOutcome, ReloadOrdering, ViewContext},
    error::{fallback_reason, MutationError},
    loader::{SnapshotLoader, SnapshotSource},
    routes::{EndpointError, Endpoints},
    surface::{Notice, NoticeId, NoticeTone, ViewSurface},
};

/// How long an inline notice stays visible.
pub const NOTICE_DISPLAY_WINDOW: Duration = Duration::from_secs(5);
const ENROLL_CONFIRMED_FALLBACK: &str = "Signed up successfully";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub notice_display: Duration,
    pub reload_ordering: ReloadOrdering,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            notice_display: NOTICE_DISPLAY_WINDOW,
            reload_ordering: ReloadOrdering::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    ViewMounted { seq: u64 },
    ReloadDiscarded { seq: u64, latest: u64 },
    MutationSucceeded {
        mutation: PendingMutation,
        message: Option<String>,
    },
    MutationFailed {
        mutation: PendingMutation,
        reason: String,
    },
    NoticeCleared(NoticeId),
}

/// Issues enroll/withdraw requests and drives the reload-and-render cycle.
///
/// Calls are not serialized: overlapping operations race at the network and
/// each success triggers its own reload. Which reload ends up on screen is
/// decided by the context's [`ReloadOrdering`].
pub struct MutationCoordinator {
    http: Client,
    endpoints: Endpoints,
    source: Arc<dyn SnapshotSource>,
    context: Arc<ViewContext>,
    notice_display: Duration,
    next_notice: AtomicU64,
    events: broadcast::Sender<SyncEvent>,
}

impl MutationCoordinator {
    pub fn connect(
        server_url: &str,
        surface: Arc<dyn ViewSurface>,
        options: SyncOptions,
    ) -> Result<Arc<Self>, EndpointError> {
        let endpoints = Endpoints::parse(server_url)?;
        let http = Client::new();
        let source = Arc::new(SnapshotLoader::new(http.clone(), endpoints.clone()));
        let context = Arc::new(ViewContext::new(surface, options.reload_ordering));
        Ok(Self::new_with_dependencies(
            http,
            endpoints,
            source,
            context,
            options.notice_display,
        ))
    }

    pub fn new_with_dependencies(
        http: Client,
        endpoints: Endpoints,
        source: Arc<dyn SnapshotSource>,
        context: Arc<ViewContext>,
        notice_display: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            http,
            endpoints,
            source,
            context,
            notice_display,
            next_notice: AtomicU64::new(1),
            events,
        })
    }

    pub fn context(&self) -> &Arc<ViewContext> {
        &self.context
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// One Loader→Renderer cycle. Used on startup, for manual reloads, and
    /// after every successful mutation.
    pub async fn refresh(&self) -> ApplyOutcome {
        let seq = self.context.begin_reload();
        debug!("sync: reload issued seq={seq}");
        let result = self.source.load().await;
        let outcome = self.context.apply(seq, result).await;

        let _ = self.events.send(match outcome {
            ApplyOutcome::Mounted { seq } => SyncEvent::ViewMounted { seq },
            ApplyOutcome::Discarded { seq, latest } => SyncEvent::ReloadDiscarded { seq, latest },
        });
        outcome
    }

    /// Signs `email` up for `activity`. Outcomes are shown as an inline
    /// notice; only a success reloads the directory.
    pub async fn enroll(&self, activity: &str, email: &str) -> Result<String, MutationError> {
        let mutation = PendingMutation::new(MutationKind::Enroll, activity, email);

        match self.dispatch(&mutation).await {
            Ok(message) => {
                let message = message.unwrap_or_else(|| ENROLL_CONFIRMED_FALLBACK.to_string());
                info!(
                    "enroll: accepted activity={} email={}",
                    mutation.activity, mutation.email
                );
                self.show_notice(NoticeTone::Success, &message);
                self.context.surface().reset_enroll_form();
                self.refresh().await;
                let _ = self.events.send(SyncEvent::MutationSucceeded {
                    mutation,
                    message: Some(message.clone()),
                });
                Ok(message)
            }
            Err(err) => {
                let reason = err.reason();
                warn!(
                    "enroll: failed activity={} email={}: {err}",
                    mutation.activity, mutation.email
                );
                self.show_notice(NoticeTone::Error, &reason);
                let _ = self
                    .events
                    .send(SyncEvent::MutationFailed { mutation, reason });
                Err(err)
            }
        }
    }

    /// Removes `email` from `activity`. Failures interrupt the user with an
    /// alert; a success reloads the directory without any notice.
    pub async fn withdraw(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<Option<String>, MutationError> {
        let mutation = PendingMutation::new(MutationKind::Withdraw, activity, email);

        match self.dispatch(&mutation).await {
            Ok(message) => {
                info!(
                    "withdraw: accepted activity={} email={}",
                    mutation.activity, mutation.email
                );
                self.refresh().await;
                let _ = self.events.send(SyncEvent::MutationSucceeded {
                    mutation,
                    message: message.clone(),
                });
                Ok(message)
            }
            Err(err) => {
                let reason = err.reason();
                warn!(
                    "withdraw: failed activity={} email={}: {err}",
                    mutation.activity, mutation.email
                );
                self.context.surface().alert(&reason);
                let _ = self
                    .events
                    .send(SyncEvent::MutationFailed { mutation, reason });
                Err(err)
            }
        }
    }

    async fn dispatch(&self, mutation: &PendingMutation) -> Result<Option<String>, MutationError> {
        let method = match mutation.kind {
            MutationKind::Enroll => Method::POST,
            MutationKind::Withdraw => Method::DELETE,
        };
        let url = self.endpoints.signup(&mutation.activity);
        debug!("{}: issuing {method} url={url}", mutation.kind.as_str());

        let transport = |source: reqwest::Error| MutationError::Transport {
            kind: mutation.kind,
            source,
        };
        let res = self
            .http
            .request(method, url)
            .query(&SignupQuery::new(mutation.email.as_str()))
            .send()
            .await
            .map_err(transport)?;
        let status = res.status();
        let body = res.text().await.map_err(transport)?;

        if status.is_success() {
            let message = serde_json::from_str::<SignupConfirmation>(&body)
                .ok()
                .map(|confirmation| confirmation.message);
            return Ok(message);
        }

        let reason = ErrorDetail::reason_from_body(&body)
            .unwrap_or_else(|| fallback_reason(mutation.kind).to_string());
        Err(MutationError::Rejected {
            kind: mutation.kind,
            rejection: ServerRejection::new(status.as_u16(), reason),
        })
    }

    /// Shows an inline notice and schedules its removal after the display
    /// window. The timer is not cancelled by later activity.
    fn show_notice(&self, tone: NoticeTone, text: &str) {
        let id = NoticeId(self.next_notice.fetch_add(1, Ordering::Relaxed));
        let surface = Arc::clone(self.context.surface());
        surface.show_notice(&Notice {
            id,
            tone,
            text: text.to_string(),
        });

        let events = self.events.clone();
        let display = self.notice_display;
        tokio::spawn(async move {
            tokio::time::sleep(display).await;
            surface.clear_notice(id);
            let _ = events.send(SyncEvent::NoticeCleared(id));
        });
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
