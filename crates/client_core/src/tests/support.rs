//! Shared fixtures: seed data, an in-memory surface, and an axum server that
//! behaves like the activities backend.

use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex as StdMutex,
    },
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared::{
    domain::{Activity, Directory},
    error::ErrorDetail,
    protocol::{SignupConfirmation, SignupQuery},
};
use tokio::{
    net::TcpListener,
    sync::{mpsc, oneshot, Mutex},
};

use crate::{
    context::{ReloadOrdering, ViewContext},
    coordinator::MutationCoordinator,
    loader::SnapshotLoader,
    render::RenderedView,
    routes::Endpoints,
    surface::{Notice, NoticeId, ViewSurface},
};

fn activity(description: &str, schedule: &str, max: u32, participants: &[&str]) -> Activity {
    Activity {
        description: description.to_string(),
        schedule: schedule.to_string(),
        max_participants: max,
        participants: participants.iter().map(|p| p.to_string()).collect(),
    }
}

pub(crate) fn seed_directory() -> Directory {
    Directory::from_entries([
        (
            "Chess Club",
            activity(
                "Learn strategies and compete in chess tournaments",
                "Fridays, 3:30 PM - 5:00 PM",
                12,
                &["michael@mergington.edu", "daniel@mergington.edu"],
            ),
        ),
        (
            "Programming Class",
            activity(
                "Learn programming fundamentals and build software projects",
                "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
                20,
                &["emma@mergington.edu", "sophia@mergington.edu"],
            ),
        ),
        (
            "Gym Class",
            activity(
                "Physical education and sports activities",
                "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
                30,
                &["john@mergington.edu", "olivia@mergington.edu"],
            ),
        ),
        (
            "Science Club",
            activity(
                "Conduct experiments and explore scientific discoveries",
                "Thursdays, 3:30 PM - 4:30 PM",
                22,
                &[],
            ),
        ),
    ])
}

#[derive(Default)]
struct Recorded {
    mounts: Vec<RenderedView>,
    notices: Vec<Notice>,
    active_notice: Option<Notice>,
    alerts: Vec<String>,
    form_resets: usize,
}

#[derive(Default)]
pub(crate) struct RecordingSurface {
    inner: StdMutex<Recorded>,
}

impl RecordingSurface {
    fn with<T>(&self, f: impl FnOnce(&Recorded) -> T) -> T {
        let recorded = self.inner.lock().expect("surface lock");
        f(&*recorded)
    }

    pub(crate) fn mount_count(&self) -> usize {
        self.with(|r| r.mounts.len())
    }

    pub(crate) fn last_mount(&self) -> Option<RenderedView> {
        self.with(|r| r.mounts.last().cloned())
    }

    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.with(|r| r.notices.clone())
    }

    pub(crate) fn active_notice(&self) -> Option<Notice> {
        self.with(|r| r.active_notice.clone())
    }

    pub(crate) fn alerts(&self) -> Vec<String> {
        self.with(|r| r.alerts.clone())
    }

    pub(crate) fn form_resets(&self) -> usize {
        self.with(|r| r.form_resets)
    }
}

impl ViewSurface for RecordingSurface {
    fn mount(&self, view: &RenderedView) {
        self.inner
            .lock()
            .expect("surface lock")
            .mounts
            .push(view.clone());
    }

    fn show_notice(&self, notice: &Notice) {
        let mut recorded = self.inner.lock().expect("surface lock");
        recorded.notices.push(notice.clone());
        recorded.active_notice = Some(notice.clone());
    }

    fn clear_notice(&self, id: NoticeId) {
        let mut recorded = self.inner.lock().expect("surface lock");
        if recorded.active_notice.as_ref().map(|n| n.id) == Some(id) {
            recorded.active_notice = None;
        }
    }

    fn alert(&self, text: &str) {
        self.inner
            .lock()
            .expect("surface lock")
            .alerts
            .push(text.to_string());
    }

    fn reset_enroll_form(&self) {
        self.inner.lock().expect("surface lock").form_resets += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedSignup {
    pub(crate) method: &'static str,
    pub(crate) activity: String,
    pub(crate) email: String,
}

#[derive(Clone)]
struct MockState {
    directory: Arc<Mutex<Directory>>,
    directory_loads: Arc<AtomicUsize>,
    load_seen: mpsc::UnboundedSender<usize>,
    load_gates: Arc<Mutex<VecDeque<oneshot::Receiver<()>>>>,
    directory_override: Arc<Mutex<Option<(StatusCode, String)>>>,
    signup_override: Arc<Mutex<Option<(StatusCode, String)>>>,
    signups: Arc<Mutex<Vec<RecordedSignup>>>,
}

pub(crate) struct MockServer {
    pub(crate) url: String,
    state: MockState,
    load_rx: Mutex<mpsc::UnboundedReceiver<usize>>,
}

impl MockServer {
    pub(crate) async fn spawn(directory: Directory) -> Self {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");
        let (load_seen, load_rx) = mpsc::unbounded_channel();
        let state = MockState {
            directory: Arc::new(Mutex::new(directory)),
            directory_loads: Arc::new(AtomicUsize::new(0)),
            load_seen,
            load_gates: Arc::new(Mutex::new(VecDeque::new())),
            directory_override: Arc::new(Mutex::new(None)),
            signup_override: Arc::new(Mutex::new(None)),
            signups: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/activities", get(list_activities))
            .route(
                "/activities/:activity/signup",
                axum::routing::post(signup).delete(unregister),
            )
            .with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            url: format!("http://{addr}"),
            state,
            load_rx: Mutex::new(load_rx),
        }
    }

    pub(crate) fn directory_loads(&self) -> usize {
        self.state.directory_loads.load(Ordering::SeqCst)
    }

    pub(crate) async fn directory(&self) -> Directory {
        self.state.directory.lock().await.clone()
    }

    pub(crate) async fn signups(&self) -> Vec<RecordedSignup> {
        self.state.signups.lock().await.clone()
    }

    pub(crate) async fn fail_directory_with(&self, status: StatusCode, body: &str) {
        *self.state.directory_override.lock().await = Some((status, body.to_string()));
    }

    pub(crate) async fn answer_signups_with(&self, status: StatusCode, body: &str) {
        *self.state.signup_override.lock().await = Some((status, body.to_string()));
    }

    /// Holds the next not-yet-gated directory response until the returned
    /// sender fires. The snapshot is still taken when the request arrives.
    pub(crate) async fn gate_next_load(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.load_gates.lock().await.push_back(rx);
        tx
    }

    /// Waits until the server has received at least `count` directory loads.
    pub(crate) async fn wait_for_load(&self, count: usize) {
        let mut rx = self.load_rx.lock().await;
        if self.directory_loads() >= count {
            return;
        }
        tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(seen) = rx.recv().await {
                if seen >= count {
                    return;
                }
            }
        })
        .await
        .expect("directory load did not arrive");
    }
}

/// A base URL nothing listens on.
pub(crate) async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr: SocketAddr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

pub(crate) fn coordinator_for(
    server_url: &str,
    ordering: ReloadOrdering,
    notice_display: Duration,
) -> (Arc<MutationCoordinator>, Arc<RecordingSurface>) {
    let surface = Arc::new(RecordingSurface::default());
    let endpoints = Endpoints::parse(server_url).expect("endpoints");
    let http = reqwest::Client::new();
    let source = Arc::new(SnapshotLoader::new(http.clone(), endpoints.clone()));
    let context = Arc::new(ViewContext::new(surface.clone(), ordering));
    let coordinator = MutationCoordinator::new_with_dependencies(
        http,
        endpoints,
        source,
        context,
        notice_display,
    );
    (coordinator, surface)
}

async fn list_activities(State(state): State<MockState>) -> Response {
    let overridden = state.directory_override.lock().await.clone();
    let snapshot = state.directory.lock().await.clone();
    let gate = state.load_gates.lock().await.pop_front();

    let seen = state.directory_loads.fetch_add(1, Ordering::SeqCst) + 1;
    let _ = state.load_seen.send(seen);

    if let Some((status, body)) = overridden {
        return (status, body).into_response();
    }
    if let Some(gate) = gate {
        let _ = gate.await;
    }
    Json(snapshot).into_response()
}

fn rejection(status: StatusCode, detail: &str) -> Response {
    (status, Json(ErrorDetail::new(detail))).into_response()
}

async fn signup(
    State(state): State<MockState>,
    Path(activity): Path<String>,
    Query(query): Query<SignupQuery>,
) -> Response {
    state.signups.lock().await.push(RecordedSignup {
        method: "POST",
        activity: activity.clone(),
        email: query.email.clone(),
    });
    if let Some((status, body)) = state.signup_override.lock().await.clone() {
        return (status, body).into_response();
    }

    let mut directory = state.directory.lock().await;
    let Some(current) = directory.get(&activity).cloned() else {
        return rejection(StatusCode::NOT_FOUND, "Activity not found");
    };
    if current.participants.contains(&query.email) {
        return rejection(
            StatusCode::BAD_REQUEST,
            "Student already signed up for this activity",
        );
    }

    let mut updated = current;
    updated.participants.push(query.email.clone());
    *directory = replace_activity(&directory, &activity, updated);
    Json(SignupConfirmation {
        message: format!("Signed up {} for {activity}", query.email),
    })
    .into_response()
}

async fn unregister(
    State(state): State<MockState>,
    Path(activity): Path<String>,
    Query(query): Query<SignupQuery>,
) -> Response {
    state.signups.lock().await.push(RecordedSignup {
        method: "DELETE",
        activity: activity.clone(),
        email: query.email.clone(),
    });
    if let Some((status, body)) = state.signup_override.lock().await.clone() {
        return (status, body).into_response();
    }

    let mut directory = state.directory.lock().await;
    let Some(current) = directory.get(&activity).cloned() else {
        return rejection(StatusCode::NOT_FOUND, "Activity not found");
    };
    if !current.participants.contains(&query.email) {
        return rejection(
            StatusCode::BAD_REQUEST,
            "Student not signed up for this activity",
        );
    }

    let mut updated = current;
    updated.participants.retain(|p| p != &query.email);
    *directory = replace_activity(&directory, &activity, updated);
    Json(SignupConfirmation {
        message: format!("Unregistered {} from {activity}", query.email),
    })
    .into_response()
}

fn replace_activity(directory: &Directory, name: &str, updated: Activity) -> Directory {
    Directory::from_entries(directory.iter().map(|(existing, activity)| {
        let activity = if existing == name {
            updated.clone()
        } else {
            activity.clone()
        };
        (existing.to_string(), activity)
    }))
}
