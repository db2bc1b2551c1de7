use async_trait::async_trait;
use reqwest::Client;
use shared::domain::Directory;
use tracing::debug;

use crate::{error::LoadFailure, routes::Endpoints};

/// Produces complete directory snapshots.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn load(&self) -> Result<Directory, LoadFailure>;
}

/// Fetches `GET /activities` and parses the whole body into a [`Directory`].
pub struct SnapshotLoader {
    http: Client,
    endpoints: Endpoints,
}

impl SnapshotLoader {
    pub fn new(http: Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }
}

#[async_trait]
impl SnapshotSource for SnapshotLoader {
    async fn load(&self) -> Result<Directory, LoadFailure> {
        let url = self.endpoints.directory();
        debug!("loader: fetching directory url={url}");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(LoadFailure::Transport)?;
        let status = res.status();
        if !status.is_success() {
            return Err(LoadFailure::Status {
                status: status.as_u16(),
            });
        }

        let body = res.text().await.map_err(LoadFailure::Transport)?;
        let directory = serde_json::from_str::<Directory>(&body).map_err(LoadFailure::Malformed)?;
        debug!("loader: directory parsed activities={}", directory.len());
        Ok(directory)
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
