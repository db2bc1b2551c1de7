use shared::{
    domain::MutationKind,
    error::{ServerRejection, ENROLL_FALLBACK_REASON, WITHDRAW_FALLBACK_REASON},
};
use thiserror::Error;

/// The directory could not be fetched or parsed. A load either yields a
/// complete directory or one of these; there is no partial result.
#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("failed to reach activity directory: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("activity directory returned status {status}")]
    Status { status: u16 },
    #[error("malformed activity directory: {0}")]
    Malformed(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum MutationError {
    /// The server answered and declined the request.
    #[error("{} rejected with status {}: {}", .kind.as_str(), .rejection.status, .rejection.reason)]
    Rejected {
        kind: MutationKind,
        #[source]
        rejection: ServerRejection,
    },
    /// No usable response at all.
    #[error("{} request failed: {source}", .kind.as_str())]
    Transport {
        kind: MutationKind,
        #[source]
        source: reqwest::Error,
    },
}

impl MutationError {
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationError::Rejected { kind, .. } | MutationError::Transport { kind, .. } => *kind,
        }
    }

    /// Text shown to the user on the operation's display channel.
    pub fn reason(&self) -> String {
        match self {
            MutationError::Rejected { rejection, .. } => rejection.reason.clone(),
            MutationError::Transport { kind, .. } => fallback_reason(*kind).to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            MutationError::Rejected { rejection, .. } => Some(rejection.status),
            MutationError::Transport { .. } => None,
        }
    }
}

pub(crate) fn fallback_reason(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::Enroll => ENROLL_FALLBACK_REASON,
        MutationKind::Withdraw => WITHDRAW_FALLBACK_REASON,
    }
}
