use serde::{Deserialize, Serialize};

/// Success body of `POST /activities/{name}/signup` (and, ignored by the
/// client, of the matching `DELETE`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupConfirmation {
    pub message: String,
}

/// Query string shared by both signup endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupQuery {
    pub email: String,
}

impl SignupQuery {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}
