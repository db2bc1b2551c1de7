use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid server url '{url}': {source}")]
    Invalid {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("server url '{0}' cannot carry a path")]
    NotHierarchical(String),
}

/// URLs of the activity endpoints, derived from one base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn parse(server_url: &str) -> Result<Self, EndpointError> {
        let trimmed = server_url.trim();
        let base = Url::parse(trimmed).map_err(|source| EndpointError::Invalid {
            url: trimmed.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(EndpointError::NotHierarchical(trimmed.to_string()));
        }
        Ok(Self { base })
    }

    /// `GET /activities`
    pub fn directory(&self) -> Url {
        self.with_segments(&["activities"])
    }

    /// `POST|DELETE /activities/{activity}/signup`. The activity name is
    /// percent-encoded as a single path segment; the email travels in the
    /// query string and is encoded by the request builder.
    pub fn signup(&self, activity: &str) -> Url {
        self.with_segments(&["activities", activity, "signup"])
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
