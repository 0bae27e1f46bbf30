// Credentials attached to every request sent to the host.

use reqwest::blocking::RequestBuilder;

/// HTTP Basic credentials: empty username, API key as password. The key is
/// not validated here; a bad key shows up as a 401 from the host.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Credentials {
            api_key: api_key.into(),
        }
    }

    /// Attach the Authorization header to a request.
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.basic_auth("", Some(&self.api_key))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
