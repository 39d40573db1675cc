//! HTTP client utilities.

use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;

/// Shared HTTP client with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a client identifying itself with `user_agent`.
    ///
    /// `timeout` bounds the whole request including the body; redirects are
    /// followed up to `max_redirects` hops.
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        max_redirects: usize,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .redirect(Policy::limited(max_redirects))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }
}

/// Build the user agent string sent to every service.
///
/// Crossref and NCBI ask for a contact address so they can reach the operator
/// instead of blocking the client.
pub fn user_agent(contact_email: &str) -> String {
    format!(
        "{}/{} (mailto:{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        contact_email
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_contains_contact() {
        let ua = user_agent("ops@example.org");
        assert!(ua.starts_with("paper-extract/"));
        assert!(ua.ends_with("(mailto:ops@example.org)"));
    }

    #[test]
    fn test_client_builds() {
        let client = HttpClient::new("test-agent", Duration::from_secs(1), 5);
        assert!(client.is_ok());
    }
}
