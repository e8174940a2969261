// Remote access facade: a small blocking HTTP client for the delivery
// platform. Every call is a single attempt; failures come back as a
// `ClientError` tagged with the operation label.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde_json::Value;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::session::Session;

/// Query parameters of a platform call, in order.
pub type Query = Vec<(&'static str, String)>;

/// Read (fetch) and write (submit) access to the platform.
///
/// `path` is given as segments (`["request", id, "offers"]`); each one is
/// percent-encoded on its own, so a segment can never add a path level, a
/// query or a fragment. `label` names the operation ("price", "new
/// request"...) and ends up in any error the call produces.
pub trait Platform {
    fn fetch(&self, path: &[&str], query: &Query, label: &str) -> Result<String>;

    fn submit(&self, path: &[&str], query: &Query, body: &Value, label: &str) -> Result<String>;
}

impl<T: Platform + ?Sized> Platform for &T {
    fn fetch(&self, path: &[&str], query: &Query, label: &str) -> Result<String> {
        (**self).fetch(path, query, label)
    }

    fn submit(&self, path: &[&str], query: &Query, body: &Value, label: &str) -> Result<String> {
        (**self).submit(path, query, body, label)
    }
}

/// Platform client holding a reqwest blocking client, the base URL and
/// the session every call is authorized with.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &Config, session: Session) -> Result<Self> {
        let client = build_http_client(config.timeout)?;
        let base_url = Url::parse(&config.api_url).map_err(|err| {
            ClientError::Config(format!("invalid ENVIOS_API_URL '{}': {err}", config.api_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "ENVIOS_API_URL '{}' cannot carry a path",
                config.api_url
            )));
        }
        Ok(ApiClient {
            client,
            base_url,
            session,
        })
    }

    /// Caller query plus authorization and, when set, impersonation.
    fn full_query(&self, query: &Query) -> Query {
        let mut all = query.clone();
        all.push(("authorization", self.session.token().to_string()));
        if let Some(nick) = self.session.impersonating() {
            all.push(("impersonalize", nick.to_string()));
        }
        all
    }

    /// Base URL with each path segment appended, percent-encoded.
    fn url(&self, path: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path);
        }
        url
    }
}

impl Platform for ApiClient {
    fn fetch(&self, path: &[&str], query: &Query, label: &str) -> Result<String> {
        tracing::debug!(?path, label, "GET");
        let req = self.client.get(self.url(path)).query(&self.full_query(query));
        send(req, label)
    }

    fn submit(&self, path: &[&str], query: &Query, body: &Value, label: &str) -> Result<String> {
        tracing::debug!(?path, label, "POST");
        let req = self
            .client
            .post(self.url(path))
            .query(&self.full_query(query))
            .json(body);
        send(req, label)
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("envios-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| ClientError::Transport {
            label: "http client".into(),
            source,
        })
}

/// Send one request and return its body, or a labelled transport error.
pub(crate) fn send(req: RequestBuilder, label: &str) -> Result<String> {
    let spinner = spinner(label);
    let outcome = req.send();
    spinner.finish_and_clear();

    let res = outcome.map_err(|source| ClientError::Transport {
        label: label.to_string(),
        source,
    })?;
    let status = res.status();
    tracing::trace!(label, status = status.as_u16(), "response");

    let text = res.text().map_err(|source| ClientError::Transport {
        label: label.to_string(),
        source,
    })?;
    if !status.is_success() {
        return Err(ClientError::Status {
            label: label.to_string(),
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}

// Drawn on stderr; indicatif hides it when stderr is not a terminal.
fn spinner(label: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("{label}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
