//! Blocking HTTP client used by remote file producers.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use stagehand_core::{
    application::ApplicationError,
    domain::RemoteSource,
    error::{StagehandError, StagehandResult},
};
use tracing::debug;

/// Client settings shared by every remote file of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpSettings {
    /// Prefix for relative URLs.
    pub base_url: Option<String>,
    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Log every request and response status.
    pub debug: bool,
}

/// Thin wrapper over `reqwest::blocking::Client`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    settings: HttpSettings,
}

impl HttpClient {
    pub fn new(settings: HttpSettings) -> StagehandResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &settings.headers {
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                StagehandError::Configuration {
                    message: format!("invalid http header name '{name}': {e}"),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| StagehandError::Configuration {
                message: format!("invalid value for http header '{name}': {e}"),
            })?;
            headers.insert(header, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("stagehand/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StagehandError::Configuration {
                message: format!("build http client: {e}"),
            })?;

        Ok(Self { client, settings })
    }

    /// Absolute URL for `url`, joined onto the base URL when relative.
    pub fn resolve(&self, url: &str) -> String {
        match &self.settings.base_url {
            Some(base) if !url.contains("://") => {
                format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'))
            }
            _ => url.to_owned(),
        }
    }

    /// GET the source and return the body. Non-2xx statuses are errors.
    pub fn fetch(&self, source: &RemoteSource) -> StagehandResult<Vec<u8>> {
        let url = self.resolve(&source.url);
        let mut request = self.client.get(&url);
        for (name, value) in &source.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !source.query.is_empty() {
            request = request.query(&source.query);
        }

        if self.settings.debug {
            debug!(url = %url, headers = ?source.headers, query = ?source.query, "http request");
        }

        let response = request.send().map_err(|e| ApplicationError::Http {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if self.settings.debug {
            debug!(url = %url, status = status.as_u16(), "http response");
        }
        if !status.is_success() {
            return Err(ApplicationError::HttpStatus {
                url,
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().map_err(|e| ApplicationError::Http {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        Ok(body.to_vec())
    }
}

/// An [`HttpClient`] created on first use and then shared.
///
/// One instance serves a whole file action batch; batches without remote
/// files never build a client.
#[derive(Debug)]
pub struct LazyHttpClient {
    settings: HttpSettings,
    client: OnceLock<Result<HttpClient, StagehandError>>,
}

impl LazyHttpClient {
    pub fn new(settings: HttpSettings) -> Self {
        Self {
            settings,
            client: OnceLock::new(),
        }
    }

    pub fn get(&self) -> StagehandResult<&HttpClient> {
        self.client
            .get_or_init(|| HttpClient::new(self.settings.clone()))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn resolve_joins_relative_urls() {
        let client = HttpClient::new(HttpSettings {
            base_url: Some("https://example.com/raw/".into()),
            ..HttpSettings::default()
        })
        .unwrap();

        assert_eq!(client.resolve("/a/b.txt"), "https://example.com/raw/a/b.txt");
        assert_eq!(client.resolve("http://other.org/x"), "http://other.org/x");
    }

    #[test]
    fn fetch_sends_headers_and_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/files/readme")
                .header("x-token", "secret")
                .header("x-default", "yes")
                .query_param("ref", "main");
            then.status(200).body("# Readme");
        });

        let client = HttpClient::new(HttpSettings {
            base_url: Some(server.base_url()),
            headers: BTreeMap::from([("x-default".to_owned(), "yes".to_owned())]),
            debug: true,
        })
        .unwrap();

        let mut source = RemoteSource::new("files/readme");
        source.headers.insert("x-token".into(), "secret".into());
        source.query.insert("ref".into(), "main".into());

        assert_eq!(client.fetch(&source).unwrap(), b"# Readme");
        mock.assert();
    }

    #[test]
    fn non_success_status_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let client = HttpClient::new(HttpSettings::default()).unwrap();
        let err = client
            .fetch(&RemoteSource::new(server.url("/missing")))
            .unwrap_err();

        assert!(matches!(
            err,
            StagehandError::Application(ApplicationError::HttpStatus { status: 404, .. })
        ));
    }

    #[test]
    fn lazy_client_builds_once() {
        let lazy = LazyHttpClient::new(HttpSettings::default());
        assert!(!lazy.is_initialized());
        let first = lazy.get().unwrap() as *const HttpClient;
        let second = lazy.get().unwrap() as *const HttpClient;
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_header_is_a_configuration_error() {
        let err = HttpClient::new(HttpSettings {
            headers: BTreeMap::from([("bad header".to_owned(), "v".to_owned())]),
            ..HttpSettings::default()
        })
        .unwrap_err();
        assert!(matches!(err, StagehandError::Configuration { .. }));
    }
}
