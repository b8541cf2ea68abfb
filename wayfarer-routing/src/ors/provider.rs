//! HTTP-based `RoutingProvider` using the OpenRouteService directions API.
//!
//! The [`RoutingProvider`] trait is synchronous so the optimizer can stay
//! free of async code. This provider bridges to the async HTTP client by
//! blocking on a Tokio runtime it owns.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use wayfarer_core::{LatLng, RoutePreference, RoutingProvider};
//! use wayfarer_routing::{HttpRoutingProvider, HttpRoutingProviderConfig};
//!
//! let config = HttpRoutingProviderConfig::default()
//!     .with_api_key("my-key")
//!     .with_timeout(Duration::from_secs(10));
//! let provider = HttpRoutingProvider::with_config(config)?;
//! let route = provider.route(
//!     LatLng::new(13.0827, 80.2707),
//!     LatLng::new(11.9416, 79.8083),
//!     RoutePreference::Recommended,
//! )?;
//! println!("{:.1} km", route.distance_km);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use log::debug;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use wayfarer_core::{
    LatLng, ProviderError, ProviderTag, RoadRoute, RouteDetail, RoutePreference, RoutingProvider,
};

use super::api::{
    CODE_POINT_NOT_FOUND, CODE_ROUTE_NOT_FOUND, CODE_ROUTE_TOO_LONG, DirectionsRequest, ErrorBody,
    ErrorResponse, Feature, FeatureCollection,
};

/// Error type for [`HttpRoutingProvider`] construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Name reported in [`ProviderTag::Provider`] for routes from this provider.
pub const PROVIDER_NAME: &str = "openrouteservice";

/// Default OpenRouteService endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

/// Default routing profile.
pub const DEFAULT_PROFILE: &str = "driving-car";

/// Default user agent for requests.
pub const DEFAULT_USER_AGENT: &str = "wayfarer-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Worker threads in the provider's own runtime.
const RUNTIME_WORKERS: usize = 2;

/// Configuration for [`HttpRoutingProvider`].
#[derive(Clone)]
pub struct HttpRoutingProviderConfig {
    /// Base URL of the service, e.g. `"https://api.openrouteservice.org"`.
    pub base_url: String,
    /// API key sent in the `Authorization` header.
    pub api_key: Option<String>,
    /// Routing profile, e.g. `"driving-car"`.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for HttpRoutingProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRoutingProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("profile", &self.profile)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpRoutingProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpRoutingProviderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Road routing through the OpenRouteService directions API.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the provider blocks on its own multi-threaded
/// runtime, so it can be called from many threads at once. Inside a
/// multi-threaded runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]) it reuses that runtime's handle through
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it
/// falls back to its own runtime, which may deadlock if the caller's runtime
/// drives IO this request depends on.
pub struct HttpRoutingProvider {
    client: Client,
    config: HttpRoutingProviderConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpRoutingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRoutingProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpRoutingProvider {
    /// Create a provider for the public service using `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRoutingProviderConfig::default().with_api_key(api_key))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpRoutingProviderConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(RUNTIME_WORKERS)
            .thread_name("wayfarer-routing")
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The provider's configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpRoutingProviderConfig {
        &self.config
    }

    /// Build the directions URL: `{base_url}/v2/directions/{profile}/geojson`.
    fn directions_url(&self) -> String {
        format!(
            "{}/v2/directions/{}/geojson",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        )
    }

    /// Post a directions request and convert every returned route.
    async fn post_directions(
        &self,
        body: &DirectionsRequest,
    ) -> Result<Vec<RoadRoute>, ProviderError> {
        let url = self.directions_url();
        let mut request = self.client.post(&url).json(body);
        if let Some(api_key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|err| self.convert_reqwest_error(&err, &url))?;
            return Err(convert_error_body(status.as_u16(), &text));
        }

        let collection: FeatureCollection =
            response
                .json()
                .await
                .map_err(|err| ProviderError::ParseError {
                    message: err.to_string(),
                })?;
        debug!(
            "{url} returned {} route(s)",
            collection.features.len()
        );
        convert_collection(collection)
    }

    /// Convert a reqwest error to a `ProviderError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> ProviderError {
        if error.is_timeout() {
            return ProviderError::Timeout {
                message: format!(
                    "{url} did not answer within {}s",
                    self.config.timeout.as_secs()
                ),
            };
        }

        if let Some(status) = error.status() {
            return ProviderError::HttpError {
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        ProviderError::Network {
            message: error.to_string(),
        }
    }

    fn block_on<T>(
        &self,
        future: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        // block_in_place requires a multi-threaded runtime; for current_thread
        // runtimes we fall back to our own stored runtime.
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

/// Map a non-success response body to a `ProviderError`.
fn convert_error_body(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error: ErrorBody::Detailed { code, message },
        }) => match code {
            CODE_ROUTE_TOO_LONG => ProviderError::RouteTooLong,
            CODE_ROUTE_NOT_FOUND | CODE_POINT_NOT_FOUND => ProviderError::RouteNotFound,
            _ => ProviderError::ServiceError {
                code,
                message: message.unwrap_or_default(),
            },
        },
        Ok(ErrorResponse {
            error: ErrorBody::Message(message),
        }) => ProviderError::HttpError { status, message },
        Err(_) => ProviderError::HttpError {
            status,
            message: body.to_owned(),
        },
    }
}

/// Convert a feature collection into routes, preserving order.
fn convert_collection(collection: FeatureCollection) -> Result<Vec<RoadRoute>, ProviderError> {
    if collection.features.is_empty() {
        return Err(ProviderError::ParseError {
            message: "directions response contained no routes".to_owned(),
        });
    }
    collection.features.iter().map(convert_feature).collect()
}

fn convert_feature(feature: &Feature) -> Result<RoadRoute, ProviderError> {
    let geometry = feature
        .geometry
        .to_lat_lngs()
        .ok_or_else(|| ProviderError::ParseError {
            message: "route geometry has a malformed vertex".to_owned(),
        })?;
    let summary = &feature.properties.summary;
    Ok(RoadRoute::new(
        summary.distance / 1000.0,
        RouteDetail {
            duration_minutes: summary.duration / 60.0,
            geometry,
            provider: ProviderTag::Provider(PROVIDER_NAME.to_owned()),
        },
    ))
}

impl RoutingProvider for HttpRoutingProvider {
    fn route(
        &self,
        from: LatLng,
        to: LatLng,
        preference: RoutePreference,
    ) -> Result<RoadRoute, ProviderError> {
        let body = DirectionsRequest::single(from, to, preference);
        let routes = self.block_on(self.post_directions(&body))?;
        routes
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ParseError {
                message: "directions response contained no routes".to_owned(),
            })
    }

    fn alternatives(
        &self,
        from: LatLng,
        to: LatLng,
        max_routes: usize,
    ) -> Result<Vec<RoadRoute>, ProviderError> {
        let body = DirectionsRequest::alternatives(from, to, max_routes);
        let mut routes = self.block_on(self.post_directions(&body))?;
        routes.truncate(max_routes.max(1));
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn directions_url_includes_profile() {
        let provider = HttpRoutingProvider::with_config(
            HttpRoutingProviderConfig::new("http://ors.example.com/").with_profile("cycling-regular"),
        )
        .expect("provider should build");
        assert_eq!(
            provider.directions_url(),
            "http://ors.example.com/v2/directions/cycling-regular/geojson"
        );
    }

    #[rstest]
    #[case(r#"{"error": {"code": 2004, "message": "too long"}}"#, ProviderError::RouteTooLong)]
    #[case(r#"{"error": {"code": 2009, "message": "none"}}"#, ProviderError::RouteNotFound)]
    #[case(r#"{"error": {"code": 2010, "message": "no point"}}"#, ProviderError::RouteNotFound)]
    #[case(
        r#"{"error": {"code": 2003, "message": "bad profile"}}"#,
        ProviderError::ServiceError { code: 2003, message: "bad profile".to_owned() }
    )]
    #[case(
        r#"{"error": "Quota exceeded"}"#,
        ProviderError::HttpError { status: 403, message: "Quota exceeded".to_owned() }
    )]
    #[case("<html>", ProviderError::HttpError { status: 403, message: "<html>".to_owned() })]
    fn error_bodies_are_classified(#[case] body: &str, #[case] expected: ProviderError) {
        assert_eq!(convert_error_body(403, body), expected);
    }

    #[rstest]
    fn empty_collections_are_parse_errors() {
        let err = convert_collection(FeatureCollection {
            features: Vec::new(),
        })
        .expect_err("no routes");
        assert!(matches!(err, ProviderError::ParseError { .. }));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpRoutingProviderConfig::new("http://example.com")
            .with_api_key("secret")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.profile, DEFAULT_PROFILE);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(!format!("{config:?}").contains("secret"));
    }
}
