//! OpenRouteService road routing.
//!
//! [`HttpRoutingProvider`] implements [`wayfarer_core::RoutingProvider`] on
//! top of the ORS directions endpoint. Service error codes are mapped onto
//! [`wayfarer_core::ProviderError`] so the oracle can tell an unreachable
//! destination from a request that is merely too long for alternatives.

mod api;
mod provider;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_PROFILE, DEFAULT_USER_AGENT, HttpRoutingProvider,
    HttpRoutingProviderConfig, PROVIDER_NAME, ProviderBuildError,
};
