//! Contract for external road-routing providers.
//!
//! A [`RoutingProvider`] answers two questions about a pair of points: the
//! best road route under a [`RoutePreference`], and a ranked set of
//! alternative routes. Implementations live in `wayfarer-routing`; the
//! optimizer only ever sees this trait.

mod error;
mod provider;

pub use error::ProviderError;
pub use provider::{RoutePreference, RoutingProvider};
