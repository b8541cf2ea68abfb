//! Oracle configuration.

/// Average road speed used to derive durations, in km/h.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;

/// Minimum distance separating synthesised alternatives, in kilometres.
pub const DEFAULT_ALTERNATIVE_THRESHOLD_KM: f64 = 5.0;

/// Worker threads used to build distance matrices.
pub const DEFAULT_MAX_PARALLEL_REQUESTS: usize = 4;

/// How the oracle reports travel time for provider routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationPolicy {
    /// Derive every duration from distance at the configured average speed.
    #[default]
    AverageSpeed,
    /// Keep the duration the provider reported. Fallback estimates still use
    /// the average speed.
    ProviderReported,
}

/// Configuration for [`crate::DistanceOracle`].
///
/// # Examples
/// ```
/// use wayfarer_routing::{DurationPolicy, OracleConfig};
///
/// let config = OracleConfig::default()
///     .with_average_speed_kmh(60.0)
///     .with_duration_policy(DurationPolicy::ProviderReported)
///     .with_max_parallel_requests(8);
/// assert_eq!(config.max_parallel_requests, 8);
/// assert!(!config.fallback_on_unreachable);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OracleConfig {
    /// Speed used for derived durations, in km/h.
    pub average_speed_kmh: f64,
    /// Source of route durations.
    pub duration_policy: DurationPolicy,
    /// Estimate a geometric route instead of failing when no road path
    /// exists.
    pub fallback_on_unreachable: bool,
    /// Synthesised alternatives must differ from every kept route by more
    /// than this many kilometres.
    pub alternative_threshold_km: f64,
    /// Upper bound on concurrent provider lookups while building a matrix.
    pub max_parallel_requests: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            duration_policy: DurationPolicy::default(),
            fallback_on_unreachable: false,
            alternative_threshold_km: DEFAULT_ALTERNATIVE_THRESHOLD_KM,
            max_parallel_requests: DEFAULT_MAX_PARALLEL_REQUESTS,
        }
    }
}

impl OracleConfig {
    /// Set the average speed.
    #[must_use]
    pub const fn with_average_speed_kmh(mut self, speed: f64) -> Self {
        self.average_speed_kmh = speed;
        self
    }

    /// Set the duration policy.
    #[must_use]
    pub const fn with_duration_policy(mut self, policy: DurationPolicy) -> Self {
        self.duration_policy = policy;
        self
    }

    /// Fall back to a geometric estimate for unreachable pairs.
    #[must_use]
    pub const fn with_fallback_on_unreachable(mut self, enabled: bool) -> Self {
        self.fallback_on_unreachable = enabled;
        self
    }

    /// Set the alternative separation threshold.
    #[must_use]
    pub const fn with_alternative_threshold_km(mut self, km: f64) -> Self {
        self.alternative_threshold_km = km;
        self
    }

    /// Set the matrix worker count; zero is treated as one.
    #[must_use]
    pub const fn with_max_parallel_requests(mut self, workers: usize) -> Self {
        self.max_parallel_requests = if workers == 0 { 1 } else { workers };
        self
    }
}
