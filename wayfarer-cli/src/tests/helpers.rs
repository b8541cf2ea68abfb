//! Test helpers: request files and stubbed routing providers.

use super::*;
use crate::routing::{ProviderBuilder, RoutingConfig};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use wayfarer_core::test_support::{FailingRoutingProvider, StubRoutingProvider};
use wayfarer_core::{LatLng, OptimizeRequest, RoutingProvider, WaypointInput};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write test file");
}

/// Temporary directory holding a `request.json` path.
pub(super) struct RequestFile {
    _tmp: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) path: Utf8PathBuf,
}

impl RequestFile {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        let path = root.join("request.json");
        Self {
            _tmp: tmp,
            root,
            path,
        }
    }

    pub(super) fn write_request(&self, request: &OptimizeRequest) {
        let payload = serde_json::to_string_pretty(request).expect("serialize request");
        write_utf8(&self.path, payload.as_bytes());
    }
}

/// A, B, C, D on the equator; visiting A, C, B, D is shortest.
pub(super) fn four_stop_request() -> OptimizeRequest {
    OptimizeRequest::new(vec![
        WaypointInput::new(0.0, 0.0, Some("A")),
        WaypointInput::new(0.0, 3.0, Some("B")),
        WaypointInput::new(0.0, 1.0, Some("C")),
        WaypointInput::new(0.0, 4.0, Some("D")),
    ])
}

/// Hands out a fresh provider from `make` for every invocation.
pub(super) struct StubProviders {
    make: fn() -> Box<dyn RoutingProvider>,
}

impl StubProviders {
    pub(super) fn straight_line() -> Self {
        fn make() -> Box<dyn RoutingProvider> {
            Box::new(StubRoutingProvider::straight_line())
        }
        Self { make }
    }

    pub(super) fn offline() -> Self {
        fn make() -> Box<dyn RoutingProvider> {
            Box::new(FailingRoutingProvider::offline())
        }
        Self { make }
    }

    /// No road leads from the second to the third stop of
    /// [`four_stop_request`].
    pub(super) fn disconnected() -> Self {
        fn make() -> Box<dyn RoutingProvider> {
            let points = four_stop_request()
                .waypoints
                .iter()
                .map(|w| LatLng::new(w.lat, w.lng))
                .collect();
            Box::new(StubRoutingProvider::with_matrix(points, Vec::new()).unreachable(1, 2))
        }
        Self { make }
    }
}

impl ProviderBuilder for StubProviders {
    fn build(&self, _config: &RoutingConfig) -> Result<Box<dyn RoutingProvider>, CliError> {
        Ok((self.make)())
    }
}

/// Arguments for `optimize` pointing at `path` with a test API key.
pub(super) fn optimize_args(path: &Utf8Path) -> OptimizeArgs {
    OptimizeArgs {
        request_path: Some(path.to_path_buf()),
        api_key: Some("test-key".to_owned()),
        ..OptimizeArgs::default()
    }
}

/// Parse the JSON envelope written by a command.
pub(super) fn envelope(buffer: &[u8]) -> serde_json::Value {
    serde_json::from_slice(buffer).expect("stdout should hold a JSON envelope")
}
