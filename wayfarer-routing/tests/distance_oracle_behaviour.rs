//! Behavioural tests for [`DistanceOracle`].

use std::cell::RefCell;
use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use wayfarer_core::test_support::{FailingRoutingProvider, StubRoutingProvider};
use wayfarer_core::{LatLng, RoadRoute, RoutingProvider};
use wayfarer_routing::{DistanceOracle, OracleConfig, OracleError, haversine_km};

type Oracle = DistanceOracle<Arc<dyn RoutingProvider>>;

#[derive(Default)]
struct World {
    oracle: RefCell<Option<Oracle>>,
    calls: RefCell<Option<Box<dyn Fn() -> usize>>>,
    results: RefCell<Vec<Result<RoadRoute, OracleError>>>,
}

#[fixture]
fn world() -> World {
    World::default()
}

fn a() -> LatLng {
    LatLng::new(0.0, 0.0)
}

fn b() -> LatLng {
    LatLng::new(0.0, 1.0)
}

fn install_stub(world: &World, stub: StubRoutingProvider) {
    let stub = Arc::new(stub);
    let counter = Arc::clone(&stub);
    *world.calls.borrow_mut() = Some(Box::new(move || counter.route_calls()));
    let provider: Arc<dyn RoutingProvider> = stub;
    *world.oracle.borrow_mut() = Some(DistanceOracle::new(provider, OracleConfig::default()));
}

#[given("a routing service returning road distances")]
fn service_ok(world: &World) {
    install_stub(
        world,
        StubRoutingProvider::with_matrix(vec![a(), b()], vec![vec![0.0, 140.0], vec![150.0, 0.0]]),
    );
}

#[given("a routing service with no road from A to B")]
fn service_unreachable(world: &World) {
    install_stub(
        world,
        StubRoutingProvider::with_matrix(vec![a(), b()], vec![vec![0.0, 140.0], vec![150.0, 0.0]])
            .unreachable(0, 1),
    );
}

#[given("a routing service that is offline")]
fn service_offline(world: &World) {
    let failing = Arc::new(FailingRoutingProvider::offline());
    let counter = Arc::clone(&failing);
    *world.calls.borrow_mut() = Some(Box::new(move || counter.calls()));
    let provider: Arc<dyn RoutingProvider> = failing;
    *world.oracle.borrow_mut() = Some(DistanceOracle::new(provider, OracleConfig::default()));
}

#[when("I request the distance from A to B")]
#[expect(clippy::expect_used, reason = "given steps install the oracle")]
fn request_once(world: &World) {
    let oracle = world.oracle.borrow();
    let oracle = oracle.as_ref().expect("oracle must be initialised");
    world.results.borrow_mut().push(oracle.distance(a(), b()));
}

#[when("I request the distance from A to B twice")]
fn request_twice(world: &World) {
    request_once(world);
    request_once(world);
}

#[then("both answers are identical")]
fn identical(world: &World) {
    let results = world.results.borrow();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0], results[1]);
    assert!(results[0].is_ok());
}

#[then("the routing service was called once")]
#[expect(clippy::expect_used, reason = "given steps install the counter")]
fn called_once(world: &World) {
    let calls = world.calls.borrow();
    let count = calls.as_ref().expect("counter must be initialised")();
    assert_eq!(count, 1);
}

#[then("the answer is a fallback estimate")]
#[expect(clippy::expect_used, reason = "when steps record a result")]
fn fallback(world: &World) {
    let results = world.results.borrow();
    let route = results[0].as_ref().expect("fallback route");
    assert!(route.is_fallback());
    let expected = haversine_km(a(), b()) * 1.3;
    assert!((route.distance_km - expected).abs() < 1e-9);
    assert_eq!(results[0], results[1]);
}

#[then("the locations are reported as not connected")]
fn not_connected(world: &World) {
    let results = world.results.borrow();
    assert_eq!(
        results[0],
        Err(OracleError::RouteImpossible { from: a(), to: b() })
    );
}

#[scenario(path = "tests/features/distance_oracle.feature", index = 0)]
fn cached_lookup(world: World) {
    let _ = world;
}

#[scenario(path = "tests/features/distance_oracle.feature", index = 1)]
fn offline_fallback(world: World) {
    let _ = world;
}

#[scenario(path = "tests/features/distance_oracle.feature", index = 2)]
fn unconnected(world: World) {
    let _ = world;
}
