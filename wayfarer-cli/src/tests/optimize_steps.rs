//! Behaviour-driven step definitions driving the optimize CLI scenarios.

use super::helpers::{RequestFile, StubProviders, envelope, four_stop_request, write_utf8};
use super::*;
use crate::optimize::{HybridOptimizerBuilder, run_optimize_with};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

struct OptimizeWorld {
    files: RequestFile,
    include_request: RefCell<bool>,
    disconnected: RefCell<bool>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl OptimizeWorld {
    fn new() -> Self {
        Self {
            files: RequestFile::new(),
            include_request: RefCell::new(true),
            disconnected: RefCell::new(false),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["wayfarer".to_owned(), "optimize".to_owned()];
        if *self.include_request.borrow() {
            argv.push(self.files.path.as_str().to_owned());
        }
        argv.extend([format!("--{ARG_API_KEY}"), "test-key".to_owned()]);
        argv
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }
}

#[fixture]
fn world() -> OptimizeWorld {
    OptimizeWorld::new()
}

#[given("a four stop request exists on disk")]
fn four_stop_request_exists(#[from(world)] world: &OptimizeWorld) {
    world.files.write_request(&four_stop_request());
}

#[given("the optimize request contains invalid JSON")]
fn request_contains_invalid_json(#[from(world)] world: &OptimizeWorld) {
    write_utf8(&world.files.path, b"{ not valid json");
}

#[given("the second and third stops are not connected by road")]
fn stops_not_connected(#[from(world)] world: &OptimizeWorld) {
    *world.disconnected.borrow_mut() = true;
}

#[given("I omit the optimize request path")]
fn omit_request_path(#[from(world)] world: &OptimizeWorld) {
    *world.include_request.borrow_mut() = false;
}

#[when("I run the optimize command")]
fn run_optimize_command(#[from(world)] world: &OptimizeWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Optimize(args) => {
            let providers = if *world.disconnected.borrow() {
                StubProviders::disconnected()
            } else {
                StubProviders::straight_line()
            };
            let builder = HybridOptimizerBuilder { providers };
            let mut buffer = world.stdout.borrow_mut();
            run_optimize_with(args, &builder, &mut *buffer)
        }
        Command::Distance(_) => panic!("expected optimize command"),
    });

    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints the order 0, 2, 1, 3")]
fn command_succeeds_with_order(#[from(world)] world: &OptimizeWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");

    let json = envelope(&world.stdout.borrow());
    assert_eq!(json["success"], serde_json::Value::Bool(true));
    assert_eq!(json["data"]["optimized_order"], serde_json::json!([0, 2, 1, 3]));
}

#[then("the command fails because the request JSON is invalid")]
fn command_fails_invalid_json(#[from(world)] world: &OptimizeWorld) {
    match &*world.error() {
        CliError::ParseRequest { .. } => {}
        other => panic!("expected ParseRequest, found {other:?}"),
    }
    let json = envelope(&world.stdout.borrow());
    assert_eq!(json["kind"], "invalid_input");
}

#[then("the command prints a route_impossible failure")]
fn command_prints_route_impossible(#[from(world)] world: &OptimizeWorld) {
    match &*world.error() {
        CliError::Optimize { source } => assert_eq!(source.kind(), "route_impossible"),
        other => panic!("expected Optimize, found {other:?}"),
    }
    let json = envelope(&world.stdout.borrow());
    assert_eq!(json["success"], serde_json::Value::Bool(false));
    assert_eq!(json["kind"], "route_impossible");
}

#[then("the command fails because the request path is missing")]
fn command_fails_missing_request_path(#[from(world)] world: &OptimizeWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_REQUEST),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_optimize_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/optimize_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: OptimizeWorld) {
            let _ = world;
        }
    };
}

register_optimize_scenario!(optimize_happy_path, "optimizing a request from JSON");
register_optimize_scenario!(optimize_invalid_json, "rejecting invalid JSON input");
register_optimize_scenario!(optimize_disconnected, "reporting unconnected stops");
register_optimize_scenario!(optimize_missing_request, "rejecting missing request paths");
