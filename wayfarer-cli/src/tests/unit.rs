//! Focused unit tests covering optimize CLI configuration validation.

use super::helpers::{RequestFile, optimize_args, write_utf8};
use super::*;
use crate::optimize::{OptimizeConfig, config_from_layers_for_test};
use camino::Utf8PathBuf;
use rstest::rstest;

#[rstest]
fn converting_without_request_path_errors() {
    let args = OptimizeArgs {
        api_key: Some("key".to_owned()),
        ..OptimizeArgs::default()
    };
    let err = OptimizeConfig::try_from(args).expect_err("missing request should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_REQUEST);
            assert_eq!(env, ENV_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn converting_without_api_key_leaves_it_unset() {
    let args = OptimizeArgs {
        request_path: Some(Utf8PathBuf::from("request.json")),
        ..OptimizeArgs::default()
    };
    let config = OptimizeConfig::try_from(args).expect("key is optional");
    assert_eq!(config.routing.api_key, None);
}

#[rstest]
fn round_overrides_reach_the_optimizer() {
    let args = OptimizeArgs {
        request_path: Some(Utf8PathBuf::from("request.json")),
        api_key: Some("key".to_owned()),
        seed: Some(7),
        explore_rounds: Some(5),
        exploit_rounds: Some(6),
        ..OptimizeArgs::default()
    };
    let config = OptimizeConfig::try_from(args).expect("config should build");
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.optimizer.explore_rounds, 5);
    assert_eq!(config.optimizer.exploit_rounds, 6);
    assert_eq!(
        config.optimizer.refine_passes,
        wayfarer_optimizer::OptimizerConfig::default().refine_passes
    );
}

#[rstest]
fn validate_sources_reports_missing_request() {
    let files = RequestFile::new();
    let args = optimize_args(&files.path);
    let config = OptimizeConfig::try_from(args).expect("config should build");
    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_REQUEST);
            assert_eq!(path, files.path);
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directories() {
    let files = RequestFile::new();
    let args = optimize_args(&files.root);
    let config = OptimizeConfig::try_from(args).expect("config should build");
    let err = config
        .validate_sources()
        .expect_err("expected directory rejection");
    match err {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_REQUEST),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_accepts_files() {
    let files = RequestFile::new();
    write_utf8(&files.path, b"{}");
    let args = optimize_args(&files.path);
    let config = OptimizeConfig::try_from(args).expect("config should build");
    config.validate_sources().expect("request file exists");
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "request_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let files = RequestFile::new();
    let env_request = files.root.join("from-env.json");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "api_key": "from-file",
            "base_url": "http://from-file:8080",
            "average_speed_kmh": 30.0,
        }),
        None,
    );
    composer.push_environment(json!({
        "request_path": env_request.as_str(),
        "api_key": "from-env",
    }));
    composer.push_cli(json!({
        "average_speed_kmh": 55.0,
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request_path, env_request);
    assert_eq!(config.routing.api_key.as_deref(), Some("from-env"));
    assert_eq!(config.routing.base_url, "http://from-file:8080");
    assert_eq!(config.routing.average_speed_kmh, 55.0);
}

#[rstest]
fn repeated_logging_setup_keeps_the_first_logger() {
    init_logging();
    let level = log::max_level();
    init_logging();
    assert_eq!(log::max_level(), level);
}
