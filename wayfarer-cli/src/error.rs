//! Error types emitted by the Wayfarer CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use wayfarer_core::OptimizeError;
use wayfarer_routing::{OracleError, ProviderBuildError};

/// Errors emitted by the Wayfarer CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An option was supplied with an unusable value.
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the optimize request file failed.
    #[error("failed to open optimize request at {path:?}: {source}")]
    OpenRequest {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Optimize request JSON could not be decoded.
    #[error("failed to parse optimize request JSON at {path:?}: {source}")]
    ParseRequest {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Constructing the routing provider failed.
    #[error("failed to build routing provider for {base_url:?}: {source}")]
    BuildRoutingProvider {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The optimizer rejected the request.
    #[error("optimization failed: {source}")]
    Optimize {
        #[source]
        source: OptimizeError,
    },
    /// The distance oracle could not route between the points.
    #[error("distance lookup failed: {source}")]
    Distance {
        #[source]
        source: OracleError,
    },
    /// Serializing the command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    /// Stable machine-readable tag reported in failure envelopes.
    ///
    /// Optimizer failures keep the optimizer's own tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ArgumentParsing(_)
            | Self::Configuration(_)
            | Self::MissingArgument { .. }
            | Self::InvalidArgument { .. } => "configuration",
            Self::MissingSourceFile { .. }
            | Self::SourcePathNotFile { .. }
            | Self::InspectSourcePath { .. }
            | Self::OpenRequest { .. } => "io",
            Self::ParseRequest { .. } => "invalid_input",
            Self::BuildRoutingProvider { .. } => "provider",
            Self::Optimize { source } => source.kind(),
            Self::Distance { .. } => "route_impossible",
            Self::SerializeOutput(_) | Self::WriteOutput(_) => "output",
        }
    }
}
