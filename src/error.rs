use thiserror::Error;
use wayfinder_core::RouteError;
use wayfinder_core::prelude::SessionError;

use crate::trace::TraceError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] wayfinder_core::Error),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error("Invalid tracker settings: {0}")]
    TrackerConfig(#[source] serde_json::Error),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}
