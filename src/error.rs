//! Error taxonomy for the dispatch pipeline.
//!
//! Every expected failure class an adapter or the registry can hit is a
//! [`DispatchError`] variant. The manager converts all of them into a failed
//! [`crate::DispatchOutcome`]; none of them reach the caller as an `Err`.
//! The one thing that does propagate is [`FlowAbort`], the control-flow
//! short-circuit owned by the surrounding request-handling layer.

use crate::config::ChannelKind;
use serde_json::Value;
use thiserror::Error;

/// Failure classes produced by config resolution, rendering and adapters.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The requested channel tag is not registered.
    #[error("unknown notification channel `{0}`")]
    UnknownChannel(String),

    /// The channel exists but is switched off; it must never be selected,
    /// even when explicitly requested.
    #[error("channel `{0}` is not active")]
    ChannelInactive(ChannelKind),

    /// Missing or invalid channel settings, raised at config-load time.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Network or timeout failure at the transport layer.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The remote endpoint answered, but rejected the message (HTTP status
    /// >= 400, or a non-zero API-level error code).
    #[error("remote rejection: {0}")]
    RemoteRejection(String),

    /// Malformed renderer input. Rendering degrades gracefully, so this is
    /// only produced when an adapter cannot use the rendered payload at all.
    #[error("render failure: {0}")]
    Render(String),

    /// The outer framework's abort signal. Must pass through adapter and
    /// manager code unmodified; never reported as a dispatch failure.
    #[error(transparent)]
    Abort(#[from] FlowAbort),
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::Transport(err.to_string())
    }
}

/// Control-flow short-circuit used by the surrounding request layer to stop
/// normal response generation. Carries the response payload to emit instead.
///
/// This is not a dispatch failure: when it surfaces inside adapter or
/// config-store code, [`crate::manager::DispatchManager::send`] re-raises it
/// unchanged instead of folding it into the outcome.
#[derive(Debug, Clone, Error)]
#[error("request flow aborted")]
pub struct FlowAbort {
    /// The response the outer layer should emit in place of the normal one.
    pub response: Value,
}

impl FlowAbort {
    pub fn new(response: Value) -> Self {
        Self { response }
    }
}
