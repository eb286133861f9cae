//! notify-bridge - one-shot notification delivery over email, enterprise
//! chat or generic webhooks.
//!
//! A [`NotificationRequest`] is rendered from markdown into the form the
//! chosen channel expects and handed to that channel's adapter; the
//! [`DispatchManager`] turns every expected failure into a definite
//! [`DispatchOutcome`] instead of an error.

pub mod channels;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod manager;
pub mod registry;
pub mod render;
pub mod request;

pub use config::{ChannelConfig, ChannelKind, ChannelSettings, Config, ConfigStore};
pub use error::{DispatchError, FlowAbort};
pub use history::{DeliveryRecord, HistorySink, LoggingHistorySink};
pub use manager::DispatchManager;
pub use render::{render, RenderMode};
pub use request::{Action, DispatchOutcome, NotificationRequest, Severity};
