//! Channel adapters: one implementation per transport, each owning its
//! channel's wire protocol behind a shared contract.

mod chat;
mod email;
mod webhook;

pub use chat::ChatAdapter;
pub use email::EmailAdapter;
pub use webhook::WebhookAdapter;

use crate::config::{ChannelConfig, ChannelKind, ChannelSettings};
use crate::error::DispatchError;
use crate::render::RenderMode;
use crate::request::NotificationRequest;
use async_trait::async_trait;

/// The polymorphic send contract.
///
/// `rendered` is the message body already rendered in the mode the adapter
/// declared via [`ChannelAdapter::render_mode`]. Expected failure classes
/// come back as [`DispatchError`] values; adapters never panic on transport
/// problems.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    fn kind(&self) -> ChannelKind;

    /// The render mode this adapter expects its body in.
    fn render_mode(&self) -> RenderMode;

    async fn send(
        &self,
        config: &ChannelConfig,
        request: &NotificationRequest,
        rendered: &str,
    ) -> Result<(), DispatchError>;
}

/// Resolves the recipient for a send: the explicit request recipient wins
/// over the channel's configured default; a channel that needs one and has
/// neither is a configuration failure.
pub(crate) fn resolve_recipient<'a>(
    request: &'a NotificationRequest,
    settings: &'a ChannelSettings,
) -> Result<&'a str, DispatchError> {
    request
        .recipient
        .as_deref()
        .or_else(|| settings.default_recipient())
        .ok_or_else(|| {
            DispatchError::Configuration(format!(
                "{}: no recipient given and no default configured",
                settings.kind()
            ))
        })
}
