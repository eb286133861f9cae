//! The generic webhook adapter: a single HTTP POST to a configured URL.

use crate::channels::ChannelAdapter;
use crate::config::{ChannelConfig, ChannelKind, ChannelSettings, WebhookFormat, WebhookSettings};
use crate::error::DispatchError;
use crate::render::RenderMode;
use crate::request::NotificationRequest;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

pub struct WebhookAdapter;

impl WebhookAdapter {
    fn settings(config: &ChannelConfig) -> Result<&WebhookSettings, DispatchError> {
        match &config.settings {
            ChannelSettings::Webhook(settings) => Ok(settings),
            _ => Err(DispatchError::Configuration(
                "webhook: settings are for a different channel kind".into(),
            )),
        }
    }
}

/// Everything but `A-Za-z0-9`, `-`, `_`, `.` and space is percent-encoded;
/// spaces become `+`, matching form-style URL encoding on the receiving end.
const HEADER_VALUE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b' ');

fn encode(value: &str) -> String {
    utf8_percent_encode(value, HEADER_VALUE_SET)
        .to_string()
        .replace(' ', "+")
}

#[async_trait]
impl ChannelAdapter for WebhookAdapter {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Webhook
    }

    fn render_mode(&self) -> RenderMode {
        RenderMode::SymbolicText
    }

    async fn send(
        &self,
        config: &ChannelConfig,
        request: &NotificationRequest,
        rendered: &str,
    ) -> Result<(), DispatchError> {
        let settings = Self::settings(config)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let mut builder = match settings.format {
            WebhookFormat::Text => {
                let mut builder = client
                    .post(&settings.url)
                    .header("Title", encode(&request.title))
                    .header("Type", request.severity.as_str());
                if let Some(action) = &request.action_left {
                    builder = builder
                        .header("Action-Left-Url", encode(&action.url))
                        .header("Action-Left-Text", encode(&action.label));
                }
                if let Some(action) = &request.action_right {
                    builder = builder
                        .header("Action-Right-Url", encode(&action.url))
                        .header("Action-Right-Text", encode(&action.label));
                }
                builder.body(rendered.to_string())
            }
            WebhookFormat::Json => {
                let payload = json!({
                    "title": request.title,
                    "message": rendered,
                    "type": request.severity.as_str(),
                    "recipient": request.recipient,
                    "actionLeftUrl": request.action_left.as_ref().map(|a| a.url.as_str()),
                    "actionLeftText": request.action_left.as_ref().map(|a| a.label.as_str()),
                    "actionRightUrl": request.action_right.as_ref().map(|a| a.url.as_str()),
                    "actionRightText": request.action_right.as_ref().map(|a| a.label.as_str()),
                    "timestamp": request.created_at.to_rfc3339(),
                    "channel": ChannelKind::Webhook.as_str(),
                });
                client.post(&settings.url).json(&payload)
            }
        };

        if let Some(auth) = &settings.auth_header {
            builder = builder.header(auth.name.as_str(), auth.value.as_str());
        }

        debug!(url = %settings.url, format = ?settings.format, "posting webhook notification");
        let response = builder.send().await?;
        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::RemoteRejection(format!(
                "HTTP {status}: {body}"
            )));
        }

        info!(url = %settings.url, status = %status, "webhook notification delivered");
        Ok(())
    }
}
