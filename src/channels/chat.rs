//! The enterprise chat bot adapter.
//!
//! Two sequential round-trips per send: corp credentials are exchanged for a
//! short-lived bearer token, then the message is posted with it. The token
//! is fetched anew on every send; the API's embedded `errcode` decides
//! success independently of the HTTP status.

use crate::channels::{resolve_recipient, ChannelAdapter};
use crate::config::{ChannelConfig, ChannelKind, ChannelSettings, ChatSettings};
use crate::error::DispatchError;
use crate::render::RenderMode;
use crate::request::NotificationRequest;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

/// Suppression window the API applies when duplicate checking is enabled.
const DUPLICATE_CHECK_INTERVAL_SECS: u32 = 1800;

pub struct ChatAdapter;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    errmsg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    errcode: Option<i64>,
    errmsg: Option<String>,
}

impl ChatAdapter {
    fn settings(config: &ChannelConfig) -> Result<&ChatSettings, DispatchError> {
        match &config.settings {
            ChannelSettings::Chat(settings) => Ok(settings),
            _ => Err(DispatchError::Configuration(
                "chat: settings are for a different channel kind".into(),
            )),
        }
    }

    async fn fetch_token(
        client: &reqwest::Client,
        settings: &ChatSettings,
    ) -> Result<String, DispatchError> {
        let url = format!("{}/gettoken", settings.api_base.trim_end_matches('/'));
        debug!(%url, "requesting chat access token");
        let response: TokenResponse = client
            .get(&url)
            .query(&[
                ("corpid", settings.corp_id.as_str()),
                ("corpsecret", settings.corp_secret.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        response.access_token.ok_or_else(|| {
            DispatchError::RemoteRejection(format!(
                "token request rejected: {}",
                response.errmsg.unwrap_or_else(|| "unknown error".into())
            ))
        })
    }

    /// Builds the text content: severity emoji and title, body, then one
    /// line per action link.
    fn build_content(request: &NotificationRequest, rendered: &str) -> String {
        let mut content = format!(
            "{} {}\n\n{}",
            request.severity.emoji(),
            request.title,
            rendered
        );
        if request.action_left.is_some() || request.action_right.is_some() {
            content.push_str("\n\n");
            if let Some(action) = &request.action_left {
                content.push_str(&format!("{}: {}", action.label, action.url));
            }
            if let Some(action) = &request.action_right {
                if request.action_left.is_some() {
                    content.push('\n');
                }
                content.push_str(&format!("{}: {}", action.label, action.url));
            }
        }
        content
    }
}

#[async_trait]
impl ChannelAdapter for ChatAdapter {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Chat
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
        let recipient = resolve_recipient(request, &config.settings)?;

        let client = reqwest::Client::new();
        let token = Self::fetch_token(&client, settings).await?;

        let message = json!({
            "msgtype": "text",
            "agentid": settings.agent_id,
            "text": { "content": Self::build_content(request, rendered) },
            "touser": recipient,
            "enable_duplicate_check": 0,
            "duplicate_check_interval": DUPLICATE_CHECK_INTERVAL_SECS,
        });

        let url = format!("{}/message/send", settings.api_base.trim_end_matches('/'));
        let response: SendResponse = client
            .post(&url)
            .query(&[("access_token", token.as_str())])
            .json(&message)
            .send()
            .await?
            .json()
            .await?;

        match response.errcode {
            Some(0) => {
                info!(touser = %recipient, title = %request.title, "chat notification delivered");
                Ok(())
            }
            Some(code) => Err(DispatchError::RemoteRejection(format!(
                "errcode {code}: {}",
                response.errmsg.unwrap_or_else(|| "unknown error".into())
            ))),
            None => Err(DispatchError::RemoteRejection(
                "malformed send response: missing errcode".into(),
            )),
        }
    }
}
