//! Shared builders for the integration tests.

#![allow(dead_code)]

use notify_bridge::config::{
    AuthHeader, ChannelConfig, ChannelSettings, ChatSettings, Config, WebhookFormat,
    WebhookSettings,
};
use notify_bridge::DispatchManager;

pub fn manager(default_channel: &str, channels: Vec<ChannelConfig>) -> DispatchManager {
    let config = Config {
        log_level: "info".to_string(),
        default_channel: default_channel.to_string(),
        channels,
    };
    DispatchManager::from_config(config).expect("valid test config")
}

pub fn webhook_channel(
    url: &str,
    format: WebhookFormat,
    active: bool,
    auth_header: Option<AuthHeader>,
) -> ChannelConfig {
    ChannelConfig {
        name: "Test hook".to_string(),
        active,
        settings: ChannelSettings::Webhook(WebhookSettings {
            url: url.to_string(),
            timeout_secs: 30,
            auth_header,
            format,
        }),
    }
}

pub fn chat_channel(api_base: &str, default_recipient: Option<&str>) -> ChannelConfig {
    ChannelConfig {
        name: "Test chat".to_string(),
        active: true,
        settings: ChannelSettings::Chat(ChatSettings {
            api_base: api_base.to_string(),
            corp_id: "corp".to_string(),
            corp_secret: "secret".to_string(),
            agent_id: "1000002".to_string(),
            default_recipient: default_recipient.map(str::to_string),
        }),
    }
}
