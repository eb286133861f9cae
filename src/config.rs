//! Configuration for notify-bridge.
//!
//! The application config is loaded with `figment` by layering defaults, a
//! TOML file and `NOTIFY_BRIDGE_`-prefixed environment variables. Channel
//! settings are typed per channel kind and validated at load time, so a
//! misconfigured channel fails before any network call is attempted.

use crate::error::DispatchError;
use anyhow::Result;
use async_trait::async_trait;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Closed set of notification channel kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Email,
    Chat,
    Webhook,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 3] = [ChannelKind::Email, ChannelKind::Chat, ChannelKind::Webhook];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Email => "email",
            ChannelKind::Chat => "chat",
            ChannelKind::Webhook => "webhook",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = DispatchError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "email" => Ok(ChannelKind::Email),
            "chat" => Ok(ChannelKind::Chat),
            "webhook" => Ok(ChannelKind::Webhook),
            other => Err(DispatchError::UnknownChannel(other.to_string())),
        }
    }
}

/// One configured channel: display label, activation flag and typed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Display label, e.g. "Ops mail".
    pub name: String,
    /// Inactive channels are never selected, even when explicitly requested.
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(flatten)]
    pub settings: ChannelSettings,
}

fn default_active() -> bool {
    true
}

impl ChannelConfig {
    pub fn kind(&self) -> ChannelKind {
        self.settings.kind()
    }
}

/// Channel-specific settings, tagged by channel kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChannelSettings {
    Email(EmailSettings),
    Chat(ChatSettings),
    Webhook(WebhookSettings),
}

impl ChannelSettings {
    pub fn kind(&self) -> ChannelKind {
        match self {
            ChannelSettings::Email(_) => ChannelKind::Email,
            ChannelSettings::Chat(_) => ChannelKind::Chat,
            ChannelSettings::Webhook(_) => ChannelKind::Webhook,
        }
    }

    /// The channel's own fallback recipient, if it declares one.
    pub fn default_recipient(&self) -> Option<&str> {
        match self {
            ChannelSettings::Email(s) => s.default_recipient.as_deref(),
            ChannelSettings::Chat(s) => s.default_recipient.as_deref(),
            ChannelSettings::Webhook(_) => None,
        }
    }

    /// Validates the settings. Called at config-load time so that failures
    /// surface before a send is attempted.
    pub fn validate(&self) -> Result<(), DispatchError> {
        match self {
            ChannelSettings::Email(s) => s.validate(),
            ChannelSettings::Chat(s) => s.validate(),
            ChannelSettings::Webhook(s) => s.validate(),
        }
    }
}

/// SMTP settings for the email channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSettings {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// SMTP username; also used as the from and reply-to address.
    pub username: String,
    pub password: String,
    /// Use implicit TLS (SMTPS). When false, STARTTLS is used instead.
    #[serde(default = "default_true")]
    pub implicit_tls: bool,
    /// Accept self-signed or otherwise invalid server certificates.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Sender display name; also names the site in the email footer.
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub default_recipient: Option<String>,
}

fn default_smtp_port() -> u16 {
    465
}

fn default_true() -> bool {
    true
}

impl EmailSettings {
    fn validate(&self) -> Result<(), DispatchError> {
        if self.host.is_empty() {
            return Err(DispatchError::Configuration(
                "email: SMTP host must not be empty".into(),
            ));
        }
        if self.port == 0 {
            return Err(DispatchError::Configuration(
                "email: SMTP port must not be 0".into(),
            ));
        }
        if self.username.is_empty() || self.password.is_empty() {
            return Err(DispatchError::Configuration(
                "email: SMTP credentials are incomplete".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for the enterprise chat bot channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// API root; overridable so tests can point at a mock server.
    #[serde(default = "default_chat_api_base")]
    pub api_base: String,
    pub corp_id: String,
    pub corp_secret: String,
    pub agent_id: String,
    #[serde(default)]
    pub default_recipient: Option<String>,
}

fn default_chat_api_base() -> String {
    "https://qyapi.weixin.qq.com/cgi-bin".to_string()
}

impl ChatSettings {
    fn validate(&self) -> Result<(), DispatchError> {
        if self.corp_id.is_empty() {
            return Err(DispatchError::Configuration(
                "chat: corp_id must not be empty".into(),
            ));
        }
        if self.corp_secret.is_empty() || self.agent_id.is_empty() {
            return Err(DispatchError::Configuration(
                "chat: corp_secret and agent_id must not be empty".into(),
            ));
        }
        if reqwest::Url::parse(&self.api_base).is_err() {
            return Err(DispatchError::Configuration(format!(
                "chat: api_base `{}` is not a valid URL",
                self.api_base
            )));
        }
        Ok(())
    }
}

/// How the webhook channel packages a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookFormat {
    /// Metadata in custom headers, rendered text as the raw body.
    #[default]
    Text,
    /// A single JSON payload carrying all fields.
    Json,
}

/// Optional custom auth header attached to webhook requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthHeader {
    pub name: String,
    pub value: String,
}

/// Settings for the generic webhook channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSettings {
    pub url: String,
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub auth_header: Option<AuthHeader>,
    #[serde(default)]
    pub format: WebhookFormat,
}

fn default_webhook_timeout() -> u64 {
    30
}

impl WebhookSettings {
    fn validate(&self) -> Result<(), DispatchError> {
        if self.url.is_empty() {
            return Err(DispatchError::Configuration(
                "webhook: URL must not be empty".into(),
            ));
        }
        let url = reqwest::Url::parse(&self.url).map_err(|_| {
            DispatchError::Configuration(format!("webhook: `{}` is not a valid URL", self.url))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(DispatchError::Configuration(format!(
                "webhook: unsupported URL scheme `{}`",
                url.scheme()
            )));
        }
        if !(1..=300).contains(&self.timeout_secs) {
            return Err(DispatchError::Configuration(
                "webhook: timeout must be between 1 and 300 seconds".into(),
            ));
        }
        Ok(())
    }
}

/// The main configuration struct for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Channel tag used when a dispatch names no channel.
    pub default_channel: String,
    /// Configured channels, one entry per kind.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_channel: "email".to_string(),
            channels: Vec::new(),
        }
    }
}

impl Config {
    /// Loads the configuration by layering defaults, the TOML file and
    /// environment variables (e.g. `NOTIFY_BRIDGE_DEFAULT_CHANNEL=webhook`).
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment.merge(Env::prefixed("NOTIFY_BRIDGE_")).extract()?;
        config.default_kind()?;
        Ok(config)
    }

    /// The default channel kind; errors if the configured tag is unknown.
    pub fn default_kind(&self) -> Result<ChannelKind, DispatchError> {
        self.default_channel.parse()
    }

    pub fn channel(&self, kind: ChannelKind) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.kind() == kind)
    }
}

/// Read access to per-channel configuration, consulted freshly on every
/// dispatch. Implementations own any caching or persistence concerns.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn channel(&self, kind: ChannelKind) -> Result<Option<ChannelConfig>, DispatchError>;
}

/// A [`ConfigStore`] backed by an in-memory [`Config`].
pub struct StaticConfigStore {
    config: Config,
}

impl StaticConfigStore {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConfigStore for StaticConfigStore {
    async fn channel(&self, kind: ChannelKind) -> Result<Option<ChannelConfig>, DispatchError> {
        Ok(self.config.channel(kind).cloned())
    }
}
