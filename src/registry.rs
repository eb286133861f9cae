//! The compile-time channel registry.
//!
//! A closed mapping from [`ChannelKind`] to adapter constructors, plus the
//! resolution step that turns a requested tag into a validated, active
//! channel configuration.

use crate::channels::{ChannelAdapter, ChatAdapter, EmailAdapter, WebhookAdapter};
use crate::config::{ChannelConfig, ChannelKind, ConfigStore};
use crate::error::DispatchError;

pub struct ChannelRegistry;

impl ChannelRegistry {
    /// Constructs the adapter for a channel kind. The mapping is closed at
    /// compile time; there is no runtime registration.
    pub fn adapter(kind: ChannelKind) -> Box<dyn ChannelAdapter> {
        match kind {
            ChannelKind::Email => Box::new(EmailAdapter),
            ChannelKind::Chat => Box::new(ChatAdapter),
            ChannelKind::Webhook => Box::new(WebhookAdapter),
        }
    }

    /// Tags of all registered channel kinds.
    pub fn tags() -> Vec<&'static str> {
        ChannelKind::ALL.iter().map(|kind| kind.as_str()).collect()
    }

    /// Resolves a requested channel tag (or the default) to its validated
    /// configuration. Fails without any network I/O for unknown tags,
    /// unconfigured or inactive channels, and invalid settings.
    pub async fn resolve(
        store: &dyn ConfigStore,
        requested: Option<&str>,
        default: ChannelKind,
    ) -> Result<ChannelConfig, DispatchError> {
        let kind = match requested {
            Some(tag) => tag.parse()?,
            None => default,
        };

        let config = store.channel(kind).await?.ok_or_else(|| {
            DispatchError::Configuration(format!("channel `{kind}` is not configured"))
        })?;

        if config.kind() != kind {
            return Err(DispatchError::Configuration(format!(
                "channel `{kind}` is configured with `{}` settings",
                config.kind()
            )));
        }
        if !config.active {
            return Err(DispatchError::ChannelInactive(kind));
        }
        config.settings.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelSettings, WebhookFormat, WebhookSettings};
    use crate::render::RenderMode;
    use async_trait::async_trait;

    struct OneChannelStore {
        config: Option<ChannelConfig>,
    }

    #[async_trait]
    impl ConfigStore for OneChannelStore {
        async fn channel(
            &self,
            kind: ChannelKind,
        ) -> Result<Option<ChannelConfig>, DispatchError> {
            Ok(self
                .config
                .as_ref()
                .filter(|c| c.kind() == kind)
                .cloned())
        }
    }

    fn webhook_config(active: bool, url: &str) -> ChannelConfig {
        ChannelConfig {
            name: "hook".to_string(),
            active,
            settings: ChannelSettings::Webhook(WebhookSettings {
                url: url.to_string(),
                timeout_secs: 30,
                auth_header: None,
                format: WebhookFormat::Text,
            }),
        }
    }

    #[test]
    fn every_kind_has_an_adapter_with_matching_tag() {
        for kind in ChannelKind::ALL {
            assert_eq!(ChannelRegistry::adapter(kind).kind(), kind);
        }
        assert_eq!(ChannelRegistry::tags(), vec!["email", "chat", "webhook"]);
    }

    #[test]
    fn adapters_declare_their_render_modes() {
        assert_eq!(
            ChannelRegistry::adapter(ChannelKind::Email).render_mode(),
            RenderMode::RichHtml
        );
        assert_eq!(
            ChannelRegistry::adapter(ChannelKind::Chat).render_mode(),
            RenderMode::SymbolicText
        );
        assert_eq!(
            ChannelRegistry::adapter(ChannelKind::Webhook).render_mode(),
            RenderMode::SymbolicText
        );
    }

    #[tokio::test]
    async fn unknown_tag_fails_resolution() {
        let store = OneChannelStore { config: None };
        let err = ChannelRegistry::resolve(&store, Some("pigeon"), ChannelKind::Webhook)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownChannel(_)));
    }

    #[tokio::test]
    async fn inactive_channel_fails_resolution() {
        let store = OneChannelStore {
            config: Some(webhook_config(false, "https://example.test/hook")),
        };
        let err = ChannelRegistry::resolve(&store, Some("webhook"), ChannelKind::Webhook)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::ChannelInactive(ChannelKind::Webhook)
        ));
    }

    #[tokio::test]
    async fn invalid_settings_fail_resolution() {
        let store = OneChannelStore {
            config: Some(webhook_config(true, "not a url")),
        };
        let err = ChannelRegistry::resolve(&store, Some("webhook"), ChannelKind::Webhook)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Configuration(_)));
    }

    #[tokio::test]
    async fn missing_tag_resolves_the_default() {
        let store = OneChannelStore {
            config: Some(webhook_config(true, "https://example.test/hook")),
        };
        let config = ChannelRegistry::resolve(&store, None, ChannelKind::Webhook)
            .await
            .unwrap();
        assert_eq!(config.kind(), ChannelKind::Webhook);
    }
}
