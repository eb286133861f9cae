//! The dispatch manager: the crate's primary entry point.
//!
//! Resolves the channel, renders the message in the mode the adapter
//! expects, invokes the adapter and records the outcome. Every expected
//! failure becomes a failed [`DispatchOutcome`]; only the outer framework's
//! [`FlowAbort`] signal propagates as an `Err`.

use crate::config::{ChannelKind, Config, ConfigStore, StaticConfigStore};
use crate::error::{DispatchError, FlowAbort};
use crate::history::{DeliveryRecord, HistorySink, LoggingHistorySink};
use crate::registry::ChannelRegistry;
use crate::render::render;
use crate::request::{DispatchOutcome, NotificationRequest};
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Body used by [`DispatchManager::test`].
const TEST_MESSAGE: &str = "This is a test notification.\nCheck **bold** rendering.";

/// Orchestrates a single best-effort delivery attempt per call. Holds no
/// per-call state, so one instance can serve concurrent callers as long as
/// its collaborators can.
pub struct DispatchManager {
    store: Arc<dyn ConfigStore>,
    history: Arc<dyn HistorySink>,
    default_channel: ChannelKind,
}

impl DispatchManager {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        history: Arc<dyn HistorySink>,
        default_channel: ChannelKind,
    ) -> Self {
        Self {
            store,
            history,
            default_channel,
        }
    }

    /// Convenience constructor wiring the static config store and the
    /// logging history sink.
    pub fn from_config(config: Config) -> Result<Self, DispatchError> {
        let default_channel = config.default_kind()?;
        Ok(Self::new(
            Arc::new(StaticConfigStore::new(config)),
            Arc::new(LoggingHistorySink),
            default_channel,
        ))
    }

    /// Tags of all registered channels.
    pub fn list_available_channels(&self) -> Vec<&'static str> {
        ChannelRegistry::tags()
    }

    /// Delivers one notification through the named channel, or the default
    /// when `channel` is `None`.
    ///
    /// Always returns a definite outcome for dispatch-level failures; the
    /// only `Err` is the pass-through [`FlowAbort`] signal.
    pub async fn send(
        &self,
        request: &NotificationRequest,
        channel: Option<&str>,
    ) -> Result<DispatchOutcome, FlowAbort> {
        let tag = channel.unwrap_or(self.default_channel.as_str()).to_string();

        let outcome = match self.dispatch(request, channel).await {
            Ok(()) => {
                info!(channel = %tag, title = %request.title, "dispatch succeeded");
                DispatchOutcome::success()
            }
            Err(DispatchError::Abort(abort)) => return Err(abort),
            Err(err) => {
                error!(channel = %tag, error = %err, "dispatch failed");
                DispatchOutcome::failure(format!("{tag}: {err}"))
            }
        };

        let record = DeliveryRecord {
            channel: tag,
            title: request.title.clone(),
            recipient: request.recipient.clone(),
            succeeded: outcome.succeeded,
            diagnostic: outcome.diagnostic.clone(),
            timestamp: Utc::now(),
        };
        if let Err(err) = self.history.record(&record).await {
            warn!(error = %err, "failed to record delivery history");
        }

        Ok(outcome)
    }

    /// Builds a request from loosely-typed key/value input and sends it.
    pub async fn send_from_map(
        &self,
        fields: Map<String, Value>,
        channel: Option<&str>,
    ) -> Result<DispatchOutcome, FlowAbort> {
        let request = NotificationRequest::from_map(fields);
        self.send(&request, channel).await
    }

    /// Sends a synthetic notification through the named channel, resolving
    /// the recipient from the channel's own default when it has one.
    pub async fn test(&self, channel: &str) -> Result<DispatchOutcome, FlowAbort> {
        let mut request = NotificationRequest::new("Test notification", TEST_MESSAGE);
        if let Ok(kind) = channel.parse::<ChannelKind>() {
            match self.store.channel(kind).await {
                Ok(Some(config)) => {
                    if let Some(recipient) = config.settings.default_recipient() {
                        request.recipient = Some(recipient.to_string());
                    }
                }
                Err(DispatchError::Abort(abort)) => return Err(abort),
                _ => {}
            }
        }
        self.send(&request, Some(channel)).await
    }

    async fn dispatch(
        &self,
        request: &NotificationRequest,
        channel: Option<&str>,
    ) -> Result<(), DispatchError> {
        let config =
            ChannelRegistry::resolve(self.store.as_ref(), channel, self.default_channel).await?;
        let adapter = ChannelRegistry::adapter(config.kind());
        let rendered = render(&request.message, adapter.render_mode());
        adapter.send(&config, request, &rendered).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelConfig, ChannelSettings, WebhookFormat, WebhookSettings};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeStore {
        channels: Vec<ChannelConfig>,
        abort: bool,
    }

    #[async_trait]
    impl ConfigStore for FakeStore {
        async fn channel(
            &self,
            kind: ChannelKind,
        ) -> Result<Option<ChannelConfig>, DispatchError> {
            if self.abort {
                return Err(DispatchError::Abort(FlowAbort::new(json!({ "code": 401 }))));
            }
            Ok(self.channels.iter().find(|c| c.kind() == kind).cloned())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<DeliveryRecord>>,
    }

    #[async_trait]
    impl HistorySink for RecordingSink {
        async fn record(&self, record: &DeliveryRecord) -> anyhow::Result<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl HistorySink for FailingSink {
        async fn record(&self, _record: &DeliveryRecord) -> anyhow::Result<()> {
            anyhow::bail!("history table unavailable")
        }
    }

    fn webhook_config(active: bool) -> ChannelConfig {
        ChannelConfig {
            name: "hook".to_string(),
            active,
            settings: ChannelSettings::Webhook(WebhookSettings {
                url: "https://example.invalid/hook".to_string(),
                timeout_secs: 30,
                auth_header: None,
                format: WebhookFormat::Text,
            }),
        }
    }

    fn manager_with(
        channels: Vec<ChannelConfig>,
        sink: Arc<dyn HistorySink>,
    ) -> DispatchManager {
        DispatchManager::new(
            Arc::new(FakeStore {
                channels,
                abort: false,
            }),
            sink,
            ChannelKind::Webhook,
        )
    }

    #[tokio::test]
    async fn unknown_channel_returns_failed_outcome() {
        let sink = Arc::new(RecordingSink::default());
        let manager = manager_with(vec![], sink.clone());
        let request = NotificationRequest::new("T", "m");

        let outcome = manager.send(&request, Some("pigeon")).await.unwrap();
        assert!(!outcome.succeeded);
        let diagnostic = outcome.diagnostic.unwrap();
        assert!(diagnostic.contains("pigeon"), "diagnostic: {diagnostic}");

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].succeeded);
    }

    #[tokio::test]
    async fn inactive_channel_fails_without_io() {
        // The URL is unroutable; reaching the network would surface as a
        // transport diagnostic instead of the inactive-channel one.
        let manager = manager_with(
            vec![webhook_config(false)],
            Arc::new(RecordingSink::default()),
        );
        let request = NotificationRequest::new("T", "m");

        let outcome = manager.send(&request, Some("webhook")).await.unwrap();
        assert!(!outcome.succeeded);
        assert!(outcome.diagnostic.unwrap().contains("not active"));
    }

    #[tokio::test]
    async fn unconfigured_channel_fails_cleanly() {
        let manager = manager_with(vec![], Arc::new(RecordingSink::default()));
        let request = NotificationRequest::new("T", "m");

        let outcome = manager.send(&request, Some("chat")).await.unwrap();
        assert!(!outcome.succeeded);
        assert!(outcome.diagnostic.unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn history_sink_failure_does_not_fail_dispatch() {
        let manager = manager_with(vec![], Arc::new(FailingSink));
        let request = NotificationRequest::new("T", "m");

        let outcome = manager.send(&request, Some("pigeon")).await.unwrap();
        assert!(!outcome.succeeded);
    }

    #[tokio::test]
    async fn flow_abort_passes_through_unchanged() {
        let manager = DispatchManager::new(
            Arc::new(FakeStore {
                channels: vec![],
                abort: true,
            }),
            Arc::new(RecordingSink::default()),
            ChannelKind::Webhook,
        );
        let request = NotificationRequest::new("T", "m");

        let abort = manager.send(&request, Some("webhook")).await.unwrap_err();
        assert_eq!(abort.response, json!({ "code": 401 }));
    }

    #[tokio::test]
    async fn send_from_map_reports_like_send() {
        let manager = manager_with(vec![], Arc::new(RecordingSink::default()));
        let fields = match json!({ "title": "T", "message": "m" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let outcome = manager.send_from_map(fields, Some("pigeon")).await.unwrap();
        assert!(!outcome.succeeded);
    }

    #[test]
    fn available_channels_lists_all_tags() {
        let manager = manager_with(vec![], Arc::new(RecordingSink::default()));
        assert_eq!(
            manager.list_available_channels(),
            vec!["email", "chat", "webhook"]
        );
    }
}
