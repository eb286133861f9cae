//! Delivery history: every dispatch outcome is forwarded to a sink.
//!
//! The sink is best-effort by contract; a failing sink never fails the
//! dispatch that produced the record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

/// What happened to one dispatch attempt.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRecord {
    pub channel: String,
    pub title: String,
    pub recipient: Option<String>,
    pub succeeded: bool,
    pub diagnostic: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Receives a record after every dispatch. Implementations own persistence;
/// the provided [`LoggingHistorySink`] just emits tracing events.
#[async_trait]
pub trait HistorySink: Send + Sync {
    async fn record(&self, record: &DeliveryRecord) -> anyhow::Result<()>;
}

/// A sink that logs records instead of persisting them.
pub struct LoggingHistorySink;

#[async_trait]
impl HistorySink for LoggingHistorySink {
    async fn record(&self, record: &DeliveryRecord) -> anyhow::Result<()> {
        if record.succeeded {
            info!(
                channel = %record.channel,
                title = %record.title,
                "notification delivered"
            );
        } else {
            error!(
                channel = %record.channel,
                title = %record.title,
                diagnostic = record.diagnostic.as_deref().unwrap_or(""),
                "notification failed"
            );
        }
        Ok(())
    }
}
