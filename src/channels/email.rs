//! The SMTP email adapter.
//!
//! Sends the rich-HTML envelope with a tag-stripped plain-text alternative.
//! The SMTP session uses implicit TLS or STARTTLS depending on settings and
//! the transport library's default timeout.

use crate::channels::{resolve_recipient, ChannelAdapter};
use crate::config::{ChannelConfig, ChannelKind, ChannelSettings, EmailSettings};
use crate::error::DispatchError;
use crate::render::{render_email_envelope, strip_tags, RenderMode};
use crate::request::NotificationRequest;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

const PLAIN_FALLBACK: &str = "Your mail client cannot display HTML messages.";

pub struct EmailAdapter;

impl EmailAdapter {
    fn settings(config: &ChannelConfig) -> Result<&EmailSettings, DispatchError> {
        match &config.settings {
            ChannelSettings::Email(settings) => Ok(settings),
            _ => Err(DispatchError::Configuration(
                "email: settings are for a different channel kind".into(),
            )),
        }
    }

    /// Site name shown in the banner and footer: the configured sender
    /// display name, or the channel's display label when there is none.
    fn site_name<'a>(settings: &'a EmailSettings, config: &'a ChannelConfig) -> &'a str {
        if settings.from_name.is_empty() {
            config.name.as_str()
        } else {
            settings.from_name.as_str()
        }
    }

    fn from_mailbox(settings: &EmailSettings, site_name: &str) -> Result<Mailbox, DispatchError> {
        let spec = if site_name.is_empty() {
            settings.username.clone()
        } else {
            format!("{} <{}>", site_name, settings.username)
        };
        spec.parse().map_err(|_| {
            DispatchError::Configuration(format!(
                "email: `{}` is not a valid sender address",
                settings.username
            ))
        })
    }

    fn mailer(
        settings: &EmailSettings,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, DispatchError> {
        let builder = if settings.implicit_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| DispatchError::Transport(format!("smtp: {e}")))?;

        let builder = if settings.accept_invalid_certs {
            let tls = TlsParameters::builder(settings.host.clone())
                .dangerous_accept_invalid_certs(true)
                .build()
                .map_err(|e| DispatchError::Transport(format!("smtp tls: {e}")))?;
            if settings.implicit_tls {
                builder.tls(Tls::Wrapper(tls))
            } else {
                builder.tls(Tls::Required(tls))
            }
        } else {
            builder
        };

        Ok(builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build())
    }
}

#[async_trait]
impl ChannelAdapter for EmailAdapter {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    fn render_mode(&self) -> RenderMode {
        RenderMode::RichHtml
    }

    async fn send(
        &self,
        config: &ChannelConfig,
        request: &NotificationRequest,
        rendered: &str,
    ) -> Result<(), DispatchError> {
        let settings = Self::settings(config)?;
        let recipient = resolve_recipient(request, &config.settings)?;

        let site_name = Self::site_name(settings, config);

        let from = Self::from_mailbox(settings, site_name)?;
        let reply_to: Mailbox = settings.username.parse().map_err(|_| {
            DispatchError::Configuration(format!(
                "email: `{}` is not a valid reply-to address",
                settings.username
            ))
        })?;
        let to: Mailbox = recipient.parse().map_err(|_| {
            DispatchError::Configuration(format!(
                "email: `{recipient}` is not a valid recipient address"
            ))
        })?;

        let html = render_email_envelope(request, rendered, site_name);
        let plain = {
            let text = strip_tags(rendered);
            if text.trim().is_empty() {
                PLAIN_FALLBACK.to_string()
            } else {
                text
            }
        };

        let email = Message::builder()
            .from(from)
            .reply_to(reply_to)
            .to(to)
            .subject(request.title.as_str())
            .multipart(MultiPart::alternative_plain_html(plain, html))
            .map_err(|e| DispatchError::Configuration(format!("email: cannot build message: {e}")))?;

        let mailer = Self::mailer(settings)?;
        mailer
            .send(email)
            .await
            .map_err(|e| DispatchError::Transport(format!("smtp: {e}")))?;

        info!(to = %recipient, title = %request.title, "email notification delivered");
        Ok(())
    }
}
