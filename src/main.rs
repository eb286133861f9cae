//! notify-bridge binary: one-shot notification delivery from the shell.

use anyhow::Result;
use clap::Parser;
use notify_bridge::{
    cli::{Cli, Command},
    Action, Config, DispatchManager, DispatchOutcome, NotificationRequest, Severity,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let manager = DispatchManager::from_config(config)?;

    let outcome = match cli.command {
        Command::Send {
            title,
            message,
            severity,
            recipient,
            channel,
            action_left_url,
            action_left_text,
            action_right_url,
            action_right_text,
        } => {
            let mut request = NotificationRequest::new(title, message)
                .with_severity(Severity::from_tag(&severity));
            request.recipient = recipient;
            if let (Some(url), Some(label)) = (action_left_url, action_left_text) {
                request.action_left = Some(Action::new(url, label));
            }
            if let (Some(url), Some(label)) = (action_right_url, action_right_text) {
                request.action_right = Some(Action::new(url, label));
            }
            dispatch(&manager, &request, channel.as_deref()).await?
        }
        Command::Test { channel } => match manager.test(&channel).await {
            Ok(outcome) => outcome,
            Err(abort) => anyhow::bail!("dispatch aborted: {}", abort.response),
        },
        Command::Channels => {
            for tag in manager.list_available_channels() {
                println!("{tag}");
            }
            return Ok(());
        }
    };

    if outcome.succeeded {
        println!("notification sent");
        Ok(())
    } else {
        eprintln!(
            "notification failed: {}",
            outcome.diagnostic.unwrap_or_default()
        );
        std::process::exit(1);
    }
}

async fn dispatch(
    manager: &DispatchManager,
    request: &NotificationRequest,
    channel: Option<&str>,
) -> Result<DispatchOutcome> {
    match manager.send(request, channel).await {
        Ok(outcome) => Ok(outcome),
        Err(abort) => anyhow::bail!("dispatch aborted: {}", abort.response),
    }
}
