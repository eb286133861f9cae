//! Command-line interface definition.
//!
//! The binary mirrors the crate's entry points: `send` for a one-shot
//! delivery, `test` for a channel's synthetic test notification and
//! `channels` to list the registered tags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Deliver notifications over email, enterprise chat or webhooks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one notification.
    Send {
        /// Notification title.
        #[arg(long, default_value = "System Notice")]
        title: String,

        /// Markdown message body.
        #[arg(long)]
        message: String,

        /// Severity tag: default, success, warning or error.
        #[arg(long, default_value = "default")]
        severity: String,

        /// Recipient; falls back to the channel's configured default.
        #[arg(long)]
        recipient: Option<String>,

        /// Channel tag; falls back to the configured default channel.
        #[arg(long)]
        channel: Option<String>,

        /// Left action button URL.
        #[arg(long, requires = "action_left_text")]
        action_left_url: Option<String>,

        /// Left action button label.
        #[arg(long, requires = "action_left_url")]
        action_left_text: Option<String>,

        /// Right action button URL.
        #[arg(long, requires = "action_right_text")]
        action_right_url: Option<String>,

        /// Right action button label.
        #[arg(long, requires = "action_right_url")]
        action_right_text: Option<String>,
    },

    /// Send a synthetic test notification through one channel.
    Test {
        /// Channel tag to test.
        channel: String,
    },

    /// List the registered channel tags.
    Channels,
}
