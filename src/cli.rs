use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::invoker::InvokerConfig;
use crate::sms::{DEFAULT_MESSAGE, DEFAULT_PHONE, DEFAULT_URL, SmsRequest};

pub const DEFAULT_PROBE_URL: &str = "https://www.google.com";

/// Sends one test SMS request to a local SMS service and prints the result.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about)]
pub struct AppArgs {
    /// Raise log verbosity on stderr. Repeat for more detail.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Abort the request after this long, e.g. `5s` or `1500ms`. No limit by default.
    #[arg(long, global = true, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,
    #[command(flatten)]
    pub send: SendArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Overrides for the SMS request. Every field defaults to the built-in test values.
#[derive(Debug, Clone, Args)]
pub struct SendArgs {
    /// Endpoint the request is posted to.
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,
    /// Recipient in E.164 format.
    #[arg(long, default_value = DEFAULT_PHONE)]
    pub phone: String,
    /// Message text.
    #[arg(long, default_value = DEFAULT_MESSAGE)]
    pub message: String,
}

#[derive(Debug, Clone, Subcommand)]
#[command(rename_all = "kebab-case")]
pub enum Command {
    /// Check that a URL answers a GET request at all.
    #[command(alias = "test-connection")]
    Probe {
        #[arg(default_value = DEFAULT_PROBE_URL)]
        url: String,
    },
}

impl AppArgs {
    pub fn invoker_config(&self) -> InvokerConfig {
        InvokerConfig {
            url: self.send.url.clone(),
            sms: SmsRequest::new(self.send.phone.clone(), self.send.message.clone()),
            timeout: self.timeout,
        }
    }
}
