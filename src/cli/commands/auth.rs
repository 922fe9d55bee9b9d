//! Token, OTP, and notification outbox arguments.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    with_outbox_args(command)
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("token-secret")
                .long("token-secret")
                .help("HS256 signing secret for access and refresh tokens")
                .env("DEVSEARCH_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("access-ttl-seconds")
                .long("access-ttl-seconds")
                .help("Access token TTL in seconds")
                .env("DEVSEARCH_ACCESS_TTL_SECONDS")
                .default_value("300")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("refresh-ttl-seconds")
                .long("refresh-ttl-seconds")
                .help("Refresh token TTL in seconds")
                .env("DEVSEARCH_REFRESH_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("otp-ttl-seconds")
                .long("otp-ttl-seconds")
                .help("Validity window for one-time codes in seconds")
                .env("DEVSEARCH_OTP_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("frontend-base-url")
                .long("frontend-base-url")
                .help("Frontend base URL used for CORS and email links")
                .env("DEVSEARCH_FRONTEND_BASE_URL")
                .default_value("https://devsearch.dev"),
        )
}

fn with_outbox_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("email-outbox-poll-seconds")
                .long("email-outbox-poll-seconds")
                .help("Email outbox poll interval in seconds")
                .env("DEVSEARCH_EMAIL_OUTBOX_POLL_SECONDS")
                .default_value("5")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("email-outbox-batch-size")
                .long("email-outbox-batch-size")
                .help("Email outbox batch size per poll")
                .env("DEVSEARCH_EMAIL_OUTBOX_BATCH_SIZE")
                .default_value("10")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("email-outbox-max-attempts")
                .long("email-outbox-max-attempts")
                .help("Max attempts before marking an email as failed")
                .env("DEVSEARCH_EMAIL_OUTBOX_MAX_ATTEMPTS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("email-outbox-backoff-base-seconds")
                .long("email-outbox-backoff-base-seconds")
                .help("Base delay for email outbox retry backoff")
                .env("DEVSEARCH_EMAIL_OUTBOX_BACKOFF_BASE_SECONDS")
                .default_value("5")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("email-outbox-backoff-max-seconds")
                .long("email-outbox-backoff-max-seconds")
                .help("Max delay for email outbox retry backoff")
                .env("DEVSEARCH_EMAIL_OUTBOX_BACKOFF_MAX_SECONDS")
                .default_value("300")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[derive(Debug)]
pub struct OutboxOptions {
    pub poll_seconds: u64,
    pub batch_size: usize,
    pub max_attempts: u32,
    pub backoff_base_seconds: u64,
    pub backoff_max_seconds: u64,
}

#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub otp_ttl_seconds: i64,
    pub frontend_base_url: String,
    pub outbox: OutboxOptions,
}

impl Options {
    /// Collect the auth/outbox options out of parsed matches.
    ///
    /// # Errors
    /// Returns an error when a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let token_secret = matches
            .get_one::<String>("token-secret")
            .cloned()
            .context("missing required argument: --token-secret")?;

        Ok(Self {
            token_secret: SecretString::from(token_secret),
            access_ttl_seconds: matches
                .get_one::<i64>("access-ttl-seconds")
                .copied()
                .unwrap_or(300),
            refresh_ttl_seconds: matches
                .get_one::<i64>("refresh-ttl-seconds")
                .copied()
                .unwrap_or(86_400),
            otp_ttl_seconds: matches
                .get_one::<i64>("otp-ttl-seconds")
                .copied()
                .unwrap_or(900),
            frontend_base_url: matches
                .get_one::<String>("frontend-base-url")
                .cloned()
                .unwrap_or_else(|| "https://devsearch.dev".to_string()),
            outbox: OutboxOptions {
                poll_seconds: matches
                    .get_one::<u64>("email-outbox-poll-seconds")
                    .copied()
                    .unwrap_or(5),
                batch_size: matches
                    .get_one::<usize>("email-outbox-batch-size")
                    .copied()
                    .unwrap_or(10),
                max_attempts: matches
                    .get_one::<u32>("email-outbox-max-attempts")
                    .copied()
                    .unwrap_or(5),
                backoff_base_seconds: matches
                    .get_one::<u64>("email-outbox-backoff-base-seconds")
                    .copied()
                    .unwrap_or(5),
                backoff_max_seconds: matches
                    .get_one::<u64>("email-outbox-backoff-max-seconds")
                    .copied()
                    .unwrap_or(300),
            },
        })
    }
}
