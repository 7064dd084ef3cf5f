//! Subcommand implementations and the plumbing they share.

pub mod jobs;
pub mod reports;
pub mod simulations;
pub mod stores;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use storesim_async::normalize::{JobId, JobStatus};
use storesim_async::persist::FileStore;
use storesim_async::poller::{JobPoller, JobSource, PollOptions, PollState};
use storesim_async::{Client, Config as _, Locale, StoresimConfig, StoresimError, parse_error};

/// File holding reconnect slots, relative to the user data directory
const SLOTS_FILE: &str = "storesim/jobs.json";

/// Everything a subcommand needs from the global flags
pub struct Context {
    pub client: Arc<Client<StoresimConfig>>,
    pub locale: Locale,
    compact: bool,
}

impl Context {
    pub fn new(base_url: Option<String>, locale: Option<Locale>, compact: bool) -> Self {
        let mut config = StoresimConfig::new();
        if let Some(base) = base_url {
            config = config.with_api_base(base);
        }
        if let Some(locale) = locale {
            config = config.with_locale(locale);
        }
        let locale = config.locale();
        Self {
            client: Arc::new(Client::with_config(config)),
            locale,
            compact,
        }
    }

    /// Writes `value` to stdout as JSON.
    pub fn print<T: Serialize>(&self, value: &T) -> Result<()> {
        let out = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        println!("{out}");
        Ok(())
    }

    /// Turns a client error into the localized message shown to the user.
    pub fn fail(&self, err: &StoresimError) -> anyhow::Error {
        let parsed = parse_error(err, self.locale);
        tracing::trace!(error = %err, "reporting failure");
        match parsed.code {
            Some(code) => anyhow::anyhow!("{} [{code}]", parsed.message),
            None => anyhow::anyhow!("{}", parsed.message),
        }
    }

    /// Follows `job_id` until it reaches a terminal state, printing progress
    /// to stderr and the final state to stdout.
    pub async fn follow(&self, job_id: JobId, poll: &PollArgs) -> Result<PollState> {
        let source: Arc<dyn JobSource> = Arc::<Client<StoresimConfig>>::clone(&self.client);
        let mut poller = JobPoller::new(source).with_options(poll.options(self.locale));
        if poll.persist_key.is_some() {
            poller = poller.with_store(Arc::new(slot_store()?));
        }

        let handle = poller.watch(job_id);
        let mut updates = handle.subscribe();
        eprintln!("{} watching job {}", "INFO".blue(), handle.job_id().to_string().cyan());

        let progress = async {
            loop {
                let state = updates.borrow_and_update().clone();
                if !state.is_polling {
                    break;
                }
                report_progress(&state);
                if updates.changed().await.is_err() {
                    break;
                }
            }
        };

        tokio::select! {
            () = progress => {}
            _ = tokio::signal::ctrl_c() => {
                handle.cancel();
                anyhow::bail!("Interrupted; job {job_id} keeps running on the server");
            }
        }

        let state = handle.finished().await;
        self.print(&state)?;
        match state.status {
            JobStatus::Completed => {
                eprintln!("{} job {job_id} completed", "OK".green());
                Ok(state)
            }
            _ => {
                let message = state.error_message.as_deref().unwrap_or_default();
                match state.error_code.as_deref() {
                    Some(code) => anyhow::bail!("{message} [{code}]"),
                    None => anyhow::bail!("{message}"),
                }
            }
        }
    }
}

fn report_progress(state: &PollState) {
    let progress = state
        .progress
        .map_or_else(String::new, |p| format!(" {p:.0}%"));
    eprintln!(
        "{} {}{progress} (attempt {})",
        "..".dimmed(),
        state.status,
        state.attempt
    );
}

/// Path of the reconnect slot file
pub fn slots_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Could not determine the user data directory")?;
    Ok(base.join(SLOTS_FILE))
}

/// Reconnect store shared by every `--persist-key` user
pub fn slot_store() -> Result<FileStore> {
    Ok(FileStore::new(slots_path()?))
}

/// Polling knobs shared by every command that waits on a job
#[derive(Args, Debug, Clone)]
pub struct PollArgs {
    /// Delay before the first re-poll, in milliseconds
    #[arg(long, default_value_t = 1500)]
    pub interval_ms: u64,

    /// Upper bound on the delay between polls, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub max_interval_ms: u64,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Give up after this many polls
    #[arg(long, default_value_t = 120)]
    pub max_attempts: u32,

    /// Remember the job under this key so `jobs resume` can pick it up
    #[arg(long)]
    pub persist_key: Option<String>,
}

impl PollArgs {
    fn options(&self, locale: Locale) -> PollOptions {
        let mut options = PollOptions::default()
            .with_intervals(
                Duration::from_millis(self.interval_ms),
                Duration::from_millis(self.max_interval_ms),
            )
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_attempts(self.max_attempts)
            .with_locale(locale);
        if let Some(key) = &self.persist_key {
            options = options.with_persist_key(key.clone());
        }
        options
    }
}
