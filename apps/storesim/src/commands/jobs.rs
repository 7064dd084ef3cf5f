//! Job status, watching and reconnecting.

use anyhow::{Context as _, Result};
use clap::Subcommand;
use colored::Colorize;
use storesim_async::normalize::JobId;
use storesim_async::persist::persisted_job_id;

use super::{Context, PollArgs, slot_store};

#[derive(Subcommand)]
pub enum JobCommands {
    /// Show a job's current status once
    Status {
        /// Job ID
        id: JobId,
    },

    /// Poll a job until it completes or fails
    Watch {
        /// Job ID
        id: JobId,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Resume watching the job remembered under a persist key
    Resume {
        /// Key the job was watched under
        key: String,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Print the file holding remembered jobs
    Slots,
}

pub async fn execute(ctx: &Context, cmd: JobCommands) -> Result<()> {
    match cmd {
        JobCommands::Status { id } => {
            let job = ctx
                .client
                .jobs()
                .get(id)
                .await
                .map_err(|e| ctx.fail(&e))?;
            ctx.print(&job)
        }
        JobCommands::Watch { id, poll } => ctx.follow(id, &poll).await.map(drop),
        JobCommands::Resume { key, mut poll } => {
            let store = slot_store()?;
            let id = persisted_job_id(&store, &key)
                .with_context(|| format!("No job is remembered under '{key}'"))?;
            eprintln!("{} resuming job {} from '{key}'", "INFO".blue(), id.to_string().cyan());
            poll.persist_key = Some(key);
            ctx.follow(id, &poll).await.map(drop)
        }
        JobCommands::Slots => {
            println!("{}", super::slots_path()?.display());
            Ok(())
        }
    }
}
