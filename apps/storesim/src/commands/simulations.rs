//! Simulation jobs.

use anyhow::Result;
use clap::Subcommand;
use storesim_async::types::SimulationCreate;

use super::{Context, PollArgs};

#[derive(Subcommand)]
pub enum SimulationCommands {
    /// Start a simulation and optionally wait for it
    Run {
        /// Store to simulate
        #[arg(long)]
        store_source_id: Option<String>,

        /// Strategy to apply (repeatable)
        #[arg(long = "strategy")]
        strategies: Vec<String>,

        /// Simulated days
        #[arg(long)]
        days: Option<u32>,

        /// Wait for the job and print the finished simulation
        #[arg(long)]
        wait: bool,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Fetch a finished simulation
    Get {
        /// Simulation ID
        id: u64,
    },
}

pub async fn execute(ctx: &Context, cmd: SimulationCommands) -> Result<()> {
    match cmd {
        SimulationCommands::Run {
            store_source_id,
            strategies,
            days,
            wait,
            poll,
        } => {
            let payload = SimulationCreate {
                store_source_id,
                selected_strategy_ids: strategies,
                days,
            };
            let created = ctx
                .client
                .simulations()
                .create(&payload)
                .await
                .map_err(|e| ctx.fail(&e))?;

            if !wait {
                return ctx.print(&created);
            }
            let state = ctx.follow(created.job_id, &poll).await?;
            match state.result_id {
                Some(id) => get(ctx, id).await,
                None => Ok(()),
            }
        }
        SimulationCommands::Get { id } => get(ctx, id).await,
    }
}

async fn get(ctx: &Context, id: u64) -> Result<()> {
    let raw = ctx
        .client
        .simulations()
        .get(id)
        .await
        .map_err(|e| ctx.fail(&e))?;
    ctx.print(&raw.unwrap_or_default())
}
