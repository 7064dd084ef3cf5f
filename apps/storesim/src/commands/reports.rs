//! X-Report and Y-Report commands.

use anyhow::Result;
use clap::Subcommand;
use storesim_async::types::{XReportCreate, YReportCreate};

use super::{Context, PollArgs};

#[derive(Subcommand)]
pub enum XReportCommands {
    /// Generate (or fetch the cached) diagnostic report for a store
    Create {
        /// Store to diagnose
        #[arg(long)]
        store_source_id: Option<String>,

        /// Data snapshot to use
        #[arg(long)]
        snapshot_version: Option<String>,

        /// Prompt template to use
        #[arg(long)]
        prompt_id: Option<String>,

        /// Print the report view instead of just its ID
        #[arg(long)]
        view: bool,
    },

    /// Show a report
    View {
        /// Report ID
        id: u64,

        /// Print the payload as the server sent it
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Subcommand)]
pub enum YReportCommands {
    /// Start a comparison report and optionally wait for it
    Create {
        /// Store to compare
        #[arg(long)]
        store_id: Option<String>,

        /// Strategy that was simulated (repeatable)
        #[arg(long = "strategy")]
        strategies: Vec<String>,

        /// Wait for the job and print the finished report
        #[arg(long)]
        wait: bool,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Show a report
    View {
        /// Report ID
        id: u64,

        /// Print the payload as the server sent it
        #[arg(long)]
        raw: bool,
    },
}

pub async fn execute_x(ctx: &Context, cmd: XReportCommands) -> Result<()> {
    match cmd {
        XReportCommands::Create {
            store_source_id,
            snapshot_version,
            prompt_id,
            view,
        } => {
            let payload = XReportCreate {
                store_source_id,
                snapshot_version,
                prompt_id,
            };
            let created = ctx
                .client
                .x_reports()
                .create(&payload)
                .await
                .map_err(|e| ctx.fail(&e))?;
            if view {
                view_x(ctx, created.x_report_id, false).await
            } else {
                ctx.print(&created)
            }
        }
        XReportCommands::View { id, raw } => view_x(ctx, id, raw).await,
    }
}

pub async fn execute_y(ctx: &Context, cmd: YReportCommands) -> Result<()> {
    match cmd {
        YReportCommands::Create {
            store_id,
            strategies,
            wait,
            poll,
        } => {
            let payload = YReportCreate {
                store_id,
                selected_strategy_ids: strategies,
            };
            let created = ctx
                .client
                .y_reports()
                .create(&payload)
                .await
                .map_err(|e| ctx.fail(&e))?;

            if !wait {
                return ctx.print(&created);
            }
            let state = ctx.follow(created.job_id, &poll).await?;
            match state.result_id {
                Some(id) => view_y(ctx, id, false).await,
                None => Ok(()),
            }
        }
        YReportCommands::View { id, raw } => view_y(ctx, id, raw).await,
    }
}

async fn view_x(ctx: &Context, id: u64, raw: bool) -> Result<()> {
    let reports = ctx.client.x_reports();
    if raw {
        let body = reports.view_raw(id).await.map_err(|e| ctx.fail(&e))?;
        return ctx.print(&body.unwrap_or_default());
    }
    let view = reports.view(id).await.map_err(|e| ctx.fail(&e))?;
    ctx.print(&view)
}

async fn view_y(ctx: &Context, id: u64, raw: bool) -> Result<()> {
    let reports = ctx.client.y_reports();
    if raw {
        let body = reports.view_raw(id).await.map_err(|e| ctx.fail(&e))?;
        return ctx.print(&body.unwrap_or_default());
    }
    let view = reports.view(id).await.map_err(|e| ctx.fail(&e))?;
    ctx.print(&view)
}
