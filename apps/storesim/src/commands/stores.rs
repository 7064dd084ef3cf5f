//! Store search.

use anyhow::Result;
use clap::Subcommand;
use storesim_async::types::StoreQuery;

use super::Context;

#[derive(Subcommand)]
pub enum StoreCommands {
    /// Search stores by name or address
    Search {
        /// Free-text query; omit to list every store
        query: Option<String>,

        /// Page size
        #[arg(long, default_value_t = 50)]
        limit: u32,

        /// Page offset
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
}

pub async fn execute(ctx: &Context, cmd: StoreCommands) -> Result<()> {
    match cmd {
        StoreCommands::Search {
            query,
            limit,
            offset,
        } => {
            let query = StoreQuery {
                q: query.filter(|q| !q.trim().is_empty()),
                limit,
                offset,
            };
            let page = ctx
                .client
                .stores()
                .search(&query)
                .await
                .map_err(|e| ctx.fail(&e))?;
            tracing::info!(count = page.items.len(), total = page.total, "stores fetched");
            ctx.print(&page)
        }
    }
}
