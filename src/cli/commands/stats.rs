//! Implementation of the `collatz-explorer stats` command.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use crate::adapters::sqlite::{create_pool, SqliteResultQueries};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{ComputationSummary, Config, DistributionStat, RecentAverages};
use crate::domain::ports::ResultQueries;

/// Arguments for `stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Window size for the recent-averages section
    #[arg(long, default_value = "100")]
    pub recent: u32,
}

#[derive(Debug, serde::Serialize)]
struct StatsOutput {
    summary: ComputationSummary,
    recent_window: u32,
    recent: RecentAverages,
    distribution: Vec<DistributionStat>,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["statistic", "value"]);
        table.add_row(vec![
            "last checked number".to_string(),
            self.summary.last_checked_number.to_string(),
        ]);
        table.add_row(vec![
            "total computation time (s)".to_string(),
            format!("{:.1}", self.summary.total_computation_time),
        ]);
        table.add_row(vec![
            "average steps".to_string(),
            format!("{:.2}", self.summary.average_steps),
        ]);
        table.add_row(vec![
            format!("average steps (last {})", self.recent_window),
            self.recent.average_number_of_steps.map_or("-".to_string(), |v| format!("{v:.2}")),
        ]);
        table.add_row(vec![
            format!("average max value (last {})", self.recent_window),
            self.recent.average_max_value.map_or("-".to_string(), |v| format!("{v:.2}")),
        ]);

        let mut sections = vec![table.to_string()];
        if !self.distribution.is_empty() {
            let mut dist_table = Table::new();
            dist_table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["max-value distribution", "value"]);
            for stat in &self.distribution {
                dist_table.add_row(vec![stat.stat_name.clone(), format!("{:.2}", stat.value)]);
            }
            sections.push(dist_table.to_string());
        }
        sections.join("\n")
    }
}

/// Print the whole-store summary, recent averages and the persisted
/// distribution snapshot.
pub async fn execute(args: StatsArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = create_pool(&config.database.path, None)
        .await
        .with_context(|| format!("failed to open database at {}", config.database.path))?;
    let queries = SqliteResultQueries::new(pool.clone());

    let summary = queries.summary().await.context("failed to read summary")?;
    let recent = queries
        .recent_averages(args.recent)
        .await
        .context("failed to read recent averages")?;
    let distribution = queries.distribution().await.context("failed to read distribution")?;
    pool.close().await;

    let result = StatsOutput {
        summary,
        recent_window: args.recent,
        recent,
        distribution,
    };
    output(&result, json_mode);
    Ok(())
}
