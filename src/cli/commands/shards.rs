use crate::attendance::EventSource;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::ShardCount;
use crate::ui::messages::info;
use crate::utils::table::Table;

/// List the attendance shards matching `table_prefix` with their current row counts.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Shards { json } = cmd {
        let source = super::open_source(cfg)?;

        let mut counts = Vec::new();
        for shard in source.list_shards()? {
            match source.shard_row_count(&shard) {
                Ok(row_count) => counts.push(ShardCount {
                    table_name: shard,
                    row_count,
                }),
                Err(e) => tracing::warn!(shard = %shard, error = %e, "row count failed"),
            }
        }

        if *json {
            let out = serde_json::to_string_pretty(&counts)
                .map_err(|e| AppError::Other(e.to_string()))?;
            println!("{}", out);
            return Ok(());
        }

        if counts.is_empty() {
            info(format!(
                "No shard matching '{}YYYYMM' in {}",
                cfg.table_prefix, cfg.attendance_database
            ));
            return Ok(());
        }

        let mut table = Table::with_headers(&["SHARD", "ROWS"]);
        for c in counts {
            table.add_row(vec![c.table_name, c.row_count.to_string()]);
        }
        print!("{}", table.render());
    }

    Ok(())
}
