//! Transfer run controller.
//!
//! Thin orchestration over the matcher and the assembler: validates the
//! mapping against both tables before touching any row, then walks source
//! rows in order, appending each included row to the sink and reporting
//! progress. A row is either fully assembled and appended or entirely
//! skipped; the only fatal mid-run condition is the final save.

use serde::Serialize;

use crate::error::{MatchError, TransferResult};
use crate::logs::{log_info, log_success, log_warning};
use crate::mapping::ColumnMapping;
use crate::matcher::{MatchConfig, MatchOutcome, Matcher};
use crate::sink::TableSink;
use crate::source::TableData;
use crate::transfer::assemble::assemble;

/// Options for a transfer run
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Run the full pipeline but skip the final save
    pub dry_run: bool,
}

/// Result of a completed transfer run
#[derive(Debug, Clone, Serialize)]
pub struct TransferSummary {
    /// Source rows scanned
    pub rows_total: usize,
    /// Rows appended to the destination
    pub rows_inserted: usize,
    /// Rows excluded by the matcher
    pub rows_skipped: usize,
}

/// Receives per-row progress and the terminal summary.
///
/// Implementations must not mutate pipeline state; at worst they briefly
/// re-render a display.
pub trait ProgressSink {
    fn on_row(&mut self, processed: usize, total: usize);
    fn on_done(&mut self, summary: &TransferSummary);
}

/// Progress sink that narrates through the console logger in 25% steps.
#[derive(Default)]
pub struct ConsoleProgress {
    last_quarter: usize,
}

impl ProgressSink for ConsoleProgress {
    fn on_row(&mut self, processed: usize, total: usize) {
        if total == 0 {
            return;
        }
        let quarter = processed * 4 / total;
        if quarter > self.last_quarter {
            self.last_quarter = quarter;
            log_info(format!("Processed {}/{} rows", processed, total));
        }
    }

    fn on_done(&mut self, summary: &TransferSummary) {
        log_success(format!(
            "Inserted {} of {} rows ({} skipped)",
            summary.rows_inserted, summary.rows_total, summary.rows_skipped
        ));
    }
}

/// Progress sink that discards everything.
#[derive(Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn on_row(&mut self, _processed: usize, _total: usize) {}
    fn on_done(&mut self, _summary: &TransferSummary) {}
}

/// Run a transfer: match every source row, assemble and append the
/// included ones, then save the sink.
///
/// Validation happens before the first row: mapping sources against the
/// source headers, routed destinations against the sink headers, and a
/// non-empty actively-monitored set. Appends go to consecutive indices
/// after the sink's pre-run rows.
pub fn run_transfer(
    table: &TableData,
    sink: &mut dyn TableSink,
    mapping: &ColumnMapping,
    config: &MatchConfig,
    progress: &mut dyn ProgressSink,
    options: &TransferOptions,
) -> TransferResult<TransferSummary> {
    mapping.validate_source_headers(&table.headers)?;
    mapping.validate_dest_headers(sink.headers())?;

    let active_monitored = mapping.active_monitored(&config.monitored_columns);
    if active_monitored.is_empty() {
        return Err(MatchError::NoMonitoredColumns.into());
    }

    let matcher = Matcher::new(config)?;

    log_info(format!(
        "Monitoring {} column(s): {}",
        active_monitored.len(),
        active_monitored.join(", ")
    ));

    let total = table.rows.len();
    let mut inserted = 0;
    let mut skipped = 0;

    for (i, row) in table.rows.iter().enumerate() {
        match row.as_object() {
            Some(cells) => {
                let outcome = matcher.evaluate(cells, &active_monitored);
                if outcome.included {
                    let dest_row = assemble(cells, mapping, &active_monitored, &outcome.extracted);
                    sink.append(&dest_row)?;
                    inserted += 1;
                } else {
                    skipped += 1;
                }
            }
            None => {
                log_warning(format!("Row {} is not an object, skipping", i + 1));
                skipped += 1;
            }
        }
        progress.on_row(i + 1, total);
    }

    if options.dry_run {
        log_info("Dry run: destination not saved");
    } else {
        sink.save()?;
    }

    let summary = TransferSummary {
        rows_total: total,
        rows_inserted: inserted,
        rows_skipped: skipped,
    };
    progress.on_done(&summary);

    Ok(summary)
}

/// Evaluate every source row without touching any sink.
///
/// Returns `(row_index, outcome)` for each row the matcher would include;
/// the CLI `preview` command prints these.
pub fn preview_matches(
    table: &TableData,
    mapping: &ColumnMapping,
    config: &MatchConfig,
) -> TransferResult<Vec<(usize, MatchOutcome)>> {
    mapping.validate_source_headers(&table.headers)?;

    let active_monitored = mapping.active_monitored(&config.monitored_columns);
    if active_monitored.is_empty() {
        return Err(MatchError::NoMonitoredColumns.into());
    }

    let matcher = Matcher::new(config)?;

    Ok(table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let cells = row.as_object()?;
            let outcome = matcher.evaluate(cells, &active_monitored);
            outcome.included.then_some((i, outcome))
        })
        .collect())
}
