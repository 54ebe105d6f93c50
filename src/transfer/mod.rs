//! Row assembly and transfer orchestration.
//!
//! - `assemble`: builds one destination row from an included source row and
//!   the column mapping
//! - `pipeline`: runs the whole transfer (match, assemble, append, report)

pub mod assemble;
pub mod pipeline;

pub use assemble::{assemble, DestinationRow};
pub use pipeline::{
    preview_matches, run_transfer, ConsoleProgress, ProgressSink, SilentProgress, TransferOptions,
    TransferSummary,
};
