//! Export module
//!
//! Turns the event log into delimited text and the frame store into a
//! packaged archive, with an ordered fallback when packaging fails.

pub mod archive;
pub mod delimited;
pub mod fallback;
pub mod sink;
pub mod types;

pub use archive::{to_archive, ArchivePackager, ZipPackager};
pub use delimited::to_delimited_text;
pub use fallback::{Attempted, FallbackChain, Strategy, StrategyFailure};
pub use sink::{write_archive_outcome, write_download, SinkReport};
pub use types::{ArchiveEntry, ArchiveOutcome, Download, ExportError, FrameDownload};
