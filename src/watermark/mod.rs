// Watermark module - placement, compositing, per-format encoding and batch runs
mod batch;
mod error;
pub mod formats;
mod naming;
mod placement;
mod processor;
mod types;

// Re-export public items
pub use batch::{
    BatchOutcome, BatchRequest, BatchSummary, DEFAULT_QUALITY, FailureSummary, batch_watermark,
    load_watermark, run_batch,
};
pub use error::{ImageFailure, ProcessError, WatermarkError};
pub use naming::{OUTPUT_SUFFIX, candidate_name, create_output_file, output_stem};
pub use placement::{DEFAULT_MARGIN, Position, compute_position};
pub use processor::{ProcessedImage, open_with_format, process_one};
pub use types::{EncodingPolicy, OutputFormat, SourceFormat};
