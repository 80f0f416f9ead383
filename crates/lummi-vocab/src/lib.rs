pub mod clean;
pub mod pipeline;
pub mod report;

pub use clean::{NormalizeOptions, TokenizeMethod, normalize, normalize_text, tokenize, tokenize_text};
pub use pipeline::{
    CleanOp, InputSpec, OrphanScope, PipelineError, ReadSettings, SourceFormat, read_input,
    run_clean, run_fix, run_merge,
};
pub use report::{Report, ReportFormat, render};
