//! Prelude module - commonly used test helpers.

pub use crate::{
    FailingSink, MemorySink, PanickingFilter, PanickingSink, RecordingFilter, TestLogDir,
    init_test_tracing, read_json_lines, sample_record, unique_logger_name,
};
