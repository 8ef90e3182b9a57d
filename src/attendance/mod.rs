//! Attendance uploads and corrections

pub mod correction;
mod grammar;
pub mod upload;

pub use correction::{find_record, find_record_mut, CorrectionError};
pub use upload::{
    parse_upload, AttendancePreview, CsvMode, PreviewLine, PreviewRow, PreviewSummary, RowStatus,
    UploadOptions, REQUIRED_COLUMNS,
};
