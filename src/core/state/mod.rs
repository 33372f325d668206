// Processing record for incremental exports

pub mod record;

pub use record::{JsonFileProcessingRecord, NoOpProcessingRecord, ProcessingRecord, RecordEntry};
