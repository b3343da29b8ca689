pub mod memory;
pub mod ndjson;
pub mod noop;

pub use memory::MemoryResultSink;
pub use ndjson::NdjsonResultSink;
pub use noop::NoopResultSink;
