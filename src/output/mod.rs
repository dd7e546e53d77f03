pub mod manager;
pub mod writer;

pub use manager::{CompileReport, CompileSummary, ConfigSnapshot, FileEntry, OutputManager};
pub use writer::FileWriter;
