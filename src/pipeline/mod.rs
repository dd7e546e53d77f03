pub mod compiler;
pub mod file;
pub mod paths;

pub use compiler::{CompileProgress, ComponentCompiler, FileOutcome, ProcessedFile};
pub use file::SourceFile;
pub use paths::{component_name, normalize_extension, rewrite_path};
