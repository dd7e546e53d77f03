use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A delimited block of a single-file component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Template,
    Script,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Template => write!(f, "template"),
            Section::Script => write!(f, "script"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SfcJsError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input directory not found: {path}")]
    InputNotFound { path: String },

    #[error("Component has no <{section}> section")]
    MissingSection { section: Section },

    #[error("Script section does not match `export default {{ ... }};`")]
    MalformedScript,

    #[error("Component name cannot be embedded in a quoted key: {name}")]
    InvalidComponentName { name: String },

    #[error("Component source is not valid UTF-8")]
    InvalidEncoding,

    #[error("Failed to compile {}: {source}", .path.display())]
    Transform {
        path: PathBuf,
        #[source]
        source: Box<SfcJsError>,
    },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,

    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Output file already exists: {path}")]
    OutputExists { path: String },

    #[error("{first} and {second} both map to {path}")]
    OutputCollision {
        path: String,
        first: String,
        second: String,
    },
}

impl SfcJsError {
    /// Attach the offending file to a transform failure.
    pub fn in_file<P: Into<PathBuf>>(self, path: P) -> Self {
        SfcJsError::Transform {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// True for failures produced by the extraction/reassembly step.
    pub fn is_transform_failure(&self) -> bool {
        matches!(
            self,
            SfcJsError::MissingSection { .. }
                | SfcJsError::MalformedScript
                | SfcJsError::InvalidComponentName { .. }
                | SfcJsError::InvalidEncoding
                | SfcJsError::Transform { .. }
        )
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for SfcJsError {
    fn user_message(&self) -> String {
        match self {
            SfcJsError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            SfcJsError::InputNotFound { path } => {
                format!("Input directory not found: {}", path)
            }
            SfcJsError::MissingSection { section } => {
                format!("Component is missing its <{}> block", section)
            }
            SfcJsError::MalformedScript => {
                "Script block must contain `export default { ... };`".to_string()
            }
            SfcJsError::InvalidComponentName { name } => {
                format!("File name cannot be used as a component key: {}", name)
            }
            SfcJsError::Transform { path, source } => {
                format!("{}: {}", path.display(), source.user_message())
            }
            SfcJsError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            SfcJsError::FileTooLarge { size, max_size } => {
                format!(
                    "File too large: {} (maximum allowed: {})",
                    format_bytes(*size),
                    format_bytes(*max_size)
                )
            }
            SfcJsError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            SfcJsError::OutputExists { path } => {
                format!("Output file already exists: {}", path)
            }
            SfcJsError::OutputCollision {
                path,
                first,
                second,
            } => {
                format!("{} and {} would both be written to {}", first, second, path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            SfcJsError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            SfcJsError::InputNotFound { .. } => Some(
                "Pass an existing directory containing .vue files as the first argument.".to_string()
            ),
            SfcJsError::MissingSection { .. } | SfcJsError::MalformedScript => Some(
                "Each component needs one <template> block and one <script> block ending in `export default { ... };`.".to_string()
            ),
            SfcJsError::InvalidComponentName { .. } => Some(
                "Rename the file so its name has no quotes, backslashes or line breaks.".to_string()
            ),
            SfcJsError::Transform { source, .. } => source.suggestion().or_else(|| Some(
                "Use --on-error skip to pass malformed components through unchanged.".to_string()
            )),
            SfcJsError::Permission { .. } => Some(
                "Ensure you have the necessary read/write permissions for the target directory.".to_string()
            ),
            SfcJsError::FileTooLarge { .. } => Some(
                "Raise the limit with --max-size or max_file_size in the [filters] section of your configuration.".to_string()
            ),
            SfcJsError::OutputCollision { .. } => Some(
                "Rename one of the files or pick a target extension no other input file uses (--ext).".to_string()
            ),
            SfcJsError::OutputExists { .. } => Some(
                "Remove the existing output, choose a different directory with --out-dir, or use --force to overwrite.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for SfcJsError {
    fn from(error: toml::de::Error) -> Self {
        SfcJsError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SfcJsError>;

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
