pub mod content;
pub mod error;
pub mod signals;
pub mod utils;

pub use content::*;
pub use error::{EngineError, ErrorCategory, ErrorClassifier, LlmError, Result};
pub use signals::*;
pub use utils::{json_string, json_string_array, slugify, truncate_chars};
