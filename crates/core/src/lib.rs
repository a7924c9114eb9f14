pub mod config;
pub mod error;
pub mod kind;
pub mod record;

pub use config::{Config, SuffixTable};
pub use error::*;
pub use kind::FileKind;
pub use record::{FileRecord, Outcome};
