//! Invoice AI Common Library
//!
//! CLIとデスクトップビューアで共有される型とユーティリティ

pub mod codec;
pub mod error;
pub mod path;
pub mod record;
pub mod wire;

pub use codec::{parse_records, render_records};
pub use error::{Error, Result};
pub use path::{file_name_of, normalize_path};
pub use record::{FileInfo, FileKind, OutputFileRecord};
pub use wire::{ErrorDetail, FuzzyMatch, HealthStatus, ProcessingRequest, ProcessingResult};
