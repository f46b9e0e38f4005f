mod config;
mod error;
mod types;
mod utils;

pub use config::{AdminConfig, Config, DbConfig, MailConfig, ServerConfig};
pub use error::{Bucket, Error};
pub use types::*;
pub use utils::*;

/// capacity ceiling per bucket (brunch turn or evening)
pub const MAX_GUESTS: i64 = 25;
/// hard cap on rows in a PDF export
pub const MAX_EXPORT_ROWS: i64 = 1000;
