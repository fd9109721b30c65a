pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod process;
pub mod settings;

pub use command::derive_command;
pub use convert::{convert, FileActions};
pub use error::{Error, Result};
pub use settings::{Quality, VideoFormat, VideoInputSettings};
