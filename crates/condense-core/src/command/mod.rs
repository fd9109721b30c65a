pub mod builder;
pub mod platform;

pub use builder::{default_command, derive_command, final_output_path};
pub use platform::{twitter_command, whatsapp_status_command};
