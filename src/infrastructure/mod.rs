pub mod log_sanitizer;
pub mod logging;

pub use log_sanitizer::sanitize_address;
pub use logging::init_logging;
