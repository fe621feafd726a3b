pub mod log_errors;
pub mod recover;

pub use log_errors::log_server_errors;
pub use recover::recover_panic;
