pub mod exhibits;
pub mod init;
pub mod progress;
pub mod reset;
pub mod take;
pub mod validate;
