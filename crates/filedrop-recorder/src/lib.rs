pub mod envelope;
pub mod handler;
pub mod secrets;
