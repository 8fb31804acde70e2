pub mod error;
pub mod spam;
