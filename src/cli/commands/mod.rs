pub mod config;
pub mod convert;

pub use convert::OutputMode;
