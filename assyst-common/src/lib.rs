pub mod ansi;
pub mod config;
pub mod util;
