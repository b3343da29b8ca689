pub mod cli;
pub mod config;
pub mod engine;
pub mod logging;
pub mod replay;
pub mod session;
pub mod sink;
pub mod variables;
