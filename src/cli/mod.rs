//! Command line front end: argument parsing in [`app`], one module per
//! subcommand in [`commands`]

pub mod app;
pub mod commands;

pub use app::run;
