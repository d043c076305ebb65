pub mod alerts;
pub mod api;
pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod feed;
pub mod logging;
pub mod market;
pub mod meetings;
pub mod watch;
