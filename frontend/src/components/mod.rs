pub mod alerts;
pub mod analysis;
pub mod dashboard;
pub mod history_chart;
pub mod indicators;
pub mod notices;
pub mod quote_panel;
pub mod symbol_bar;
