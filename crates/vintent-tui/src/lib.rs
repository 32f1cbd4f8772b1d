//! vintent-tui: Terminal UI components
//!
//! Widgets for the chat log, the analysis panel and the connection
//! indicator, built on ratatui and crossterm.

pub mod app;
pub mod input;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use theme::Theme;
