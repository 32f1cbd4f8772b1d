//! Custom widgets for the TUI

pub mod analysis_panel;
pub mod input_box;
pub mod message_list;
pub mod spinner;
pub mod status;

pub use analysis_panel::AnalysisPanel;
pub use input_box::InputBox;
pub use message_list::MessageList;
pub use status::ConnectionIndicator;
