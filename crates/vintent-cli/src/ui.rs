//! TUI mode: one select loop over terminal input, timers and the two
//! network calls

use crate::commands::{CommandResult, execute_command, unknown_message};
use crossterm::event::EventStream;
use futures::{FutureExt, StreamExt, future::BoxFuture};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;
use vintent_client::AnalysisResult;
use vintent_session::{AnalysisError, ChatSession, HealthCheck, SessionEvent, Submission};
use vintent_tui::{
    App, Theme,
    input::{Action, event_to_action},
    widgets::{
        AnalysisPanel, ConnectionIndicator, InputBox, MessageList,
        message_list::calculate_message_height, spinner,
    },
};

type AnalysisFuture = BoxFuture<'static, Result<AnalysisResult, AnalysisError>>;

const INPUT_PLACEHOLDER: &str = "Nhập câu tiếng Việt để phân tích ý định...";
const SCROLL_STEP: usize = 3;

/// What the loop should do after a key press
#[derive(Debug, PartialEq)]
enum UiRequest {
    None,
    Submit,
    CheckHealth,
    Quit,
}

/// UI state around the chat session
struct TuiState {
    session: ChatSession,
    input: InputBox,
    theme: Theme,
    /// Lines scrolled back from the newest message
    scroll_back: usize,
    /// Height of the conversation viewport at the last draw
    chat_height: usize,
    chat_width: usize,
    /// Retry notice for the status line
    note: Option<String>,
    spinner_start: Instant,
}

impl TuiState {
    fn new(session: ChatSession) -> Self {
        Self {
            session,
            input: InputBox::new().with_placeholder(INPUT_PLACEHOLDER),
            theme: Theme::default(),
            scroll_back: 0,
            chat_height: 0,
            chat_width: 0,
            note: None,
            spinner_start: Instant::now(),
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);

        self.chat_height = columns[0].height.saturating_sub(2) as usize;
        self.chat_width = columns[0].width.saturating_sub(2) as usize;
        self.clamp_scroll();

        let entries = self.session.conversation().entries();
        frame.render_widget(
            MessageList::new(entries, &self.theme)
                .scroll_back(self.scroll_back)
                .spinner_frame(spinner::frame_at(self.spinner_start.elapsed())),
            columns[0],
        );
        frame.render_widget(
            AnalysisPanel::new(self.session.view(), &self.theme),
            columns[1],
        );
        frame.render_widget(
            ConnectionIndicator::new(self.session.connection(), &self.theme)
                .char_count(self.input.char_count())
                .note(self.note.as_deref()),
            rows[1],
        );
        self.input.render(rows[2], frame.buffer_mut(), &self.theme);
    }

    fn max_scroll_back(&self) -> usize {
        calculate_message_height(self.session.conversation().entries(), self.chat_width)
            .saturating_sub(self.chat_height)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_back = self.scroll_back.min(self.max_scroll_back());
    }

    fn handle_action(&mut self, action: Action) -> UiRequest {
        match action {
            a if a.is_exit() => UiRequest::Quit,
            Action::Submit => {
                let text = self.input.text();
                match execute_command(&text) {
                    Some(result) => {
                        self.input.clear();
                        self.apply_command(result)
                    }
                    None => UiRequest::Submit,
                }
            }
            Action::Clear => {
                self.clear();
                UiRequest::None
            }
            Action::PageUp => {
                self.scroll_back = self.scroll_back.saturating_add(self.chat_height.max(1));
                self.clamp_scroll();
                UiRequest::None
            }
            Action::PageDown => {
                self.scroll_back = self.scroll_back.saturating_sub(self.chat_height.max(1));
                UiRequest::None
            }
            Action::ScrollUp => {
                self.scroll_back = self.scroll_back.saturating_add(SCROLL_STEP);
                self.clamp_scroll();
                UiRequest::None
            }
            Action::ScrollDown => {
                self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP);
                UiRequest::None
            }
            other => {
                self.input.handle_action(&other);
                UiRequest::None
            }
        }
    }

    fn apply_command(&mut self, result: CommandResult) -> UiRequest {
        match result {
            CommandResult::Clear => {
                self.clear();
                UiRequest::None
            }
            CommandResult::CheckHealth => UiRequest::CheckHealth,
            CommandResult::Exit => UiRequest::Quit,
            CommandResult::Message(msg) => {
                self.session.show_system_message(&msg);
                self.scroll_back = 0;
                UiRequest::None
            }
            CommandResult::Unknown(name) => {
                self.session.show_system_message(&unknown_message(&name));
                self.scroll_back = 0;
                UiRequest::None
            }
        }
    }

    fn clear(&mut self) {
        self.session.clear();
        self.scroll_back = 0;
        self.note = None;
    }

    /// Start an analysis for the current input. Rejections leave the input intact.
    fn begin_submission(&mut self) -> Option<(Submission, AnalysisFuture)> {
        let submission = match self.session.begin_submission(&self.input.text()) {
            Ok(submission) => submission,
            Err(rejected) => {
                tracing::debug!("submission rejected: {:?}", rejected);
                self.scroll_back = 0;
                return None;
            }
        };

        self.input.clear();
        self.scroll_back = 0;
        self.spinner_start = Instant::now();

        let dispatcher = self.session.dispatcher();
        let utterance = submission.utterance().to_string();
        let future = async move { dispatcher.analyze(&utterance).await }.boxed();
        Some((submission, future))
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Retrying {
                attempt,
                max_retries,
                ..
            } => {
                self.note = Some(format!("Retrying ({}/{})", attempt, max_retries));
            }
            e if e.is_terminal() => self.note = None,
            SessionEvent::Cleared => self.note = None,
            _ => {}
        }
    }
}

/// Await the future in `slot`, or never resolve when the slot is empty
async fn run_pending<T>(slot: &mut Option<BoxFuture<'static, T>>) -> T {
    match slot.as_mut() {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}

/// Run the TUI application
pub async fn run_tui(session: ChatSession) -> anyhow::Result<()> {
    let mut events = session.subscribe();
    let health_interval = session.health_interval();
    let mut state = TuiState::new(session);

    let mut app = App::new()?;
    let mut event_stream = EventStream::new();

    // Tick interval for animations (80ms for smooth spinner)
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));
    // First tick fires immediately: the startup health check
    let mut health_tick = tokio::time::interval(health_interval);

    let mut submission: Option<Submission> = None;
    let mut analysis: Option<AnalysisFuture> = None;
    let mut health: Option<HealthCheck> = None;

    loop {
        app.draw(|frame| state.render(frame))?;

        tokio::select! {
            outcome = run_pending(&mut analysis), if analysis.is_some() => {
                analysis = None;
                if let Some(pending) = submission.take() {
                    state.session.finish(pending, outcome);
                    state.scroll_back = 0;
                }
            }

            outcome = run_pending(&mut health), if health.is_some() => {
                health = None;
                state.session.record_health(outcome);
            }

            event = events.recv() => {
                match event {
                    Ok(event) => state.handle_session_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "session events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(event)) => {
                        let Some(action) = event_to_action(event) else {
                            continue;
                        };
                        match state.handle_action(action) {
                            UiRequest::Quit => break,
                            UiRequest::Submit => {
                                if let Some((pending, future)) = state.begin_submission() {
                                    submission = Some(pending);
                                    analysis = Some(future);
                                }
                            }
                            UiRequest::CheckHealth => {
                                if let Some(check) = state.session.start_health_check() {
                                    health = Some(check);
                                }
                            }
                            UiRequest::None => {}
                        }
                    }
                    Some(Err(e)) => return Err(anyhow::anyhow!("Event error: {}", e)),
                    None => break,
                }
            }

            _ = health_tick.tick() => {
                if let Some(check) = state.session.start_health_check() {
                    health = Some(check);
                }
            }

            // Tick for animations (spinner updates)
            _ = tick_interval.tick() => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use vintent_client::{HealthStatus, NluService};
    use vintent_session::SessionConfig;

    struct Online;

    #[async_trait]
    impl NluService for Online {
        async fn health(&self) -> vintent_client::Result<HealthStatus> {
            Ok(HealthStatus {
                device: Some("GPU".into()),
            })
        }

        async fn parse(&self, _utterance: &str) -> vintent_client::Result<AnalysisResult> {
            Ok(serde_json::from_str(r#"{"intents":["greet"]}"#).unwrap())
        }
    }

    async fn connected_state() -> TuiState {
        let mut session = ChatSession::new(Arc::new(Online), SessionConfig::default());
        session.check_health().await;
        TuiState::new(session)
    }

    fn type_text(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            state.handle_action(Action::Char(c));
        }
    }

    #[tokio::test]
    async fn test_submit_runs_analysis() {
        let mut state = connected_state().await;
        type_text(&mut state, "xin chào");
        assert_eq!(state.handle_action(Action::Submit), UiRequest::Submit);

        let (submission, future) = state.begin_submission().unwrap();
        assert!(state.input.is_empty());
        assert!(state.session.is_busy());

        let outcome = future.await;
        state.session.finish(submission, outcome);
        assert!(!state.session.is_busy());
        assert!(state.session.view().is_some());
    }

    #[tokio::test]
    async fn test_submit_while_busy_keeps_input() {
        let mut state = connected_state().await;
        type_text(&mut state, "một");
        let _first = state.begin_submission().unwrap();

        type_text(&mut state, "hai");
        assert!(state.begin_submission().is_none());
        assert_eq!(state.input.text(), "hai");
    }

    #[tokio::test]
    async fn test_slash_commands() {
        let mut state = connected_state().await;

        type_text(&mut state, "/health");
        assert_eq!(state.handle_action(Action::Submit), UiRequest::CheckHealth);
        assert!(state.input.is_empty());

        type_text(&mut state, "/nope");
        assert_eq!(state.handle_action(Action::Submit), UiRequest::None);
        let last = state.session.conversation().entries().last().unwrap();
        assert!(last.content.contains("Unknown command: /nope"));

        type_text(&mut state, "/clear");
        state.handle_action(Action::Submit);
        assert!(state.session.conversation().is_empty());

        type_text(&mut state, "/quit");
        assert_eq!(state.handle_action(Action::Submit), UiRequest::Quit);
    }

    #[tokio::test]
    async fn test_health_request_waits_for_analysis() {
        let mut state = connected_state().await;
        type_text(&mut state, "đặt bàn");
        let (submission, future) = state.begin_submission().unwrap();

        type_text(&mut state, "/health");
        assert_eq!(state.handle_action(Action::Submit), UiRequest::CheckHealth);
        assert!(state.session.start_health_check().is_none());

        state.session.finish(submission, future.await);
        let check = state.session.start_health_check().unwrap();
        state.session.record_health(check.await);
        assert!(state.session.is_connected());
    }

    #[tokio::test]
    async fn test_retry_notice_lifecycle() {
        let mut state = connected_state().await;
        state.handle_session_event(SessionEvent::Retrying {
            attempt: 1,
            max_retries: 3,
            delay_ms: 1000,
            error: "HTTP 500: Internal Server Error".into(),
        });
        assert_eq!(state.note.as_deref(), Some("Retrying (1/3)"));

        state.handle_session_event(SessionEvent::AnalysisFailed {
            attempts: 4,
            message: "HTTP 500: Internal Server Error".into(),
        });
        assert_eq!(state.note, None);
    }

    #[tokio::test]
    async fn test_exit_keys_quit() {
        let mut state = connected_state().await;
        assert_eq!(state.handle_action(Action::Escape), UiRequest::Quit);
        assert_eq!(state.handle_action(Action::Interrupt), UiRequest::Quit);
    }
}
