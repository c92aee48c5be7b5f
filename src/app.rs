//! Application state and core logic.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tracing::{info, warn};

use crate::config::Config;
use crate::gemini::TextGenerator;
use crate::parse::parse_numbered_list;
use crate::prompts;
use crate::report::ReportSection;
use crate::session::{ConfirmOutcome, Session, SubtopicsOutcome};

/// Fields that can be focused on the topic selection page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectingFocus {
    /// Trending topics list (default).
    #[default]
    TrendingList,
    /// Free-text topic input.
    CustomInput,
    /// The Confirm Topic button.
    ConfirmButton,
}

impl SelectingFocus {
    pub fn next(self) -> Self {
        match self {
            Self::TrendingList => Self::CustomInput,
            Self::CustomInput => Self::ConfirmButton,
            Self::ConfirmButton => Self::TrendingList,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::TrendingList => Self::ConfirmButton,
            Self::CustomInput => Self::TrendingList,
            Self::ConfirmButton => Self::CustomInput,
        }
    }
}

/// Panels that can be focused on the confirmation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmFocus {
    /// The three-way choice list (default).
    #[default]
    ChoiceList,
    /// The subtopic list, once the panel is open.
    SubtopicList,
}

impl ConfirmFocus {
    /// Toggle between the choice list and the subtopic list.
    pub fn toggle(self) -> Self {
        match self {
            Self::ChoiceList => Self::SubtopicList,
            Self::SubtopicList => Self::ChoiceList,
        }
    }
}

/// The three ways forward once a main topic is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtopicChoice {
    ChooseOne,
    GenerateSubtopics,
    ProceedWithMainTopic,
}

impl SubtopicChoice {
    /// All choices in display order.
    pub const ALL: [SubtopicChoice; 3] = [
        SubtopicChoice::ChooseOne,
        SubtopicChoice::GenerateSubtopics,
        SubtopicChoice::ProceedWithMainTopic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SubtopicChoice::ChooseOne => "Choose One",
            SubtopicChoice::GenerateSubtopics => "Generate Subtopics",
            SubtopicChoice::ProceedWithMainTopic => "Proceed with Main Topic",
        }
    }
}

/// Main application state.
pub struct App {
    /// Topic selection state machine.
    pub session: Session,
    /// Focused field on the selection page.
    pub selecting_focus: SelectingFocus,
    /// Focused panel on the confirmation page.
    pub confirm_focus: ConfirmFocus,
    /// Cursor row in the trending topics list.
    pub trending_cursor: usize,
    /// Marked trending topic. Confirming requires an explicit mark;
    /// the cursor alone is not a selection.
    pub trending_selected: Option<usize>,
    /// Free-text topic input.
    pub custom_topic: String,
    /// Cursor position within custom_topic, counted in chars.
    pub custom_cursor: usize,
    /// Cursor row in the choice list on the confirmation page.
    pub choice_cursor: usize,
    /// The last choice applied with Enter; drives the subtopic panel.
    pub applied_choice: Option<SubtopicChoice>,
    /// Cursor row in the subtopic list. Here the cursor is the selection.
    pub subtopic_cursor: usize,
    /// Rendered report lines.
    pub output_lines: Vec<String>,
    pub scroll_offset: u16,
    pub is_auto_following: bool,
    pub main_pane_height: u16,
    pub main_pane_width: u16,
    /// Set once report generation has begun, so it only runs once.
    pub report_started: bool,
    /// Transient warning shown in the notice line.
    pub warning: Option<String>,
    /// Error shown in the notice line; takes precedence over warnings.
    pub error_banner: Option<String>,
    /// Label shown in the status area while a Gemini call is in flight.
    pub busy: Option<String>,
    /// Whether the help overlay is visible.
    pub show_help: bool,
    /// Session ID for this invocation (always populated).
    pub session_id: String,
    /// Directory where logs are written.
    pub log_directory: Option<PathBuf>,
    /// Loaded configuration.
    pub config: Config,
}

impl App {
    pub fn new(session_id: String, log_directory: Option<PathBuf>, config: Config) -> Self {
        Self {
            session: Session::new(),
            selecting_focus: SelectingFocus::default(),
            confirm_focus: ConfirmFocus::default(),
            trending_cursor: 0,
            trending_selected: None,
            custom_topic: String::new(),
            custom_cursor: 0,
            choice_cursor: 0,
            applied_choice: None,
            subtopic_cursor: 0,
            output_lines: Vec::new(),
            scroll_offset: 0,
            is_auto_following: true,
            main_pane_height: 0,
            main_pane_width: 0,
            report_started: false,
            warning: None,
            error_banner: None,
            busy: None,
            show_help: false,
            session_id,
            log_directory,
            config,
        }
    }

    /// Clear transient notices before the next user action takes effect.
    pub fn clear_notices(&mut self) {
        self.warning = None;
        self.error_banner = None;
    }

    /// Fetch the opening trending topic pool. Called once before the first
    /// frame; a failure here is fatal to the session.
    pub async fn bootstrap_trending(&mut self, generator: &impl TextGenerator) -> Result<()> {
        let topics = fetch_trending(generator)
            .await
            .context("failed to fetch the initial trending topics")?;
        info!(count = topics.len(), "trending_fetched");
        self.session.trending_topics = topics;
        Ok(())
    }

    /// Apply the Confirm Topic button. Returns the outcome so the caller
    /// knows whether a trending refresh is still owed before the stage
    /// can advance.
    pub fn start_confirm_topic(&mut self) -> ConfirmOutcome {
        self.clear_notices();
        let pick = self
            .trending_selected
            .and_then(|i| self.session.trending_topics.get(i))
            .cloned();
        let outcome = self
            .session
            .confirm_topic(&self.custom_topic, pick.as_deref());
        match outcome {
            ConfirmOutcome::Confirmed => {
                info!(
                    topic = self.session.topic().unwrap_or(""),
                    source = "custom",
                    "topic_confirmed"
                );
            }
            ConfirmOutcome::NeedsRefresh => {
                info!(
                    topic = self.session.topic().unwrap_or(""),
                    source = "trending",
                    "topic_confirmed"
                );
            }
            ConfirmOutcome::Rejected => {
                warn!("confirm_without_selection");
                self.warning =
                    Some("Please select a trending topic or enter your own.".to_string());
            }
        }
        outcome
    }

    /// Second half of a trending confirmation: refresh the pool so the
    /// list is current if the user ever comes back, then advance the
    /// stage. On failure the selection page stays active and the
    /// confirmation can be retried.
    pub async fn finish_confirm_refresh(&mut self, generator: &impl TextGenerator) {
        match fetch_trending(generator).await {
            Ok(refreshed) => {
                info!(count = refreshed.len(), "trending_refreshed");
                self.session.finish_trending_confirm(refreshed);
                self.trending_cursor = 0;
                self.trending_selected = None;
            }
            Err(e) => {
                warn!(error = %e, "trending_refresh_failed");
                self.error_banner = Some(format!("Could not refresh trending topics: {:#}", e));
            }
        }
    }

    /// Apply the highlighted choice on the confirmation page. Returns true
    /// when a first subtopic batch still needs to be fetched.
    pub fn apply_choice_at_cursor(&mut self) -> bool {
        self.clear_notices();
        let choice = self.choice_under_cursor();
        self.applied_choice = Some(choice);
        match choice {
            SubtopicChoice::ChooseOne => false,
            SubtopicChoice::GenerateSubtopics => {
                let needs_fetch = self.session.open_subtopics();
                if needs_fetch {
                    info!("subtopic_section_opened");
                    self.subtopic_cursor = 0;
                }
                needs_fetch
            }
            SubtopicChoice::ProceedWithMainTopic => {
                self.session.proceed_with_topic();
                info!(
                    topic = self.session.topic().unwrap_or(""),
                    "proceed_with_main_topic"
                );
                false
            }
        }
    }

    /// Fetch the first subtopic batch for the confirmed topic. On failure
    /// the panel is closed again so Generate Subtopics can be re-applied
    /// as a retry.
    pub async fn fetch_first_subtopics(&mut self, generator: &impl TextGenerator) {
        let Some(topic) = self.session.topic().map(String::from) else {
            return;
        };
        let prompt = prompts::subtopics(&topic, self.session.subtopic_round);
        match generator.generate(&prompt).await {
            Ok(text) => {
                let batch = parse_numbered_list(&text);
                info!(
                    round = self.session.subtopic_round,
                    count = batch.len(),
                    "subtopics_fetched"
                );
                self.session.install_subtopics(batch);
                self.subtopic_cursor = 0;
            }
            Err(e) => {
                warn!(error = %e, "subtopics_fetch_failed");
                self.session.show_subtopic_section = false;
                self.error_banner = Some(format!("Could not generate subtopics: {:#}", e));
            }
        }
    }

    /// Fetch another batch after the More Subtopics action. The round
    /// counter advances whether or not the batch turns out fresh.
    pub async fn fetch_more_subtopics(&mut self, generator: &impl TextGenerator) {
        let Some(topic) = self.session.topic().map(String::from) else {
            return;
        };
        self.clear_notices();
        let round = self.session.begin_more_subtopics();
        let prompt = prompts::subtopics(&topic, round);
        match generator.generate(&prompt).await {
            Ok(text) => {
                let batch = parse_numbered_list(&text);
                match self.session.apply_more_subtopics(batch) {
                    SubtopicsOutcome::Fresh => {
                        info!(
                            round,
                            count = self.session.subtopics.len(),
                            "subtopics_fetched"
                        );
                        self.subtopic_cursor = 0;
                    }
                    SubtopicsOutcome::Repeated => {
                        warn!(round, "subtopics_repeated");
                        self.warning = Some("Same subtopics again. Trying again...".to_string());
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "subtopics_fetch_failed");
                self.error_banner = Some(format!("Could not generate subtopics: {:#}", e));
            }
        }
    }

    /// Confirm the subtopic under the cursor as the final research topic.
    pub fn confirm_selected_subtopic(&mut self) {
        let Some(choice) = self.session.subtopics.get(self.subtopic_cursor).cloned() else {
            return;
        };
        self.clear_notices();
        self.session.confirm_subtopic(choice);
        info!(
            topic = self.session.topic().unwrap_or(""),
            "subtopic_confirmed"
        );
    }

    /// Mark the report as started so it only renders once.
    pub fn begin_report(&mut self) {
        self.report_started = true;
        info!(
            topic = self.session.topic().unwrap_or(""),
            "report_started"
        );
    }

    /// Generate one report section and append it to the output. Returns
    /// false when the call failed and the remaining sections should be
    /// skipped.
    pub async fn generate_section(
        &mut self,
        generator: &impl TextGenerator,
        section: ReportSection,
    ) -> bool {
        let Some(topic) = self.session.topic().map(String::from) else {
            return false;
        };
        let prompt = section.prompt(&topic);
        match generator.generate(&prompt).await {
            Ok(text) => {
                self.add_line(format!("━━━ {} ━━━", section.title()));
                self.add_line(String::new());
                for line in text.lines() {
                    self.add_line(line.to_string());
                }
                self.add_line(String::new());
                info!(
                    section = section.slug(),
                    response_len = text.len(),
                    "report_section_generated"
                );
                true
            }
            Err(e) => {
                warn!(section = section.slug(), error = %e, "report_section_failed");
                self.error_banner = Some(format!("{} failed: {:#}", section.title(), e));
                false
            }
        }
    }

    pub fn trending_prev(&mut self) {
        if self.trending_cursor > 0 {
            self.trending_cursor -= 1;
        }
    }

    pub fn trending_next(&mut self) {
        let len = self.session.trending_topics.len();
        if len > 0 && self.trending_cursor < len - 1 {
            self.trending_cursor += 1;
        }
    }

    /// Mark the trending topic under the cursor as the selection.
    pub fn mark_trending(&mut self) {
        if !self.session.trending_topics.is_empty() {
            self.trending_selected = Some(self.trending_cursor);
        }
    }

    pub fn choice_prev(&mut self) {
        if self.choice_cursor > 0 {
            self.choice_cursor -= 1;
        }
    }

    pub fn choice_next(&mut self) {
        if self.choice_cursor < SubtopicChoice::ALL.len() - 1 {
            self.choice_cursor += 1;
        }
    }

    pub fn choice_under_cursor(&self) -> SubtopicChoice {
        SubtopicChoice::ALL[self.choice_cursor.min(SubtopicChoice::ALL.len() - 1)]
    }

    pub fn subtopic_prev(&mut self) {
        if self.subtopic_cursor > 0 {
            self.subtopic_cursor -= 1;
        }
    }

    pub fn subtopic_next(&mut self) {
        let len = self.session.subtopics.len();
        if len > 0 && self.subtopic_cursor < len - 1 {
            self.subtopic_cursor += 1;
        }
    }

    /// Byte offset of the cursor within the custom topic field.
    fn custom_byte_offset(&self) -> usize {
        self.custom_topic
            .char_indices()
            .nth(self.custom_cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.custom_topic.len())
    }

    /// Insert a character at the current cursor position.
    pub fn insert_char(&mut self, c: char) {
        let at = self.custom_byte_offset();
        self.custom_topic.insert(at, c);
        self.custom_cursor += 1;
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char_before(&mut self) {
        if self.custom_cursor == 0 {
            return;
        }
        self.custom_cursor -= 1;
        let at = self.custom_byte_offset();
        self.custom_topic.remove(at);
    }

    /// Delete the character at the cursor position (delete key).
    pub fn delete_char_at(&mut self) {
        if self.custom_cursor < self.custom_topic.chars().count() {
            let at = self.custom_byte_offset();
            self.custom_topic.remove(at);
        }
    }

    /// Move cursor left within the input field.
    pub fn cursor_left(&mut self) {
        if self.custom_cursor > 0 {
            self.custom_cursor -= 1;
        }
    }

    /// Move cursor right within the input field.
    pub fn cursor_right(&mut self) {
        if self.custom_cursor < self.custom_topic.chars().count() {
            self.custom_cursor += 1;
        }
    }

    /// Move to beginning of the input field.
    pub fn cursor_home(&mut self) {
        self.custom_cursor = 0;
    }

    /// Move to end of the input field.
    pub fn cursor_end(&mut self) {
        self.custom_cursor = self.custom_topic.chars().count();
    }

    pub fn visual_line_count(&self) -> u16 {
        if self.main_pane_width == 0 {
            return 0;
        }
        let content: Vec<Line> = self.output_lines.iter().map(Line::raw).collect();
        let paragraph = Paragraph::new(content)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        paragraph.line_count(self.main_pane_width) as u16
    }

    pub fn max_scroll(&self) -> u16 {
        self.visual_line_count()
            .saturating_sub(self.main_pane_height)
    }

    pub fn scroll_up(&mut self, amount: u16) {
        if self.scroll_offset > 0 {
            self.scroll_offset = self.scroll_offset.saturating_sub(amount);
            self.is_auto_following = false;
        }
    }

    pub fn scroll_down(&mut self, amount: u16) {
        let max = self.max_scroll();
        self.scroll_offset = (self.scroll_offset + amount).min(max);
        if self.scroll_offset >= max {
            self.is_auto_following = true;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll();
        self.is_auto_following = true;
    }

    pub fn add_line(&mut self, line: String) {
        self.output_lines.push(line);
        if self.is_auto_following {
            self.scroll_to_bottom();
        }
    }
}

/// Fetch and parse one trending topic batch.
async fn fetch_trending(generator: &impl TextGenerator) -> Result<Vec<String>> {
    let text = generator.generate(prompts::TRENDING_TOPICS).await?;
    Ok(parse_numbered_list(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TopicStage;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses in order and records every prompt it saw.
    struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn recorded_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("script exhausted")))
        }
    }

    fn test_app() -> App {
        App::new("abc123".to_string(), None, Config::default())
    }

    fn numbered(items: &[&str]) -> String {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // bootstrap tests

    #[tokio::test]
    async fn test_bootstrap_fills_trending_pool() {
        let mut app = test_app();
        let generator = ScriptedGenerator::new(vec![Ok(numbered(&["AI safety", "Gene editing"]))]);

        app.bootstrap_trending(&generator).await.unwrap();

        assert_eq!(
            app.session.trending_topics,
            vec!["AI safety".to_string(), "Gene editing".to_string()]
        );
        assert_eq!(app.session.stage, TopicStage::Selecting);
    }

    #[tokio::test]
    async fn test_bootstrap_failure_is_fatal() {
        let mut app = test_app();
        let generator = ScriptedGenerator::new(vec![Err(anyhow!("network down"))]);

        let result = app.bootstrap_trending(&generator).await;

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("failed to fetch the initial trending topics"));
        assert!(message.contains("network down"));
    }

    // confirm tests

    #[test]
    fn test_confirm_custom_topic_advances_immediately() {
        let mut app = test_app();
        app.custom_topic = "  Quantum batteries  ".to_string();

        let outcome = app.start_confirm_topic();

        assert_eq!(outcome, ConfirmOutcome::Confirmed);
        assert_eq!(app.session.stage, TopicStage::Confirm);
        assert_eq!(app.session.topic(), Some("Quantum batteries"));
    }

    #[tokio::test]
    async fn test_confirm_trending_defers_stage_until_refresh() {
        let mut app = test_app();
        app.session.trending_topics = vec!["Topic A".to_string(), "Topic B".to_string()];
        app.trending_cursor = 1;
        app.mark_trending();

        let outcome = app.start_confirm_topic();
        assert_eq!(outcome, ConfirmOutcome::NeedsRefresh);
        assert_eq!(app.session.stage, TopicStage::Selecting);
        assert_eq!(app.session.topic(), Some("Topic B"));

        let generator = ScriptedGenerator::new(vec![Ok(numbered(&["Fresh A", "Fresh B"]))]);
        app.finish_confirm_refresh(&generator).await;

        assert_eq!(app.session.stage, TopicStage::Confirm);
        assert_eq!(
            app.session.trending_topics,
            vec!["Fresh A".to_string(), "Fresh B".to_string()]
        );
        assert_eq!(app.trending_selected, None);
        assert_eq!(
            generator.recorded_prompts(),
            vec![prompts::TRENDING_TOPICS.to_string()]
        );
    }

    #[test]
    fn test_confirm_with_nothing_selected_warns() {
        let mut app = test_app();
        app.custom_topic = "   ".to_string();

        let outcome = app.start_confirm_topic();

        assert_eq!(outcome, ConfirmOutcome::Rejected);
        assert_eq!(app.session.stage, TopicStage::Selecting);
        assert_eq!(
            app.warning.as_deref(),
            Some("Please select a trending topic or enter your own.")
        );
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_selection_page() {
        let mut app = test_app();
        app.session.trending_topics = vec!["Topic A".to_string()];
        app.trending_cursor = 0;
        app.mark_trending();
        app.start_confirm_topic();

        let generator = ScriptedGenerator::new(vec![Err(anyhow!("timeout"))]);
        app.finish_confirm_refresh(&generator).await;

        assert_eq!(app.session.stage, TopicStage::Selecting);
        assert_eq!(app.session.trending_topics, vec!["Topic A".to_string()]);
        assert!(app.error_banner.as_deref().unwrap().contains("timeout"));
    }

    // subtopic tests

    fn app_with_confirmed_topic(topic: &str) -> App {
        let mut app = test_app();
        app.custom_topic = topic.to_string();
        app.start_confirm_topic();
        app
    }

    #[tokio::test]
    async fn test_first_subtopic_fetch_uses_round_one_prompt() {
        let mut app = app_with_confirmed_topic("AI in medicine");
        app.choice_cursor = 1; // Generate Subtopics

        assert!(app.apply_choice_at_cursor());

        let generator = ScriptedGenerator::new(vec![Ok(numbered(&["Sub A", "Sub B"]))]);
        app.fetch_first_subtopics(&generator).await;

        assert_eq!(
            generator.recorded_prompts(),
            vec![prompts::subtopics("AI in medicine", 1)]
        );
        assert_eq!(
            app.session.subtopics,
            vec!["Sub A".to_string(), "Sub B".to_string()]
        );
        assert_eq!(app.session.subtopic_round, 1);
    }

    #[test]
    fn test_reapplying_generate_subtopics_does_not_refetch() {
        let mut app = app_with_confirmed_topic("AI in medicine");
        app.choice_cursor = 1;

        assert!(app.apply_choice_at_cursor());
        assert!(!app.apply_choice_at_cursor());
    }

    #[tokio::test]
    async fn test_more_subtopics_repeat_warns_and_keeps_list() {
        let mut app = app_with_confirmed_topic("AI in medicine");
        app.choice_cursor = 1;
        app.apply_choice_at_cursor();
        app.session
            .install_subtopics(vec!["Sub A".to_string(), "Sub B".to_string()]);

        let generator = ScriptedGenerator::new(vec![Ok(numbered(&["Sub A", "Sub B"]))]);
        app.fetch_more_subtopics(&generator).await;

        assert_eq!(app.session.subtopic_round, 2);
        assert_eq!(
            app.session.subtopics,
            vec!["Sub A".to_string(), "Sub B".to_string()]
        );
        assert_eq!(
            app.warning.as_deref(),
            Some("Same subtopics again. Trying again...")
        );
        assert_eq!(
            generator.recorded_prompts(),
            vec![prompts::subtopics("AI in medicine", 2)]
        );
    }

    #[tokio::test]
    async fn test_more_subtopics_failure_keeps_round_increment() {
        let mut app = app_with_confirmed_topic("AI in medicine");
        app.choice_cursor = 1;
        app.apply_choice_at_cursor();
        app.session.install_subtopics(vec!["Sub A".to_string()]);

        let generator = ScriptedGenerator::new(vec![Err(anyhow!("rate limited"))]);
        app.fetch_more_subtopics(&generator).await;

        assert_eq!(app.session.subtopic_round, 2);
        assert_eq!(app.session.subtopics, vec!["Sub A".to_string()]);
        assert!(app.error_banner.is_some());
    }

    #[tokio::test]
    async fn test_first_fetch_failure_reopens_section() {
        let mut app = app_with_confirmed_topic("AI in medicine");
        app.choice_cursor = 1;
        app.apply_choice_at_cursor();

        let generator = ScriptedGenerator::new(vec![Err(anyhow!("boom"))]);
        app.fetch_first_subtopics(&generator).await;

        assert!(!app.session.show_subtopic_section);
        assert!(app.error_banner.is_some());
        // Re-applying the choice retries from round one
        assert!(app.apply_choice_at_cursor());
        assert_eq!(app.session.subtopic_round, 1);
    }

    #[test]
    fn test_confirm_subtopic_sets_final_topic() {
        let mut app = app_with_confirmed_topic("AI in medicine");
        app.choice_cursor = 1;
        app.apply_choice_at_cursor();
        app.session
            .install_subtopics(vec!["Sub A".to_string(), "Sub B".to_string()]);
        app.subtopic_cursor = 1;

        app.confirm_selected_subtopic();

        assert_eq!(app.session.topic(), Some("Sub B"));
        assert_eq!(app.session.stage, TopicStage::Generate);
        assert!(!app.session.show_subtopic_section);
    }

    #[test]
    fn test_confirm_subtopic_with_empty_list_is_noop() {
        let mut app = app_with_confirmed_topic("AI in medicine");
        app.choice_cursor = 1;
        app.apply_choice_at_cursor();

        app.confirm_selected_subtopic();

        assert_eq!(app.session.topic(), Some("AI in medicine"));
        assert_eq!(app.session.stage, TopicStage::Confirm);
    }

    #[test]
    fn test_proceed_with_main_topic() {
        let mut app = app_with_confirmed_topic("AI in medicine");
        app.choice_cursor = 2; // Proceed with Main Topic

        assert!(!app.apply_choice_at_cursor());
        assert_eq!(app.session.stage, TopicStage::Generate);
        assert_eq!(app.session.topic(), Some("AI in medicine"));
    }

    // report tests

    #[tokio::test]
    async fn test_generate_section_appends_header_and_body() {
        let mut app = app_with_confirmed_topic("AI in medicine");
        app.session.proceed_with_topic();

        let generator =
            ScriptedGenerator::new(vec![Ok("First question?\nSecond question?".to_string())]);
        let ok = app
            .generate_section(&generator, ReportSection::Questions)
            .await;

        assert!(ok);
        assert_eq!(app.output_lines[0], "━━━ Research Questions ━━━");
        assert_eq!(app.output_lines[1], "");
        assert_eq!(app.output_lines[2], "First question?");
        assert_eq!(app.output_lines[3], "Second question?");
        assert_eq!(app.output_lines[4], "");
    }

    #[tokio::test]
    async fn test_generate_section_failure_sets_banner_and_stops() {
        let mut app = app_with_confirmed_topic("AI in medicine");
        app.session.proceed_with_topic();

        let generator = ScriptedGenerator::new(vec![Err(anyhow!("quota exceeded"))]);
        let ok = app
            .generate_section(&generator, ReportSection::Abstract)
            .await;

        assert!(!ok);
        let banner = app.error_banner.unwrap();
        assert!(banner.contains("Academic Abstract"));
        assert!(banner.contains("quota exceeded"));
        assert!(app.output_lines.is_empty());
    }

    // editing tests

    #[test]
    fn test_insert_and_delete_round_trip() {
        let mut app = test_app();
        for c in "topic".chars() {
            app.insert_char(c);
        }
        assert_eq!(app.custom_topic, "topic");
        assert_eq!(app.custom_cursor, 5);

        app.cursor_home();
        app.delete_char_at();
        assert_eq!(app.custom_topic, "opic");

        app.cursor_end();
        app.delete_char_before();
        assert_eq!(app.custom_topic, "opi");
        assert_eq!(app.custom_cursor, 3);
    }

    #[test]
    fn test_editing_is_char_safe_for_multibyte_input() {
        let mut app = test_app();
        for c in "café".chars() {
            app.insert_char(c);
        }
        app.cursor_left();
        app.insert_char('f');
        assert_eq!(app.custom_topic, "caffé");

        app.cursor_end();
        app.delete_char_before();
        assert_eq!(app.custom_topic, "caff");
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut app = test_app();
        app.cursor_left();
        app.delete_char_before();
        app.delete_char_at();
        assert_eq!(app.custom_cursor, 0);

        app.insert_char('x');
        app.cursor_right();
        app.cursor_right();
        assert_eq!(app.custom_cursor, 1);
    }

    // focus tests

    #[test]
    fn test_selecting_focus_next_prev_inverse() {
        let all = [
            SelectingFocus::TrendingList,
            SelectingFocus::CustomInput,
            SelectingFocus::ConfirmButton,
        ];
        for focus in all {
            assert_eq!(focus.next().prev(), focus);
            assert_eq!(focus.prev().next(), focus);
        }
    }

    #[test]
    fn test_confirm_focus_toggle() {
        assert_eq!(
            ConfirmFocus::ChoiceList.toggle(),
            ConfirmFocus::SubtopicList
        );
        assert_eq!(
            ConfirmFocus::SubtopicList.toggle(),
            ConfirmFocus::ChoiceList
        );
    }

    #[test]
    fn test_choice_cursor_bounds() {
        let mut app = test_app();
        app.choice_prev();
        assert_eq!(app.choice_cursor, 0);
        app.choice_next();
        app.choice_next();
        app.choice_next();
        assert_eq!(app.choice_cursor, 2);
        assert_eq!(
            app.choice_under_cursor(),
            SubtopicChoice::ProceedWithMainTopic
        );
    }
}
