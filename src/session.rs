//! Session state for the topic selection flow.
//!
//! Holds the stage machine and its transitions, free of any I/O. The
//! caller runs the model calls and feeds the results back in.

/// Stage of the topic selection flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopicStage {
    /// Picking from trending topics or typing a custom one.
    #[default]
    Selecting,
    /// A topic is chosen; deciding between subtopics and proceeding.
    Confirm,
    /// The final topic is locked in; the report renders.
    Generate,
}

/// Outcome of a confirm-topic action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Custom text was accepted and the stage moved to `Confirm`.
    Confirmed,
    /// A trending pick was accepted; the trending pool must be replaced
    /// before the stage moves (see [`Session::finish_trending_confirm`]).
    NeedsRefresh,
    /// Nothing usable was provided; the stage is unchanged.
    Rejected,
}

/// Outcome of applying a later-round subtopic batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtopicsOutcome {
    /// The batch differed from the previous one and was installed.
    Fresh,
    /// The model returned the same list again; the old batch stays.
    Repeated,
}

/// All mutable state for one run. A fresh process is a fresh session.
#[derive(Debug, Clone)]
pub struct Session {
    pub stage: TopicStage,
    /// The topic the report will be generated for. Non-empty whenever the
    /// stage has moved past `Selecting`.
    pub final_topic: Option<String>,
    pub trending_topics: Vec<String>,
    pub subtopics: Vec<String>,
    /// 1-based counter of subtopic batches. Increments only on an explicit
    /// request for more, never on its own.
    pub subtopic_round: u32,
    /// True while the subtopic sub-flow has been entered and not yet
    /// resolved by confirming a subtopic.
    pub show_subtopic_section: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            stage: TopicStage::Selecting,
            final_topic: None,
            trending_topics: Vec::new(),
            subtopics: Vec::new(),
            subtopic_round: 1,
            show_subtopic_section: false,
        }
    }

    /// The confirmed topic, if one is set.
    pub fn topic(&self) -> Option<&str> {
        self.final_topic.as_deref()
    }

    /// Resolves a confirm action. Non-empty custom text wins over a
    /// trending pick; with neither, the action is rejected and the stage
    /// stays put. A trending pick sets the topic but defers the stage
    /// change until the replacement pool has been fetched.
    pub fn confirm_topic(
        &mut self,
        custom_text: &str,
        trending_pick: Option<&str>,
    ) -> ConfirmOutcome {
        let custom = custom_text.trim();
        if !custom.is_empty() {
            self.final_topic = Some(custom.to_string());
            self.stage = TopicStage::Confirm;
            ConfirmOutcome::Confirmed
        } else if let Some(pick) = trending_pick {
            self.final_topic = Some(pick.trim().to_string());
            ConfirmOutcome::NeedsRefresh
        } else {
            ConfirmOutcome::Rejected
        }
    }

    /// Completes a trending-pick confirm once the replacement pool has
    /// arrived. The consumed pick is gone; next time the list is fresh.
    pub fn finish_trending_confirm(&mut self, refreshed: Vec<String>) {
        self.trending_topics = refreshed;
        self.stage = TopicStage::Confirm;
    }

    /// Enters the subtopic sub-flow. Returns true when this is the first
    /// entry and a round-1 batch needs to be fetched; re-entry keeps the
    /// existing batch and round.
    pub fn open_subtopics(&mut self) -> bool {
        if self.show_subtopic_section {
            return false;
        }
        self.show_subtopic_section = true;
        self.subtopic_round = 1;
        true
    }

    /// Installs the round-1 subtopic batch.
    pub fn install_subtopics(&mut self, batch: Vec<String>) {
        self.subtopics = batch;
    }

    /// Starts another subtopic round. The counter increments before the
    /// fetch and stays incremented whatever the fetch brings back.
    pub fn begin_more_subtopics(&mut self) -> u32 {
        self.subtopic_round += 1;
        self.subtopic_round
    }

    /// Applies a later-round batch. A batch identical to the current one
    /// is not installed; the caller surfaces the repeat to the user.
    pub fn apply_more_subtopics(&mut self, batch: Vec<String>) -> SubtopicsOutcome {
        if batch == self.subtopics {
            SubtopicsOutcome::Repeated
        } else {
            self.subtopics = batch;
            SubtopicsOutcome::Fresh
        }
    }

    /// Locks in a subtopic as the final topic and leaves the sub-flow.
    pub fn confirm_subtopic(&mut self, choice: String) {
        self.final_topic = Some(choice);
        self.stage = TopicStage::Generate;
        self.show_subtopic_section = false;
    }

    /// Keeps the already-confirmed topic and moves straight to the report.
    pub fn proceed_with_topic(&mut self) {
        self.stage = TopicStage::Generate;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // confirm_topic tests

    #[test]
    fn test_confirm_custom_topic_sets_final_topic() {
        let mut session = Session::new();
        let outcome = session.confirm_topic("  Quantum error correction  ", None);
        assert_eq!(outcome, ConfirmOutcome::Confirmed);
        assert_eq!(session.topic(), Some("Quantum error correction"));
        assert_eq!(session.stage, TopicStage::Confirm);
    }

    #[test]
    fn test_confirm_custom_text_wins_over_trending_pick() {
        let mut session = Session::new();
        session.trending_topics = vec!["Trending A".to_string()];
        let outcome = session.confirm_topic("My own topic", Some("Trending A"));
        assert_eq!(outcome, ConfirmOutcome::Confirmed);
        assert_eq!(session.topic(), Some("My own topic"));
    }

    #[test]
    fn test_confirm_trending_pick_defers_stage_until_refresh() {
        let mut session = Session::new();
        session.trending_topics = vec!["Old A".to_string(), "Old B".to_string()];
        let outcome = session.confirm_topic("", Some("Old B"));
        assert_eq!(outcome, ConfirmOutcome::NeedsRefresh);
        assert_eq!(session.topic(), Some("Old B"));
        // Stage holds until the replacement pool lands
        assert_eq!(session.stage, TopicStage::Selecting);

        session.finish_trending_confirm(vec!["New A".to_string()]);
        assert_eq!(session.stage, TopicStage::Confirm);
        assert_eq!(session.trending_topics, vec!["New A"]);
    }

    #[test]
    fn test_confirm_without_input_keeps_stage() {
        let mut session = Session::new();
        let outcome = session.confirm_topic("   ", None);
        assert_eq!(outcome, ConfirmOutcome::Rejected);
        assert_eq!(session.stage, TopicStage::Selecting);
        assert!(session.final_topic.is_none());
    }

    // subtopic flow tests

    #[test]
    fn test_open_subtopics_fetches_only_once() {
        let mut session = Session::new();
        assert!(session.open_subtopics());
        assert!(session.show_subtopic_section);
        assert_eq!(session.subtopic_round, 1);
        // Re-entering must not trigger another fetch
        assert!(!session.open_subtopics());
    }

    #[test]
    fn test_more_subtopics_increments_round_exactly_once() {
        let mut session = Session::new();
        session.open_subtopics();
        session.install_subtopics(vec!["S1".to_string(), "S2".to_string()]);

        assert_eq!(session.begin_more_subtopics(), 2);
        let outcome = session.apply_more_subtopics(vec!["S3".to_string()]);
        assert_eq!(outcome, SubtopicsOutcome::Fresh);
        assert_eq!(session.subtopic_round, 2);
    }

    #[test]
    fn test_repeated_subtopics_keep_round_and_list() {
        let mut session = Session::new();
        session.open_subtopics();
        session.install_subtopics(vec!["S1".to_string(), "S2".to_string()]);

        session.begin_more_subtopics();
        let outcome = session.apply_more_subtopics(vec!["S1".to_string(), "S2".to_string()]);
        assert_eq!(outcome, SubtopicsOutcome::Repeated);
        // The counter stays incremented even though the batch was a repeat
        assert_eq!(session.subtopic_round, 2);
        assert_eq!(session.subtopics, vec!["S1", "S2"]);
    }

    #[test]
    fn test_confirm_subtopic_sets_topic_and_closes_section() {
        let mut session = Session::new();
        session.confirm_topic("Parent topic", None);
        session.open_subtopics();
        session.install_subtopics(vec!["Narrow A".to_string(), "Narrow B".to_string()]);

        session.confirm_subtopic("Narrow B".to_string());
        assert_eq!(session.topic(), Some("Narrow B"));
        assert_eq!(session.stage, TopicStage::Generate);
        assert!(!session.show_subtopic_section);
    }

    #[test]
    fn test_proceed_with_main_topic_goes_to_generate() {
        let mut session = Session::new();
        session.confirm_topic("Main topic", None);
        session.proceed_with_topic();
        assert_eq!(session.stage, TopicStage::Generate);
        assert_eq!(session.topic(), Some("Main topic"));
    }

    #[test]
    fn test_proceed_leaves_subtopic_flag_alone() {
        let mut session = Session::new();
        session.confirm_topic("Main topic", None);
        session.open_subtopics();
        session.proceed_with_topic();
        // Only confirming a subtopic clears the flag
        assert!(session.show_subtopic_section);
    }

    #[test]
    fn test_new_session_defaults() {
        let session = Session::new();
        assert_eq!(session.stage, TopicStage::Selecting);
        assert!(session.final_topic.is_none());
        assert!(session.trending_topics.is_empty());
        assert!(session.subtopics.is_empty());
        assert_eq!(session.subtopic_round, 1);
        assert!(!session.show_subtopic_section);
    }
}
