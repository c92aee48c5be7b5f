//! Prompt texts for the topic selection flow.

/// Instruction for a fresh batch of trending research topics.
pub const TRENDING_TOPICS: &str = "Give me 5 currently trending and high-impact academic research topics. Numbered list. Long sentence-style titles. Do NOT include any explanation.";

/// Builds the prompt for a batch of subtopics. Rounds past the first ask
/// the model to avoid repeating earlier batches; nothing is enforced
/// beyond asking.
pub fn subtopics(topic: &str, round: u32) -> String {
    if round <= 1 {
        format!("Suggest 5 subtopics for: '{topic}'. Numbered list only.")
    } else {
        format!("Suggest 5 new subtopics for: '{topic}', different from earlier. Numbered only.")
    }
}
