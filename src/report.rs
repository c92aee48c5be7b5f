//! Report sections and the prompts that generate them.

/// The six blocks of the research packet, in render order. Each section
/// is generated independently from the final topic alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSection {
    Questions,
    LiteratureReview,
    FutureDirections,
    References,
    Abstract,
    Breakdown,
}

impl ReportSection {
    /// All sections in the order the report renders them.
    pub const ALL: [ReportSection; 6] = [
        ReportSection::Questions,
        ReportSection::LiteratureReview,
        ReportSection::FutureDirections,
        ReportSection::References,
        ReportSection::Abstract,
        ReportSection::Breakdown,
    ];

    /// Display title for the section header.
    pub fn title(&self) -> &'static str {
        match self {
            ReportSection::Questions => "Research Questions",
            ReportSection::LiteratureReview => "Literature Review",
            ReportSection::FutureDirections => "Future Research Directions",
            ReportSection::References => "Structured APA References",
            ReportSection::Abstract => "Academic Abstract",
            ReportSection::Breakdown => "Detailed Topic Breakdown",
        }
    }

    /// Identifier used in log events.
    pub fn slug(&self) -> &'static str {
        match self {
            ReportSection::Questions => "questions",
            ReportSection::LiteratureReview => "literature_review",
            ReportSection::FutureDirections => "future_directions",
            ReportSection::References => "references",
            ReportSection::Abstract => "abstract",
            ReportSection::Breakdown => "breakdown",
        }
    }

    /// Builds the generation prompt for this section.
    pub fn prompt(&self, topic: &str) -> String {
        match self {
            ReportSection::Questions => {
                format!("Suggest 3 research questions on the topic: '{topic}'")
            }
            ReportSection::LiteratureReview => format!(
                r#"You are an academic researcher. Write a detailed academic literature review (400–500 words) on the topic: "{topic}".

Structure:
- Mention exactly 5 relevant academic papers
- Start each paper on a new line (e.g., "Paper 1:", "Paper 2:", etc.)
- Summarize each paper in 2–3 lines: include key contribution, author(s), and year if known
- After describing all 5, summarize the overall findings, highlight contradictions, and identify research gaps
- Conclude with future research directions"#
            ),
            ReportSection::FutureDirections => {
                format!("List 5 future research directions for: '{topic}' in bullet points")
            }
            ReportSection::References => format!(
                r#"You are an academic assistant. Provide 5 APA-style references for peer-reviewed research papers related to the topic "{topic}".

Structure:
- Format each reference in APA 7 style
- Include author(s), year, title, journal, volume(issue), pages, and DOI (if available)
- List each reference on a new line with numbering (1. 2. 3.)"#
            ),
            ReportSection::Abstract => format!(
                "Write a formal academic abstract (150-200 words) for the research topic: '{topic}'"
            ),
            ReportSection::Breakdown => format!(
                r#"I want you to act as an elite research analyst with deep experience in synthesizing complex information into clear, concise insights.

Your task is to conduct a comprehensive research breakdown on the following topic:

{topic}

Here's how I want you to proceed:
1. Start with a brief, plain-English overview of the topic.
2. Break the topic into 3–5 major sub-topics or components.
3. For each sub-topic, provide:
   - A short definition or explanation
   - Key facts, trends, or recent developments
   - Any major debates or differing perspectives
4. Include notable data, statistics, or real-world examples where relevant.
5. Recommend 3–5 high-quality resources for further reading.
6. End with a "Smart Summary" — 5 bullet points that provide an executive-style briefing."#
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_render_in_fixed_order() {
        assert_eq!(ReportSection::ALL.len(), 6);
        assert_eq!(ReportSection::ALL[0], ReportSection::Questions);
        assert_eq!(ReportSection::ALL[1], ReportSection::LiteratureReview);
        assert_eq!(ReportSection::ALL[2], ReportSection::FutureDirections);
        assert_eq!(ReportSection::ALL[3], ReportSection::References);
        assert_eq!(ReportSection::ALL[4], ReportSection::Abstract);
        assert_eq!(ReportSection::ALL[5], ReportSection::Breakdown);
    }

    #[test]
    fn test_questions_prompt() {
        assert_eq!(
            ReportSection::Questions.prompt("Dark matter"),
            "Suggest 3 research questions on the topic: 'Dark matter'"
        );
    }

    #[test]
    fn test_every_prompt_embeds_the_topic() {
        for section in ReportSection::ALL {
            let prompt = section.prompt("Microplastics in soil");
            assert!(
                prompt.contains("Microplastics in soil"),
                "{} prompt is missing the topic",
                section.title()
            );
        }
    }

    #[test]
    fn test_literature_review_asks_for_five_papers() {
        let prompt = ReportSection::LiteratureReview.prompt("X");
        assert!(prompt.contains("exactly 5 relevant academic papers"));
        assert!(prompt.contains("Paper 1:"));
    }
}
