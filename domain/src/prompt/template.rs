//! Prompt templates for each step of a discussion round

use crate::discussion::point::DiscussionPoint;

/// Templates for generating prompts at each step
pub struct PromptTemplate;

impl PromptTemplate {
    /// User prompt asking an agent for its position on a point
    pub fn point_prompt(point: &str, round_num: u32) -> String {
        format!(
            r#"Round {round_num} of the discussion.

Discussion point:
{point}

State your position on this point and support it with reasoning."#
        )
    }

    /// User prompt asking the moderator to condense a round
    ///
    /// Lists every point with its agreeing and disagreeing responses.
    pub fn summarize_prompt(points: &[DiscussionPoint]) -> String {
        let mut prompt =
            String::from("Please summarize the following discussion points and responses:\n\n");

        for point in points {
            prompt.push_str(&format!("Point: {}\n", point.content()));
            for record in point.agreements() {
                prompt.push_str(&format!("{} agrees: {}\n", record.author, record.content));
            }
            for record in point.disagreements() {
                prompt.push_str(&format!("{} disagrees: {}\n", record.author, record.content));
            }
            prompt.push('\n');
        }

        prompt
    }

    /// User prompt asking the moderator for the next round's questions
    pub fn next_points_prompt(summary: &str) -> String {
        format!(
            r#"Based on this summary of the previous discussion:
{summary}

Please generate 3-5 new discussion questions that would deepen or expand the conversation.
Write each question on its own line and end it with a question mark."#
        )
    }
}
