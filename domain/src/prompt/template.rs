//! Prompt templates for the synthesis call

use crate::prompt::parsing::parse_model_tag;
use crate::synthesis::mode::{MergeStrategy, SynthesisMode};
use crate::synthesis::response::ModelResponse;

/// System and user prompt for one merge call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisPrompt {
    pub system: String,
    pub user: String,
}

/// Builds mode-specific synthesis prompts
///
/// The system prompt states the merge rules of the mode and always ends by
/// demanding an answer in the configured language. The user prompt quotes
/// the question and lists every response under an identity tag
/// `=== {model_name} ({model_id}) ===` in the given order. Content lines of
/// the same shape are indented by one space so only real tags parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    language: String,
}

impl PromptTemplate {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Both prompts for `strategy` over `responses`.
    pub fn build(
        &self,
        strategy: MergeStrategy,
        question: &str,
        responses: &[ModelResponse],
    ) -> SynthesisPrompt {
        SynthesisPrompt {
            system: self.system_prompt(strategy.mode()),
            user: Self::user_prompt(strategy, question, responses),
        }
    }

    /// Merge rules for `mode`.
    pub fn system_prompt(&self, mode: SynthesisMode) -> String {
        let rules = match mode {
            SynthesisMode::Union => {
                r#"In union mode, follow these rules:
1. Include the information from every response, but remove duplicated content
2. If the responses take different perspectives or approaches, include all of them
3. Check the information for accuracy and point out any conflicting statements
4. Organize the result systematically so it is easy to read"#
            }
            SynthesisMode::Intersection => {
                r#"In intersection mode, follow these rules:
1. Include only content that at least the specified number of models mention in common
2. If there is not enough common content, say so explicitly
3. Focus on highly reliable core information
4. Keep the result concise and accurate"#
            }
            SynthesisMode::Selective => {
                r#"In selective mode, follow these rules:
1. Select only the most valuable and accurate information
2. Prefer content that answers the question most directly
3. Leave out uncertain or low-importance information
4. Provide a practical and useful answer"#
            }
        };

        format!(
            "You are an expert at merging the responses of several AI models.\n\n{}\n\nAlways answer in {}.",
            rules, self.language
        )
    }

    /// Question, tagged responses and the closing instruction.
    pub fn user_prompt(
        strategy: MergeStrategy,
        question: &str,
        responses: &[ModelResponse],
    ) -> String {
        let mut prompt = format!("Original question: \"{}\"\n\n", question);
        prompt.push_str(&format!(
            "The following are the responses from {} AI models:\n\n",
            responses.len()
        ));

        for response in responses {
            prompt.push_str(&format!(
                "=== {} ({}) ===\n{}\n\n",
                response.model_name,
                response.model_id,
                escape_tag_lines(&response.content)
            ));
        }

        match strategy {
            MergeStrategy::Union => prompt.push_str(
                "Merge the responses above as a union. Include every useful piece of \
                 information, remove duplicates, and organize the result systematically.",
            ),
            MergeStrategy::Intersection { threshold } => prompt.push_str(&format!(
                "From the responses above, extract and merge only the content that at least \
                 {} models mention in common.",
                threshold
            )),
            MergeStrategy::Selective => prompt.push_str(
                "From the responses above, select only the most accurate and valuable \
                 information and build the best possible answer. Answer the question as \
                 directly and practically as possible.",
            ),
        }

        prompt
    }
}

/// Indent content lines that would read as identity tags.
fn escape_tag_lines(content: &str) -> String {
    if !content.lines().any(|line| parse_model_tag(line).is_some()) {
        return content.to_string();
    }
    content
        .lines()
        .map(|line| {
            if parse_model_tag(line).is_some() {
                format!(" {}", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responses() -> Vec<ModelResponse> {
        vec![
            ModelResponse::completed("openai/gpt-4o", "GPT-4O", "Rust is memory safe."),
            ModelResponse::completed(
                "anthropic/claude-3-haiku",
                "Claude 3 Haiku",
                "Rust has no garbage collector.",
            ),
        ]
    }

    #[test]
    fn test_system_prompt_ends_with_language() {
        let template = PromptTemplate::new("Korean");
        for mode in SynthesisMode::ALL {
            let system = template.system_prompt(mode);
            assert!(system.ends_with("Always answer in Korean."));
            assert!(system.contains(&format!("In {} mode", mode)));
        }
    }

    #[test]
    fn test_user_prompt_lists_responses_in_order() {
        let prompt =
            PromptTemplate::user_prompt(MergeStrategy::Union, "What is Rust?", &responses());
        assert!(prompt.starts_with("Original question: \"What is Rust?\""));
        assert!(prompt.contains("responses from 2 AI models"));
        let first = prompt.find("=== GPT-4O (openai/gpt-4o) ===").unwrap();
        let second = prompt
            .find("=== Claude 3 Haiku (anthropic/claude-3-haiku) ===")
            .unwrap();
        assert!(first < second);
        assert!(prompt.ends_with("organize the result systematically."));
    }

    #[test]
    fn test_tag_shaped_content_is_indented() {
        let responses = vec![ModelResponse::completed(
            "a",
            "GPT",
            "=== Summary (short) ===\nRust is safe.",
        )];
        let prompt = PromptTemplate::user_prompt(MergeStrategy::Union, "q", &responses);
        assert!(
            prompt.contains("=== GPT (a) ===\n === Summary (short) ===\nRust is safe.\n\n")
        );
    }

    #[test]
    fn test_intersection_prompt_embeds_threshold() {
        let prompt = PromptTemplate::user_prompt(
            MergeStrategy::Intersection { threshold: 2 },
            "q",
            &responses()[..1],
        );
        assert!(prompt.contains("responses from 1 AI models"));
        assert!(prompt.contains("at least 2 models mention in common"));
    }

    #[test]
    fn test_build_pairs_system_and_user() {
        let template = PromptTemplate::new("English");
        let prompt = template.build(MergeStrategy::Selective, "q", &responses());
        assert!(prompt.system.contains("selective mode"));
        assert!(prompt.user.contains("most accurate and valuable"));
    }
}
