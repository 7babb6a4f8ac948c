//! Console output formatter for round results

use chatsynth_domain::{OutputFormat, RoundResult, ScoredResponse, SynthesisOutcome};
use colored::Colorize;

/// Formats round results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render `result` in the requested format
    pub fn render(result: &RoundResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(result),
            OutputFormat::Synthesis => Self::format_synthesis_only(result),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    /// Render what is still missing after the merged answer was printed live.
    ///
    /// A merged answer that already streamed needs nothing more; any other
    /// outcome is rendered in full.
    pub fn render_after_stream(
        result: &RoundResult,
        format: OutputFormat,
        streamed: bool,
    ) -> Option<String> {
        if streamed && format == OutputFormat::Synthesis && result.outcome.is_merged() {
            return None;
        }
        Some(Self::render(result, format))
    }

    /// Format the complete round result
    pub fn format(result: &RoundResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Synthesis Round Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            result.question
        ));
        output.push_str(&format!("{} {}\n", "Group:".cyan().bold(), result.group));

        output.push_str(&Self::section_header("Model Responses"));
        for scored in &result.responses {
            output.push_str(&Self::response_block(scored));
        }
        if let Some(line) = Self::failure_summary(result) {
            output.push_str(&line);
        }

        output.push_str(&Self::section_header("Synthesis"));
        output.push_str(&Self::outcome_block(&result.outcome));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &RoundResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the merged answer only (concise output)
    pub fn format_synthesis_only(result: &RoundResult) -> String {
        let mut output = String::new();

        if let SynthesisOutcome::Fallback { reason, .. } = &result.outcome {
            output.push_str(&format!(
                "{}\n\n",
                format!("[basic merge: {}]", reason).yellow()
            ));
        }

        output.push_str(result.outcome.text());
        output.push('\n');
        output
    }

    fn response_block(scored: &ScoredResponse) -> String {
        let response = &scored.response;
        let title = format!("── {} ({}) ──", response.model_name, response.model_id);

        let status = match (&response.error, response.is_completed) {
            (Some(error), _) if response.content.is_empty() => {
                format!("failed: {}", error).red().to_string()
            }
            (Some(error), _) => format!(
                "failed: {} ({} chars received)",
                error,
                response.char_count()
            )
            .red()
            .to_string(),
            (None, true) => match scored.quality {
                Some(score) => format!("completed, score {}", score).green().to_string(),
                None => "completed".green().to_string(),
            },
            (None, false) => "incomplete".yellow().to_string(),
        };

        let title = if response.is_completed {
            title.yellow().bold()
        } else {
            title.red().bold()
        };

        let mut block = format!("\n{}\n[{}]\n", title, status);
        if !response.content.is_empty() {
            block.push_str(&response.content);
            block.push('\n');
        }
        block
    }

    /// `Failed: name, name` for every response that did not complete.
    fn failure_summary(result: &RoundResult) -> Option<String> {
        let names: Vec<&str> = result
            .failed_responses()
            .map(|r| r.model_name.as_str())
            .collect();
        if names.is_empty() {
            return None;
        }
        Some(format!(
            "\n{} {}\n",
            "Failed:".red().bold(),
            names.join(", ")
        ))
    }

    fn outcome_block(outcome: &SynthesisOutcome) -> String {
        match outcome {
            SynthesisOutcome::Merged {
                synthesizer,
                mode,
                text,
            } => format!(
                "\n{}\n\n{}\n",
                format!("Synthesizer: {} ({} mode)", synthesizer, mode)
                    .yellow()
                    .bold(),
                text
            ),
            SynthesisOutcome::Fallback {
                synthesizer,
                mode,
                reason,
                text,
            } => format!(
                "\n{}\n{}\n\n{}\n",
                format!("Synthesizer: {} ({} mode)", synthesizer, mode)
                    .yellow()
                    .bold(),
                format!("Fallback merge, synthesis failed: {}", reason).red(),
                text
            ),
            SynthesisOutcome::NoResponses { text }
            | SynthesisOutcome::NoCompletedResponses { text } => {
                format!("\n{}\n", text.red())
            }
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatsynth_domain::{Model, ModelResponse, SynthesisMode};

    fn result(outcome: SynthesisOutcome) -> RoundResult {
        let mut failed = ModelResponse::started("claude", "Claude");
        failed.fail("timed out");
        RoundResult::new(
            "What is Rust?",
            "Research panel",
            vec![
                ScoredResponse {
                    response: ModelResponse::completed("gpt", "GPT-4O", "A language."),
                    quality: Some(10),
                },
                ScoredResponse {
                    response: failed,
                    quality: None,
                },
            ],
            outcome,
        )
    }

    fn merged() -> SynthesisOutcome {
        SynthesisOutcome::Merged {
            synthesizer: Model::Gpt4oMini,
            mode: SynthesisMode::Union,
            text: "Rust is a systems language.".to_string(),
        }
    }

    #[test]
    fn test_full_format_lists_every_response() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&result(merged()));
        assert!(output.contains("Question: What is Rust?"));
        assert!(output.contains("── GPT-4O (gpt) ──"));
        assert!(output.contains("[completed, score 10]"));
        assert!(output.contains("[failed: timed out]"));
        assert!(output.contains("Failed: Claude\n"));
        assert!(output.contains("Synthesizer: openai/gpt-4o-mini (union mode)"));
        assert!(output.contains("Rust is a systems language."));
    }

    #[test]
    fn test_partial_failure_reports_received_chars() {
        colored::control::set_override(false);
        let mut partial = ModelResponse::started("gemini", "Gemini");
        partial.append("안녕하세요");
        partial.fail("connection reset");
        let result = RoundResult::new(
            "q",
            "g",
            vec![ScoredResponse {
                response: partial,
                quality: None,
            }],
            SynthesisOutcome::no_completed_responses(),
        );

        let output = ConsoleFormatter::format(&result);
        assert!(output.contains("[failed: connection reset (5 chars received)]"));
        assert!(output.contains("Failed: Gemini\n"));
    }

    #[test]
    fn test_all_completed_has_no_failure_line() {
        colored::control::set_override(false);
        let result = RoundResult::new(
            "q",
            "g",
            vec![ScoredResponse {
                response: ModelResponse::completed("gpt", "GPT-4O", "ok"),
                quality: Some(0),
            }],
            merged(),
        );
        assert!(!ConsoleFormatter::format(&result).contains("Failed:"));
    }

    #[test]
    fn test_fallback_is_labelled() {
        colored::control::set_override(false);
        let outcome = SynthesisOutcome::Fallback {
            synthesizer: Model::Gpt4oMini,
            mode: SynthesisMode::Selective,
            reason: "connection refused".to_string(),
            text: "basic".to_string(),
        };
        let full = ConsoleFormatter::format(&result(outcome.clone()));
        assert!(full.contains("Fallback merge, synthesis failed: connection refused"));

        let short = ConsoleFormatter::format_synthesis_only(&result(outcome));
        assert!(short.starts_with("[basic merge: connection refused]"));
        assert!(short.ends_with("basic\n"));
    }

    #[test]
    fn test_json_format_is_parseable() {
        let output = ConsoleFormatter::render(&result(merged()), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["group"], "Research panel");
        assert_eq!(value["outcome"]["status"], "merged");
        assert_eq!(value["responses"][0]["quality"], 10);
        assert_eq!(value["responses"][1]["error"], "timed out");
    }

    #[test]
    fn test_streamed_merge_is_not_repeated() {
        let merged_result = result(merged());
        assert!(
            ConsoleFormatter::render_after_stream(&merged_result, OutputFormat::Synthesis, true)
                .is_none()
        );
        assert!(
            ConsoleFormatter::render_after_stream(&merged_result, OutputFormat::Full, true)
                .is_some()
        );
        let empty = result(SynthesisOutcome::no_responses());
        assert!(
            ConsoleFormatter::render_after_stream(&empty, OutputFormat::Synthesis, true).is_some()
        );
    }
}
