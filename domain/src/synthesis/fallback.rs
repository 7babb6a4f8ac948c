//! Deterministic, network-free merge used when the synthesizer call fails.

use super::mode::SynthesisMode;
use super::response::ModelResponse;

/// Text returned when a selective fallback has nothing to select from.
pub const FALLBACK_EMPTY: &str = "No response is available.";

/// Builds the degraded merge text for a mode and response set.
pub struct FallbackSynthesizer;

impl FallbackSynthesizer {
    /// Merge `responses` without a model.
    ///
    /// - intersection: every response under its own heading, after a notice
    ///   that common content could not be detected
    /// - selective: only the first response, after a notice that automatic
    ///   selection failed
    /// - union: every response under its own heading
    ///
    /// Identical input always yields identical output.
    pub fn merge(mode: SynthesisMode, responses: &[ModelResponse]) -> String {
        let mut result = format!("[{} mode - basic merge]\n\n", mode);

        match mode {
            SynthesisMode::Selective => {
                result.push_str(
                    "Automatic selection failed, so the first response is provided as-is:\n\n",
                );
                match responses.first() {
                    Some(first) => result.push_str(&first.content),
                    None => result.push_str(FALLBACK_EMPTY),
                }
                return result;
            }
            SynthesisMode::Intersection => {
                result.push_str(
                    "Content shared between the models could not be detected automatically, \
                     so every response is provided:\n\n",
                );
            }
            SynthesisMode::Union => {
                result.push_str(
                    "The responses could not be merged automatically and are listed one after another:\n\n",
                );
            }
        }

        for response in responses {
            result.push_str(&format!("**{}'s response:**\n", response.model_name));
            result.push_str(&response.content);
            result.push_str("\n\n");
        }

        result
    }
}
