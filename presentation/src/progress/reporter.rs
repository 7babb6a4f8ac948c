//! Progress reporting for synthesis rounds

use chatsynth_application::ProgressNotifier;
use chatsynth_domain::{Model, ModelGroup, SynthesisMode, SynthesisOutcome};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// One spinner line per model
struct ModelBar {
    bar: ProgressBar,
    chars: usize,
}

/// Reports round progress with one spinner per model
///
/// Spinners are drawn on stderr. With live synthesis enabled the merged
/// answer is printed to stdout as it streams in.
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ModelBar>>,
    live_synthesis: bool,
    streamed: AtomicBool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
            live_synthesis: false,
            streamed: AtomicBool::new(false),
        }
    }

    /// Print synthesis chunks to stdout as they arrive
    pub fn with_live_synthesis(mut self, live: bool) -> Self {
        self.live_synthesis = live;
        self
    }

    /// Whether the merged answer was already printed live
    pub fn streamed_synthesis(&self) -> bool {
        self.streamed.load(Ordering::SeqCst)
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_bar(&self, model_id: &str, f: impl FnOnce(&mut ModelBar)) {
        if let Ok(mut bars) = self.bars.lock()
            && let Some(entry) = bars.get_mut(model_id)
        {
            f(entry);
        }
    }

    /// Stop every spinner that has not finished yet.
    fn settle(&self) {
        if let Ok(mut bars) = self.bars.lock() {
            for (_, entry) in bars.drain() {
                if !entry.bar.is_finished() {
                    entry.bar.abandon();
                }
            }
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_round_start(&self, group: &ModelGroup) {
        self.streamed.store(false, Ordering::SeqCst);
        let _ = self.multi.println(format!(
            "{} {} ({} models)",
            "->".cyan(),
            group.title.bold(),
            group.len()
        ));

        let Ok(mut bars) = self.bars.lock() else {
            return;
        };
        for model in &group.models {
            let bar = self.multi.add(ProgressBar::new_spinner());
            bar.set_style(Self::spinner_style());
            bar.set_prefix(model.display_name.clone());
            bar.set_message("waiting...");
            bar.enable_steady_tick(Duration::from_millis(100));
            bars.insert(model.id.clone(), ModelBar { bar, chars: 0 });
        }
    }

    fn on_model_stream_start(&self, model_id: &str, _model_name: &str) {
        self.with_bar(model_id, |entry| entry.bar.set_message("streaming..."));
    }

    fn on_model_stream_chunk(&self, model_id: &str, chunk: &str) {
        self.with_bar(model_id, |entry| {
            entry.chars += chunk.chars().count();
            entry.bar.set_message(format!("{} chars", entry.chars));
        });
    }

    fn on_model_stream_end(&self, model_id: &str) {
        self.with_bar(model_id, |entry| {
            entry
                .bar
                .finish_with_message(format!("{} {} chars", "v".green(), entry.chars));
        });
    }

    fn on_model_failed(&self, model_id: &str, reason: &str) {
        self.with_bar(model_id, |entry| {
            entry
                .bar
                .abandon_with_message(format!("{} {}", "x".red(), reason.red()));
        });
    }

    fn on_synthesis_start(&self, synthesizer: &Model, mode: SynthesisMode, inputs: usize) {
        self.settle();
        let _ = self.multi.println(format!(
            "{} Merging {} answers with {} ({} mode)",
            "->".cyan(),
            inputs,
            synthesizer.to_string().bold(),
            mode
        ));
        if self.live_synthesis {
            println!();
        }
    }

    fn on_synthesis_chunk(&self, chunk: &str) {
        if !self.live_synthesis {
            return;
        }
        self.streamed.store(true, Ordering::SeqCst);
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(chunk.as_bytes());
        let _ = stdout.flush();
    }

    fn on_synthesis_fallback(&self, reason: &str) {
        if self.streamed.swap(false, Ordering::SeqCst) {
            println!();
        }
        eprintln!(
            "{} synthesis failed ({}), using a basic merge",
            "!".yellow().bold(),
            reason
        );
    }

    fn on_round_complete(&self, _outcome: &SynthesisOutcome) {
        self.settle();
        if self.streamed_synthesis() {
            println!();
        }
    }
}

/// Line-based progress for terminals that cannot draw spinners
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_round_start(&self, group: &ModelGroup) {
        eprintln!(
            "{} {} ({} models)",
            "->".cyan(),
            group.title.bold(),
            group.len()
        );
    }

    fn on_model_stream_end(&self, model_id: &str) {
        eprintln!("  {} {}", "v".green(), model_id);
    }

    fn on_model_failed(&self, model_id: &str, reason: &str) {
        eprintln!("  {} {} ({})", "x".red(), model_id, reason);
    }

    fn on_synthesis_start(&self, synthesizer: &Model, mode: SynthesisMode, inputs: usize) {
        eprintln!(
            "{} Merging {} answers with {} ({} mode)",
            "->".cyan(),
            inputs,
            synthesizer,
            mode
        );
    }

    fn on_synthesis_fallback(&self, reason: &str) {
        eprintln!("  {} synthesis failed ({})", "!".yellow(), reason);
    }

    fn on_round_complete(&self, outcome: &SynthesisOutcome) {
        eprintln!("{} {}", "->".cyan(), outcome.label());
    }
}
