//! Progress reporting for discussion rounds

use agora_application::ports::progress::ProgressNotifier;
use agora_domain::ChainSummary;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a discussion with a progress bar per round
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::new())
    }

    /// Reporter that tracks progress without drawing anything
    pub fn hidden() -> Self {
        Self::with_multi(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        let mut guard = self
            .round_bar
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard);
    }

    fn tally(summary: &ChainSummary) -> String {
        format!(
            "{} concluded, {} active",
            summary.concluded_points.to_string().green(),
            summary.active_points.to_string().yellow()
        )
    }

    #[cfg(test)]
    fn position(&self) -> Option<u64> {
        let mut position = None;
        self.with_bar(|bar| position = bar.as_ref().map(ProgressBar::position));
        position
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_round_start(&self, round: u32, points: usize, calls: usize) {
        let pb = self.multi.add(ProgressBar::new(calls as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(format!("Round {round}"));
        pb.set_message(format!("{points} points"));

        self.with_bar(|bar| {
            if let Some(previous) = bar.replace(pb) {
                previous.finish_and_clear();
            }
        });
    }

    fn on_agent_complete(&self, _round: u32, agent: &str, degraded: bool) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.as_ref() {
                let status = if degraded {
                    format!("{} {}", "x".red(), agent)
                } else {
                    format!("{} {}", "v".green(), agent)
                };
                pb.set_message(status);
                pb.inc(1);
            }
        });
    }

    fn on_round_complete(&self, round: u32, summary: &ChainSummary) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.take() {
                pb.finish_with_message(format!(
                    "{} {}",
                    format!("Round {round} complete:").green(),
                    Self::tally(summary)
                ));
            }
        });
    }

    fn on_session_terminated(&self, rounds_completed: u32) {
        let _ = self.multi.println(format!(
            "{} after {} rounds",
            "Discussion finished".cyan().bold(),
            rounds_completed
        ));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_round_start(&self, round: u32, points: usize, calls: usize) {
        println!(
            "{} {} ({} points, {} calls)",
            "->".cyan(),
            format!("Round {round}").bold(),
            points,
            calls
        );
    }

    fn on_agent_complete(&self, _round: u32, agent: &str, degraded: bool) {
        if degraded {
            println!("  {} {} (no valid response)", "x".red(), agent);
        } else {
            println!("  {} {}", "v".green(), agent);
        }
    }

    fn on_round_complete(&self, round: u32, summary: &ChainSummary) {
        println!(
            "  Round {} complete: {}\n",
            round,
            ProgressReporter::tally(summary)
        );
    }

    fn on_round_summary(&self, _round: u32, summary: &str) {
        if let Some(first) = summary.lines().find(|l| !l.trim().is_empty()) {
            println!("  {} {}", "Summary:".dimmed(), first.trim());
        }
    }

    fn on_session_terminated(&self, rounds_completed: u32) {
        println!(
            "{} after {} rounds",
            "Discussion finished".cyan().bold(),
            rounds_completed
        );
    }
}
