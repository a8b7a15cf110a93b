//! Console output formatter for discussion results

use crate::output::formatter::{DiscussionReport, OutputFormatter};
use agora_domain::DiscussionPoint;
use colored::Colorize;

/// Formats discussion results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete discussion
    pub fn format(report: &DiscussionReport<'_>) -> String {
        let outcome = report.outcome;
        let mut output = String::new();

        output.push_str(&Self::header("Agora Discussion"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Topic:".cyan().bold(), report.topic));
        output.push_str(&format!(
            "{} {}",
            "Rounds completed:".cyan().bold(),
            outcome.rounds_completed
        ));
        if let Some(reason) = outcome.termination {
            output.push_str(&format!(" {}", format!("(stopped: {reason})").dimmed()));
        }
        output.push_str("\n\n");

        output.push_str(&Self::section_header("Discussion Points"));
        for point in report.points {
            output.push_str(&Self::point_line(point));
        }

        if let Some(summary) = &outcome.last_round_summary {
            output.push_str(&Self::section_header("Moderator Summary"));
            output.push_str(&format!("\n{}\n", Self::indent(summary, "  ")));
        }

        output.push_str(&Self::section_header("Chain Summary"));
        output.push_str(&format!(
            "\n  {} total, {} concluded, {} active\n",
            outcome.summary.total_points,
            outcome.summary.concluded_points.to_string().green(),
            outcome.summary.active_points.to_string().yellow()
        ));
        if !outcome.summary.latest_conclusions.is_empty() {
            output.push_str(&format!("\n{}\n", "Latest Conclusions:".green().bold()));
            for entry in &outcome.summary.latest_conclusions {
                output.push_str(&format!("  * {}\n", entry.point));
                if let Some(conclusion) = &entry.conclusion {
                    output.push_str(&format!("    {} {}\n", "->".dimmed(), conclusion));
                }
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(report: &DiscussionReport<'_>) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format conclusions only (concise output)
    pub fn format_summary_only(report: &DiscussionReport<'_>) -> String {
        let outcome = report.outcome;
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Agora Conclusions ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Topic:".bold(), report.topic));
        output.push_str(&format!(
            "{}\n\n",
            format!(
                "{} rounds, {} of {} points concluded",
                outcome.rounds_completed,
                outcome.summary.concluded_points,
                outcome.summary.total_points
            )
            .dimmed()
        ));

        if outcome.concluded.is_empty() {
            output.push_str("No point reached consensus.\n");
            return output;
        }

        for point in &outcome.concluded {
            output.push_str(&format!("{} {}\n", "✓".green(), point.content()));
            if let Some(conclusion) = point.conclusion() {
                output.push_str(&format!("{}\n", Self::indent(conclusion, "    ")));
            }
        }

        output
    }

    fn point_line(point: &DiscussionPoint) -> String {
        let tag = format!("[R{}]", point.round_num());
        if point.is_concluded() {
            let mut line = format!(
                "{} {} {} {}\n",
                "✓".green(),
                tag.dimmed(),
                point.content(),
                format!("(consensus {:.2})", point.consensus_score()).green()
            );
            if let Some(conclusion) = point.conclusion() {
                line.push_str(&format!("      {} {}\n", "->".dimmed(), conclusion));
            }
            line
        } else {
            format!(
                "{} {} {} {}\n",
                "•".yellow(),
                tag.dimmed(),
                point.content(),
                format!(
                    "(consensus {:.2}, {} participants)",
                    point.consensus_score(),
                    point.participants().len()
                )
                .dimmed()
            )
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

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &DiscussionReport<'_>) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &DiscussionReport<'_>) -> String {
        Self::format_json(report)
    }

    fn format_summary_only(&self, report: &DiscussionReport<'_>) -> String {
        Self::format_summary_only(report)
    }
}
