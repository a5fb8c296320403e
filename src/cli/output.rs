//! CLI output formatting utilities.

use crate::episode::Episode;
use crate::index::ScoredSegment;
use crate::rag::RagResponse;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one line of the episode list.
    pub fn episode_info(position: usize, episode: &Episode) {
        let label = episode
            .season_label()
            .map(|l| format!("[{}] ", l))
            .unwrap_or_default();
        println!(
            "  {:>2}. {}{}",
            position,
            style(label).cyan(),
            style(episode.title()).bold()
        );
        println!(
            "      {} ({} header + {} window segments, {})",
            style(episode.id()).dim(),
            episode.header_segments().len(),
            episode.window_segments().len(),
            format_duration(episode.duration_seconds())
        );
    }

    /// Print a retrieved segment.
    pub fn segment_result(scored: &ScoredSegment) {
        let segment = &scored.segment;
        println!(
            "\n{} {} @ {} [{}] (score: {:.2})",
            style(">>").green(),
            style(&segment.episode_title).bold(),
            style(segment.format_timestamp()).cyan(),
            segment.strategy,
            scored.score
        );
        if let Some(header) = &segment.source_header {
            println!("   {}", style(header).italic());
        }
        println!("   {}", content_preview(&segment.text, 200));
        println!("   {}", style(&segment.deep_link).dim());
    }

    /// Print a generated answer and its grounding warnings.
    pub fn answer(response: &RagResponse) {
        println!("\n{}\n", response.answer);
        for warning in &response.warnings {
            Output::warning(&warning.to_string());
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Format duration in seconds to a human-readable string.
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
