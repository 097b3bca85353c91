// Colored terminal output for topic tables and model metadata.
//
// This module handles all terminal-specific formatting. main.rs only
// decides what to show.

use colored::Colorize;

use crate::cluster::ModelInfo;
use crate::topics::summary::TopicRecord;

/// Display the topic table as a bar chart, most frequent topic first.
pub fn display_topics(topics: &[TopicRecord], considered: usize) {
    println!(
        "\n{}",
        format!("=== Topics ({} responses considered) ===", considered).bold()
    );
    println!();

    let bar_width: usize = 20;

    for (i, topic) in topics.iter().enumerate() {
        let share = topic.frequency_pct / 100.0;
        let filled = (share * bar_width as f64).round() as usize;
        let empty = bar_width.saturating_sub(filled);
        let bar = format!("[{}{}]", "=".repeat(filled), " ".repeat(empty));

        let colored_bar = if share >= 0.25 {
            bar.bright_green()
        } else if share >= 0.10 {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };

        let label = topic.label();
        let label = if label.is_empty() {
            "(no keywords)".dimmed()
        } else {
            label.bold()
        };

        println!(
            "  {:>2}. #{:<3} {:<40} {} {:>5.1}% ({} responses)",
            i + 1,
            topic.cluster,
            label,
            colored_bar,
            topic.frequency_pct,
            topic.responses
        );

        if !topic.keywords.is_empty() {
            println!("      Keywords: {}", topic.keywords_text().dimmed());
        }
        if let Some(example) = topic.examples.first() {
            let preview = super::truncate_chars(example, 100);
            println!("      Example:  \"{}\"", preview.dimmed());
        }
        println!();
    }
}

/// Display persisted model metadata.
pub fn display_model_info(key: &str, info: &ModelInfo) {
    println!("\n{}", format!("=== Topic model '{key}' ===").bold());
    println!("  Format version: {}", info.format_version);
    println!("  Trained at: {}", info.trained_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "  Clusters: {} ({} populated)",
        info.k,
        info.populated_clusters.to_string().bright_green()
    );
    println!("  Priors: alpha={} beta={}", info.alpha, info.beta);
    println!("  Training documents: {}", info.documents);
    println!("  Vocabulary: {} stems", info.vocabulary);
}
