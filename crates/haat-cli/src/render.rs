//! Terminal rendering of the search view.

use colored::Colorize;
use haat_application::SearchView;
use haat_core::search::{SearchResult, SuggestionSource};
use haat_core::visibility::Visibility;
use haat_infrastructure::DiagnosticEvent;

pub fn print_view(view: &SearchView) {
    if let Some(alert) = &view.alert {
        println!("{} {}", "!".bright_red().bold(), alert.bright_red());
    }
    if view.is_recording {
        println!(
            "{} level {:>3}{}",
            "● recording".bright_red(),
            view.amplitude,
            view.live_transcript
                .as_deref()
                .map(|t| format!("  \"{}\"", t))
                .unwrap_or_default()
        );
    }

    match view.phase {
        Visibility::Idle => print_idle(view),
        Visibility::ShowingSuggestions => print_suggestions(view),
        Visibility::Loading => println!("{}", "searching…".bright_black()),
        Visibility::ShowingResults => print_results(view),
    }

    if view.filters_open {
        let filters = serde_json::to_string(&view.filters).unwrap_or_default();
        println!("{} {}", "filters".bright_yellow(), filters);
    }
}

fn print_idle(view: &SearchView) {
    if !view.trending.is_empty() {
        println!("{} {}", "trending:".bright_black(), view.trending.join(", "));
    }
    if !view.recommendations.is_empty() {
        println!("{}", "recommended for you:".bright_black());
        for result in &view.recommendations {
            println!("  {}", format_result(result));
        }
    }
}

fn print_suggestions(view: &SearchView) {
    if view.suggestions.is_empty() {
        println!("{}", "no suggestions".bright_black());
        return;
    }
    for (i, item) in view.suggestions.iter().enumerate() {
        let marker = match item.source {
            SuggestionSource::Page => "page".bright_cyan(),
            SuggestionSource::Ai => "  ai".bright_blue(),
        };
        println!("{:>2}. {} {}", i + 1, marker, item.text);
    }
}

fn print_results(view: &SearchView) {
    if let Some(error) = &view.error {
        println!("{}", error.yellow());
    }
    if view.results.is_empty() {
        println!("{}", "no results".bright_black());
        return;
    }
    for (i, result) in view.results.iter().enumerate() {
        println!("{:>2}. {}", i + 1, format_result(result));
    }
}

pub fn format_result(result: &SearchResult) -> String {
    format!(
        "{} {}",
        format!("[{}]", result.kind).bright_magenta(),
        result.title
    )
}

pub fn print_diagnostic(event: &DiagnosticEvent) {
    let fields = event
        .fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "{}",
        format!("  [{} {}] {} {}", event.level, event.target, event.message, fields).bright_black()
    );
}
