//! Terminal rendering for results

use crate::application::dto::AnalysisResult;
use crate::domain::entities::{DecodeOutcome, EngineAvailability, IntegrityReport};
use crate::domain::repositories::PayloadFormatter;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for a batch of analyses
pub fn batch_progress(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(template) = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} images ({eta})")
    {
        bar.set_style(template.progress_chars("#>-"));
    }
    bar.set_message("Analyzing images...".to_string());
    bar
}

pub fn print_result(result: &AnalysisResult, formatter: &dyn PayloadFormatter, platform: &str, language: &str) {
    let info = &result.image_info;
    println!();
    if result.is_success() {
        println!("{} {}", style("[+]").green().bold(), style(&info.image_name).bold());
        println!("{}", formatter.format(&result.payload, platform, language));
    } else {
        println!("{} {}", style("[x]").red().bold(), style(&info.image_name).bold());
    }

    if let (Some(original), Some(final_size)) = (info.original_size, info.final_size) {
        println!(
            "    {} {}x{} -> {}x{}{}",
            style("size").dim(),
            original.0,
            original.1,
            final_size.0,
            final_size.1,
            info.method_used
                .map(|m| format!(" ({})", m))
                .unwrap_or_default()
        );
    }
    if let Some(engine) = &info.engine_used {
        let note = if info.engine_substituted {
            format!(" (requested {})", info.requested_engine)
        } else {
            String::new()
        };
        println!("    {} {}{}", style("engine").dim(), engine, note);
    }
    println!(
        "    {} {:.2}s",
        style("time").dim(),
        info.processing_time_seconds
    );
    for warning in &info.warnings {
        println!("    {} {}", style("[!]").yellow(), warning);
    }

    if let Some(error) = &result.error {
        println!("    {} {}", style("error").red(), error.message);
        for suggestion in &error.suggestions {
            println!("      - {}", suggestion);
        }
    }
}

pub fn print_engines(engines: &[EngineAvailability], default_engine: &str) {
    println!("{:<10} {:<12} {}", style("ENGINE").bold(), style("STATUS").bold(), style("NOTE").bold());
    println!("{}", "-".repeat(45));
    for engine in engines {
        let status = if engine.available {
            style("available").green()
        } else {
            style("unavailable").red()
        };
        let mut note = engine.reason.clone().unwrap_or_default();
        if engine.engine_id == default_engine {
            note = if note.is_empty() { "default".to_string() } else { format!("default; {}", note) };
        }
        println!("{:<10} {:<12} {}", engine.engine_id, status, note);
    }
}

pub fn print_check(report: &IntegrityReport, outcome: Option<&DecodeOutcome>) {
    if report.has_error() {
        println!("{}", style("Validation failed").red().bold());
        println!("{}", report.detailed_message());
    } else {
        println!(
            "{} {} ({} bytes)",
            style("Integrity check passed:").green().bold(),
            report.file_name(),
            report.size_bytes()
        );
        for warning in report.warnings() {
            println!("  {} {}", style("[!]").yellow(), warning);
        }
    }

    match outcome {
        Some(DecodeOutcome::Success(image)) => {
            for failure in &image.failures {
                println!("  {} {}", style("[!]").yellow(), failure);
            }
            println!(
                "Decoded with {} after {} attempt(s): {}x{} -> {}x{}{}",
                style(image.method).cyan(),
                image.attempts_tried,
                image.original_dimensions.0,
                image.original_dimensions.1,
                image.final_dimensions.0,
                image.final_dimensions.1,
                if image.untouched { " (passed through)" } else { "" }
            );
        }
        Some(DecodeOutcome::Exhausted(failures)) => {
            println!("{}", style("All decode strategies failed").red());
            for failure in failures {
                println!("  - {}", failure);
            }
        }
        None => {}
    }
}
