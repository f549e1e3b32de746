//! `check` subcommand: parse one TRA file and describe it

use anyhow::Result;
use colored::Colorize;

use crate::cli::CheckArgs;
use crate::tra::{self, ParsedFile, RawRecord};
use crate::utils::truncate_display;

pub fn run(args: CheckArgs) -> Result<()> {
    println!("{}", format!("[Check] {}", args.input.display()).green());

    let parsed = match tra::parse_file(&args.input) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", format!("[ERROR] {}", e).red());
            if let Some(line) = e.line() {
                eprintln!("  Fix line {} and run check again", line);
            }
            return Err(e.into());
        }
    };

    let stats = &parsed.stats;
    println!("  Records: {}", stats.records);
    println!("  Single: {}", stats.single);
    println!("  Gender pairs: {}", stats.gender_pairs);
    println!("  Anomalous: {}", stats.anomalous);
    if stats.duplicates > 0 {
        println!("  Duplicate ids: {}", stats.duplicates);
    }
    if stats.ignored_lines > 0 {
        println!("  Ignored lines: {}", stats.ignored_lines);
    }

    let problems = problem_records(&parsed, args.target);
    if problems.is_empty() {
        println!("{}", "[OK] No anomalies".green());
        return Ok(());
    }

    println!(
        "{}",
        format!("[WARN] {} record(s) would be skipped", problems.len()).yellow()
    );
    for record in problems.iter().take(args.limit) {
        println!(
            "  line {}: @{} has {} segment(s): {}",
            record.line,
            record.id,
            record.segments.len(),
            preview(record)
        );
    }
    if problems.len() > args.limit {
        println!("  ... and {} more", problems.len() - args.limit);
    }

    Ok(())
}

/// Records whose segment count is wrong for the file's role. Source files
/// allow one segment, target files one or two.
pub fn problem_records(parsed: &ParsedFile, target: bool) -> Vec<&RawRecord> {
    if target {
        parsed.anomalies().collect()
    } else {
        parsed
            .records
            .values()
            .filter(|r| r.text().is_none())
            .collect()
    }
}

fn preview(record: &RawRecord) -> String {
    let joined = record
        .segments
        .iter()
        .map(|s| format!("~{}~", s))
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        "(empty)".to_string()
    } else {
        truncate_display(&joined, 60)
    }
}
