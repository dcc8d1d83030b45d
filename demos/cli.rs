//! Command-line interface for omr_scan
//!
//! Evaluates one sheet image against an answer set: JSON result to stdout
//! for programmatic use, human summary to stderr.

use std::{env, path::Path, process};

use omr_scan::{evaluate_sheet, AnswerKeySet, PipelineConfig, SheetResult};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut set = "A".to_string();
    let mut config_path = None;
    let mut keys_path = None;
    let mut image_path_arg = None;

    // Parse arguments
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--set" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --set requires a value");
                    process::exit(1);
                }
                set = args[i + 1].clone();
                i += 1;
            }
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    process::exit(1);
                }
                config_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--keys" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --keys requires a file path");
                    process::exit(1);
                }
                keys_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => {
                if image_path_arg.is_none() {
                    image_path_arg = Some(arg.to_string());
                } else {
                    eprintln!("Error: Multiple image paths provided");
                    process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let image_path_str = match image_path_arg {
        Some(path) => path,
        None => {
            print_help(&args[0]);
            process::exit(1);
        }
    };

    let image_path = Path::new(&image_path_str);
    if !image_path.exists() {
        eprintln!("Error: File '{}' does not exist", image_path.display());
        process::exit(1);
    }

    let config = match config_path {
        Some(path) => match PipelineConfig::from_json_file(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: Failed to load config '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => PipelineConfig::default(),
    };

    let keys = match keys_path {
        Some(path) => match AnswerKeySet::from_json_file(Path::new(&path)) {
            Ok(keys) => keys,
            Err(e) => {
                eprintln!("Error: Failed to load key set '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => AnswerKeySet::builtin(&config.layout),
    };

    match evaluate_sheet(image_path, &set, &config, &keys) {
        Ok(result) => print_result(&result),
        Err(error) => {
            eprintln!("Evaluation failed: {}", error);
            if error.is_recoverable() {
                eprintln!("Suggestion: {}", error.user_message());
            }
            process::exit(1);
        }
    }
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <image_path>", program_name);
    eprintln!();
    eprintln!("Score a bubble-sheet exam image against an answer set.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --set SET        Answer set identifier (default: A)");
    eprintln!("  --config FILE    Pipeline configuration JSON (default: builtin)");
    eprintln!("  --keys FILE      Answer key set JSON (default: builtin sets A-D)");
    eprintln!("  --help, -h       Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} sheet.jpg", program_name);
    eprintln!("  {} --set C sheet.png", program_name);
    eprintln!("  {} --config omr.json --keys keys.json sheet.jpg", program_name);
}

fn print_result(result: &SheetResult) {
    // JSON to stdout for programmatic use
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing result: {}", e);
            process::exit(1);
        }
    }

    // Summary to stderr for human reading
    eprintln!();
    eprintln!("Sheet Evaluation Summary (set {}):", result.set);
    for subject in &result.score.subjects {
        eprintln!("  {}: {} / {}", subject.subject, subject.correct, subject.out_of);
    }
    eprintln!("  Total: {} / {}", result.score.total, result.score.max_total);

    let diag = result.answers.diagnostics();
    if diag.padded > 0 || diag.truncated > 0 {
        eprintln!(
            "  Warning: detected {} bubble regions (expected {}); {} padded, {} truncated.",
            diag.detected_regions,
            result.answers.len(),
            diag.padded,
            diag.truncated
        );
        eprintln!("  Check scan quality and detection thresholds.");
    }
}
