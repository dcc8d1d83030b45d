//! Write the default pipeline configuration as JSON
//!
//! Produces a starting point for per-deployment threshold calibration.

use std::{env, path::Path, process};

use omr_scan::PipelineConfig;

fn main() {
    let args: Vec<String> = env::args().collect();

    let output = match args.len() {
        1 => "omr_config.json".to_string(),
        2 if args[1] != "--help" && args[1] != "-h" => args[1].clone(),
        _ => {
            eprintln!("Usage: {} [output.json]", args[0]);
            eprintln!();
            eprintln!("Writes the default pipeline configuration to the given file");
            eprintln!("(default: omr_config.json).");
            let asked_for_help =
                matches!(args.get(1).map(|a| a.as_str()), Some("--help") | Some("-h"));
            process::exit(if asked_for_help { 0 } else { 1 });
        }
    };

    let config = PipelineConfig::default();
    match config.to_json_file(Path::new(&output)) {
        Ok(()) => eprintln!("Wrote default configuration to {}", output),
        Err(e) => {
            eprintln!("Error: Failed to write {}: {}", output, e);
            process::exit(1);
        }
    }
}
