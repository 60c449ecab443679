//! Checks that every artifact the API needs is present and loadable.
//!
//! Usage: `check-artifacts [DIR]` (defaults to `$ARTIFACTS_DIR`, then `.`).

use house_price_api::artifacts::{self, FileCheck, SCALER_JSON_FILE, SCALER_YAML_FILE};
use std::{path::Path, process::ExitCode};

const RULE: &str = "============================================================";

fn main() -> ExitCode {
    let dir = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ARTIFACTS_DIR").ok())
        .unwrap_or_else(|| ".".to_string());
    let dir = Path::new(&dir);

    println!("{RULE}");
    println!("ARTIFACT CHECK: {}", dir.display());
    println!("{RULE}");

    let report = artifacts::check(dir);

    for entry in &report.files {
        println!("\n{}:", entry.file);
        match &entry.result {
            FileCheck::Missing => println!("  ✗ MISSING"),
            FileCheck::Absent => println!("  - absent (optional)"),
            FileCheck::Loaded { bytes, details } => {
                println!("  ✓ Exists ({} bytes)", bytes);
                for line in details {
                    println!("  ✓ {}", line);
                }
            }
            FileCheck::Invalid { bytes, reason } => {
                println!("  ✓ Exists ({} bytes)", bytes);
                println!("  ✗ LOAD ERROR: {}", reason);
            }
        }
    }

    if !report.scaler_found {
        println!("\n✗ No loadable scaler ({} or {})", SCALER_JSON_FILE, SCALER_YAML_FILE);
    }
    if let Some(e) = &report.set_error {
        println!("\n✗ Artifacts do not load together: {}", e);
    }

    println!("\n{RULE}");
    let code = if report.is_ok() {
        println!("✓ ALL ARTIFACTS OK");
        println!("\nStart the API with:");
        println!("  ARTIFACTS_DIR={} price-api", dir.display());
        println!("\nThen try:");
        println!("  http://127.0.0.1:8000/health");
        println!("  http://127.0.0.1:8000/artifacts");
        ExitCode::SUCCESS
    } else {
        println!("✗ SOME ARTIFACTS ARE MISSING OR INVALID");
        println!("\nRe-export them from the training notebook");
        ExitCode::FAILURE
    };
    println!("{RULE}");
    code
}
