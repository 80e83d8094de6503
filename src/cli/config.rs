//! Config check command handler.

use anyhow::Result;

use finsight::config::validate::{check_file, DiagnosticLevel};
use finsight::config::Config;

use super::common::load_config;
use super::{ConfigAction, GlobalArgs};

/// Validate configuration file.
pub(crate) fn cmd_config(globals: &GlobalArgs, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check => {
            let config_path = globals.config.clone().unwrap_or_else(Config::path);
            println!("Config file: {}", config_path.display());

            let (mut errors, mut warnings) = (0usize, 0usize);

            if config_path.exists() {
                match check_file(&config_path) {
                    Ok(diagnostics) => {
                        for diag in &diagnostics {
                            println!("{}", diag);
                        }
                        errors += diagnostics
                            .iter()
                            .filter(|d| d.level == DiagnosticLevel::Error)
                            .count();
                        warnings += diagnostics
                            .iter()
                            .filter(|d| d.level == DiagnosticLevel::Warn)
                            .count();
                    }
                    Err(e) => {
                        println!("[ERROR] {}", e);
                        return Ok(());
                    }
                }
            } else {
                println!("[OK] No config file found (using defaults)");
            }

            match load_config(globals).map(|c| c.validate()) {
                Ok(Ok(())) => println!("[OK] Settings valid"),
                Ok(Err(e)) => {
                    errors += 1;
                    println!("[ERROR] {}", e);
                }
                Err(e) => {
                    errors += 1;
                    println!("[ERROR] {:#}", e);
                }
            }

            if errors == 0 && warnings == 0 {
                println!("\nConfiguration looks good!");
            } else {
                println!("\nFound {} error(s), {} warning(s)", errors, warnings);
            }
        }
    }
    Ok(())
}
