//! Summary, expense and chat command handlers.

use std::path::PathBuf;

use anyhow::{Context, Result};

use finsight::advisor::Advisor;
use finsight::error::ErrorKind;
use finsight::report::breakdown;
use finsight::FinsightError;

use super::common::{credentials, load_config, prompt_line, statement_text};
use super::GlobalArgs;

fn advisor_for(globals: &GlobalArgs) -> Result<(Advisor, finsight::providers::Credentials)> {
    let config = load_config(globals)?;
    config.validate()?;
    let creds = credentials(&config)?;
    let advisor = Advisor::from_config(&config)?;
    Ok((advisor, creds))
}

/// Print the raw model output kept by an extraction failure.
fn report_raw_reply(err: &FinsightError) {
    if let Some(raw) = err.raw_reply() {
        eprintln!("Could not parse the model reply. Raw output:\n{}", raw);
    }
}

/// Summarize statements and print the advice.
pub(crate) async fn cmd_summary(globals: &GlobalArgs, files: Vec<PathBuf>) -> Result<()> {
    let (advisor, creds) = advisor_for(globals)?;
    let text = statement_text(files).await?;

    let summary = advisor.produce_summary(&text, &creds).await?;
    if summary.is_empty() {
        println!("The model returned an empty summary.");
    } else {
        println!("{}", summary);
    }
    Ok(())
}

/// Print the expense breakdown, optionally writing CSV.
pub(crate) async fn cmd_expenses(
    globals: &GlobalArgs,
    files: Vec<PathBuf>,
    csv: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let (advisor, creds) = advisor_for(globals)?;
    let text = statement_text(files).await?;

    let expenses = match advisor.produce_expense_breakdown(&text, &creds).await {
        Ok(expenses) => expenses,
        Err(err) => {
            report_raw_reply(&err);
            return Err(err.into());
        }
    };

    let report = breakdown(&expenses);
    if json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
    } else {
        print!("{}", report.format_table());
        if !report.is_empty() {
            println!();
            for row in &report.rows {
                println!("  {}", row.label());
            }
        }
    }

    if let Some(path) = csv {
        std::fs::write(&path, report.to_csv())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

/// Summarize, then answer follow-up questions until `exit`, `quit` or EOF.
pub(crate) async fn cmd_chat(globals: &GlobalArgs, files: Vec<PathBuf>) -> Result<()> {
    let (advisor, creds) = advisor_for(globals)?;
    let text = statement_text(files).await?;

    let (summary, mut conversation) = advisor.begin_session(&text, &creds).await?;
    println!("{}", summary);
    println!();
    println!("Ask a follow-up question (type 'exit' to quit).");

    loop {
        let Some(question) = prompt_line("\n> ")? else {
            break;
        };
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        match advisor.answer_followup(&conversation, &question, &creds).await {
            Ok((reply, extended)) => {
                println!("\n{}", reply);
                conversation = extended;
            }
            // The session survives upstream hiccups; the question can be retried.
            Err(err) if !matches!(err.kind(), ErrorKind::ConfigurationError) => {
                eprintln!("Error ({}): {}", err.kind(), err);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
