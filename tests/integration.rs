//! Integration tests for Finsight
//!
//! These tests drive the public API end to end: documents are turned into
//! statement text, the advisor runs against a scripted chat provider, and the
//! result is rendered through the report module.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::tempdir;

use finsight::advisor::{
    Advisor, AdvisorSettings, NumericMode, ADVICE_USER_PREFIX, EXTRACTION_USER_PREFIX,
    FOLLOWUP_SYSTEM_PROMPT,
};
use finsight::config::Config;
use finsight::documents::{extract_text, AutoExtractor, Document, PlainTextExtractor};
use finsight::report::breakdown;
use finsight::session::{Conversation, Message, Role};
use finsight::{ChatOptions, Credentials, ErrorKind, LLMProvider, LLMResponse};

// ============================================================================
// Test Provider
// ============================================================================

/// Replays canned replies in order and records every request.
struct CannedProvider {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl CannedProvider {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for CannedProvider {
    async fn chat(
        &self,
        messages: Vec<Message>,
        _model: &str,
        _credentials: &Credentials,
        _options: ChatOptions,
    ) -> finsight::Result<LLMResponse> {
        self.requests.lock().unwrap().push(messages);
        let reply = self.replies.lock().unwrap().pop_front().unwrap_or_default();
        Ok(LLMResponse::text(&reply))
    }

    fn name(&self) -> &str {
        "canned"
    }
}

fn advisor(provider: Arc<CannedProvider>) -> Advisor {
    Advisor::new(provider, AdvisorSettings::default()).unwrap()
}

fn creds() -> Credentials {
    Credentials::new("sk-test")
}

const STATEMENT: &str = "\
2024-03-01 GROCERY MART        -54.20
2024-03-03 CITY RENT          -1200.00
2024-03-05 PAYROLL            +3100.00
2024-03-09 COFFEE CORNER         -4.50
";

// ============================================================================
// Documents -> Advisor -> Report
// ============================================================================

#[tokio::test]
async fn test_statement_file_to_expense_report() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("march.txt");
    std::fs::write(&path, STATEMENT).unwrap();

    let document = Document::from_path(&path).unwrap();
    let text = extract_text(&AutoExtractor, &[document]).unwrap();
    assert!(text.contains("CITY RENT"));

    let provider = CannedProvider::new(&[
        "Here you go: {\"Rent\": 1200, \"Groceries\": \"54.20\", \"Coffee\": 4.5, \"Income\": -3100}",
    ]);
    let advisor = advisor(provider.clone());

    let expenses = advisor
        .produce_expense_breakdown(&text, &creds())
        .await
        .unwrap();
    assert_eq!(expenses.len(), 3);
    assert_eq!(expenses.get("Rent"), Some(1200.0));
    assert_eq!(expenses.get("Groceries"), Some(54.2));
    assert!(expenses.get("Income").is_none());

    let report = breakdown(&expenses);
    let table = report.format_table();
    assert!(table.contains("Rent"));
    assert!(table.contains("Total Expenses: $1258.70"));

    let csv = report.to_csv();
    assert!(csv.starts_with("Category,Amount\n"));
    assert!(csv.contains("Rent,1200.0"));

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    let user = &requests[0][1];
    assert_eq!(user.role, Role::User);
    assert!(user.content.starts_with(EXTRACTION_USER_PREFIX));
    assert!(user.content.contains("GROCERY MART"));
}

#[tokio::test]
async fn test_multiple_documents_are_concatenated_in_order() {
    let docs = vec![
        Document::new("jan.txt", b"January statement".to_vec()),
        Document::new("feb.txt", b"February statement".to_vec()),
    ];
    let text = extract_text(&PlainTextExtractor, &docs).unwrap();
    let jan = text.find("January").unwrap();
    let feb = text.find("February").unwrap();
    assert!(jan < feb);

    let provider = CannedProvider::new(&["Spending looks steady."]);
    let summary = advisor(provider.clone())
        .produce_summary(&text, &creds())
        .await
        .unwrap();
    assert_eq!(summary.as_str(), "Spending looks steady.");

    let sent = &provider.requests()[0][1].content;
    assert!(sent.starts_with(ADVICE_USER_PREFIX));
    assert!(sent.contains("January statement"));
    assert!(sent.contains("February statement"));
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_session_survives_serialization_between_turns() {
    let provider = CannedProvider::new(&[
        "You spent most on rent.",
        "Rent was 1200.",
        "Coffee was 4.50.",
    ]);
    let advisor = advisor(provider.clone());

    let (summary, conversation) = advisor.begin_session(STATEMENT, &creds()).await.unwrap();
    assert_eq!(summary.as_str(), "You spent most on rent.");
    assert_eq!(conversation.len(), 3);

    // The client holds the conversation between turns.
    let wire = serde_json::to_string(&conversation).unwrap();
    let restored: Conversation = serde_json::from_str(&wire).unwrap();
    assert_eq!(restored, conversation);

    let (reply, conversation) = advisor
        .answer_followup(&restored, "How much was rent?", &creds())
        .await
        .unwrap();
    assert_eq!(reply, "Rent was 1200.");
    assert_eq!(conversation.len(), 5);

    let (reply, conversation) = advisor
        .answer_followup(&conversation, "And coffee?", &creds())
        .await
        .unwrap();
    assert_eq!(reply, "Coffee was 4.50.");
    assert_eq!(conversation.len(), 7);

    // Every follow-up request carries the full history plus the new question.
    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].len(), 6);
    assert_eq!(requests[2][..5], conversation.messages()[..5]);
    assert_eq!(requests[2][5].content, "And coffee?");
}

#[tokio::test]
async fn test_followup_without_history_uses_followup_prompt() {
    let provider = CannedProvider::new(&["Budget 10% for savings."]);
    let advisor = advisor(provider.clone());

    let (reply, conversation) = advisor
        .answer_followup(&Conversation::default(), "How should I save?", &creds())
        .await
        .unwrap();
    assert_eq!(reply, "Budget 10% for savings.");
    assert_eq!(conversation.messages()[0].content, FOLLOWUP_SYSTEM_PROMPT);
    assert_eq!(conversation.last().unwrap().role, Role::Assistant);
}

// ============================================================================
// Error surface
// ============================================================================

#[tokio::test]
async fn test_unparseable_reply_keeps_raw_text() {
    let provider = CannedProvider::new(&["I could not find any expenses."]);
    let err = advisor(provider)
        .produce_expense_breakdown(STATEMENT, &creds())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoJsonFound);
    assert_eq!(err.raw_reply(), Some("I could not find any expenses."));
}

#[tokio::test]
async fn test_strict_mode_drops_string_amounts() {
    let provider = CannedProvider::new(&["{\"Rent\": 1200, \"Groceries\": \"54.20\"}"]);
    let settings = AdvisorSettings {
        numeric_mode: NumericMode::Strict,
        ..AdvisorSettings::default()
    };
    let advisor = Advisor::new(provider, settings).unwrap();

    let expenses = advisor
        .produce_expense_breakdown(STATEMENT, &creds())
        .await
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses.get("Rent"), Some(1200.0));
}

#[tokio::test]
async fn test_missing_credentials_never_reach_provider() {
    let provider = CannedProvider::new(&["unused"]);
    let err = advisor(provider.clone())
        .produce_summary(STATEMENT, &Credentials::new("  "))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingInput);
    assert!(provider.requests().is_empty());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_drives_advisor_settings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "provider": {"model": "gpt-4o-mini", "timeout_secs": 15},
            "budget": {"max_input_tokens": 500},
            "extraction": {"numeric_mode": "strict"}
        }"#,
    )
    .unwrap();

    let mut config: Config =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    config.apply_overrides_from(|_| None);
    config.validate().unwrap();

    let settings = AdvisorSettings::from_config(&config);
    assert_eq!(settings.model, "gpt-4o-mini");
    assert_eq!(settings.max_input_tokens, 500);
    assert_eq!(settings.timeout.as_secs(), 15);
    assert_eq!(settings.numeric_mode, NumericMode::Strict);

    let advisor = Advisor::new(CannedProvider::new(&[]), settings).unwrap();
    assert_eq!(advisor.budgeter().max_tokens(), 500);
}

#[test]
fn test_oversized_statement_is_trimmed_to_budget() {
    let settings = AdvisorSettings {
        max_input_tokens: 20,
        ..AdvisorSettings::default()
    };
    let advisor = Advisor::new(CannedProvider::new(&[]), settings).unwrap();
    let long = STATEMENT.repeat(50);

    let trimmed = advisor.budgeter().trim(&long);
    assert!(advisor.budgeter().count(&trimmed) <= 20);
    assert!(long.starts_with(trimmed.as_ref()));
}
