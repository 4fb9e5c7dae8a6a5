use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use symbion_lab::{
    LabError, LabResult, OracleClient, OracleResult, SimulationState, TextGenerator, find_module,
};

/// Scripted stand-in for the remote model.
struct Scripted {
    reply: fn() -> LabResult<String>,
    calls: AtomicUsize,
}

impl Scripted {
    fn new(reply: fn() -> LabResult<String>) -> Self {
        Scripted { reply, calls: AtomicUsize::new(0) }
    }
}

impl TextGenerator for Scripted {
    async fn generate_text(&self, prompt: &str, schema: &Value) -> LabResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(prompt.contains("Perfect Number Resonance"));
        assert_eq!(schema["type"], "OBJECT");
        (self.reply)()
    }
}

async fn consult(client: &OracleClient<Scripted>) -> OracleResult {
    let state = SimulationState::default();
    client.consult(&state, find_module(&state.active_module_id)).await
}

#[tokio::test]
async fn missing_key_returns_disconnected_without_calling() {
    let client: OracleClient<Scripted> = OracleClient::disconnected();
    let result = consult(&client).await;
    assert_eq!(result, OracleResult::disconnected());
    assert_eq!(result.harmonic_state, "Disconnected");
    assert!(client.generator().is_none());
}

#[tokio::test]
async fn transport_failure_returns_silence() {
    let client = OracleClient::new(Scripted::new(|| {
        Err(LabError::Provider { status: 503, body: "overloaded".into() })
    }));
    let result = consult(&client).await;
    assert_eq!(result, OracleResult::silence());
    assert_eq!(result.harmonic_state, "Silence");
    assert_eq!(calls(&client), 1);
}

#[tokio::test]
async fn empty_reply_returns_silence() {
    let client = OracleClient::new(Scripted::new(|| Err(LabError::EmptyReply)));
    assert_eq!(consult(&client).await.harmonic_state, "Silence");
}

#[tokio::test]
async fn fenced_json_is_parsed() {
    let client = OracleClient::new(Scripted::new(|| {
        Ok("```json\n{\"interpretation\":\"x\",\"harmonicState\":\"Resonant\",\"suggestedFocus\":\"y\"}\n```".into())
    }));
    let result = consult(&client).await;
    assert_eq!(
        result,
        OracleResult {
            interpretation: "x".into(),
            harmonic_state: "Resonant".into(),
            suggested_focus: "y".into(),
        }
    );
}

#[tokio::test]
async fn unparseable_reply_returns_interference() {
    let client = OracleClient::new(Scripted::new(|| Ok("not json".into())));
    let result = consult(&client).await;
    assert_eq!(result, OracleResult::interference());
    assert_eq!(result.harmonic_state, "Unknown");
}

#[tokio::test]
async fn reply_missing_a_field_returns_interference() {
    let client = OracleClient::new(Scripted::new(|| {
        Ok(r#"{"interpretation":"x","harmonicState":"Resonant"}"#.into())
    }));
    assert_eq!(consult(&client).await.harmonic_state, "Unknown");
}

#[tokio::test]
async fn each_consult_issues_exactly_one_request() {
    let ok = OracleClient::new(Scripted::new(|| {
        Ok(r#"{"interpretation":"a","harmonicState":"Chaotic","suggestedFocus":"b"}"#.into())
    }));
    consult(&ok).await;
    consult(&ok).await;
    assert_eq!(calls(&ok), 2);

    let failing = OracleClient::new(Scripted::new(|| Err(LabError::EmptyReply)));
    consult(&failing).await;
    assert_eq!(calls(&failing), 1);
}

fn calls(client: &OracleClient<Scripted>) -> usize {
    client.generator().map_or(0, |g| g.calls.load(Ordering::SeqCst))
}
