//! # Testes de Integração
//!
//! Valida o fluxo completo do playground:
//! - Sessão → Runner → Sandbox: cenários de execução de ponta a ponta
//! - Isolamento entre execuções e entre sessões
//! - Runner → Conversa: mensagens de execução no histórico
//! - Tutor → Sessão: desafio extraído semeia o playground

use code_tutor::conversation::{ConversationLog, MemoryPreferenceStore, PreferenceStore};
use code_tutor::playground::{
    ChallengeRunner, FailureKind, JsSandbox, NoopObserver, OutputCapture, PlaygroundSession,
    RunResult, RunStatus, Severity, NO_OUTPUT_PLACEHOLDER,
};
use code_tutor::tutor::{MockTutorClient, TutorClient, TutorRequest};
use code_tutor::types::{Conversation, Message, Role, SkillLevel, Topic, UserPreferences, UserSkills};
use code_tutor::{TutorConfig, PREFERENCES_KEY};
use std::sync::Mutex;

fn session(code: &str) -> Mutex<PlaygroundSession> {
    Mutex::new(PlaygroundSession::new(code))
}

// ============================================================================
// TESTE 1: Cenários básicos de execução
// ============================================================================

#[tokio::test]
async fn test_hello_scenario() {
    let runner = ChallengeRunner::default();
    let session = session("console.log('hi')");

    let result = runner.run(&session, &NoopObserver).await.unwrap();

    assert!(matches!(result, RunResult::Success { .. }));
    assert_eq!(result.transcript().render(), "hi\n");
    assert_eq!(session.lock().unwrap().output_text(), "hi\n");
}

#[tokio::test]
async fn test_object_is_rendered_structurally() {
    let runner = ChallengeRunner::default();
    let session = session("console.log({a:1})");

    let result = runner.run(&session, &NoopObserver).await.unwrap();
    let rendered = result.transcript().render();

    assert!(!rendered.contains("[object Object]"));
    assert!(rendered.contains("\"a\": 1"));
}

#[tokio::test]
async fn test_awkward_objects_render_without_host_failure() {
    let runner = ChallengeRunner::default();
    let session = session(
        "console.log({ a: undefined, b: 1 }); \
         const u = { onClick: function () {} }; console.log(u); \
         const node = { v: 1 }; node.next = node; console.log(node); \
         console.log('done')",
    );

    let result = runner.run(&session, &NoopObserver).await.unwrap();

    assert!(result.is_success());
    let lines = result.transcript().lines();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0].text, "{\n  \"b\": 1\n}");
    assert_eq!(lines[1].text, "{}");
    assert_eq!(lines[3].text, "done");
    assert_eq!(session.lock().unwrap().status(), RunStatus::Idle);
}

#[tokio::test]
async fn test_warning_scenario() {
    let runner = ChallengeRunner::default();
    let session = session("console.warn('careful')");

    let result = runner.run(&session, &NoopObserver).await.unwrap();
    let lines = result.transcript().lines();

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].severity, Severity::Warning);
    assert!(lines[0].render().starts_with("⚠️ Warning: "));
    assert!(lines[0].text.contains("careful"));
}

#[tokio::test]
async fn test_no_output_shows_placeholder() {
    let runner = ChallengeRunner::default();
    let session = session("const x = 1 + 1;");

    runner.run(&session, &NoopObserver).await.unwrap();

    assert_eq!(session.lock().unwrap().output_text(), NO_OUTPUT_PLACEHOLDER);
}

#[tokio::test]
async fn test_blank_code_refused_without_callback() {
    let runner = ChallengeRunner::default();
    let session = session("   ");
    let calls = Mutex::new(0usize);
    let observer = |_code: &str, _output: &str| {
        *calls.lock().unwrap() += 1;
    };

    assert!(runner.run(&session, &observer).await.is_none());
    assert_eq!(*calls.lock().unwrap(), 0);
    assert_eq!(session.lock().unwrap().status(), RunStatus::Idle);
}

// ============================================================================
// TESTE 2: Falhas
// Erro no meio da execução mantém as linhas anteriores e volta para Idle
// ============================================================================

#[tokio::test]
async fn test_throw_partway_keeps_earlier_lines() {
    let runner = ChallengeRunner::default();
    let session = session("console.log('one'); console.log('two'); throw new Error('boom')");

    let result = runner.run(&session, &NoopObserver).await.unwrap();

    assert_eq!(result.failure_kind(), Some(FailureKind::Runtime));
    assert!(!result.diagnostic().unwrap().is_empty());
    assert!(result.diagnostic().unwrap().contains("boom"));
    assert!(result.transcript().render().starts_with("one\ntwo\n"));

    let guard = session.lock().unwrap();
    assert_eq!(guard.status(), RunStatus::Idle);
    assert!(guard.output_text().contains("❌ Error: "));
}

#[tokio::test]
async fn test_syntax_error_is_authoring_failure() {
    let runner = ChallengeRunner::default();
    let session = session("console.log('unterminated");

    let result = runner.run(&session, &NoopObserver).await.unwrap();

    assert_eq!(result.failure_kind(), Some(FailureKind::Authoring));
    assert_eq!(session.lock().unwrap().status(), RunStatus::Idle);
}

#[tokio::test]
async fn test_infinite_loop_is_stopped() {
    let sandbox = JsSandbox::new().loop_limit(100_000);
    let runner = ChallengeRunner::new(sandbox, std::time::Duration::from_secs(10));
    let session = session("while (true) {}");

    let result = runner.run(&session, &NoopObserver).await.unwrap();

    assert!(matches!(
        result.failure_kind(),
        Some(FailureKind::ResourceLimit) | Some(FailureKind::Timeout)
    ));
    assert_eq!(session.lock().unwrap().status(), RunStatus::Idle);
}

// ============================================================================
// TESTE 3: Ordem do transcript
// render() == concatenação das linhas na ordem de intake
// ============================================================================

#[test]
fn test_transcript_matches_intake_order() {
    let sandbox = JsSandbox::new();
    let capture = OutputCapture::new();

    let result = sandbox.evaluate(
        "console.log('a', 1); console.warn('b'); console.error('c'); console.info(true);",
        &capture,
    );

    let transcript = result.transcript();
    let concatenated: String = transcript.lines().iter().map(|l| l.render()).collect();
    assert_eq!(transcript.render(), concatenated);
    assert_eq!(
        concatenated,
        "a 1\n⚠️ Warning: b\n🔴 Error: c\ntrue\n"
    );
}

// ============================================================================
// TESTE 4: Isolamento
// Nada do que um script faz sobrevive para a próxima execução ou sessão
// ============================================================================

#[tokio::test]
async fn test_globals_do_not_leak_between_runs() {
    let runner = ChallengeRunner::default();
    let session = session("console = { log() {} }; globalThis.leaked = 42;");

    runner.run(&session, &NoopObserver).await.unwrap();

    session
        .lock()
        .unwrap()
        .set_source("console.log(typeof leaked)");
    let result = runner.run(&session, &NoopObserver).await.unwrap();

    assert_eq!(result.transcript().render(), "undefined\n");
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let runner = ChallengeRunner::default();
    let first = session("console.log('first')");
    let second = session("console.log('second')");

    runner.run(&first, &NoopObserver).await.unwrap();
    runner.run(&second, &NoopObserver).await.unwrap();

    assert_eq!(first.lock().unwrap().output_text(), "first\n");
    assert_eq!(second.lock().unwrap().output_text(), "second\n");
}

#[tokio::test]
async fn test_reset_after_run() {
    let runner = ChallengeRunner::default();
    let session = session("console.log('start')");

    session.lock().unwrap().set_source("console.log('edited')");
    runner.run(&session, &NoopObserver).await.unwrap();

    let mut guard = session.lock().unwrap();
    guard.reset();
    let once = (guard.source().to_string(), guard.output_text());
    guard.reset();
    let twice = (guard.source().to_string(), guard.output_text());

    assert_eq!(once, twice);
    assert_eq!(guard.source(), "console.log('start')");
    assert!(guard.last_result().is_none());
}

// ============================================================================
// TESTE 5: Runner → Conversa → Tutor
// ============================================================================

#[tokio::test]
async fn test_run_is_recorded_in_conversation() {
    let runner = ChallengeRunner::default();
    let log = ConversationLog::new(Conversation::start(Topic::JavaScript, SkillLevel::Beginner));
    let session = session("console.log(1 + 2)");

    runner.run(&session, &log).await.unwrap();

    let conversation = log.snapshot();
    let last = conversation.messages.last().unwrap();
    assert_eq!(last.role, Role::User);
    assert_eq!(
        last.content,
        "Here's my code solution:\n```javascript\nconsole.log(1 + 2)\n```\nOutput:\n```\n3\n\n```"
    );
}

#[tokio::test]
async fn test_tutor_challenge_seeds_playground() {
    let raw = "Nice! Now try:\n```challenge\n{\"initialCode\": \"console.log(2 * 21)\", \"description\": \"Multiply\", \"expectedOutput\": \"42\"}\n```";
    let client = MockTutorClient::new(raw);

    let mut conversation = Conversation::start(Topic::JavaScript, SkillLevel::Beginner);
    conversation.push(Message::user("Give me a challenge"));

    let request =
        TutorRequest::from_conversation(&conversation, SkillLevel::Beginner, &TutorConfig::default());
    let reply = client.respond(&request).await.unwrap();
    let challenge = reply.challenge.clone().unwrap();
    conversation.push(Message::assistant(reply.text, reply.challenge));

    let session = Mutex::new(PlaygroundSession::from_challenge(
        conversation.latest_challenge().unwrap(),
    ));
    let result = ChallengeRunner::default()
        .run(&session, &NoopObserver)
        .await
        .unwrap();

    assert_eq!(
        result.transcript().render().trim_end(),
        challenge.expected_output.as_deref().unwrap()
    );
}

#[tokio::test]
async fn test_preferences_keep_conversation() {
    let store = MemoryPreferenceStore::new();
    let log = ConversationLog::new(Conversation::start(Topic::React, SkillLevel::Intermediate));

    ChallengeRunner::default()
        .run(&session("console.log('saved')"), &log)
        .await
        .unwrap();

    let mut prefs = UserPreferences::new("maria", UserSkills::default());
    prefs.upsert_conversation(log.into_inner());
    store.save(PREFERENCES_KEY, &prefs).await.unwrap();

    let loaded = store.load(PREFERENCES_KEY).await.unwrap().unwrap();
    let restored = loaded.last_conversation().unwrap();
    assert_eq!(restored.messages.len(), 2);
    assert!(restored.messages[1].content.contains("saved"));
}
