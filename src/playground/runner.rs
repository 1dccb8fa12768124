// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHALLENGE RUNNER - Um ciclo completo de execução
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// 1. Tira o snapshot do código e marca a sessão como Running
// 2. Executa o sandbox em um worker bloqueante com orçamento de tempo
// 3. Guarda o resultado e volta a sessão para Idle (sempre)
// 4. Notifica a camada de conversa via `RunObserver::on_run`
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use super::capture::OutputCapture;
use super::result::{FailureKind, RunResult};
use super::sandbox::JsSandbox;
use super::session::PlaygroundSession;
use crate::config::PlaygroundConfig;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Consumidor do resultado de cada execução (camada de conversa)
pub trait RunObserver: Send + Sync {
    /// Chamado exatamente uma vez por execução concluída
    fn on_run(&self, source: &str, output: &str);
}

impl<F> RunObserver for F
where
    F: Fn(&str, &str) + Send + Sync,
{
    fn on_run(&self, source: &str, output: &str) {
        self(source, output)
    }
}

/// Observer que descarta as notificações
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_run(&self, _source: &str, _output: &str) {}
}

/// Recupera o lock mesmo se uma thread anterior entrou em panic segurando-o
fn lock(session: &Mutex<PlaygroundSession>) -> MutexGuard<'_, PlaygroundSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Garante a volta para `Idle` se a execução for abandonada no meio
/// (panic ou future descartado).
struct RunningGuard<'a> {
    session: &'a Mutex<PlaygroundSession>,
    armed: bool,
}

impl<'a> RunningGuard<'a> {
    fn finish(mut self, result: RunResult) {
        lock(self.session).finish_run(result);
        self.armed = false;
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("Playground run abandoned, restoring Idle status");
            lock(self.session).abort_run();
        }
    }
}

/// Orquestra uma execução do playground
///
/// # Exemplo
/// ```ignore
/// let runner = ChallengeRunner::new(JsSandbox::new(), Duration::from_secs(5));
/// let session = Mutex::new(PlaygroundSession::new("console.log('hi')"));
/// let result = runner.run(&session, &|code: &str, output: &str| {
///     println!("{code} => {output}");
/// }).await;
/// ```
#[derive(Debug, Clone)]
pub struct ChallengeRunner {
    sandbox: JsSandbox,
    timeout: Duration,
}

impl Default for ChallengeRunner {
    fn default() -> Self {
        Self::from_config(&PlaygroundConfig::default())
    }
}

impl ChallengeRunner {
    /// Cria runner com sandbox e orçamento de tempo explícitos
    pub fn new(sandbox: JsSandbox, timeout: Duration) -> Self {
        Self { sandbox, timeout }
    }

    /// Cria runner a partir da configuração carregada
    pub fn from_config(config: &PlaygroundConfig) -> Self {
        Self::new(JsSandbox::from_config(config), config.timeout())
    }

    /// Orçamento de tempo de parede por execução
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Executa o código atual da sessão.
    ///
    /// Retorna `None` sem tocar no status nem chamar o observer quando o
    /// código está em branco ou a sessão já está executando.
    pub async fn run(
        &self,
        session: &Mutex<PlaygroundSession>,
        observer: &dyn RunObserver,
    ) -> Option<RunResult> {
        let source = lock(session).begin_run()?;
        let guard = RunningGuard {
            session,
            armed: true,
        };

        log::debug!("▶ Playground run started ({} bytes)", source.len());
        let start = Instant::now();

        let result = self.execute(&source).await;

        match &result {
            RunResult::Success { transcript } => log::info!(
                "✅ Playground run succeeded in {}ms ({} lines)",
                start.elapsed().as_millis(),
                transcript.len()
            ),
            RunResult::Failure {
                kind, diagnostic, ..
            } => log::warn!(
                "❌ Playground run failed ({}) in {}ms: {}",
                kind.as_str(),
                start.elapsed().as_millis(),
                diagnostic
            ),
        }

        guard.finish(result.clone());
        observer.on_run(&source, &result.reported_text());

        Some(result)
    }

    /// Executa o snapshot em um worker com orçamento de tempo.
    ///
    /// Em caso de estouro o worker é abandonado; o limite de loop da
    /// engine o encerra depois.
    async fn execute(&self, source: &str) -> RunResult {
        let capture = OutputCapture::new();
        let worker_capture = capture.clone();
        let sandbox = self.sandbox.clone();
        let code = source.to_string();

        let worker = tokio::task::spawn_blocking(move || sandbox.evaluate(&code, &worker_capture));

        match timeout(self.timeout, worker).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                let diagnostic = format!("Sandbox worker failed: {}", join_error);
                log::warn!("{}", diagnostic);
                host_failure(capture, FailureKind::Host, diagnostic)
            }
            Err(_) => {
                let diagnostic = format!(
                    "Execution timeout after {}ms",
                    self.timeout.as_millis()
                );
                log::warn!("⏱️ {} (worker detached)", diagnostic);
                host_failure(capture, FailureKind::Timeout, diagnostic)
            }
        }
    }
}

fn host_failure(capture: OutputCapture, kind: FailureKind, diagnostic: String) -> RunResult {
    capture.emit_error([diagnostic.as_str()]);
    RunResult::Failure {
        kind,
        diagnostic,
        transcript: capture.transcript(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playground::session::RunStatus;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, String)>>,
    }

    impl RunObserver for Recorder {
        fn on_run(&self, source: &str, output: &str) {
            self.calls
                .lock()
                .unwrap()
                .push((source.to_string(), output.to_string()));
        }
    }

    fn session(code: &str) -> Mutex<PlaygroundSession> {
        Mutex::new(PlaygroundSession::new(code))
    }

    #[tokio::test]
    async fn test_success_notifies_observer() {
        let runner = ChallengeRunner::default();
        let session = session("console.log('hi')");
        let recorder = Recorder::default();

        let result = runner.run(&session, &recorder).await.unwrap();

        assert!(result.is_success());
        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("console.log('hi')".to_string(), "hi\n".to_string()));
        assert_eq!(session.lock().unwrap().status(), RunStatus::Idle);
    }

    #[tokio::test]
    async fn test_failure_reports_banner() {
        let runner = ChallengeRunner::default();
        let session = session("console.log('a'); throw new Error('boom')");
        let recorder = Recorder::default();

        let result = runner.run(&session, &recorder).await.unwrap();

        assert!(!result.is_success());
        let calls = recorder.calls.lock().unwrap();
        assert!(calls[0].1.starts_with("a\n"));
        assert!(calls[0].1.ends_with("❌ Error: boom"));
        let guard = session.lock().unwrap();
        assert_eq!(guard.status(), RunStatus::Idle);
        assert!(guard.output_text().contains("boom"));
    }

    #[tokio::test]
    async fn test_blank_source_refused() {
        let runner = ChallengeRunner::default();
        let session = session("   ");
        let recorder = Recorder::default();

        assert!(runner.run(&session, &recorder).await.is_none());
        assert!(recorder.calls.lock().unwrap().is_empty());
        assert!(session.lock().unwrap().last_result().is_none());
    }

    #[tokio::test]
    async fn test_refused_while_running() {
        let runner = ChallengeRunner::default();
        let session = session("console.log(1)");
        session.lock().unwrap().begin_run();

        assert!(runner.run(&session, &NoopObserver).await.is_none());
        assert!(session.lock().unwrap().is_running());
    }

    #[tokio::test]
    async fn test_timeout_returns_to_idle() {
        let runner = ChallengeRunner::new(JsSandbox::new(), Duration::from_millis(100));
        // Espera ativa finita: o worker abandonado termina sozinho
        let session = session(
            "console.log('start'); const end = Date.now() + 400; while (Date.now() < end) {}",
        );

        let result = runner.run(&session, &NoopObserver).await.unwrap();

        assert_eq!(result.failure_kind(), Some(FailureKind::Timeout));
        assert!(result.diagnostic().unwrap().contains("timeout"));
        assert_eq!(session.lock().unwrap().status(), RunStatus::Idle);
    }

    #[tokio::test]
    async fn test_loop_limit_failure() {
        let sandbox = JsSandbox::new().loop_limit(10_000);
        let runner = ChallengeRunner::new(sandbox, Duration::from_secs(10));
        let session = session("for (;;) {}");

        let result = runner.run(&session, &NoopObserver).await.unwrap();

        assert_eq!(result.failure_kind(), Some(FailureKind::ResourceLimit));
    }

    #[tokio::test]
    async fn test_closure_observer() {
        let runner = ChallengeRunner::default();
        let session = session("console.warn('careful')");
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&seen);
        let observer = move |_code: &str, output: &str| {
            sink.lock().unwrap().push_str(output);
        };

        runner.run(&session, &observer).await.unwrap();

        assert!(seen.lock().unwrap().contains("careful"));
    }

    #[tokio::test]
    async fn test_each_run_gets_fresh_capture() {
        let runner = ChallengeRunner::default();
        let session = session("console.log('once')");

        runner.run(&session, &NoopObserver).await.unwrap();
        let second = runner.run(&session, &NoopObserver).await.unwrap();

        assert_eq!(second.transcript().render(), "once\n");
    }

    #[tokio::test]
    async fn test_dropped_run_restores_idle() {
        let runner = ChallengeRunner::new(JsSandbox::new(), Duration::from_secs(30));
        let session = session("const end = Date.now() + 300; while (Date.now() < end) {}");

        // O future é descartado no meio da execução
        let _ = tokio::time::timeout(
            Duration::from_millis(50),
            runner.run(&session, &NoopObserver),
        )
        .await;

        assert_eq!(session.lock().unwrap().status(), RunStatus::Idle);
    }
}
