// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PLAYGROUND - Execução de desafios de código
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Fluxo de uma execução:
//
//   PlaygroundSession (código atual)
//        │ run()
//        ▼
//   ChallengeRunner ── snapshot + Running
//        │
//        ▼
//   JsSandbox::evaluate (engine nova + OutputCapture novo)
//        │
//        ▼
//   RunResult ── sessão volta para Idle ── RunObserver::on_run
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Buffer de captura da saída
pub mod capture;
/// Resultado de uma execução
pub mod result;
/// Ciclo completo de execução
pub mod runner;
/// Avaliação isolada de JavaScript
pub mod sandbox;
/// Estado da sessão do playground
pub mod session;

pub use capture::{CapturedLine, OutputCapture, Severity, Transcript, ERROR_PREFIX, WARNING_PREFIX};
pub use result::{FailureKind, RunResult, FAILURE_BANNER_PREFIX, NO_OUTPUT_PLACEHOLDER};
pub use runner::{ChallengeRunner, NoopObserver, RunObserver};
pub use sandbox::{JsSandbox, SandboxError, SandboxLimits};
pub use session::{PlaygroundSession, RunStatus, DEFAULT_COPY_ACK, IDLE_OUTPUT_HINT};
