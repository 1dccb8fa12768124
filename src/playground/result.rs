// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RESULTADO DE EXECUÇÃO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use super::capture::Transcript;
use serde::{Deserialize, Serialize};

/// Marcador exibido quando a execução termina sem nenhuma saída
pub const NO_OUTPUT_PLACEHOLDER: &str = "✅ Code executed successfully (no output)";

/// Prefixo do banner de falha
pub const FAILURE_BANNER_PREFIX: &str = "❌ Error: ";

/// Origem de uma falha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Código malformado (erro de sintaxe)
    Authoring,
    /// Exceção lançada durante a execução
    Runtime,
    /// Limite de loop/recursão da engine excedido
    ResourceLimit,
    /// Orçamento de tempo de parede excedido
    Timeout,
    /// Falha do próprio host (worker, instalação do console)
    Host,
}

impl FailureKind {
    /// Identificador usado nos logs
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Authoring => "authoring",
            FailureKind::Runtime => "runtime",
            FailureKind::ResourceLimit => "resource_limit",
            FailureKind::Timeout => "timeout",
            FailureKind::Host => "host",
        }
    }
}

/// Resultado de exatamente uma execução
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunResult {
    /// Execução completa; o transcript pode estar vazio
    Success {
        /// Saída completa da execução
        transcript: Transcript,
    },
    /// Execução interrompida por erro
    ///
    /// `transcript` mantém toda a saída parcial produzida antes da falha,
    /// incluindo a linha de erro roteada pela fronteira do sandbox.
    Failure {
        /// Origem da falha
        kind: FailureKind,
        /// Mensagem legível (nunca vazia)
        diagnostic: String,
        /// Saída parcial até a falha
        transcript: Transcript,
    },
}

impl RunResult {
    /// Execução terminou sem erro
    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Success { .. })
    }

    /// Transcript da execução (completo ou parcial)
    pub fn transcript(&self) -> &Transcript {
        match self {
            RunResult::Success { transcript } | RunResult::Failure { transcript, .. } => transcript,
        }
    }

    /// Mensagem de diagnóstico, apenas em falhas
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            RunResult::Success { .. } => None,
            RunResult::Failure { diagnostic, .. } => Some(diagnostic),
        }
    }

    /// Tipo da falha, se houver
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            RunResult::Success { .. } => None,
            RunResult::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Texto entregue ao callback `on_run`.
    ///
    /// Sucesso: `render()` do transcript, possivelmente vazio.
    /// Falha: saída parcial seguida do banner de erro.
    pub fn reported_text(&self) -> String {
        match self {
            RunResult::Success { transcript } => transcript.render(),
            RunResult::Failure {
                diagnostic,
                transcript,
                ..
            } => format!(
                "{}{}{}",
                transcript.render(),
                FAILURE_BANNER_PREFIX,
                diagnostic
            ),
        }
    }

    /// Texto exibido no painel de saída (nunca vazio)
    pub fn display_text(&self) -> String {
        match self {
            RunResult::Success { transcript } if transcript.is_empty() => {
                NO_OUTPUT_PLACEHOLDER.to_string()
            }
            _ => self.reported_text(),
        }
    }
}
