// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ESTADO DA SESSÃO DO PLAYGROUND
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use super::result::RunResult;
use crate::clipboard::Clipboard;
use crate::types::CodeChallenge;
use std::time::{Duration, Instant};

/// Texto exibido no painel antes da primeira execução
pub const IDLE_OUTPUT_HINT: &str = "▶ Run your code to see the output here...";

/// Duração padrão do feedback "copiado"
pub const DEFAULT_COPY_ACK: Duration = Duration::from_secs(2);

/// Status de execução da sessão
///
/// Única transição válida: `Idle -> Running -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    /// Nenhuma execução em andamento
    #[default]
    Idle,
    /// Exatamente uma execução em andamento
    Running,
}

/// Estado de um playground: código atual, último resultado e status.
///
/// O código pode ser editado a qualquer momento, inclusive durante uma
/// execução; a execução em andamento usa o snapshot tirado no início.
#[derive(Debug, Clone)]
pub struct PlaygroundSession {
    initial_code: String,
    source: String,
    last_result: Option<RunResult>,
    status: RunStatus,
    copied_at: Option<Instant>,
    copy_ack: Duration,
}

impl Default for PlaygroundSession {
    fn default() -> Self {
        Self::new("")
    }
}

impl PlaygroundSession {
    /// Cria sessão com o código inicial informado
    pub fn new(initial_code: impl Into<String>) -> Self {
        let initial_code = initial_code.into();
        Self {
            source: initial_code.clone(),
            initial_code,
            last_result: None,
            status: RunStatus::Idle,
            copied_at: None,
            copy_ack: DEFAULT_COPY_ACK,
        }
    }

    /// Cria sessão semeada pelo desafio do tutor
    pub fn from_challenge(challenge: &CodeChallenge) -> Self {
        Self::new(challenge.initial_code.clone())
    }

    /// Define a duração do feedback "copiado"
    pub fn with_copy_ack(mut self, duration: Duration) -> Self {
        self.copy_ack = duration;
        self
    }

    /// Código atual (editável)
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Código usado pelo reset
    pub fn initial_code(&self) -> &str {
        &self.initial_code
    }

    /// Status de execução
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Há uma execução em andamento
    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    /// Último resultado, se houver
    pub fn last_result(&self) -> Option<&RunResult> {
        self.last_result.as_ref()
    }

    /// Edição livre, permitida em qualquer status
    pub fn set_source(&mut self, text: impl Into<String>) {
        self.source = text.into();
    }

    /// Restaura o código inicial e limpa o último resultado.
    ///
    /// Não altera o status de execução.
    pub fn reset(&mut self) {
        self.source = self.initial_code.clone();
        self.last_result = None;
    }

    /// Copia o código atual para a área de transferência.
    ///
    /// Falhas do host não viram erro: apenas o feedback "copiado" não é
    /// ativado.
    pub fn copy_source(&mut self, clipboard: &mut dyn Clipboard) -> bool {
        match clipboard.write_text(&self.source) {
            Ok(()) => {
                self.copied_at = Some(Instant::now());
                true
            }
            Err(e) => {
                log::warn!("📋 Copy failed: {}", e);
                false
            }
        }
    }

    /// Feedback "copiado" ativo agora
    pub fn is_copied(&self) -> bool {
        self.is_copied_at(Instant::now())
    }

    /// Feedback "copiado" ativo no instante informado
    pub fn is_copied_at(&self, now: Instant) -> bool {
        self.copied_at
            .map(|at| now.saturating_duration_since(at) < self.copy_ack)
            .unwrap_or(false)
    }

    /// Texto para o painel de saída
    pub fn output_text(&self) -> String {
        match &self.last_result {
            Some(result) => result.display_text(),
            None => IDLE_OUTPUT_HINT.to_string(),
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Transições usadas pelo runner
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Inicia uma execução, retornando o snapshot do código.
    ///
    /// Recusa (sem mudar o status) quando o código está em branco ou já
    /// existe uma execução em andamento.
    pub(crate) fn begin_run(&mut self) -> Option<String> {
        if self.status == RunStatus::Running {
            log::debug!("Run ignored: playground already running");
            return None;
        }
        if self.source.trim().is_empty() {
            log::debug!("Run ignored: source is blank");
            return None;
        }

        self.status = RunStatus::Running;
        Some(self.source.clone())
    }

    /// Finaliza a execução com o resultado, substituindo o anterior
    pub(crate) fn finish_run(&mut self, result: RunResult) {
        self.last_result = Some(result);
        self.status = RunStatus::Idle;
    }

    /// Volta para `Idle` sem resultado (execução abandonada)
    pub(crate) fn abort_run(&mut self) {
        self.status = RunStatus::Idle;
    }
}
