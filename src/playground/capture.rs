// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// OUTPUT CAPTURE - Buffer de saída do console
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Acumula as linhas emitidas por `console.log/warn/error` durante uma
// execução. Uma instância por execução: nunca reutilizada entre execuções
// nem compartilhada entre sessões.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Prefixo das linhas emitidas por `console.warn`
pub const WARNING_PREFIX: &str = "⚠️ Warning: ";

/// Prefixo das linhas emitidas por `console.error`
pub const ERROR_PREFIX: &str = "🔴 Error: ";

/// Severidade de uma linha capturada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// `console.log` / `console.info` / `console.debug`
    Info,
    /// `console.warn`
    Warning,
    /// `console.error` ou erro roteado pela fronteira do sandbox
    Error,
}

impl Severity {
    /// Prefixo fixo aplicado na renderização
    pub fn prefix(&self) -> &'static str {
        match self {
            Severity::Info => "",
            Severity::Warning => WARNING_PREFIX,
            Severity::Error => ERROR_PREFIX,
        }
    }
}

/// Uma linha capturada (valores já convertidos e unidos por espaço)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedLine {
    /// Canal de origem da linha
    pub severity: Severity,
    /// Texto sem prefixo
    pub text: String,
}

impl CapturedLine {
    /// Linha renderizada: prefixo + texto + `\n`
    pub fn render(&self) -> String {
        format!("{}{}\n", self.severity.prefix(), self.text)
    }
}

/// Registro imutável das linhas de uma execução
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    lines: Vec<CapturedLine>,
}

impl Transcript {
    /// Linhas na ordem de emissão
    pub fn lines(&self) -> &[CapturedLine] {
        &self.lines
    }

    /// Nenhuma linha capturada
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantidade de linhas
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Concatena todas as linhas; string vazia se nada foi emitido
    pub fn render(&self) -> String {
        self.lines.iter().map(CapturedLine::render).collect()
    }

    /// Quantidade de linhas com a severidade informada
    pub fn count(&self, severity: Severity) -> usize {
        self.lines.iter().filter(|l| l.severity == severity).count()
    }
}

/// Buffer de captura compartilhável entre a engine e o runner.
///
/// Clonar o handle não copia as linhas: ambos apontam para o mesmo buffer.
/// Isso permite ao runner ler a saída parcial de um worker que estourou o
/// tempo limite.
#[derive(Debug, Clone, Default)]
pub struct OutputCapture {
    lines: Arc<Mutex<Vec<CapturedLine>>>,
}

impl OutputCapture {
    /// Cria um buffer vazio
    pub fn new() -> Self {
        Self::default()
    }

    /// Intake de `console.log`
    pub fn emit_info<I, S>(&self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.emit(Severity::Info, values);
    }

    /// Intake de `console.warn`
    pub fn emit_warning<I, S>(&self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.emit(Severity::Warning, values);
    }

    /// Intake de `console.error`
    pub fn emit_error<I, S>(&self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.emit(Severity::Error, values);
    }

    /// Adiciona uma linha com os valores unidos por um espaço
    pub fn emit<I, S>(&self, severity: Severity, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");

        self.guard().push(CapturedLine { severity, text });
    }

    /// Renderiza todas as linhas acumuladas
    pub fn render(&self) -> String {
        self.transcript().render()
    }

    /// Snapshot imutável das linhas até agora
    pub fn transcript(&self) -> Transcript {
        Transcript {
            lines: self.guard().clone(),
        }
    }

    /// Nenhuma linha capturada até agora
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    // Um panic dentro da engine não pode esconder a saída já capturada
    fn guard(&self) -> MutexGuard<'_, Vec<CapturedLine>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
