// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIPBOARD - Área de transferência do host
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use thiserror::Error;

/// Erros ao escrever na área de transferência
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Host negou o acesso (permissão, sessão sem display)
    #[error("Clipboard access denied: {0}")]
    Denied(String),

    /// Área de transferência indisponível nesta build/plataforma
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Facilidade de clipboard do host (`writeText`)
#[cfg_attr(test, mockall::automock)]
pub trait Clipboard {
    /// Escreve o texto na área de transferência
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard em memória, útil para hosts headless e testes
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    deny: bool,
}

impl MemoryClipboard {
    /// Clipboard vazio que aceita escritas
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard que recusa toda escrita
    pub fn denying() -> Self {
        Self {
            contents: None,
            deny: true,
        }
    }

    /// Último texto escrito
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.deny {
            return Err(ClipboardError::Denied("write refused by host".to_string()));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Clipboard do sistema via `arboard`
#[cfg(feature = "clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    /// Abre a área de transferência do sistema
    pub fn new() -> Result<Self, ClipboardError> {
        arboard::Clipboard::new()
            .map(|inner| Self { inner })
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Denied(e.to_string()))
    }
}
