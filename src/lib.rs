//! # Code Tutor - Playground de Código
//!
//! Este crate implementa o **playground** de um tutor de programação: o
//! aluno recebe um desafio, edita o código JavaScript, executa e a saída
//! capturada volta para a conversa com o tutor.
//!
//! ## Como funciona uma execução?
//!
//! 1. A sessão tira um snapshot do código e passa para `Running`
//! 2. Um `JsSandbox` cria uma engine nova, sem capacidades do host
//! 3. Um `console` substituto alimenta o `OutputCapture`
//! 4. O resultado (`RunResult`) é guardado e a sessão volta para `Idle`
//! 5. O `RunObserver` registrado recebe código e saída
//!
//! ## Arquitetura Principal
//!
//! ### 1. Playground (`playground`)
//! - **capture**: buffer ordenado de linhas (info, warning, error)
//! - **sandbox**: avaliação isolada com limites de loop e recursão
//! - **runner**: ciclo completo com orçamento de tempo
//! - **session**: código atual, reset, cópia e texto de saída
//!
//! ### 2. Conversa (`conversation`, `tutor`)
//! - Mensagens de execução no formato esperado pelo tutor
//! - Extração do bloco ```` ```challenge ```` das respostas do modelo
//! - Persistência das preferências do usuário
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use code_tutor::prelude::*;
//! use std::sync::Mutex;
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = ChallengeRunner::default();
//!     let session = Mutex::new(PlaygroundSession::new("console.log({ a: 1 })"));
//!     runner.run(&session, &NoopObserver).await;
//!     println!("{}", session.lock().unwrap().output_text());
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Tipos fundamentais compartilhados por todo o sistema.
///
/// - [`Topic`]: Tópicos de estudo
/// - [`SkillLevel`]: Nível declarado do aluno
/// - [`CodeChallenge`]: Desafio que semeia o playground
/// - [`Conversation`] e [`Message`]: Histórico com o tutor
/// - [`UserPreferences`]: Dados persistidos
pub mod types;

/// Playground: captura de saída, sandbox, runner e estado da sessão.
pub mod playground;

/// Área de transferência do host (trait + implementações).
pub mod clipboard;

/// Configuração via variáveis de ambiente.
///
/// Carrega limites do playground e parâmetros do tutor:
/// - `PLAYGROUND_TIMEOUT_MS`, `PLAYGROUND_LOOP_LIMIT`, ...
/// - `TUTOR_MODEL`, `TUTOR_TEMPERATURE`, ...
pub mod config;

/// Cliente do modelo tutor.
///
/// Define a trait `TutorClient`, a requisição com janela de histórico e
/// a extração de desafios das respostas.
pub mod tutor;

/// Camada de conversa e persistência de preferências.
pub mod conversation;

pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use config::{load_playground_config, load_tutor_config, PlaygroundConfig, TutorConfig};
pub use conversation::{ConversationLog, PreferenceStore, PREFERENCES_KEY};
pub use playground::{
    ChallengeRunner, FailureKind, JsSandbox, OutputCapture, PlaygroundSession, RunObserver,
    RunResult, RunStatus,
};
pub use tutor::{TutorClient, TutorReply, TutorRequest};
pub use types::*;

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude com imports comuns para uso rápido.
///
/// ```rust,ignore
/// use code_tutor::prelude::*;
/// ```
pub mod prelude {
    pub use crate::conversation::{ConversationLog, MemoryPreferenceStore, PreferenceStore};
    pub use crate::playground::{
        ChallengeRunner, FailureKind, JsSandbox, NoopObserver, OutputCapture, PlaygroundSession,
        RunObserver, RunResult, RunStatus, Severity,
    };
    pub use crate::tutor::{TutorClient, TutorReply, TutorRequest};
    pub use crate::types::*;
}
