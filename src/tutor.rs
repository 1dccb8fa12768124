// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE TUTOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Interface com o modelo tutor hospedado. O cliente é construído na
// inicialização da aplicação e injetado onde for necessário.
//
// A resposta do modelo pode conter um bloco ```challenge com JSON que vira
// um `CodeChallenge` para semear o playground.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Mutex;

use crate::config::TutorConfig;
use crate::types::{CodeChallenge, Conversation, Message, SkillLevel, Topic};

/// Erros do cliente tutor
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    /// Erro devolvido pela API do modelo
    #[error("API error: {0}")]
    ApiError(String),

    /// Resposta vazia
    #[error("Empty response from tutor model")]
    EmptyResponse,

    /// Falha de rede
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Primeiro bloco de desafio (conteúdo capturado)
static CHALLENGE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```challenge\r?\n([\s\S]*?)```").expect("valid challenge regex")
});

/// Todos os blocos de desafio, para remoção do texto
static ANY_CHALLENGE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```challenge[\s\S]*?```").expect("valid challenge regex"));

/// Requisição para o tutor
#[derive(Debug, Clone, PartialEq)]
pub struct TutorRequest {
    /// Mensagens mais recentes (janela configurável)
    pub history: Vec<Message>,
    /// Tópico da conversa
    pub topic: Topic,
    /// Nível do aluno no tópico
    pub level: SkillLevel,
    /// Modelo a usar
    pub model: String,
    /// Temperatura de geração
    pub temperature: f32,
    /// Máximo de tokens na resposta
    pub max_output_tokens: u32,
}

impl TutorRequest {
    /// Monta a requisição a partir da conversa, mantendo só a janela recente
    pub fn from_conversation(
        conversation: &Conversation,
        level: SkillLevel,
        config: &TutorConfig,
    ) -> Self {
        let skip = conversation
            .messages
            .len()
            .saturating_sub(config.history_window);

        Self {
            history: conversation.messages[skip..].to_vec(),
            topic: conversation.topic,
            level,
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// Contexto injetado no prompt de sistema
    pub fn context_line(&self) -> String {
        format!("Current context: Topic: {} | Level: {}", self.topic, self.level)
    }
}

/// Resposta do tutor já separada do desafio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorReply {
    /// Texto sem os blocos de desafio
    pub text: String,
    /// Desafio extraído, se houver
    pub challenge: Option<CodeChallenge>,
}

impl TutorReply {
    /// Extrai o desafio do texto bruto do modelo e remove os blocos.
    ///
    /// JSON malformado não é erro: a resposta segue sem desafio.
    pub fn from_raw(raw: &str) -> Self {
        let challenge = extract_challenge(raw);
        let text = ANY_CHALLENGE_BLOCK.replace_all(raw, "").into_owned();
        Self { text, challenge }
    }
}

/// Extrai o primeiro bloco ```challenge como `CodeChallenge`
pub fn extract_challenge(text: &str) -> Option<CodeChallenge> {
    let body = CHALLENGE_BLOCK.captures(text)?.get(1)?.as_str();

    match serde_json::from_str::<CodeChallenge>(body) {
        Ok(challenge) => Some(challenge),
        Err(e) => {
            log::warn!("Failed to parse code challenge: {}", e);
            None
        }
    }
}

/// Trait para clientes do modelo tutor
#[async_trait]
pub trait TutorClient: Send + Sync {
    /// Gera a próxima resposta do tutor
    async fn respond(&self, request: &TutorRequest) -> Result<TutorReply, TutorError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cliente mock que devolve um texto fixo e guarda as requisições
#[derive(Debug, Default)]
pub struct MockTutorClient {
    raw_reply: String,
    requests: Mutex<Vec<TutorRequest>>,
}

impl MockTutorClient {
    /// Cria mock que sempre devolve `raw_reply`
    pub fn new(raw_reply: impl Into<String>) -> Self {
        Self {
            raw_reply: raw_reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requisições recebidas até agora
    pub fn requests(&self) -> Vec<TutorRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TutorClient for MockTutorClient {
    async fn respond(&self, request: &TutorRequest) -> Result<TutorReply, TutorError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if self.raw_reply.trim().is_empty() {
            return Err(TutorError::EmptyResponse);
        }
        Ok(TutorReply::from_raw(&self.raw_reply))
    }
}
