// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS COMPARTILHADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tópicos de estudo disponíveis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// React (componentes, hooks)
    React,
    /// Node.js (runtime, módulos, I/O)
    #[serde(rename = "nodejs")]
    NodeJs,
    /// JavaScript puro
    JavaScript,
}

impl Topic {
    /// Identificador usado no prompt e na persistência
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::React => "react",
            Topic::NodeJs => "nodejs",
            Topic::JavaScript => "javascript",
        }
    }

    /// Converte string para tópico (case-insensitive)
    pub fn from_str_loose(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "react" => Some(Topic::React),
            "nodejs" | "node" | "node.js" => Some(Topic::NodeJs),
            "javascript" | "js" => Some(Topic::JavaScript),
            _ => None,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Nível de habilidade declarado pelo usuário
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    /// Iniciante
    #[default]
    Beginner,
    /// Intermediário
    Intermediate,
    /// Avançado
    Advanced,
}

impl SkillLevel {
    /// Nome usado no prompt do tutor
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Nível + experiência livre para um tópico
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillProfile {
    /// Nível declarado
    pub level: SkillLevel,
    /// Experiência descrita pelo aluno
    pub experience: String,
}

/// Perfil de habilidades por tópico
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserSkills {
    /// Perfil em React
    pub react: SkillProfile,
    /// Perfil em Node.js
    pub nodejs: SkillProfile,
    /// Perfil em JavaScript
    pub javascript: SkillProfile,
}

impl UserSkills {
    /// Perfil do tópico informado
    pub fn profile(&self, topic: Topic) -> &SkillProfile {
        match topic {
            Topic::React => &self.react,
            Topic::NodeJs => &self.nodejs,
            Topic::JavaScript => &self.javascript,
        }
    }

    /// Nível do tópico informado
    pub fn level_for(&self, topic: Topic) -> SkillLevel {
        self.profile(topic).level
    }
}

/// Autor de uma mensagem na conversa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Aluno
    User,
    /// Tutor
    Assistant,
}

/// Desafio de código sugerido pelo tutor.
///
/// Usado uma única vez para semear o código inicial do playground.
/// `expected_output` é apenas informativo: nenhuma correção automática
/// compara esse valor com o transcript.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChallenge {
    /// Código que semeia o playground
    pub initial_code: String,
    /// Enunciado do desafio
    pub description: String,
    /// Saída esperada (informativa)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
}

/// Mensagem da conversa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Identificador único
    pub id: String,
    /// Autor
    pub role: Role,
    /// Texto da mensagem
    pub content: String,
    /// Timestamp em milissegundos desde a época Unix
    pub timestamp: i64,
    /// Desafio anexado pelo tutor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<CodeChallenge>,
}

impl Message {
    /// Cria mensagem do usuário
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), None)
    }

    /// Cria mensagem do tutor, opcionalmente com desafio
    pub fn assistant(content: impl Into<String>, code_challenge: Option<CodeChallenge>) -> Self {
        Self::new(Role::Assistant, content.into(), code_challenge)
    }

    fn new(role: Role, content: String, code_challenge: Option<CodeChallenge>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now().timestamp_millis(),
            code_challenge,
        }
    }
}

/// Conversa sobre um tópico
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Identificador único
    pub id: String,
    /// Tópico da conversa
    pub topic: Topic,
    /// Mensagens em ordem cronológica
    pub messages: Vec<Message>,
    /// Criação
    pub created_at: DateTime<Utc>,
    /// Última atualização
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Inicia uma conversa com a mensagem de boas-vindas do tutor
    pub fn start(topic: Topic, level: SkillLevel) -> Self {
        let now = Utc::now();
        let welcome = format!(
            "Welcome to the {topic} learning journey! I see you're at a {level} level. \
             Let's start with some concepts appropriate for your experience level. \
             What would you like to learn about?"
        );

        Self {
            id: Uuid::new_v4().to_string(),
            topic,
            messages: vec![Message::assistant(welcome, None)],
            created_at: now,
            updated_at: now,
        }
    }

    /// Adiciona mensagem e atualiza `updated_at`
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Último desafio sugerido pelo tutor, se houver
    pub fn latest_challenge(&self) -> Option<&CodeChallenge> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == Role::Assistant)
            .find_map(|m| m.code_challenge.as_ref())
    }
}

/// Preferências persistidas do usuário
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Nome do aluno
    pub username: String,
    /// Habilidades declaradas
    pub skills: UserSkills,
    /// Conversas salvas
    #[serde(default)]
    pub conversations: Vec<Conversation>,
}

impl UserPreferences {
    /// Cria preferências sem conversas
    pub fn new(username: impl Into<String>, skills: UserSkills) -> Self {
        Self {
            username: username.into(),
            skills,
            conversations: Vec::new(),
        }
    }

    /// Conversa mais recente (restaurada ao abrir a aplicação)
    pub fn last_conversation(&self) -> Option<&Conversation> {
        self.conversations.last()
    }

    /// Substitui a conversa com o mesmo id, ou adiciona ao final
    pub fn upsert_conversation(&mut self, conversation: Conversation) {
        match self.conversations.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation,
            None => self.conversations.push(conversation),
        }
    }
}
