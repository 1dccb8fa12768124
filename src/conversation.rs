// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CAMADA DE CONVERSA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Recebe o resultado de cada execução do playground e o transforma em uma
// mensagem do usuário. Também define a persistência das preferências
// (nome, habilidades e conversas).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;

use crate::playground::RunObserver;
use crate::types::{Conversation, Message, UserPreferences};

/// Chave de armazenamento das preferências
pub const PREFERENCES_KEY: &str = "userPreferences";

/// Formata a mensagem enviada ao tutor após uma execução
pub fn format_run_message(code: &str, output: &str) -> String {
    format!(
        "Here's my code solution:\n```javascript\n{}\n```\nOutput:\n```\n{}\n```",
        code, output
    )
}

/// Conversa que registra as execuções do playground como mensagens
#[derive(Debug)]
pub struct ConversationLog {
    conversation: Mutex<Conversation>,
}

impl ConversationLog {
    /// Envolve uma conversa existente
    pub fn new(conversation: Conversation) -> Self {
        Self {
            conversation: Mutex::new(conversation),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Adiciona uma mensagem qualquer (ex.: resposta do tutor)
    pub fn push(&self, message: Message) {
        self.guard().push(message);
    }

    /// Cópia da conversa atual
    pub fn snapshot(&self) -> Conversation {
        self.guard().clone()
    }

    /// Quantidade de mensagens
    pub fn len(&self) -> usize {
        self.guard().messages.len()
    }

    /// Conversa sem mensagens
    pub fn is_empty(&self) -> bool {
        self.guard().messages.is_empty()
    }

    /// Devolve a conversa, consumindo o log
    pub fn into_inner(self) -> Conversation {
        self.conversation
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl RunObserver for ConversationLog {
    fn on_run(&self, source: &str, output: &str) {
        if source.trim().is_empty() {
            return;
        }

        log::debug!("💬 Recording playground run in conversation");
        self.push(Message::user(format_run_message(source, output)));
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TRAIT: PreferenceStore - Persistência das preferências
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Armazenamento chave/valor das preferências do usuário.
///
/// Implementações disponíveis:
/// - `MemoryPreferenceStore`: em memória (testes, hosts efêmeros)
/// - `JsonFilePreferenceStore`: um arquivo JSON por chave
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Nome do backend
    fn name(&self) -> &'static str;

    /// Carrega as preferências salvas, se existirem
    async fn load(&self, key: &str) -> anyhow::Result<Option<UserPreferences>>;

    /// Salva (sobrescreve) as preferências
    async fn save(&self, key: &str, preferences: &UserPreferences) -> anyhow::Result<()>;
}

/// Backend em memória
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: RwLock<HashMap<String, UserPreferences>>,
}

impl MemoryPreferenceStore {
    /// Cria backend vazio
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, key: &str) -> anyhow::Result<Option<UserPreferences>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, preferences: &UserPreferences) -> anyhow::Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), preferences.clone());
        Ok(())
    }
}

/// Backend local que guarda cada chave em `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct JsonFilePreferenceStore {
    dir: PathBuf,
}

impl JsonFilePreferenceStore {
    /// Cria backend no diretório informado
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePreferenceStore {
    fn name(&self) -> &'static str {
        "json-file"
    }

    async fn load(&self, key: &str) -> anyhow::Result<Option<UserPreferences>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<UserPreferences>(&content) {
            Ok(preferences) => Ok(Some(preferences)),
            Err(e) => {
                log::warn!("⚠ Ignoring unreadable preferences at {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    async fn save(&self, key: &str, preferences: &UserPreferences) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string_pretty(preferences)?;
        std::fs::write(self.path_for(key), json)?;

        log::debug!("💾 Preferences saved ({})", key);
        Ok(())
    }
}
