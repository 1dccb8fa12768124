// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO PLAYGROUND E DO TUTOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Limites do sandbox e parâmetros da chamada ao tutor.
// Todas as configurações podem ser definidas via .env
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::str::FromStr;
use std::time::Duration;

/// Configuração do playground de código.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundConfig {
    /// Orçamento de tempo de parede por execução, em milissegundos.
    /// Padrão: 5000
    pub timeout_ms: u64,

    /// Máximo de iterações por loop dentro da engine.
    /// Padrão: 10_000_000
    pub loop_iteration_limit: u64,

    /// Profundidade máxima de recursão.
    /// Padrão: 512
    pub recursion_limit: usize,

    /// Duração do feedback "copiado" após copiar o código.
    /// Padrão: 2000
    pub copy_ack_ms: u64,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            loop_iteration_limit: 10_000_000,
            recursion_limit: 512,
            copy_ack_ms: 2_000,
        }
    }
}

impl PlaygroundConfig {
    /// Orçamento de tempo como `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Duração do feedback "copiado" como `Duration`
    pub fn copy_ack(&self) -> Duration {
        Duration::from_millis(self.copy_ack_ms)
    }
}

/// Configuração da chamada ao modelo tutor.
#[derive(Debug, Clone, PartialEq)]
pub struct TutorConfig {
    /// Modelo usado pelo cliente tutor.
    /// Padrão: "gemini-2.0-flash"
    pub model: String,

    /// Temperatura de geração.
    /// Padrão: 0.7
    pub temperature: f32,

    /// Máximo de tokens na resposta.
    /// Padrão: 2048
    pub max_output_tokens: u32,

    /// Quantidade de mensagens recentes enviadas como histórico.
    /// Padrão: 5
    pub history_window: usize,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.7,
            max_output_tokens: 2048,
            history_window: 5,
        }
    }
}

/// Lê uma variável numérica positiva; valores inválidos são ignorados
fn read_positive<T>(name: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default + std::fmt::Display,
{
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => {
            log::info!("📦 {}={}", name, value);
            Some(value)
        }
        _ => {
            log::warn!("⚠ Ignorando {}={:?} (valor inválido)", name, raw);
            None
        }
    }
}

/// Carrega configuração do playground a partir das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `PLAYGROUND_TIMEOUT_MS`: Tempo limite por execução (padrão: 5000)
/// - `PLAYGROUND_LOOP_LIMIT`: Iterações máximas por loop (padrão: 10000000)
/// - `PLAYGROUND_RECURSION_LIMIT`: Profundidade de recursão (padrão: 512)
/// - `PLAYGROUND_COPY_ACK_MS`: Duração do feedback "copiado" (padrão: 2000)
///
/// # Exemplo
///
/// ```rust,ignore
/// // .env
/// PLAYGROUND_TIMEOUT_MS=2000
///
/// // código
/// let config = load_playground_config();
/// assert_eq!(config.timeout_ms, 2000);
/// ```
pub fn load_playground_config() -> PlaygroundConfig {
    let mut config = PlaygroundConfig::default();

    if let Some(timeout) = read_positive("PLAYGROUND_TIMEOUT_MS") {
        config.timeout_ms = timeout;
    }
    if let Some(limit) = read_positive("PLAYGROUND_LOOP_LIMIT") {
        config.loop_iteration_limit = limit;
    }
    if let Some(limit) = read_positive("PLAYGROUND_RECURSION_LIMIT") {
        config.recursion_limit = limit;
    }
    if let Some(ack) = read_positive("PLAYGROUND_COPY_ACK_MS") {
        config.copy_ack_ms = ack;
    }

    log::info!(
        "🔧 Playground: timeout {}ms, loop limit {}, recursion limit {}",
        config.timeout_ms,
        config.loop_iteration_limit,
        config.recursion_limit
    );

    config
}

/// Carrega configuração do tutor a partir das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `TUTOR_MODEL`: Modelo (padrão: "gemini-2.0-flash")
/// - `TUTOR_TEMPERATURE`: Temperatura (padrão: 0.7)
/// - `TUTOR_MAX_OUTPUT_TOKENS`: Máximo de tokens (padrão: 2048)
/// - `TUTOR_HISTORY_WINDOW`: Mensagens de histórico enviadas (padrão: 5)
pub fn load_tutor_config() -> TutorConfig {
    let mut config = TutorConfig::default();

    if let Ok(model) = std::env::var("TUTOR_MODEL") {
        if !model.trim().is_empty() {
            config.model = model.trim().to_string();
            log::info!("📦 TUTOR_MODEL={}", config.model);
        }
    }

    // Temperatura 0.0 é válida, por isso não usa read_positive
    if let Ok(raw) = std::env::var("TUTOR_TEMPERATURE") {
        match raw.trim().parse::<f32>() {
            Ok(t) if (0.0..=2.0).contains(&t) => {
                config.temperature = t;
                log::info!("📦 TUTOR_TEMPERATURE={}", t);
            }
            _ => log::warn!("⚠ Ignorando TUTOR_TEMPERATURE={:?} (valor inválido)", raw),
        }
    }

    if let Some(tokens) = read_positive("TUTOR_MAX_OUTPUT_TOKENS") {
        config.max_output_tokens = tokens;
    }
    if let Some(window) = read_positive("TUTOR_HISTORY_WINDOW") {
        config.history_window = window;
    }

    config
}

/// Instala panic hook que registra o panic via `log` antes do hook padrão.
///
/// Panics dentro do worker do sandbox chegam ao runner como `JoinError`;
/// o hook garante que a causa fique no log mesmo quando a saída padrão
/// não é visível.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("unnamed");

        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic payload".to_string()
        };

        log::error!("[PANIC] Thread {} at {}: {}", thread_name, location, message);

        original_hook(panic_info);
    }));
}
