// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JS SANDBOX - Execução isolada de JavaScript (Boa Engine)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Cada execução cria um `Context` Boa novo. A única capacidade injetada é um
// objeto `console` cujos métodos escrevem no `OutputCapture` da execução.
//
// Características:
// - Nenhum estado sobrevive entre execuções (engine nova por execução)
// - Erros de sintaxe e exceções viram `RunResult::Failure`, nunca panic
// - Toda falha também é registrada no canal de erro do buffer
// - Limite de iterações de loop e recursão configurável
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use super::capture::{OutputCapture, Severity};
use super::result::{FailureKind, RunResult};
use crate::config::PlaygroundConfig;
use boa_engine::{
    js_string, object::ObjectInitializer, property::Attribute, Context, JsError,
    JsNativeErrorKind, JsObject, JsValue, NativeFunction, Script, Source,
};
use boa_gc::{Finalize, Trace};
use std::time::Instant;
use thiserror::Error;

/// Erros do host ao preparar a engine
#[derive(Debug, Error)]
pub enum SandboxError {
    /// Falha ao registrar o objeto `console` no contexto
    #[error("Failed to install console: {0}")]
    ConsoleInstall(String),

    /// `JSON.stringify` intrínseco indisponível na realm
    #[error("JSON.stringify unavailable: {0}")]
    JsonUnavailable(String),
}

/// Limites cooperativos aplicados pela engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxLimits {
    /// Máximo de iterações por loop
    pub loop_iteration_limit: u64,
    /// Profundidade máxima de recursão
    pub recursion_limit: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            loop_iteration_limit: 10_000_000,
            recursion_limit: 512,
        }
    }
}

impl SandboxLimits {
    fn apply(&self, context: &mut Context) {
        let limits = context.runtime_limits_mut();
        limits.set_loop_iteration_limit(self.loop_iteration_limit);
        limits.set_recursion_limit(self.recursion_limit);
    }
}

/// Sandbox para execução de JavaScript com captura do console
///
/// # Exemplo
/// ```ignore
/// let sandbox = JsSandbox::new();
/// let capture = OutputCapture::new();
/// let result = sandbox.evaluate("console.log('hi')", &capture);
/// assert_eq!(result.transcript().render(), "hi\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsSandbox {
    limits: SandboxLimits,
}

impl JsSandbox {
    /// Cria sandbox com limites padrão
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria sandbox a partir da configuração carregada
    pub fn from_config(config: &PlaygroundConfig) -> Self {
        Self {
            limits: SandboxLimits {
                loop_iteration_limit: config.loop_iteration_limit,
                recursion_limit: config.recursion_limit,
            },
        }
    }

    /// Define limite de iterações de loop
    pub fn loop_limit(mut self, limit: u64) -> Self {
        self.limits.loop_iteration_limit = limit;
        self
    }

    /// Define limite de recursão
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.limits.recursion_limit = limit;
        self
    }

    /// Limites aplicados a cada execução
    pub fn limits(&self) -> SandboxLimits {
        self.limits
    }

    /// Executa `source` em uma engine nova, com `console` ligado a `capture`.
    ///
    /// Síncrono: só retorna quando o script termina, lança, ou atinge um
    /// limite da engine. A saída parcial fica sempre em `capture`.
    pub fn evaluate(&self, source: &str, capture: &OutputCapture) -> RunResult {
        let start = Instant::now();

        let mut context = Context::default();
        self.limits.apply(&mut context);

        let renderer = match prepare_context(&mut context, capture) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::warn!("Sandbox setup failed: {}", e);
                let diagnostic = e.to_string();
                capture.emit_error([diagnostic.as_str()]);
                return RunResult::Failure {
                    kind: FailureKind::Host,
                    diagnostic,
                    transcript: capture.transcript(),
                };
            }
        };

        let wrapped_code = wrap_source(source);

        let outcome = match Script::parse(Source::from_bytes(&wrapped_code), None, &mut context) {
            Ok(script) => script
                .evaluate(&mut context)
                .map_err(|e| (classify_runtime(&e, &mut context), e)),
            Err(e) => Err((FailureKind::Authoring, e)),
        };

        // Callbacks de Promise pendentes escrevem antes do snapshot
        context.run_jobs();

        log::debug!(
            "Sandbox evaluation finished in {}ms",
            start.elapsed().as_millis()
        );

        match outcome {
            Ok(_) => RunResult::Success {
                transcript: capture.transcript(),
            },
            Err((kind, error)) => {
                let report = describe_error(&error, &renderer, &mut context);
                capture.emit_error([report.logged.as_str()]);
                RunResult::Failure {
                    kind,
                    diagnostic: report.diagnostic,
                    transcript: capture.transcript(),
                }
            }
        }
    }
}

/// Envolve o código em uma função strict para permitir `return` no topo
/// e manter as declarações no escopo da função.
fn wrap_source(source: &str) -> String {
    format!("(function() {{\n\"use strict\";\n{}\n}})();\n", source)
}

fn classify_runtime(error: &JsError, context: &mut Context) -> FailureKind {
    match error.try_native(context) {
        Ok(native) if matches!(native.kind, JsNativeErrorKind::RuntimeLimit) => {
            FailureKind::ResourceLimit
        }
        _ => FailureKind::Runtime,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONSOLE - Funções nativas ligadas ao buffer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Captura das funções nativas do console.
///
/// O buffer é dado Rust puro (sem ponteiros do GC), por isso é ignorado
/// pelo rastreamento. O renderer guarda um objeto da engine e é rastreado.
#[derive(Trace, Finalize)]
struct ConsoleChannel {
    #[unsafe_ignore_trace]
    capture: OutputCapture,
    #[unsafe_ignore_trace]
    severity: Severity,
    renderer: ValueRenderer,
}

fn console_method(
    capture: &OutputCapture,
    severity: Severity,
    renderer: &ValueRenderer,
) -> NativeFunction {
    NativeFunction::from_copy_closure_with_captures(
        |_this, args, channel, context| {
            let rendered: Vec<String> = args
                .iter()
                .map(|v| channel.renderer.render(v, context))
                .collect();
            channel.capture.emit(channel.severity, rendered);
            Ok(JsValue::undefined())
        },
        ConsoleChannel {
            capture: capture.clone(),
            severity,
            renderer: renderer.clone(),
        },
    )
}

/// Captura o renderer e instala o `console` antes de qualquer código do usuário
fn prepare_context(
    context: &mut Context,
    capture: &OutputCapture,
) -> Result<ValueRenderer, SandboxError> {
    let renderer = ValueRenderer::from_intrinsics(context)?;
    install_console(context, capture, &renderer)?;
    Ok(renderer)
}

fn install_console(
    context: &mut Context,
    capture: &OutputCapture,
    renderer: &ValueRenderer,
) -> Result<(), SandboxError> {
    let console = ObjectInitializer::new(context)
        .function(console_method(capture, Severity::Info, renderer), js_string!("log"), 0)
        .function(console_method(capture, Severity::Info, renderer), js_string!("info"), 0)
        .function(console_method(capture, Severity::Info, renderer), js_string!("debug"), 0)
        .function(console_method(capture, Severity::Warning, renderer), js_string!("warn"), 0)
        .function(console_method(capture, Severity::Error, renderer), js_string!("error"), 0)
        .build();

    context
        .register_global_property(
            js_string!("console"),
            console,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        )
        .map_err(|e| SandboxError::ConsoleInstall(e.to_string()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RENDERIZAÇÃO DE VALORES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// A forma estrutural vem do próprio `JSON.stringify(v, null, 2)` da engine,
// capturado da realm antes do script rodar. Reatribuir `JSON.stringify` no
// código do usuário não altera a renderização.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Converte argumentos do console em texto legível.
///
/// - Objetos e arrays: `JSON.stringify` com indentação de 2 espaços
/// - Instâncias de `Error`: `Nome: mensagem`
/// - Funções e primitivos: `String(valor)`
/// - Estruturas cíclicas ou não serializáveis: forma de exibição da engine
#[derive(Clone, Trace, Finalize)]
pub(crate) struct ValueRenderer {
    stringify: JsObject,
}

impl ValueRenderer {
    /// Obtém o `JSON.stringify` intrínseco da realm do contexto
    pub(crate) fn from_intrinsics(context: &mut Context) -> Result<Self, SandboxError> {
        let json = context.intrinsics().objects().json();
        let stringify = json
            .get(js_string!("stringify"), context)
            .map_err(|e| SandboxError::JsonUnavailable(e.to_string()))?;

        stringify
            .as_callable()
            .cloned()
            .map(|stringify| Self { stringify })
            .ok_or_else(|| SandboxError::JsonUnavailable("not callable".to_string()))
    }

    pub(crate) fn render(&self, value: &JsValue, context: &mut Context) -> String {
        let Some(object) = value.as_object() else {
            return js_string_form(value, context);
        };

        if object.is_callable() {
            return js_string_form(value, context);
        }

        if let Ok(native) = JsError::from_opaque(value.clone()).try_native(context) {
            return native.to_string();
        }

        let args = [value.clone(), JsValue::null(), JsValue::new(2)];
        match self.stringify.call(&JsValue::undefined(), &args, context) {
            Ok(json) if json.is_string() => js_string_form(&json, context),
            // `toJSON` devolvendo undefined
            Ok(_) => js_string_form(value, context),
            // Ciclos, BigInt, `toJSON` que lança
            Err(_) => value.display().to_string(),
        }
    }
}

fn js_string_form(value: &JsValue, context: &mut Context) -> String {
    match value.to_string(context) {
        Ok(s) => s.to_std_string_escaped(),
        // Symbols não aceitam ToString implícito
        Err(_) => value.display().to_string(),
    }
}

struct ErrorReport {
    /// Mensagem para o chamador
    diagnostic: String,
    /// Forma completa registrada no canal de erro
    logged: String,
}

fn describe_error(
    error: &JsError,
    renderer: &ValueRenderer,
    context: &mut Context,
) -> ErrorReport {
    if let Ok(native) = error.try_native(context) {
        let full = native.to_string();
        let diagnostic = if native.message().is_empty() {
            full.clone()
        } else {
            native.message().to_string()
        };
        return ErrorReport {
            diagnostic,
            logged: full,
        };
    }

    // Valor arbitrário lançado (`throw "texto"`, `throw {code: 1}`)
    let rendered = match error.as_opaque() {
        Some(value) => renderer.render(value, context),
        None => error.to_string(),
    };
    ErrorReport {
        diagnostic: rendered.clone(),
        logged: rendered,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
