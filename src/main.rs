// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PLAYGROUND CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Executa um ciclo do playground e imprime a saída.
//
// Uso:
//   playground-cli solucao.js
//   cat solucao.js | playground-cli -
//   playground-cli --challenge desafio.json      (roda o código inicial)
//   playground-cli solucao.js --challenge desafio.json
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use anyhow::Context as _;
use code_tutor::config::{install_panic_hook, load_playground_config};
use code_tutor::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Tenta carregar o arquivo .env de múltiplos locais possíveis
fn load_dotenv() {
    let possible_paths = [PathBuf::from(".env"), PathBuf::from("../.env")];

    for path in &possible_paths {
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => {
                    eprintln!(
                        "✓ Carregado .env de: {:?}",
                        path.canonicalize().unwrap_or(path.clone())
                    );
                    return;
                }
                Err(e) => {
                    eprintln!("⚠ Erro ao carregar {:?}: {}", path, e);
                }
            }
        }
    }
}

/// Argumentos da linha de comando
struct CliArgs {
    source: Option<String>,
    challenge: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Option<CliArgs> {
    let mut source = None;
    let mut challenge = None;
    let mut rest = args.iter().skip(1);

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--challenge" => challenge = Some(PathBuf::from(rest.next()?)),
            "-h" | "--help" => return None,
            other if source.is_none() => source = Some(other.to_string()),
            _ => return None,
        }
    }

    if source.is_none() && challenge.is_none() {
        return None;
    }
    Some(CliArgs { source, challenge })
}

fn print_usage(program: &str) {
    eprintln!("Playground CLI v{}", code_tutor::VERSION);
    eprintln!();
    eprintln!("Uso: {} <arquivo.js | -> [--challenge <desafio.json>]", program);
    eprintln!();
    eprintln!("Opções:");
    eprintln!("  -                       Lê o código da entrada padrão");
    eprintln!("  --challenge <arquivo>   Desafio em JSON (initialCode, description, expectedOutput)");
}

fn read_source(arg: &str) -> anyhow::Result<String> {
    if arg == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("falha ao ler a entrada padrão")?;
        return Ok(buffer);
    }

    std::fs::read_to_string(arg).with_context(|| format!("falha ao ler {}", arg))
}

fn read_challenge(path: &Path) -> anyhow::Result<CodeChallenge> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("falha ao ler {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("desafio inválido em {}", path.display()))
}

/// Descrição do desafio e, se houver, a saída esperada (apenas informativa)
fn challenge_banner(challenge: &CodeChallenge) -> String {
    let mut banner = format!("{}\n", challenge.description);
    if let Some(expected) = &challenge.expected_output {
        banner.push_str(&format!("Saída esperada: {}\n", expected));
    }
    banner.push('\n');
    banner
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    install_panic_hook();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("playground-cli");

    let Some(cli) = parse_args(&args) else {
        print_usage(program);
        std::process::exit(1);
    };

    let challenge = cli.challenge.as_deref().map(read_challenge).transpose()?;

    let mut session = match &challenge {
        Some(challenge) => PlaygroundSession::from_challenge(challenge),
        None => PlaygroundSession::default(),
    };
    if let Some(source) = &cli.source {
        session.set_source(read_source(source)?);
    }

    let config = load_playground_config();
    let session = Mutex::new(session.with_copy_ack(config.copy_ack()));
    let runner = ChallengeRunner::from_config(&config);

    if let Some(challenge) = &challenge {
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!(" DESAFIO");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        print!("{}", challenge_banner(challenge));
    }

    let observer = |code: &str, output: &str| {
        log::debug!("📨 Run reported ({} bytes of code, {} bytes of output)", code.len(), output.len());
    };

    let Some(result) = runner.run(&session, &observer).await else {
        eprintln!("✗ Nada para executar: o código está em branco");
        std::process::exit(1);
    };

    let output = session
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .output_text();
    println!("{}", output);

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
