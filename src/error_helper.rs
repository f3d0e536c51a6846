use colored::*;

use crate::analytics::ExportFormat;
use crate::error::ChatGraphError;

/// Print the error followed by steps to fix it
pub fn print_error_with_help(error: &ChatGraphError) {
    eprintln!("\n{}", "❌ Erro".red().bold());
    eprintln!();
    eprintln!("Causa: {}", error);
    eprintln!();

    let hints = hints(error);
    if hints.is_empty() {
        return;
    }

    eprintln!("{}", "💡 Como resolver:".yellow().bold());
    for (i, hint) in hints.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, hint);
    }
    eprintln!();
}

fn hints(error: &ChatGraphError) -> Vec<String> {
    match error {
        ChatGraphError::UnknownFormat(_) => {
            let names: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.name()).collect();
            vec![format!("Formatos suportados: {}", names.join(", ").cyan())]
        }
        ChatGraphError::Io { path, .. } => vec![
            format!("Verifique se o arquivo existe: {}", path.display().to_string().cyan()),
            "Use um caminho absoluto em vez de relativo".to_string(),
        ],
        ChatGraphError::Json { .. } | ChatGraphError::TranscriptLayout(_) => vec![
            format!(
                "Use uma lista de mensagens: {}",
                r#"[{"role": "user", "content": "..."}]"#.cyan()
            ),
            format!(
                "Ou registros de histórico com {}",
                "chatId, userMessage, AiMessage".cyan()
            ),
        ],
        ChatGraphError::ChatNotFound(_) => vec![
            format!("Liste as conversas com {}", "campus-chat-graph chats list <ARQUIVO>".cyan()),
            "Confira o filtro --user: cada usuário só vê as próprias conversas".to_string(),
        ],
        ChatGraphError::MissingApiKey(var) => vec![
            format!("Defina a chave da API: {}", format!("export {}=sua-chave", var).cyan()),
            "Gere uma chave em https://aistudio.google.com/app/apikey".to_string(),
        ],
        ChatGraphError::Llm(_) => vec![
            "Verifique a conexão de rede".to_string(),
            "Confira se a chave da API é válida e tem cota disponível".to_string(),
        ],
    }
}
