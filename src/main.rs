use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use campus_chat_graph::analytics::{
    build_graph, export, render, summarize, ExportFormat, FrequencyTable, RenderOutcome,
    SvgRenderer,
};
use campus_chat_graph::assistant::{Conversation, GeminiClient, UserProfile};
use campus_chat_graph::transcript::{Message, Transcript, TranscriptFile};
use campus_chat_graph::{error_helper, reporter, AppConfig, ChatGraphError, Vocabulary};

#[derive(Parser)]
#[command(name = "campus-chat-graph")]
#[command(about = "Keyword graphs and FAQ assistant for university chat transcripts", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TranscriptArgs {
    /// Chat transcript JSON file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Only analyze the chat with this id
    #[arg(long, value_name = "ID")]
    chat: Option<String>,

    /// Only analyze the chats of this user id
    #[arg(long, value_name = "ID")]
    user: Option<String>,

    /// Keyword vocabulary file (JSON array or one term per line)
    #[arg(long, value_name = "FILE")]
    vocab: Option<PathBuf>,
}

#[derive(Args)]
struct ProfileArgs {
    /// User name used to personalize answers
    #[arg(long)]
    name: Option<String>,

    /// User type (estudante, professor, funcionario)
    #[arg(long)]
    user_type: Option<String>,

    /// Academic registration number
    #[arg(long)]
    ra: Option<String>,

    /// Course name
    #[arg(long)]
    course: Option<String>,
}

impl ProfileArgs {
    fn into_profile(self) -> UserProfile {
        let defaults = UserProfile::default();
        UserProfile {
            name: self.name.unwrap_or(defaults.name),
            user_type: self.user_type.unwrap_or(defaults.user_type),
            ra: self.ra.unwrap_or(defaults.ra),
            course: self.course.unwrap_or(defaults.course),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export the keyword co-occurrence graph
    Graph {
        #[command(flatten)]
        input: TranscriptArgs,

        /// Export format (json, csv, text, dot)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show keyword statistics
    Stats {
        #[command(flatten)]
        input: TranscriptArgs,
    },

    /// Draw the keyword graph and top terms as SVG
    Render {
        #[command(flatten)]
        input: TranscriptArgs,

        /// Output SVG file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// List or delete the chats of a transcript
    Chats {
        #[command(subcommand)]
        action: ChatsCommand,
    },

    /// Ask the FAQ assistant a question
    Ask {
        /// The question
        #[arg(value_name = "QUESTION")]
        question: String,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Transcript used as memory; the new exchange is appended to it
        #[arg(long, value_name = "FILE")]
        history: Option<PathBuf>,

        /// Chat id inside the history file
        #[arg(long, value_name = "ID")]
        chat: Option<String>,

        /// User id owning the chat
        #[arg(long, value_name = "ID")]
        user: Option<String>,
    },

    /// Print the personalized system prompt
    Prompt {
        #[command(flatten)]
        profile: ProfileArgs,
    },
}

#[derive(Subcommand)]
enum ChatsCommand {
    /// List the chats of a transcript
    List {
        /// Chat transcript JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Only list the chats of this user id
        #[arg(long, value_name = "ID")]
        user: Option<String>,
    },

    /// Mark every record of a chat as deleted
    Delete {
        /// Chat history JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Chat id
        #[arg(value_name = "ID")]
        id: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        match err.downcast_ref::<ChatGraphError>() {
            Some(known) => error_helper::print_error_with_help(known),
            None => eprintln!("❌ {:#}", err),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Graph {
            input,
            format,
            output,
        } => {
            let format: ExportFormat = format.parse()?;
            let (messages, vocabulary) = load_input(&config, &input)?;
            let (graph, keywords) = build_graph(&messages, &vocabulary);
            let data = export(&graph, &keywords, format);

            match output {
                Some(path) => {
                    std::fs::write(&path, &data)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("📊 Nós: {}  Arestas: {}", graph.node_count(), graph.edge_count());
                    println!("✅ Exportado ({}) para: {}", format, path.display());
                    if format == ExportFormat::Dot {
                        println!("💡 Visualize com Graphviz:");
                        println!("   neato -Tsvg {} -o grafo.svg", path.display());
                    }
                }
                None => print!("{}", data),
            }
            Ok(())
        }
        Commands::Stats { input } => {
            let (messages, vocabulary) = load_input(&config, &input)?;
            println!("💬 Analisando: {}", input.file.display());

            let (graph, keywords) = build_graph(&messages, &vocabulary);
            let frequencies = FrequencyTable::from_keywords(&keywords);
            let stats = summarize(&graph, &keywords);
            reporter::print_report(&graph, &frequencies, &stats);
            Ok(())
        }
        Commands::Render { input, output } => {
            let (messages, vocabulary) = load_input(&config, &input)?;
            let (graph, keywords) = build_graph(&messages, &vocabulary);

            match render(&graph, &keywords, &SvgRenderer::default()) {
                RenderOutcome::Rendered(svg) => {
                    std::fs::write(&output, svg)
                        .with_context(|| format!("Failed to write {}", output.display()))?;
                    println!(
                        "✅ Grafo com {} termos salvo em: {}",
                        graph.node_count(),
                        output.display()
                    );
                }
                RenderOutcome::Skipped(reason) => println!("{}", reason.message()),
            }
            Ok(())
        }
        Commands::Chats { action } => run_chats(action),
        Commands::Ask {
            question,
            profile,
            history,
            chat,
            user,
        } => {
            let client = GeminiClient::from_config(&config)?;
            let runtime = tokio::runtime::Runtime::new()?;

            let mut stored = match &history {
                Some(path) if path.exists() => Some(TranscriptFile::load(path)?),
                Some(_) => Some(TranscriptFile::Messages(Vec::new())),
                None => None,
            };

            let chat_id = match (&chat, &stored) {
                (Some(id), _) => id.clone(),
                (None, Some(file)) => file
                    .to_transcript(user.as_deref())
                    .chats
                    .last()
                    .map(|c| c.id.clone())
                    .unwrap_or_else(new_chat_id),
                (None, None) => new_chat_id(),
            };

            let memory: Vec<Message> = stored
                .as_ref()
                .and_then(|file| file.to_transcript(user.as_deref()).chat(&chat_id).map(|c| c.messages.clone()))
                .unwrap_or_default();
            info!(chat = %chat_id, remembered = memory.len(), "asking assistant");

            let mut conversation =
                Conversation::new(client, &profile.into_profile()).with_history(memory);
            let answer = runtime.block_on(conversation.send(&question));
            println!("{}", answer);

            if let (Some(path), Some(file)) = (&history, stored.as_mut()) {
                file.push_exchange(&chat_id, user.as_deref(), &question, &answer);
                file.save(path)?;
                println!("\n💾 Histórico salvo em: {}", path.display());
            }
            Ok(())
        }
        Commands::Prompt { profile } => {
            println!("{}", profile.into_profile().personalized_prompt());
            Ok(())
        }
    }
}

fn run_chats(action: ChatsCommand) -> Result<()> {
    match action {
        ChatsCommand::List { file, user } => {
            let transcript = Transcript::load(&file, user.as_deref())?;
            if transcript.chats.is_empty() {
                println!("📝 Nenhuma conversa encontrada");
                return Ok(());
            }

            println!("💬 {} conversa(s):\n", transcript.chats.len());
            for chat in &transcript.chats {
                let created = chat
                    .created_at
                    .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}  {}", chat.id, chat.name);
                println!("   📅 {}  mensagens: {}", created, chat.messages.len());
            }
            Ok(())
        }
        ChatsCommand::Delete { file, id } => {
            let mut stored = TranscriptFile::load(&file)?;
            let flagged = stored.delete_chat(&id);
            if flagged == 0 {
                return Err(ChatGraphError::ChatNotFound(id).into());
            }

            stored.save(&file)?;
            println!("🗑️ Conversa {} removida ({} registro(s) marcados)", id, flagged);
            Ok(())
        }
    }
}

fn load_input(
    config: &AppConfig,
    input: &TranscriptArgs,
) -> Result<(Vec<Message>, Vocabulary)> {
    let vocabulary = config.vocabulary(input.vocab.as_deref())?;
    let messages = load_messages(&input.file, input.chat.as_deref(), input.user.as_deref())?;
    Ok((messages, vocabulary))
}

fn load_messages(file: &Path, chat: Option<&str>, user: Option<&str>) -> Result<Vec<Message>> {
    let transcript = Transcript::load(file, user)?;
    match transcript.select(chat) {
        Some(messages) => Ok(messages),
        None => Err(ChatGraphError::ChatNotFound(chat.unwrap_or_default().to_string()).into()),
    }
}

fn new_chat_id() -> String {
    chrono::Utc::now().format("%y%m%d%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_graph_command() {
        let cli = Cli::try_parse_from([
            "campus-chat-graph",
            "-vv",
            "graph",
            "chat.json",
            "--format",
            "csv",
            "--chat",
            "a1",
            "--user",
            "ana",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Graph { input, format, output } => {
                assert_eq!(input.file, PathBuf::from("chat.json"));
                assert_eq!(input.chat.as_deref(), Some("a1"));
                assert_eq!(input.user.as_deref(), Some("ana"));
                assert_eq!(format, "csv");
                assert!(output.is_none());
            }
            _ => panic!("expected graph command"),
        }
    }

    #[test]
    fn test_cli_parses_chats_commands() {
        let cli = Cli::try_parse_from(["campus-chat-graph", "chats", "delete", "h.json", "a1"]).unwrap();
        match cli.command {
            Commands::Chats {
                action: ChatsCommand::Delete { file, id },
            } => {
                assert_eq!(file, PathBuf::from("h.json"));
                assert_eq!(id, "a1");
            }
            _ => panic!("expected chats delete"),
        }

        let cli =
            Cli::try_parse_from(["campus-chat-graph", "chats", "list", "h.json", "--user", "ana"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Chats { action: ChatsCommand::List { user: Some(ref u), .. } } if u == "ana"
        ));
    }

    #[test]
    fn test_chats_delete_flags_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"[{"chatId": "a1", "userId": "ana", "userMessage": "Bolsa?", "AiMessage": "Sim."},
                {"chatId": "b2", "userId": "ana", "userMessage": "Enem?", "AiMessage": "Sim."}]"#,
        )
        .unwrap();

        run_chats(ChatsCommand::Delete {
            file: file.path().to_path_buf(),
            id: "a1".to_string(),
        })
        .unwrap();

        let messages = load_messages(file.path(), None, Some("ana")).unwrap();
        assert_eq!(messages, vec![Message::user("Enem?"), Message::assistant("Sim.")]);

        let err = run_chats(ChatsCommand::Delete {
            file: file.path().to_path_buf(),
            id: "a1".to_string(),
        })
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatGraphError>(),
            Some(ChatGraphError::ChatNotFound(_))
        ));
    }

    #[test]
    fn test_profile_defaults() {
        let cli = Cli::try_parse_from(["campus-chat-graph", "prompt", "--name", "Ana"]).unwrap();
        match cli.command {
            Commands::Prompt { profile } => {
                let profile = profile.into_profile();
                assert_eq!(profile.name, "Ana");
                assert_eq!(profile.user_type, "estudante");
            }
            _ => panic!("expected prompt command"),
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
