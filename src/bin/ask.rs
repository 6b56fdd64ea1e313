use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use math_tutor::client::HttpTutorClient;
use math_tutor::config::Config;
use math_tutor::models::{AnswerRecord, InputType, QuestionRequest};
use math_tutor::normalize::answer_text;
use math_tutor::practice::generate_practice_question;
use math_tutor::redis::RedisManager;
use math_tutor::repository::{HistoryRepository, RedisHistoryRepository};
use math_tutor::session::TutorSession;

#[derive(Parser)]
#[command(name = "math-tutor-ask", about = "Ask the math tutor proxy a question")]
struct Cli {
    /// Full URL of the proxy's solve endpoint
    #[arg(long, default_value = "http://127.0.0.1:8787/solve")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a question
    Solve {
        question: String,
        #[arg(long, default_value = "general-mathematics")]
        subject: String,
        /// text, voice or image (image expects a data URI as the question)
        #[arg(long, default_value = "text")]
        input_type: InputType,
        #[arg(long)]
        complex: bool,
        /// Save the answer to this user's history
        #[arg(long)]
        user: Option<String>,
    },
    /// Generate a practice question
    Practice { topic: Option<String> },
}

async fn history_repository(config: &Config) -> Option<Arc<dyn HistoryRepository>> {
    if !config.history.enabled {
        tracing::info!("History disabled in config, not saving");
        return None;
    }
    match RedisManager::new_with_config(config).await {
        Ok(redis) => Some(Arc::new(RedisHistoryRepository::new(
            Arc::new(redis),
            config.history.max_entries,
        ))),
        Err(e) => {
            tracing::warn!("History store unavailable: {}", e);
            None
        }
    }
}

fn print_record(record: &AnswerRecord) {
    println!("{} {}", "Question:".bold(), record.question);
    println!("{} {} ({})", "Subject:".bold(), record.subject, record.input_type);
    println!();
    println!("{}", record.answer);
    match (record.is_correct, &record.mistake) {
        (Some(true), _) => println!("\n{}", "Looks correct".green()),
        (Some(false), Some(mistake)) => println!("\n{}", mistake.yellow()),
        _ => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load();
    let client = Arc::new(HttpTutorClient::new(
        cli.url,
        config.server.bearer_token.clone(),
    ));

    match cli.command {
        Command::Solve {
            question,
            subject,
            input_type,
            complex,
            user,
        } => {
            let mut session = TutorSession::new(client);
            if user.is_some() {
                if let Some(repo) = history_repository(&config).await {
                    session = session.with_history(repo, user);
                }
            }
            let req = QuestionRequest::new(question, subject, input_type).complex(complex);
            let record = session.ask(req).await;
            print_record(&record);
        }
        Command::Practice { topic } => {
            let result = generate_practice_question(client.as_ref(), topic.as_deref()).await;
            println!("{}", answer_text(result));
        }
    }

    Ok(())
}
