use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use notion_exam_gen::models::{GenerationOutcome, NewFlashcard};
use notion_exam_gen::services::parse_answers;
use notion_exam_gen::{logger, App, Config, GenerationRequest};

#[derive(Parser)]
#[command(name = "notion-exam")]
#[command(version, about = "Turn Notion study notes into flashcards, MCQs and a mock exam")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, env = "NOTION_EXAM_CONFIG", help = "Optional TOML config file")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate flashcards, MCQs and a mock exam from the notes
    Generate {
        #[arg(long, help = "Difficulty (default: balanced)")]
        difficulty: Option<String>,
        #[arg(long, help = "Focus topics (default: none)")]
        focus: Option<String>,
        #[arg(long, short, help = "Also write the merged result to this JSON file")]
        output: Option<PathBuf>,
    },

    /// Show the first part of the collected notes
    Preview,

    /// Grade the MCQs of the last generation
    Grade {
        #[arg(long, help = "Chosen choice indexes, comma separated (e.g. 0,2,,1)")]
        answers: String,
    },

    /// Save a flashcard to the session
    SaveCard {
        #[arg(long)]
        question: String,
        #[arg(long)]
        answer: String,
        #[arg(long)]
        saved_at: Option<String>,
    },

    /// List saved flashcards
    SavedCards,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    let cli = Cli::parse();

    // 加载配置（缺少必需项时直接退出）
    let config = Config::load(cli.config.as_deref()).context("配置加载失败")?;

    let app = App::initialize(config)?;

    match cli.command {
        Commands::Generate {
            difficulty,
            focus,
            output,
        } => {
            let request = GenerationRequest::new(difficulty.as_deref(), focus.as_deref());
            match app.generate(&request, output.as_deref()).await? {
                GenerationOutcome::Generated(merged) => {
                    println!("{}", serde_json::to_string_pretty(&merged)?);
                }
                GenerationOutcome::NoSourceNotes => {
                    println!("No notes found in Notion.");
                }
            }
        }
        Commands::Preview => {
            println!("{}", app.preview().await?);
        }
        Commands::Grade { answers } => {
            let report = app.grade(&parse_answers(&answers))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::SaveCard {
            question,
            answer,
            saved_at,
        } => {
            let saved_at = saved_at.or_else(|| Some(chrono::Utc::now().to_rfc3339()));
            let saved = app.save_card(NewFlashcard {
                question,
                answer,
                saved_at,
            })?;
            println!("Flashcard saved successfully (#{})", saved.id);
        }
        Commands::SavedCards => {
            let cards = app.saved_cards()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "flashcards": cards }))?
            );
        }
    }

    Ok(())
}
