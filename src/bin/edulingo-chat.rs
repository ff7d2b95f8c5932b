//! Interactive English-tutoring chat for EduLingo.
//!
//! This binary provides a REPL interface for asking English-learning
//! questions.  The conversation is persisted per student and resumes where
//! it left off.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with ./config.json
//! edulingo-chat
//!
//! # Explicit configuration file
//! edulingo-chat --config /etc/edulingo/config.json
//!
//! # Specify a model
//! edulingo-chat --model gpt-4o-mini
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Clear conversation history
//! - `/export [txt|json]` - Export the conversation to a file
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use edulingo::chat::{ChatArgs, ChatCommand, ChatConfig, TutorSession, help_text, parse_command};
use edulingo::{Config, ConversationStore, OpenAi, prompts};

/// Main entry point for the edulingo-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("edulingo-chat [OPTIONS]");
    let chat_config = ChatConfig::from(args);

    // A missing or invalid configuration file is a startup precondition
    // failure, not something to serve through.
    let config = match Config::load_from(&chat_config.config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("{}", err.user_message());
            std::process::exit(1);
        }
    };

    let gateway = match OpenAi::with_options(config.api_key.as_str(), None, None, config.proxy.as_deref()) {
        Ok(gateway) => gateway,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("{}", err.user_message());
            std::process::exit(1);
        }
    };

    let store = ConversationStore::new(config.history_file(), prompts::system_prompt());
    let mut session = TutorSession::new(gateway, store, chat_config, config.student_id.as_str());
    if let Err(err) = session.initialize_session() {
        // Seed write failed; the in-memory session still works.
        eprintln!("{}", err);
        println!("⚠️ {}", err.user_message());
    }

    let mut rl = DefaultEditor::new()?;

    // Ctrl+C during generation exits after the in-flight turn completes;
    // there is no mid-request cancellation.
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("{}\n", prompts::WELCOME_MESSAGE);
    println!("输入 /help 查看命令，/quit 退出\n");

    loop {
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("你: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("再见！");
                            break;
                        }
                        ChatCommand::Clear => match session.clear() {
                            Ok(()) => println!("✅ 对话已清空，可以开始新的学习会话！"),
                            Err(err) => {
                                eprintln!("{}", err);
                                println!("❌ {}", err.user_message());
                            }
                        },
                        ChatCommand::Export(format) => export_conversation(&session, &format),
                        ChatCommand::Stats => print_stats(&session),
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            println!("❌ {}", message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the model.
                match session.send(line).await {
                    Ok(outcome) => {
                        println!("AI助手: {}\n", outcome.reply);
                        if let Some(warning) = outcome.persist_warning {
                            eprintln!("{}", warning);
                            println!("⚠️ {}", warning.user_message());
                        }
                    }
                    Err(err) => {
                        eprintln!("{}", err);
                        println!("❌ {}", err.user_message());
                    }
                }

                if interrupted.load(Ordering::Relaxed) {
                    println!("再见！");
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\n再见！");
                break;
            }
            Err(err) => {
                eprintln!("Input error: {}", err);
                break;
            }
        }
    }

    Ok(())
}

fn export_conversation<G: edulingo::ChatModel>(session: &TutorSession<G>, format: &str) {
    if !session.has_conversation() {
        println!("📝 暂无对话记录可导出");
        return;
    }

    match session.export(format) {
        Ok(content) => {
            let file_name = format!(
                "edulingo_conversation_{}.{}",
                session.student_id(),
                format
            );
            match fs::write(&file_name, content) {
                Ok(()) => println!("📥 对话记录已导出: {}", file_name),
                Err(err) => {
                    eprintln!("failed to write {}: {}", file_name, err);
                    println!("❌ 导出失败，请检查磁盘权限");
                }
            }
        }
        Err(err) => {
            eprintln!("{}", err);
            println!("❌ {}", err.user_message());
        }
    }
}

fn print_stats<G: edulingo::ChatModel>(session: &TutorSession<G>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Student: {}", stats.student_id);
    println!("      Model: {}", stats.model);
    println!("      Temperature: {:.2}", stats.temperature);
    println!("      Messages: {}", stats.message_count);
    println!("      Requests: {}", stats.total_requests);
}
