use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use super::calendar_agent;
use crate::ai::chat::{Conversation, Turn};
use crate::ai::llm::OpenAIModel;
use crate::ai::router::AssistantRouter;
use crate::core::AppConfig;
use crate::openai::Role;

const THINKING: &str = "Thinking...";

/// Markdown block for one turn of the transcript.
pub fn render_turn(turn: &Turn) -> String {
    let label = match turn.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
        Role::System => "System",
    };
    format!("**{}:**\n{}\n", label, turn.content)
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let agent = calendar_agent(config).await?;
    let model = Arc::new(OpenAIModel::from_config(config));
    let router = AssistantRouter::new(model).time_zone(&config.time_zone);
    let mut conversation = Conversation::builder(router)
        .greeting(config.greeting)
        .build();

    for turn in conversation.transcript().iter() {
        println!("{}", render_turn(turn));
    }

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Err(e) = rl.add_history_entry(line) {
                    tracing::debug!("Failed to add history entry: {}", e);
                }

                print!("{}", THINKING);
                io::stdout().flush()?;
                let turn = conversation.submit(&agent, line).await;
                // Clear the busy indicator before printing the reply
                print!("\r{}\r", " ".repeat(THINKING.len()));
                println!("{}", render_turn(&turn));
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
