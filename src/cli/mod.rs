//! CLI module for Tally
//!
//! Provides the commands:
//! - `chat`: interactive conversation over stdin
//! - `ask`: a single turn
//! - `status`: cache, record store and generator health

use clap::{Args, Parser, Subcommand};

pub mod chat;
pub mod status;

/// Tally expense assistant CLI
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Track expenses by chatting")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat interactively
    Chat(ConversationArgs),
    /// Send one message and print the reply
    Ask {
        #[command(flatten)]
        conversation: ConversationArgs,
        /// Message text
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Show cache and storage health
    Status,
}

/// Who is talking, and in which conversation
#[derive(Args, Debug, Clone)]
pub struct ConversationArgs {
    /// User id
    #[arg(short, long, default_value = "local")]
    pub user: String,
    /// Conversation id (defaults to "default")
    #[arg(short, long)]
    pub conversation: Option<String>,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Chat(args)) => chat::run(args).await,
        Some(Commands::Ask {
            conversation,
            message,
        }) => chat::ask(conversation, message.join(" ")).await,
        Some(Commands::Status) => status::run().await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::parse_from(["tally", "ask", "-u", "alice", "spent", "$5", "on", "tea"]);
        match cli.command {
            Some(Commands::Ask {
                conversation,
                message,
            }) => {
                assert_eq!(conversation.user, "alice");
                assert_eq!(conversation.conversation, None);
                assert_eq!(message.join(" "), "spent $5 on tea");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_chat_defaults() {
        let cli = Cli::parse_from(["tally", "chat", "--conversation", "kitchen"]);
        match cli.command {
            Some(Commands::Chat(args)) => {
                assert_eq!(args.user, "local");
                assert_eq!(args.conversation.as_deref(), Some("kitchen"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
