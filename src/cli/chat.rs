//! Interactive chat and single-turn `ask`

use super::ConversationArgs;
use crate::app;
use std::io::Write;
use tally_core::{TurnRequest, TurnResponse};
use tokio::io::{AsyncBufReadExt, BufReader};

fn request(args: &ConversationArgs, message: String) -> TurnRequest {
    let request = TurnRequest::new(args.user.clone(), message);
    match &args.conversation {
        Some(id) => request.with_conversation(id.clone()),
        None => request,
    }
}

fn print_reply(reply: &TurnResponse) {
    println!("\n{}\n", reply.response_text);
    if reply.record_changed {
        println!("(records updated)\n");
    }
}

/// Send one message
pub async fn ask(args: ConversationArgs, message: String) -> anyhow::Result<()> {
    let config = app::load_config()?;
    let app = app::build(&config).await?;

    let reply = app.engine.handle_turn(request(&args, message)).await;
    println!("{}", reply.response_text);
    Ok(())
}

/// Read messages from stdin until `exit`, `quit` or end of input
pub async fn run(args: ConversationArgs) -> anyhow::Result<()> {
    let config = app::load_config()?;
    let app = app::build(&config).await?;

    println!("💬 Tally - tell me what you spent, or ask about your spending.");
    println!("   Type \"exit\" to leave.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        let reply = app.engine.handle_turn(request(&args, message.to_string())).await;
        print_reply(&reply);
    }

    println!("👋 Bye!");
    Ok(())
}
