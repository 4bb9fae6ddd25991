//! Terminal chat loop.
//!
//! Drives one in-process session through the same adapter the web server
//! uses, printing each new assistant turn as the adapter reports it.

use std::io::Write;

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use bedchat_core::chat::adapter::TurnOutcome;
use bedchat_types::chat::{Role, Turn};
use bedchat_web::state::AppState;

/// Run the stdin chat loop until `/quit` or end of input.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let session_id = state.open_session();
    let session = state.session(&session_id)?;

    println!();
    println!(
        "  {} Chatting with {}",
        style("💬").bold(),
        style(&state.generation().model_id).cyan()
    );
    println!("  {}", style("Type /quit or press Ctrl+D to exit").dim());
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut printed = 0usize;

    loop {
        print!("{} ", style("you ›").green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "/quit" {
            break;
        }

        let outcome = session
            .submit(text.to_string(), |turns| {
                print_new_turns(&turns[printed..]);
                printed = turns.len();
            })
            .await;

        if outcome == TurnOutcome::Failed {
            tracing::debug!(session_id = %session_id, "Turn ended with an error reply");
        }
    }

    state.close_session(&session_id)?;
    println!("  {}", style("Goodbye.").dim());
    Ok(())
}

fn print_new_turns(turns: &[Turn]) {
    for turn in turns.iter().filter(|t| t.role() == Role::Assistant) {
        println!();
        println!("{} {}", style("bot ›").cyan().bold(), turn.text());
        println!();
    }
}
