//! Connection check command.

use std::time::Instant;

use console::style;

use bedchat_core::llm::client::InferenceClient;
use bedchat_infra::llm::test_connection;
use bedchat_web::state::AppState;

/// Send a one-turn test prompt and report the result.
pub async fn check(state: &AppState) -> anyhow::Result<()> {
    let client = state.client();
    let model = &state.generation().model_id;

    println!();
    println!(
        "  {} Checking {} via {}",
        style("🔍").bold(),
        style(model).cyan(),
        client.name()
    );

    let started = Instant::now();
    match test_connection(client.as_ref(), state.generation()).await {
        Ok(()) => {
            println!(
                "  {} Model responded in {}ms",
                style("✓").green(),
                started.elapsed().as_millis()
            );
            println!();
            Ok(())
        }
        Err(e) => {
            println!("  {} {}", style("✗").red(), e);
            println!();
            Err(anyhow::anyhow!("connection check failed: {e}"))
        }
    }
}
