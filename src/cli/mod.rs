pub mod browse;
pub mod chat;

use std::io::Write;

use color_print::cformat;
use eyre::Result;
use tracing::info;

use crate::client::{ApiClient, ApiError};
use crate::server::routes::HealthResponse;

/// Connect to the API and print its status. `Ok(None)` means the server is
/// unreachable; instructions have already been printed.
pub async fn connect(
    output: &mut dyn Write,
    api_url: &str,
) -> Result<Option<(ApiClient, HealthResponse)>> {
    let client = ApiClient::new(api_url)?;

    match client.check_health().await {
        Ok(health) => {
            info!(model = %health.model_name, ready = health.agent_ready, "API connected");
            writeln!(output, "{}", status_line(&health))?;
            Ok(Some((client, health)))
        }
        Err(e) => {
            writeln!(output, "{}", unreachable_text(&e))?;
            Ok(None)
        }
    }
}

fn status_line(health: &HealthResponse) -> String {
    if health.agent_ready {
        cformat!("<green>Connected</green> · Model: {} · AI Agent: Ready", health.model_name)
    } else {
        cformat!(
            "<green>Connected</green> · Model: {} · <yellow>AI Agent: Limited (missing API key)</yellow>",
            health.model_name
        )
    }
}

fn unreachable_text(error: &ApiError) -> String {
    format!(
        "{}\n\n{}\n\n\
         To fix this:\n\
         1. Open a terminal in the project root\n\
         2. Run: vibecheck serve\n\
         3. Wait for the server to start on port 8000\n\
         4. Run this command again\n",
        cformat!("<red><bold>Cannot connect to the VibeCheck API!</bold></red>"),
        error
    )
}
