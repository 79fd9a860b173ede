use anyhow::Result;
use arkwork_session::cli::{actions, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (action, config) = start()?;

    // Handle the action
    actions::session::handle(action, &config).await?;

    Ok(())
}
