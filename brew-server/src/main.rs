use brew_server::{Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env, configuration, logging)
    let config = setup_environment()?;

    print_banner();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Brew server starting...");

    // 2. Order store
    let state = ServerState::initialize(&config)?;

    // 3. HTTP server
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
