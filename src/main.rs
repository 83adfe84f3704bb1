use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use triage_core::CoreConfig;
use triage_core::config::{
    path_from_env_value, recent_capacity_from_env_value, rephraser_from_env_values,
};
use triage_core::constants::DEFAULT_REST_ADDR;

/// Main entry point for the triage gateway
///
/// Resolves configuration from the environment once, then serves the REST API.
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `TRIAGE_RECENT_CASES`: size of the in-memory recent-results buffer (1-20, default 20)
/// - `TRIAGE_CASE_DB`: SQLite path for the persistent case log (unset disables it)
/// - `TRIAGE_LLM_ENABLED`: enable the explanation rephraser (default: true)
/// - `TRIAGE_LLM_URL`: Ollama base URL (default: "http://127.0.0.1:11434")
/// - `TRIAGE_LLM_MODEL`: model name (default: "llama3.2:latest")
/// - `TRIAGE_LLM_TIMEOUT_SECS`: hard rephrase timeout in seconds (1-9, default 8)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any setting above is invalid,
/// - the case log cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let env = |name: &str| std::env::var(name).ok();

    let cfg = CoreConfig::new(
        recent_capacity_from_env_value(env("TRIAGE_RECENT_CASES"))?,
        path_from_env_value(env("TRIAGE_CASE_DB")),
        rephraser_from_env_values(
            env("TRIAGE_LLM_ENABLED"),
            env("TRIAGE_LLM_URL"),
            env("TRIAGE_LLM_MODEL"),
            env("TRIAGE_LLM_TIMEOUT_SECS"),
        )?,
    )?;
    let rest_addr = env("TRIAGE_REST_ADDR").unwrap_or_else(|| DEFAULT_REST_ADDR.into());

    let app = router(AppState::from_config(&cfg)?);

    tracing::info!("++ Starting triage REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
