//! Main Entrypoint for the Assessment API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Building the prompt personas and the completion and email clients.
//! 3. Wiring them into the session orchestrator.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use assessor_api::{config::Config, router::create_router, state::AppState};
use assessor_core::{
    email::{EmailClient, SendGridEmailClient},
    finalizer::SummaryFinalizer,
    llm_client::{CompletionClient, OpenAICompatibleClient},
    prompts::PromptBuilder,
    session::SessionOrchestrator,
};
use std::{collections::HashMap, fs, net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

/// A helper function to load prompts from a directory.
fn load_prompts(prompts_path: &std::path::Path) -> anyhow::Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();
    for entry in fs::read_dir(prompts_path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            let prompt_key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?
                .to_string();
            let content = fs::read_to_string(&path)?;
            prompts.insert(prompt_key, content);
        }
    }
    Ok(prompts)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let prompts = match &config.prompts_path {
        Some(path) => {
            let templates = load_prompts(path)
                .with_context(|| format!("Failed to read prompts from {}", path.display()))?;
            info!(count = templates.len(), path = %path.display(), "Loaded prompt overrides.");
            PromptBuilder::from_prompts(&templates)
        }
        None => PromptBuilder::default(),
    };
    let prompts = Arc::new(prompts);

    let completion: Arc<dyn CompletionClient> = Arc::new(
        OpenAICompatibleClient::new(
            &config.completion_api_key,
            &config.completion_api_base,
            config.completion_model.clone(),
            config.request_timeout,
        )
        .context("Failed to build completion client")?,
    );

    let email: Option<Arc<dyn EmailClient>> = match &config.sendgrid_api_key {
        Some(api_key) => {
            let client = SendGridEmailClient::new(
                api_key.clone(),
                config.from_email.clone(),
                config.request_timeout,
            )
            .context("Failed to build email client")?;
            Some(Arc::new(client) as Arc<dyn EmailClient>)
        }
        None => {
            warn!("SENDGRID_API_KEY is not set; session summaries cannot be emailed.");
            None
        }
    };

    let finalizer = SummaryFinalizer::new(
        prompts.clone(),
        completion.clone(),
        email,
        config.generation,
    );
    let orchestrator = SessionOrchestrator::new(
        prompts,
        completion,
        finalizer,
        config.generation,
        config.finalization_policy,
    );

    let app_state = Arc::new(AppState {
        orchestrator: Arc::new(orchestrator),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        model = %config.completion_model,
        api_base = %config.completion_api_base,
        timeout_secs = config.request_timeout.as_secs(),
        policy = ?config.finalization_policy,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
