//! drive-qa binary
//!
//! Run with: cargo run -p drive-qa -- --folder_name=<folder> [--threshold=0.5]

use anyhow::Context;
use console::style;
use drive_qa::{
    args,
    auth::{CredentialProvider, GoogleOAuthClient},
    pipeline::Pipeline,
    providers::{build_qa_provider, DriveApi, GoogleDriveClient},
    report::Reporter,
    AppConfig,
};
use std::sync::Arc;
use tracing::Instrument;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drive_qa=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load_default().context("Failed to load configuration")?;

    let argv: Vec<String> = std::env::args().collect();
    let threshold_arg = args::get(&argv, "threshold", &config.report.default_threshold.to_string());
    let threshold: f32 = threshold_arg
        .parse()
        .with_context(|| format!("Invalid --threshold value: {}", threshold_arg))?;
    let folder_name = args::get(&argv, "folder_name", "");

    let span = tracing::info_span!("run", folder = %folder_name, threshold);
    run(config, folder_name, threshold).instrument(span).await
}

async fn run(config: AppConfig, folder_name: String, threshold: f32) -> anyhow::Result<()> {
    println!(
        "{}",
        style(format!(
            "Will use threshold {} and search for google drive documents in folder {}",
            threshold, folder_name
        ))
        .green()
    );

    println!("{}", style("Authenticating with your google account...").green());
    let identity = Arc::new(GoogleOAuthClient::new(
        &config.auth.client_secrets_path,
        config.auth.callback_port,
    ));
    let credential = match CredentialProvider::new(identity, &config.auth).authenticate().await {
        Ok(credential) => credential,
        Err(_) => {
            println!("{}", style("   Authentication failed. Try again.").red());
            return Ok(());
        }
    };
    println!("{}", style("   Authentication successful.").green().bright());

    let drive = Arc::new(GoogleDriveClient::new(&credential, &config.drive)?);
    let qa = build_qa_provider(&config.qa)?;
    tracing::info!("Storage: {}, QA backend: {} ({})", drive.name(), qa.name(), qa.model());
    let pipeline = Pipeline::new(drive, qa);

    println!("{}", style("Fetching documents from Google Drive...").green());
    let files = match pipeline.list(&folder_name).await {
        Ok(files) => files,
        Err(e) => {
            tracing::error!("Error fetching documents from folder '{}': {}", folder_name, e);
            println!("{}", style(format!("   Could not list folder {}.", folder_name)).red());
            return Ok(());
        }
    };
    println!("{}", style("   Documents fetched successfully.").green().bright());

    println!(
        "{}",
        style("Processing documents and queries. This may take a while, hold tight...").magenta()
    );
    let results = pipeline.answer(&config.questions, &files).await;

    Reporter::new(threshold).write_report(&mut std::io::stdout().lock(), &results)?;
    Ok(())
}
