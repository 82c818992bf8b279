use clap::Parser;
use timefill::core::engine::RunSummary;
use timefill::utils::error::ErrorSeverity;
use timefill::utils::{logger, validation::Validate};
use timefill::{
    AppConfig, BigTimeClient, CliArgs, LocalStorage, SubmissionScheduler, SynthesisEngine,
    TimefillError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, args.log_json);

    tracing::info!("Starting timefill");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    match run(&args).await {
        Ok(summary) => {
            tracing::info!(
                "✅ Done: {} entries generated, {} submitted",
                summary.entries_generated,
                summary.entries_submitted
            );
            for path in &summary.output_paths {
                println!("📁 Results saved to: {}", path);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run(args: &CliArgs) -> Result<RunSummary, TimefillError> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            AppConfig::from_file(path)?
        }
        None => {
            tracing::info!("📁 Loading configuration from BIGTIME_* environment variables");
            AppConfig::from_env()?
        }
    };

    args.apply_overrides(&mut config);
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    let today = chrono::Local::now().date_naive();
    let plan = config.run_plan(today)?;

    let client = BigTimeClient::connect(&config.bigtime_settings()).await?;
    let storage = LocalStorage::new(config.output.path.clone());
    let scheduler = SubmissionScheduler::new(client.clone(), config.submission_delay());

    let engine = SynthesisEngine::new(client, scheduler, storage, plan);
    engine.run().await
}
