use crate::config::toml_config::AppConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "timefill")]
#[command(about = "Synthesizes timesheet entries from your logged history and submits them")]
pub struct CliArgs {
    /// Path to TOML configuration file; BIGTIME_* environment variables are used when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Generate and save the schedule without submitting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Seed the sampler for a reproducible schedule
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the number of days to fill
    #[arg(long)]
    pub window_days: Option<usize>,

    /// Override the output directory
    #[arg(long)]
    pub output_path: Option<String>,
}

impl CliArgs {
    /// 套用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if self.dry_run {
            config.submission.dry_run = Some(true);
            tracing::info!("🔧 Dry run enabled from command line");
        }
        if let Some(seed) = self.seed {
            config.generation.seed = Some(seed);
        }
        if let Some(days) = self.window_days {
            config.generation.window_days = days;
            tracing::info!("🔧 Window overridden to {} days", days);
        }
        if let Some(path) = &self.output_path {
            config.output.path = path.clone();
        }
    }
}
