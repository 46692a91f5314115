//! Stack lifecycle commands

use crate::cli::display::TableRenderer;
use crate::domain::config::StackConf;
use crate::domain::pipeline::{
    CleanupOutcome, CleanupPipeline, DeployOutcome, DeployPipeline,
};
use crate::infrastructure::aws::AwsCli;
use crate::infrastructure::constants::{DEFAULT_CONF_FILE, DEFAULT_SCAN_TAG, ENV_CONF_FILE};
use crate::infrastructure::exec::{StdinPrompt, SystemRunner};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
pub struct DeployCommand {
    /// Path to the stack settings file (ekstack.toml)
    /// If not provided, uses EKSTACK_CONF_FILE or built-in defaults
    #[arg(long, short = 'f')]
    pub config: Option<String>,

    /// Terraform working directory
    #[arg(long, short = 'd', default_value = ".")]
    pub dir: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CleanupCommand {
    /// Path to the stack settings file (ekstack.toml)
    #[arg(long, short = 'f')]
    pub config: Option<String>,

    /// Terraform working directory
    #[arg(long, short = 'd', default_value = ".")]
    pub dir: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ScanCommand {
    /// Path to the stack settings file (ekstack.toml)
    #[arg(long, short = 'f')]
    pub config: Option<String>,

    /// Repository to report on; defaults to every configured registry
    #[arg(long, short = 'r')]
    pub repository: Option<String>,

    /// Image tag to inspect
    #[arg(long, short = 't', default_value = DEFAULT_SCAN_TAG)]
    pub tag: String,
}

/// Resolve configuration: --config flag > EKSTACK_CONF_FILE env > default
/// file if present > built-in defaults.
fn load_conf(config: Option<&str>) -> anyhow::Result<StackConf> {
    let conf = if let Some(path) = config {
        StackConf::from(path)?
    } else if let Ok(env_path) = std::env::var(ENV_CONF_FILE) {
        StackConf::from(&env_path)?
    } else if std::path::Path::new(DEFAULT_CONF_FILE).exists() {
        StackConf::from(DEFAULT_CONF_FILE)?
    } else {
        println!("ℹ️  No configuration file specified, using default settings");
        StackConf::default()
    };

    conf.validate()?;
    Ok(conf)
}

impl DeployCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let conf = load_conf(self.config.as_deref())?;

        let pipeline = DeployPipeline::new(
            conf,
            Arc::new(SystemRunner),
            Box::new(StdinPrompt),
            self.dir.clone(),
        )
        .with_gate_banner(TableRenderer::new().render_cost_estimate());

        match pipeline.run().await? {
            DeployOutcome::Completed(ctx) => {
                println!(
                    "Stack '{}' deployed successfully in {}!",
                    ctx.cluster_name, ctx.region
                );
                Ok(())
            }
            DeployOutcome::Cancelled => {
                // User declined; not an error.
                println!("Deployment cancelled.");
                Ok(())
            }
        }
    }
}

impl CleanupCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let conf = load_conf(self.config.as_deref())?;

        let pipeline = CleanupPipeline::new(
            conf,
            Arc::new(SystemRunner),
            Box::new(StdinPrompt),
            self.dir.clone(),
        );

        let report = pipeline.run().await?;
        let renderer = TableRenderer::new();

        if !report.steps.is_empty() {
            println!("{}", renderer.render_step_summary(&report.steps));
        }
        if let Some(ref inventory) = report.inventory {
            println!("{}", renderer.render_inventory(inventory));
        }

        match report.outcome {
            CleanupOutcome::Cancelled => {
                println!("Cleanup cancelled.");
                Ok(())
            }
            CleanupOutcome::NothingToDestroy => {
                println!("Nothing to destroy.");
                Ok(())
            }
            CleanupOutcome::Completed => {
                println!("Cleanup completed successfully!");
                Ok(())
            }
            CleanupOutcome::CompletedWithErrors => {
                anyhow::bail!("Cleanup finished with errors; see the summary above")
            }
        }
    }
}

impl ScanCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let conf = load_conf(self.config.as_deref())?;

        let repositories: Vec<String> = match self.repository {
            Some(ref repo) => vec![repo.clone()],
            None => conf.registries.clone(),
        };
        if repositories.is_empty() {
            anyhow::bail!("No registries configured; use --repository to name one");
        }

        let aws = AwsCli::new(Arc::new(SystemRunner));
        let renderer = TableRenderer::new();

        for repository in &repositories {
            match aws
                .describe_image_scan_findings(repository, &self.tag, &conf.region)
                .await
            {
                Ok(scan) => {
                    println!("{}", renderer.render_scan_report(repository, &self.tag, &scan));
                }
                Err(e) => {
                    tracing::warn!("Scan lookup failed for '{}': {}", repository, e);
                    println!("⚠ Could not fetch scan for '{}:{}': {}", repository, self.tag, e);
                }
            }
        }

        Ok(())
    }
}
