// CLI command definitions

use super::stack::{CleanupCommand, DeployCommand, ScanCommand};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "ekstack",
    version,
    about = "EKS stack lifecycle tool backed by Terraform",
    long_about = "A standalone CLI tool for provisioning and tearing down AWS EKS stacks with Terraform"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Deploy the EKS stack (interactive; applies Terraform and installs add-ons)
    Deploy(DeployCommand),

    /// Destroy the EKS stack and verify nothing billable is left behind
    Cleanup(CleanupCommand),

    /// Show vulnerability scan results for registry images (read-only)
    Scan(ScanCommand),
}
