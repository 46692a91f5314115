//! Build automation for ekstack
//!
//! Usage: cargo xtask <command>
//!
//! Available commands:
//! - build: Build the ekstack binary
//! - test: Run the test suite
//! - dist: Package a release tarball
//! - install: Install the release binary
//! - ci: Run the checks CI runs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for ekstack")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the ekstack binary
    Build {
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Run the test suite
    Test {
        /// Run only the pipeline integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Package the release binary and README into dist/
    Dist,
    /// Install the release binary
    Install {
        /// Installation prefix (default: /usr/local)
        #[arg(long, default_value = "/usr/local")]
        prefix: String,
    },
    /// Run format check, clippy and tests, as CI does
    Ci,
    /// Format code
    Fmt {
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
    /// Run clippy with warnings denied
    Clippy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    sh.change_dir(project_root());

    match cli.command {
        Commands::Build { release } => build(&sh, release),
        Commands::Test { integration } => test(&sh, integration),
        Commands::Dist => dist(&sh),
        Commands::Install { prefix } => install(&sh, &prefix),
        Commands::Ci => ci(&sh),
        Commands::Fmt { check } => fmt(&sh, check),
        Commands::Clippy => clippy(&sh),
    }
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    if release {
        cmd!(sh, "cargo build --release").run()?;
        println!("✅ Release build: target/release/ekstack");
    } else {
        cmd!(sh, "cargo build").run()?;
        println!("✅ Debug build: target/debug/ekstack");
    }
    Ok(())
}

fn test(sh: &Shell, integration: bool) -> Result<()> {
    if integration {
        // The pipeline tests under tests/ drive whole deploy/cleanup runs
        // against a scripted command runner.
        cmd!(sh, "cargo test --test deploy_test --test cleanup_test").run()?;
    } else {
        cmd!(sh, "cargo test --all").run()?;
    }
    println!("✅ Tests passed");
    Ok(())
}

fn dist(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo build --release").run()?;

    let dist_dir = project_root().join("dist");
    sh.create_dir(&dist_dir)?;
    sh.copy_file(project_root().join("target/release/ekstack"), dist_dir.join("ekstack"))?;
    sh.copy_file(project_root().join("README.md"), dist_dir.join("README.md"))?;

    let version = env!("CARGO_PKG_VERSION");
    let archive_name = format!("ekstack-{}.tar.gz", version);
    cmd!(sh, "tar -czf {archive_name} -C dist ekstack README.md")
        .run()
        .context("Failed to create tarball")?;

    println!("✅ Created {}", archive_name);
    Ok(())
}

fn install(sh: &Shell, prefix: &str) -> Result<()> {
    let binary = project_root().join("target/release/ekstack");
    if !binary.exists() {
        cmd!(sh, "cargo build --release").run()?;
    }

    let bin_dir = Path::new(prefix).join("bin");
    sh.create_dir(&bin_dir)?;
    let install_path = bin_dir.join("ekstack");
    sh.copy_file(&binary, &install_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&install_path, std::fs::Permissions::from_mode(0o755))?;
    }

    println!("✅ Installed {}", install_path.display());
    Ok(())
}

fn ci(sh: &Shell) -> Result<()> {
    fmt(sh, true)?;
    clippy(sh)?;
    test(sh, false)?;
    println!("✅ CI checks passed");
    Ok(())
}

fn fmt(sh: &Shell, check: bool) -> Result<()> {
    if check {
        cmd!(sh, "cargo fmt --all -- --check").run()?;
    } else {
        cmd!(sh, "cargo fmt --all").run()?;
    }
    Ok(())
}

fn clippy(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo clippy --all-targets --all-features -- -D warnings").run()?;
    Ok(())
}

fn project_root() -> PathBuf {
    Path::new(&env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(1)
        .unwrap()
        .to_path_buf()
}
