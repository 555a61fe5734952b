use clap::Parser;
use exambox_config::ConfigLoader;
use std::path::PathBuf;

mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = "exambox")]
#[command(about = "Inspect and drive the exam VM through VBoxManage", long_about = None)]
#[command(version)]
struct Cli {
    /// Name of the VM to query
    #[arg(long, global = true)]
    vm: Option<String>,

    /// Path to the VBoxManage executable (discovered when omitted)
    #[arg(long, global = true, value_name = "PATH")]
    vboxmanage: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    exambox_utils::tracing::init().map_err(|e| eyre::eyre!("failed to initialise logging: {e}"))?;

    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config {
        loader = loader.file(path);
    }
    if let Some(vm) = cli.vm {
        loader = loader.vm_name(vm);
    }
    if let Some(path) = cli.vboxmanage {
        loader = loader.vboxmanage_path(path);
    }
    let config = loader.load()?;
    tracing::debug!(vm = %config.vm_name, "Configuration loaded");

    // Default behavior when no command is specified
    cli.command
        .unwrap_or(Commands::Status { json: false })
        .execute(&config)
}
