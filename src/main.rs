use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use gamekeeper_mods::commands::{self, InstallRequest, ModDirs};

#[derive(Parser, Debug)]
#[command(
    name = "gamekeeper-mods",
    about = "Install and reconcile CurseForge mods for a game server",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile the mods directory against a list of references
    Install {
        /// Mod references (`<id|slug>`, `<id|slug>:<fileId>`, `<id|slug>@<partial>`,
        /// `@listfile`). Falls back to CURSEFORGE_MODS when empty.
        refs: Vec<String>,

        /// YAML values file; environment variables take precedence
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        mods_dir: Option<PathBuf>,

        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Remove installed mods no longer referenced
        #[arg(long)]
        prune: bool,

        /// Exit non-zero when any reference fails
        #[arg(long)]
        fail_on_error: bool,
    },

    /// Show installed mods from the manifest
    List {
        #[arg(long)]
        mods_dir: Option<PathBuf>,

        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    gamekeeper_mods::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Install {
            refs,
            config,
            mods_dir,
            data_dir,
            prune,
            fail_on_error,
        } => {
            let dirs = ModDirs::resolve(mods_dir, data_dir);
            let request = InstallRequest {
                references: refs,
                config,
                prune,
                fail_on_error,
            };
            match commands::install_mods(&dirs, request).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    error!("{}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Command::List {
            mods_dir,
            data_dir,
            json,
        } => {
            let dirs = ModDirs::resolve(mods_dir, data_dir);
            let mods = commands::list_installed_mods(&dirs).await;
            if json {
                match serde_json::to_string_pretty(&mods) {
                    Ok(out) => println!("{out}"),
                    Err(e) => {
                        error!("{}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                for m in &mods {
                    println!(
                        "{:>10}  {:<40}  {}",
                        m.mod_id,
                        m.reference,
                        m.file_name.as_deref().unwrap_or(&m.path)
                    );
                }
            }
            commands::report_missing(&dirs, &mods);
            ExitCode::SUCCESS
        }
    }
}
