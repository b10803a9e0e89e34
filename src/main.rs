//! cidsign CLI application.
//!
//! This binary signs local files, adds them to an IPFS node, and verifies or
//! downloads them again by CID.

use cidsign::config::{validate_download_dir, Config};
use cidsign::crypto::keys::encode_public_key_pem;
use cidsign::error::Result;
use cidsign::net::client::{IpfsClient, DEFAULT_API_URL};
use cidsign::storage::metadata::FileRecord;
use cidsign::workflow::IntegrityWorkflow;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cidsign")]
#[command(about = "Sign files, store them on IPFS, and verify their integrity", long_about = None)]
struct Cli {
    /// Settings file (download path and keypair)
    #[arg(long, global = true, env = "CIDSIGN_SETTINGS", default_value = "settings.json")]
    settings: PathBuf,

    /// Ledger of ingested files
    #[arg(long, global = true, env = "CIDSIGN_LEDGER", default_value = "files.json")]
    ledger: PathBuf,

    /// IPFS HTTP API address
    #[arg(long, global = true, env = "CIDSIGN_IPFS_API", default_value = DEFAULT_API_URL)]
    ipfs_api: String,

    /// Give up on an IPFS request after this many seconds (default: never)
    #[arg(long, global = true, env = "CIDSIGN_IPFS_TIMEOUT")]
    ipfs_timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a file and add it to IPFS
    Add {
        /// File to add
        #[arg(long)]
        file: PathBuf,
    },

    /// List added files
    List,

    /// Show the recorded information for a CID
    Info {
        /// Content identifier
        #[arg(long)]
        cid: String,
    },

    /// Print the content stored under a CID
    Cat {
        /// Content identifier
        #[arg(long)]
        cid: String,
    },

    /// Download a recorded file into the download directory
    Download {
        /// Content identifier
        #[arg(long)]
        cid: String,
    },

    /// Verify content fetched by CID against a signature
    Verify {
        /// Content identifier
        #[arg(long)]
        cid: String,

        /// Base64 signature
        #[arg(long)]
        signature: String,
    },

    /// Settings operations
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the active settings
    Show,

    /// Set the directory downloads are written to
    SetDownloadPath {
        /// Existing, writable directory
        #[arg(long)]
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config {
        settings_path: cli.settings,
        ledger_path: cli.ledger,
        ipfs_api: cli.ipfs_api,
        ipfs_timeout: cli.ipfs_timeout.map(Duration::from_secs),
    };

    let ipfs = IpfsClient::with_timeout(&config.ipfs_api, config.ipfs_timeout)?;
    let workflow = IntegrityWorkflow::open(&config, ipfs)?;

    handle_command(cli.command, &config, workflow)
}

fn handle_command(
    cmd: Commands,
    config: &Config,
    workflow: IntegrityWorkflow<IpfsClient>,
) -> Result<()> {
    match cmd {
        Commands::Add { file } => {
            let record = workflow.ingest_file(&file)?;

            println!("File successfully added! CID: {}", record.cid);
            println!("Signature: {}", record.signature);

            Ok(())
        }

        Commands::List => {
            let records = workflow.list_files()?;

            if records.is_empty() {
                println!("No files have been added yet.");
            } else {
                print!("{}", render_file_table(&records));
            }

            Ok(())
        }

        Commands::Info { cid } => {
            match workflow.file_info(&cid)? {
                Some(record) => println!("{}", record),
                None => println!("File not found."),
            }

            Ok(())
        }

        Commands::Cat { cid } => {
            let content = workflow.retrieve_content(&cid)?;

            match String::from_utf8(content) {
                Ok(text) => println!("File content:\n{}", text),
                Err(e) => println!("<binary data, {} bytes>", e.as_bytes().len()),
            }

            Ok(())
        }

        Commands::Download { cid } => {
            let path = workflow.download(&cid)?;
            println!("File downloaded successfully to {}", path.display());

            Ok(())
        }

        Commands::Verify { cid, signature } => {
            if workflow.verify(&cid, &signature)? {
                println!("File integrity confirmed.");
            } else {
                println!("File integrity refuted.");
            }

            Ok(())
        }

        Commands::Config(config_cmd) => handle_config_command(config_cmd, config, workflow),
    }
}

fn handle_config_command(
    cmd: ConfigCommands,
    config: &Config,
    mut workflow: IntegrityWorkflow<IpfsClient>,
) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let download_path = match workflow.download_path() {
                "" => "(not set, current directory)",
                path => path,
            };

            println!("Settings file: {}", config.settings_path.display());
            println!("Ledger file:   {}", config.ledger_path.display());
            println!("IPFS API:      {}", config.ipfs_api);
            match config.ipfs_timeout {
                Some(timeout) => println!("IPFS timeout:  {}s", timeout.as_secs()),
                None => println!("IPFS timeout:  (none)"),
            }
            println!("Download path: {}", download_path);

            if let Some(keypair) = workflow.keys().active() {
                println!("\n{}", encode_public_key_pem(&keypair.public)?.trim_end());
            }

            Ok(())
        }

        ConfigCommands::SetDownloadPath { path } => {
            let dir = validate_download_dir(&path)?;
            let dir = dir.display().to_string();
            workflow.set_download_path(&dir)?;

            println!("Download path set to: {}", dir);

            Ok(())
        }
    }
}

/// One line per record: name, size, CID and signature.
fn render_file_table(records: &[FileRecord]) -> String {
    let mut table = format!("{:<30} {:>12}  {:<46}  Signature\n", "Name", "Size", "CID");
    table.push_str(&"-".repeat(180));
    table.push('\n');

    for record in records {
        table.push_str(&format!(
            "{:<30} {:>11}B  {:<46}  {}\n",
            record.name, record.size, record.cid, record.signature
        ));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_table_includes_signatures() {
        let records = vec![
            FileRecord::new("a.txt".into(), 10, "QmFirst".into(), "c2lnbmF0dXJlLWE=".into()),
            FileRecord::new("b.bin".into(), 2048, "QmSecond".into(), "c2lnbmF0dXJlLWI=".into()),
        ];

        let table = render_file_table(&records);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Name"));
        assert!(lines[0].ends_with("Signature"));
        assert!(lines[2].starts_with("a.txt"));
        assert!(lines[2].contains("10B"));
        assert!(lines[2].contains("QmFirst"));
        assert!(lines[2].ends_with("c2lnbmF0dXJlLWE="));
        assert!(lines[3].ends_with("c2lnbmF0dXJlLWI="));
    }

    #[test]
    fn test_cli_parses_ipfs_timeout() {
        let cli = Cli::try_parse_from(["cidsign", "--ipfs-timeout", "45", "list"]).unwrap();
        assert_eq!(cli.ipfs_timeout, Some(45));

        let cli = Cli::try_parse_from(["cidsign", "list"]).unwrap();
        assert_eq!(cli.ipfs_timeout, None);
    }
}
