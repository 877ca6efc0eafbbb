//! `xaam`: key management and payload encryption from the command line.
//!
//! ```bash
//! # Generate a key pair; the private key goes to the key directory
//! xaam --key-dir ./keys keygen --owner judge-1 > judge-1.pub
//!
//! # Encrypt a JSON payload for two judges
//! xaam encrypt --recipient judge-1=judge-1.pub --recipient judge-2=judge-2.pub < task.json > sealed.json
//!
//! # Decrypt as one of them
//! xaam --key-dir ./keys decrypt --owner judge-1 < sealed.json
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xaam_crypto::{CipherSuite, DEFAULT_KEY_BITS};

#[derive(Parser, Debug)]
#[command(name = "xaam")]
#[command(about = "Hybrid RSA/AES envelope encryption for XAAM task payloads")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding per-owner private keys
    #[arg(long, global = true, env = "KEY_STORAGE_DIR")]
    key_dir: Option<PathBuf>,

    /// Symmetric cipher for new payloads (gcm or cbc)
    #[arg(long, global = true, default_value_t = CipherSuite::Aes256Gcm)]
    cipher: CipherSuite,

    /// RSA modulus size for generated keys
    #[arg(long, global = true, default_value_t = DEFAULT_KEY_BITS)]
    bits: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a key pair, store the private key and print the public key
    Keygen {
        /// Owner id the private key is stored under
        #[arg(long)]
        owner: String,
    },
    /// Encrypt a JSON payload for one or more recipients
    Encrypt {
        /// Recipient as <id>=<public key PEM file>; repeatable
        #[arg(long = "recipient", required = true, value_parser = parse_recipient)]
        recipients: Vec<(String, PathBuf)>,
        /// JSON payload file (stdin if omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Decrypt a sealed payload with a stored private key
    Decrypt {
        #[arg(long)]
        owner: String,
        /// Sealed payload JSON file (stdin if omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Encrypt raw bytes for a single public key
    Seal {
        #[arg(long)]
        public_key: PathBuf,
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Decrypt a sealed blob with a stored private key
    Open {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn parse_recipient(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((id, path)) if !id.is_empty() && !path.is_empty() => {
            Ok((id.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected <id>=<public key file>, got {arg:?}")),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    commands::run(cli, &mut stdout)
}
