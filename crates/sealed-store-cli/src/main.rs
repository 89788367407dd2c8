//! sealed-store CLI - read and write an encrypted file-backed store
//!
//! Values are encrypted with the configured key before they reach disk; keys
//! are stored as given. The key comes from `--key`, the `SEALED_STORE_*`
//! environment variables, a `--config` JSON file, or an interactive prompt, in
//! that order. `--iterations` and `--salt` override whichever source is used.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

use sealed_store::settings::ENV_ENCRYPTION_KEY;
use sealed_store::{CancellationToken, EncryptedStore, FileStore, StoreBuilder, StoreOptions};

/// Encrypted key/value store on the command line
#[derive(Parser, Debug)]
#[command(name = "sealed-store")]
#[command(version)]
#[command(about = "Read and write values in an encrypted key/value store")]
struct Args {
    /// Store directory (defaults to the platform data directory)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// JSON configuration file with a `SealedStore` section
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raw 256-bit key (hex or base64) or passphrase [env: SEALED_STORE_ENCRYPTION_KEY]
    #[arg(long = "key", global = true)]
    encryption_key: Option<String>,

    /// Argon2 iterations; forces passphrase derivation
    #[arg(long, global = true)]
    iterations: Option<u32>,

    /// Key derivation salt
    #[arg(long, global = true)]
    salt: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the decrypted value of KEY
    Get { key: String },
    /// Encrypt VALUE and store it under KEY
    Set { key: String, value: String },
    /// Print the value of KEY as pretty JSON
    GetJson { key: String },
    /// Validate JSON and store it under KEY
    SetJson { key: String, json: String },
    /// Delete KEY
    Remove { key: String },
    /// Exit 0 if KEY exists, 1 otherwise
    Has { key: String },
    /// Print the key at INDEX
    KeyAt {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// List all keys
    Keys,
    /// Print the number of keys
    Len,
    /// Delete every key in the store, including ones not written by this tool
    Clear {
        /// Confirm the store-wide deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let options = resolve_options(&args)?;

    let raw = match &args.dir {
        Some(dir) => FileStore::open(dir).await,
        None => FileStore::open_default().await,
    }
    .context("Failed to open store")?;
    debug!("Using store at {:?}", raw.storage_dir());

    let store = StoreBuilder::new()
        .raw_store(Arc::new(raw))
        .with_config(options)
        .build()
        .context("Failed to configure store")?;

    let mut stdout = std::io::stdout().lock();
    execute(&store, args.command, &mut stdout).await
}

fn resolve_options(args: &Args) -> anyhow::Result<StoreOptions> {
    let from_env = std::env::var_os(ENV_ENCRYPTION_KEY).is_some();
    let mut options = match (&args.encryption_key, &args.config) {
        (Some(key), _) => StoreOptions::new(key.clone()),
        (None, _) if from_env => {
            StoreOptions::from_env().context("Invalid SEALED_STORE_* environment")?
        }
        (None, Some(path)) => StoreOptions::from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        (None, None) => StoreOptions::new(rpassword::prompt_password("Encryption key: ")?),
    };

    if args.iterations.is_some() {
        options.iterations = args.iterations;
    }
    if args.salt.is_some() {
        options.salt = args.salt.clone();
    }
    Ok(options)
}

/// Run one command; `Ok(false)` means a lookup found nothing
async fn execute<W: Write>(store: &EncryptedStore, command: Command, out: &mut W) -> anyhow::Result<bool> {
    let cancel = CancellationToken::new();

    match command {
        Command::Get { key } => match store.get_string(&key, &cancel).await? {
            Some(value) => writeln!(out, "{}", value)?,
            None => return Ok(false),
        },
        Command::Set { key, value } => store.save_string(&key, &value, &cancel).await?,
        Command::GetJson { key } => {
            match store.get_object::<serde_json::Value>(&key, &cancel).await? {
                Some(value) => writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?,
                None => return Ok(false),
            }
        }
        Command::SetJson { key, json } => {
            let value: serde_json::Value =
                serde_json::from_str(&json).context("Value is not valid JSON")?;
            store.save_object(&key, &value, None, &cancel).await?;
        }
        Command::Remove { key } => store.remove(&key, &cancel).await?,
        Command::Has { key } => return Ok(store.contains_key(&key, &cancel).await?),
        Command::KeyAt { index } => writeln!(out, "{}", store.key_at(index, &cancel).await?)?,
        Command::Keys => {
            for key in store.keys(&cancel).await? {
                writeln!(out, "{}", key)?;
            }
        }
        Command::Len => writeln!(out, "{}", store.len(&cancel).await?)?,
        Command::Clear { yes } => {
            if !yes {
                bail!("clear deletes every key in the store; pass --yes to confirm");
            }
            store.clear(&cancel).await?;
        }
    }

    Ok(true)
}
