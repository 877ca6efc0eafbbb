//! Subcommand implementations. Output goes to the supplied writer so the
//! commands can be exercised without a terminal.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing::info;
use xaam_crypto::{
    EngineConfig, EnvelopeEngine, PrivateKeyPem, PublicKeyPem, RecipientKeys, SealedPayload,
};
use xaam_keystore::{KeyStoreConfig, PrivateKeyStore, open_key_store};

use crate::{Cli, Commands};

pub(crate) fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let engine = EnvelopeEngine::new(EngineConfig {
        cipher: cli.cipher,
        key_bits: cli.bits,
    });
    let store_config = KeyStoreConfig {
        key_storage_dir: cli.key_dir,
    };

    match cli.command {
        Commands::Keygen { owner } => keygen(&engine, &store_config, &owner, out),
        Commands::Encrypt { recipients, input } => {
            encrypt(&engine, &recipients, input.as_deref(), out)
        }
        Commands::Decrypt { owner, input } => decrypt(&store_config, &owner, input.as_deref(), out),
        Commands::Seal { public_key, input } => seal(&engine, &public_key, input.as_deref(), out),
        Commands::Open { owner, input } => open(&store_config, &owner, input.as_deref(), out),
    }
}

fn keygen(
    engine: &EnvelopeEngine,
    store_config: &KeyStoreConfig,
    owner: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let store = key_store(store_config)?;
    let (public_key, private_key) = engine
        .generate_key_pair()
        .context("Failed to generate key pair")?
        .into_parts();
    store
        .store_private_key(owner, &private_key)
        .with_context(|| format!("Failed to store private key for {owner}"))?;

    info!(owner, bits = engine.config().key_bits, "generated key pair");
    out.write_all(public_key.as_str().as_bytes())?;
    Ok(())
}

fn encrypt(
    engine: &EnvelopeEngine,
    recipients: &[(String, PathBuf)],
    input: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut keys = RecipientKeys::new();
    for (id, path) in recipients {
        keys.insert(id.clone(), read_public_key(path)?);
    }

    let payload: serde_json::Value =
        serde_json::from_slice(&read_input(input)?).context("Input is not valid JSON")?;
    let sealed = engine
        .encrypt_for_recipients(&payload, &keys)
        .context("Encryption failed")?;

    serde_json::to_writer_pretty(&mut *out, &sealed)?;
    writeln!(out)?;
    Ok(())
}

fn decrypt(
    store_config: &KeyStoreConfig,
    owner: &str,
    input: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let sealed: SealedPayload = serde_json::from_slice(&read_input(input)?)
        .context("Input is not a sealed payload")?;
    let wrapped = sealed
        .wrapped_keys
        .get(owner)
        .ok_or_else(|| anyhow!("{owner} is not a recipient of this payload"))?;
    let private_key = load_private_key(store_config, owner)?;

    let payload: serde_json::Value = xaam_crypto::decrypt_for_recipient(
        &sealed.envelope,
        wrapped,
        &private_key,
    )
    .context("Decryption failed")?;

    serde_json::to_writer_pretty(&mut *out, &payload)?;
    writeln!(out)?;
    Ok(())
}

fn seal(
    engine: &EnvelopeEngine,
    public_key: &Path,
    input: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let public_key = read_public_key(public_key)?;
    let blob = engine
        .encrypt_with_public_key(&public_key, &read_input(input)?)
        .context("Encryption failed")?;
    out.write_all(&blob)?;
    writeln!(out)?;
    Ok(())
}

fn open(
    store_config: &KeyStoreConfig,
    owner: &str,
    input: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let private_key = load_private_key(store_config, owner)?;
    let blob = read_input(input)?;
    let data = xaam_crypto::decrypt_with_private_key(&private_key, blob.trim_ascii())
        .context("Decryption failed")?;
    out.write_all(&data)?;
    Ok(())
}

fn key_store(config: &KeyStoreConfig) -> Result<Arc<dyn PrivateKeyStore>> {
    if config.key_storage_dir.is_none() {
        bail!("No key directory configured; pass --key-dir or set KEY_STORAGE_DIR");
    }
    open_key_store(config).context("Failed to open key store")
}

fn load_private_key(config: &KeyStoreConfig, owner: &str) -> Result<PrivateKeyPem> {
    key_store(config)?
        .retrieve_private_key(owner)
        .with_context(|| format!("Failed to read private key for {owner}"))?
        .ok_or_else(|| anyhow!("No private key stored for {owner}"))
}

fn read_public_key(path: &Path) -> Result<PublicKeyPem> {
    let pem = fs::read_to_string(path)
        .with_context(|| format!("Failed to read public key {}", path.display()))?;
    let key = PublicKeyPem::new(pem);
    key.validate()
        .with_context(|| format!("Invalid public key {}", path.display()))?;
    Ok(key)
}

fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) => {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}
