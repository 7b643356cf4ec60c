//! Key files: the 32-byte Ed25519 seed as hex, one line.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use zeroize::Zeroizing;

use docguard_crypto::LocalIdentity;

/// Generate a fresh identity and write its seed to `path`.
///
/// Refuses to overwrite an existing file.
pub fn create(path: &Path) -> anyhow::Result<LocalIdentity> {
    let identity = LocalIdentity::generate().context("reading OS entropy")?;
    let encoded = Zeroizing::new(hex::encode(identity.keypair().private.0));

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("creating key file {}", path.display()))?;
    writeln!(file, "{}", encoded.as_str())?;
    Ok(identity)
}

/// Load the identity whose seed is stored at `path`.
pub fn load(path: &Path) -> anyhow::Result<LocalIdentity> {
    let text = Zeroizing::new(
        std::fs::read_to_string(path)
            .with_context(|| format!("reading key file {}", path.display()))?,
    );
    let trimmed = text.trim();
    if trimmed.len() != 64 {
        bail!(
            "key file {} must hold 64 hex characters, found {}",
            path.display(),
            trimmed.len()
        );
    }
    let mut seed = Zeroizing::new([0u8; 32]);
    hex::decode_to_slice(trimmed, seed.as_mut())
        .with_context(|| format!("key file {} is not valid hex", path.display()))?;
    Ok(LocalIdentity::from_seed(&seed))
}
