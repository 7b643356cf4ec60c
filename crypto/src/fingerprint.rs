//! The fingerprint engine: a deterministic Blake2b-256 digest of raw bytes.
//!
//! Submission and verification must use exactly this function. Records carry
//! [`FINGERPRINT_ALGORITHM`] so that a future change of algorithm can be
//! detected instead of silently making old records unresolvable.

use std::io::{self, Read};
use std::path::Path;

use blake2::Digest;
use docguard_types::Fingerprint;
use rayon::prelude::*;

use crate::hash::Blake2b256;

/// Identifier stored alongside every fingerprint.
pub const FINGERPRINT_ALGORITHM: &str = "blake2b-256";

const READ_CHUNK: usize = 64 * 1024;

/// Fingerprint a byte slice. Total over all inputs, including the empty one.
pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    Fingerprint::new(crate::blake2b_256(bytes))
}

/// Fingerprint everything readable from `reader`.
///
/// Produces the same digest as [`fingerprint`] over the concatenated bytes.
/// Read failures are returned to the caller; no partial digest escapes.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> io::Result<Fingerprint> {
    let mut hasher = Blake2b256::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(Fingerprint::new(hasher.finalize().into()))
}

/// Fingerprint a file on disk without loading it into memory.
pub fn fingerprint_file(path: &Path) -> io::Result<Fingerprint> {
    let file = std::fs::File::open(path)?;
    let fp = fingerprint_reader(io::BufReader::new(file))?;
    tracing::debug!(path = %path.display(), fingerprint = %fp, "fingerprinted file");
    Ok(fp)
}

/// Fingerprint many inputs in parallel. Output order matches input order.
pub fn fingerprint_many(inputs: &[&[u8]]) -> Vec<Fingerprint> {
    inputs.par_iter().map(|bytes| fingerprint(bytes)).collect()
}
