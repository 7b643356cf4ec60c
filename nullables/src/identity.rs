use std::sync::atomic::{AtomicUsize, Ordering};

use docguard_crypto::SignatureVerifier;
use docguard_types::{Signature, SubmitterAddress};

/// A signature verifier with a fixed answer that counts how often it is asked.
pub struct NullSignatureVerifier {
    accept: bool,
    calls: AtomicUsize,
}

impl NullSignatureVerifier {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            accept: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SignatureVerifier for NullSignatureVerifier {
    fn verify_signature(
        &self,
        _message: &[u8],
        _signature: &Signature,
        _address: &SubmitterAddress,
    ) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.accept
    }
}
