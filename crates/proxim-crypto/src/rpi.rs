//! Rolling proximity identifier derivation.
//!
//! The cryptographic core of the protocol. Derivation is a two-step pipeline:
//! HKDF-SHA256 turns the TEK into a per-key sub-key (RPIK), then AES-128
//! encrypts one fixed padded block carrying the epoch counter. Raw
//! single-block encryption, no chaining and no padding scheme: the plaintext
//! is exactly one cipher block wide by construction.
//!
//! # Security
//!
//! - Deterministic: same `(TEK, ENIN)` always produces the same RPI
//! - Unlinkable: without the TEK, RPIs from adjacent epochs are
//!   indistinguishable from independent random values
//! - One-way: an observed RPI reveals nothing about the TEK

use aes::Aes128;
use aes::cipher::{BlockEncrypt, KeyInit, generic_array::GenericArray};
use hkdf::Hkdf;
use sha2::Sha256;

use crate::{enin::Enin, tek::Tek};

/// RPI length in bytes (one AES block).
pub const RPI_LEN: usize = 16;

/// Domain-separation label for RPIK derivation.
const RPIK_INFO: &[u8] = b"EN-RPIK";

/// Label occupying the first six bytes of the padded block.
const RPI_LABEL: &[u8] = b"EN-RPI";

/// Rolling proximity identifier: the 16-byte broadcast value.
///
/// Plain data with no secrecy requirement of its own; it is broadcast in the
/// clear by design. `Copy + Hash` so observation ledgers can index it
/// directly.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rpi([u8; RPI_LEN]);

impl Rpi {
    /// Wrap raw identifier bytes (e.g. received over the air).
    pub fn from_bytes(bytes: [u8; RPI_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; RPI_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for Rpi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rpi(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// Derive the RPIK sub-key from a TEK.
///
/// HKDF-SHA256 with no salt and the fixed `"EN-RPIK"` info label, 16-byte
/// output. The RPIK exists only to key the block cipher; it is never stored
/// or transmitted.
pub fn derive_rpik(tek: &Tek) -> [u8; 16] {
    let hkdf = Hkdf::<Sha256>::new(None, tek.as_bytes());

    let mut rpik = [0u8; 16];
    let Ok(()) = hkdf.expand(RPIK_INFO, &mut rpik) else {
        unreachable!("16 bytes is a valid HKDF-SHA256 output length");
    };

    rpik
}

/// Derive the rolling proximity identifier for one `(TEK, ENIN)` pair.
///
/// Builds the padded block `"EN-RPI"` ‖ six zero bytes ‖ ENIN as a 4-byte
/// little-endian integer, then encrypts it with AES-128 under the RPIK.
/// Bit-exact and reproducible; recomputing with the same inputs always
/// yields the same 16 bytes.
pub fn derive_rpi(tek: &Tek, enin: Enin) -> Rpi {
    let rpik = derive_rpik(tek);

    let mut block = [0u8; RPI_LEN];
    block[..RPI_LABEL.len()].copy_from_slice(RPI_LABEL);
    // bytes 6..12 stay zero
    block[12..].copy_from_slice(&enin.to_le_bytes());

    let cipher = Aes128::new(GenericArray::from_slice(&rpik));
    let mut ciphertext = GenericArray::from(block);
    cipher.encrypt_block(&mut ciphertext);

    Rpi(ciphertext.into())
}
