//! Cryptographic operations for stegkit.
//!
//! Only one primitive is needed by the codec: the password envelope that is
//! wrapped around a payload before it is framed and embedded.

pub mod envelope;

pub use envelope::{open, seal, ENVELOPE_OVERHEAD, NONCE_LEN, SALT_LEN, TAG_LEN};
