//! BACnet wire codecs in pure Rust.
//!
//! `bacstack-core` encodes and decodes tagged application values, NPDU and
//! APDU headers, and the service payloads a BACnet/IP client needs. Decoding
//! is zero-copy: strings and octet strings borrow from the input frame.
//! Everything here is `no_std`-compatible; the client engine lives in
//! `bacstack-client`.
//!
//! # Feature flags
//!
//! - **`std`** (default) — enables `std::error::Error` implementations.
//! - **`alloc`** (default) — enables decoders that return lists (ReadProperty ack, COV notifications).
//! - **`serde`** — derives `Serialize`/`Deserialize` on core types.
//! - **`defmt`** — derives `defmt::Format` for embedded logging.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

/// APDU (Application Protocol Data Unit) types for confirmed/unconfirmed requests and responses.
pub mod apdu;
/// Binary encoding primitives, tag system, and zero-copy reader/writer.
pub mod encoding;
/// Error types for encoding and decoding operations.
pub mod error;
/// NPDU (Network Protocol Data Unit) encoding and decoding.
pub mod npdu;
/// BACnet service request and response codecs.
pub mod services;
/// Core BACnet data types: object identifiers, property identifiers, and data values.
pub mod types;

pub use error::{DecodeError, EncodeError};
