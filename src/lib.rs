//! `ur_fountain` splits binary payloads into "Uniform Resource" parts and
//! puts them back together. The encoding is optimized for transport in URIs
//! and animated QR codes.
//!
//! # Encode binary data
//! ```
//! use ur_fountain::bytewords::{encode, Style};
//! let encoded = encode("Some binary data".as_bytes(), Style::Minimal);
//! assert_eq!(encoded, "gujljnihcxidinjthsjpkkcxiehsjyhsnsgdmkht");
//! ```
//!
//! # Split up payloads into uniform resource URIs
//!
//! This uses the minimal bytewords encoding scheme demonstrated above.
//! ```
//! let data = String::from("Some binary data").repeat(100);
//! let mut encoder = ur_fountain::Encoder::bytes(data.as_bytes(), 10).unwrap();
//! let part = encoder.next_part();
//! assert!(part.starts_with("ur:bytes/1-"));
//! ```
//!
//! # Emit a stream of URs that can be recombined into the payload
//!
//! The receiver can start to receive at any time, miss arbitrary
//! transmissions, and still successfully restore the payload.
//! ```
//! use ur_fountain::{Decoder, Encoder};
//! let data = String::from("Some binary data").repeat(100);
//! let mut encoder = Encoder::new(data.as_bytes(), 10, "bytes").unwrap();
//! let mut decoder = Decoder::default();
//! while !decoder.complete() {
//!     let part = encoder.next_part();
//!     // Simulate some communication loss
//!     if encoder.current_index() & 1 > 0 {
//!         decoder.receive(&part).unwrap();
//!     }
//! }
//! assert_eq!(decoder.message().unwrap().unwrap(), data.as_bytes());
//! ```

pub mod bytewords;
pub mod constants;
pub mod fountain;
pub mod sampler;
pub mod ur;
pub mod xoshiro;

pub use self::ur::Decoder;
pub use self::ur::Encoder;
pub use self::ur::{decode, encode};

/// The CRC-32 variant shared by the bytewords alphabet and the transfer
/// checksum of fountain parts.
#[must_use]
pub const fn crc32() -> crc::Crc<u32> {
    crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC)
}

/// Computes the transfer checksum of a complete message.
#[must_use]
pub fn checksum(data: &[u8]) -> u32 {
    crc32().checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(b"Hello, world!"), 0xebe6_c6e6);
        assert_eq!(checksum(b"Wolf"), 0x598c_84dc);
        assert_eq!(checksum(&[]), 0);
    }
}
