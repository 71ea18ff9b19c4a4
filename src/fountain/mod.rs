//! Split up big payloads into constantly sized chunks which can be recombined by a decoder.
//!
//! The `fountain` module provides an implementation of a fountain encoder, which splits
//! up a byte payload into multiple segments and emits an unbounded stream of parts which
//! can be recombined at the receiving decoder side. The emitted parts are either original
//! payload segments, or constructed by xor-ing a certain set of payload segments.
//!
//! A seeded `Xoshiro` RNG ensures that the receiver can reconstruct which segments
//! were combined into the part.
//! ```
//! let xor = |a: &[u8], b: &[u8]| -> Vec<_> { a.iter().zip(b).map(|(&x1, &x2)| x1 ^ x2).collect() };
//!
//! let data = String::from("Ten chars!");
//! let max_length = 4;
//! // note the padding
//! let (p1, p2, p3) = ("Ten ".as_bytes(), "char".as_bytes(), "s!\u{0}\u{0}".as_bytes());
//!
//! let mut encoder = ur_fountain::fountain::Encoder::new(data.as_bytes(), max_length).unwrap();
//! let mut decoder = ur_fountain::fountain::Decoder::default();
//!
//! // the fountain encoder first emits all original segments in order
//! let part1 = encoder.next_part();
//! assert_eq!(part1.data(), p1);
//! // receive the first part into the decoder
//! decoder.receive(&part1).unwrap();
//!
//! let part2 = encoder.next_part();
//! assert_eq!(part2.data(), p2);
//! // receive the second part into the decoder
//! decoder.receive(&part2).unwrap();
//!
//! // miss the third part
//! assert_eq!(encoder.next_part().data(), p3);
//!
//! // the RNG then first selects the original third segment
//! assert_eq!(encoder.next_part().data(), p3);
//!
//! // the RNG then selects all three segments to be xored
//! let xored = encoder.next_part();
//! assert_eq!(xored.data(), xor(&xor(p1, p2), p3));
//! // receive the xored part into the decoder
//! // since it already has p1 and p2, p3 can be computed
//! decoder.receive(&xored).unwrap();
//!
//! // decoder is now complete
//! assert!(decoder.complete());
//! assert_eq!(decoder.message().unwrap().unwrap(), data.as_bytes());
//! ```

mod config;
pub mod decoder;
pub mod encoder;
pub mod part;

pub use self::config::Config;
pub use self::decoder::Decoder;
pub use self::encoder::Encoder;
pub use self::part::{Descriptor, Part};

/// The largest number of fragments a transfer may be split into.
///
/// Selecting the fragments of a mixed part costs time and memory linear in
/// the fragment count, so parts claiming more are rejected.
pub const MAX_SEQUENCE_COUNT: usize = 1 << 16;

/// Errors that can happen during fountain encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Could not decode the CBOR payload of a part.
    #[error("cbor: {0}")]
    Cbor(String),
    /// The encoder was asked to encode an empty message.
    #[error("expected non-empty message")]
    EmptyMessage,
    /// The fragment length bounds are zero or inverted.
    #[error("invalid fragment length bounds: min {min}, max {max}")]
    InvalidFragmentLength { min: usize, max: usize },
    /// The message needs more than [`MAX_SEQUENCE_COUNT`] fragments.
    #[error("{count} fragments exceed the maximum of {}", MAX_SEQUENCE_COUNT)]
    TooManyFragments { count: usize },
    /// The redundancy ratio is negative or not finite.
    #[error("redundancy ratio must be finite and non-negative")]
    InvalidRedundancyRatio,
    /// A received part is not self-consistent.
    #[error("invalid part: {0}")]
    InvalidPart(&'static str),
    /// The fragments hold fewer bytes than the message length.
    #[error("insufficient data to join fragments")]
    InsufficientData,
    /// The reassembled message does not match the transfer checksum.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    InvalidChecksum { expected: u32, actual: u32 },
}

/// Computes the nominal fragment length for a message.
///
/// Picks the smallest fragment count for which evenly sized fragments stay
/// within `max_fragment_length`, while never using more fragments than
/// `min_fragment_length` allows.
///
/// # Examples
///
/// ```
/// use ur_fountain::fountain::fragment_length;
/// assert_eq!(fragment_length(13, 5, 5), 5);
/// assert_eq!(fragment_length(12345, 10, 1955), 1764);
/// ```
#[must_use]
pub fn fragment_length(
    message_length: usize,
    min_fragment_length: usize,
    max_fragment_length: usize,
) -> usize {
    let max_fragment_count = message_length.div_ceil(min_fragment_length.max(1));
    let mut fragment_length = 0;
    for fragment_count in 1..=max_fragment_count {
        fragment_length = message_length.div_ceil(fragment_count);
        if fragment_length <= max_fragment_length {
            break;
        }
    }
    fragment_length
}

/// Splits `data` into fragments of `fragment_length` bytes, zero-padding the last one.
#[must_use]
pub fn partition(mut data: Vec<u8>, fragment_length: usize) -> Vec<Vec<u8>> {
    if fragment_length == 0 {
        return Vec::new();
    }
    let padding = (fragment_length - (data.len() % fragment_length)) % fragment_length;
    data.resize(data.len() + padding, 0);
    data.chunks(fragment_length).map(<[u8]>::to_vec).collect()
}

/// Concatenates `fragments` and strips the padding beyond `message_length`.
///
/// # Errors
///
/// Fails with [`Error::InsufficientData`] if the fragments are shorter than
/// `message_length` in total.
pub fn join<'a>(
    fragments: impl IntoIterator<Item = &'a [u8]>,
    message_length: usize,
) -> Result<Vec<u8>, Error> {
    let mut message = Vec::with_capacity(message_length);
    for fragment in fragments {
        message.extend_from_slice(fragment);
    }
    if message.len() < message_length {
        return Err(Error::InsufficientData);
    }
    message.truncate(message_length);
    Ok(message)
}

/// Determines which fragments are mixed into the part with the given sequence number.
///
/// The first `fragment_count` sequence numbers map to the fragments in order.
/// Past that, the indexes are drawn from a [`Xoshiro256`](crate::xoshiro::Xoshiro256)
/// seeded by the sequence number and the transfer checksum, so encoders and
/// decoders agree on them without any coordination.
#[must_use]
pub fn choose_fragments(sequence: u32, fragment_count: usize, checksum: u32) -> Vec<usize> {
    if fragment_count == 0 {
        return Vec::new();
    }
    let sequence_index = usize::try_from(sequence).unwrap_or(usize::MAX);
    if (1..=fragment_count).contains(&sequence_index) {
        return vec![sequence_index - 1];
    }
    let mut xoshiro = crate::xoshiro::Xoshiro256::for_part(sequence, checksum);
    let degree = xoshiro.choose_degree(fragment_count);
    xoshiro.choose((0..fragment_count).collect(), degree)
}

/// Xors `other` into `data`, byte by byte.
pub fn xor_into(data: &mut [u8], other: &[u8]) {
    for (a, b) in data.iter_mut().zip(other) {
        *a ^= b;
    }
}
