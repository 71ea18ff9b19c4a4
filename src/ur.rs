//! Split up big payloads into constantly sized URIs which can be recombined by a decoder.
//!
//! The `ur` module provides thin wrappers around fountain en- and decoders
//! which turn these fountain parts into URIs. To this end the fountain part
//! attributes (data, checksum, indexes being used, etc.) are combined with
//! CBOR into a self-describing byte payload and encoded with the `bytewords`
//! encoding into URIs suitable for web transport and QR codes.
//!
//! A single-part UR carries the payload directly:
//! `ur:<type>/<bytewords>`. A multipart UR adds the sequence number and
//! count of the fountain part: `ur:<type>/<seq>-<count>/<bytewords>`.

use tracing::debug;

use crate::bytewords::{self, Style};
use crate::fountain::{self, Config, Part};

/// Errors that can happen during encoding and decoding of URs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A bytewords error.
    #[error(transparent)]
    Bytewords(#[from] bytewords::Error),
    /// A fountain error.
    #[error(transparent)]
    Fountain(#[from] fountain::Error),
    /// Invalid scheme.
    #[error("invalid scheme")]
    InvalidScheme,
    /// No type specified.
    #[error("no type specified")]
    TypeUnspecified,
    /// The type contains characters other than `a-z`, `0-9` and `-`.
    #[error("type contains invalid characters")]
    InvalidCharacters,
    /// The path after the type has neither one nor two components.
    #[error("invalid path")]
    InvalidPath,
    /// The sequence component is not of the form `<seq>-<count>`.
    #[error("invalid indices")]
    InvalidIndices,
    /// The given parts do not suffice to restore the message.
    #[error("not enough parts to restore the message")]
    NotComplete,
}

/// The two shapes a UR can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The whole payload in one UR.
    SinglePart,
    /// A fountain part of a larger payload.
    MultiPart,
}

/// Encodes a data payload into a single URI.
///
/// # Examples
///
/// ```
/// assert_eq!(
///     ur_fountain::ur::encode(b"data", "bytes"),
///     "ur:bytes/iehsjyhspmwfwfia"
/// );
/// ```
#[must_use]
pub fn encode(data: &[u8], ur_type: &str) -> String {
    format!("ur:{ur_type}/{}", bytewords::encode(data, Style::Minimal))
}

fn encode_part(part: &Part, ur_type: &str) -> String {
    format!(
        "ur:{ur_type}/{}/{}",
        part.sequence_id(),
        bytewords::encode(&part.to_cbor(), Style::Minimal)
    )
}

/// Decodes a single URI (either single- or multipart) into a byte payload.
///
/// For a multipart UR the payload is the CBOR encoding of the fountain
/// [`Part`].
///
/// # Examples
///
/// ```
/// use ur_fountain::ur::{decode, Kind};
/// assert_eq!(
///     decode("ur:bytes/iehsjyhspmwfwfia").unwrap(),
///     (Kind::SinglePart, b"data".to_vec())
/// );
/// ```
///
/// # Errors
///
/// This function errors for invalid inputs, for example an invalid scheme
/// other than `ur`, an invalid type, or a malformed `bytewords` payload.
pub fn decode(value: &str) -> Result<(Kind, Vec<u8>), Error> {
    let parsed = parse(value)?;
    let kind = match parsed.sequence {
        None => Kind::SinglePart,
        Some(_) => Kind::MultiPart,
    };
    Ok((kind, parsed.payload))
}

struct Parsed {
    ur_type: String,
    sequence: Option<(u32, usize)>,
    payload: Vec<u8>,
}

fn parse(value: &str) -> Result<Parsed, Error> {
    // QR codes in alphanumeric mode upper-case the whole URI.
    let value = value.to_ascii_lowercase();
    let rest = value.strip_prefix("ur:").ok_or(Error::InvalidScheme)?;
    let (ur_type, path) = rest.split_once('/').ok_or(Error::InvalidPath)?;
    validate_type(ur_type)?;
    let (sequence, body) = match path.split_once('/') {
        None => (None, path),
        Some((sequence, body)) => (Some(parse_sequence(sequence)?), body),
    };
    if body.contains('/') {
        return Err(Error::InvalidPath);
    }
    Ok(Parsed {
        ur_type: ur_type.to_string(),
        sequence,
        payload: bytewords::decode(body, Style::Minimal)?,
    })
}

fn validate_type(ur_type: &str) -> Result<(), Error> {
    if ur_type.is_empty() {
        return Err(Error::TypeUnspecified);
    }
    if !ur_type
        .bytes()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == b'-')
    {
        return Err(Error::InvalidCharacters);
    }
    Ok(())
}

fn parse_sequence(sequence: &str) -> Result<(u32, usize), Error> {
    let (index, count) = sequence.split_once('-').ok_or(Error::InvalidIndices)?;
    let index = index.parse::<u32>().map_err(|_| Error::InvalidIndices)?;
    let count = count.parse::<usize>().map_err(|_| Error::InvalidIndices)?;
    if index == 0 || count == 0 {
        return Err(Error::InvalidIndices);
    }
    Ok((index, count))
}

/// Wraps `data` into a CBOR byte string, the payload of the `bytes` type.
fn cbor_bytes(data: &[u8]) -> Vec<u8> {
    // Encoding into a `Vec` cannot fail.
    minicbor::to_vec(<&minicbor::bytes::ByteSlice>::from(data)).unwrap_or_default()
}

/// A uniform resource encoder with an underlying fountain encoding.
///
/// # Examples
///
/// See the [`crate::ur`] module documentation for an example.
#[derive(Debug)]
pub struct Encoder {
    fountain: fountain::Encoder,
    ur_type: String,
}

impl Encoder {
    /// Creates a new [`Encoder`] for given a message payload.
    ///
    /// The emitted fountain parts will respect the maximum fragment length argument.
    ///
    /// # Examples
    ///
    /// See the [`crate::ur`] module documentation for an example.
    ///
    /// # Errors
    ///
    /// If an empty message, a zero maximum fragment length or an invalid
    /// type is passed, or the message needs more than
    /// [`MAX_SEQUENCE_COUNT`](fountain::MAX_SEQUENCE_COUNT) fragments, an
    /// error will be returned.
    pub fn new(message: &[u8], max_fragment_length: usize, ur_type: &str) -> Result<Self, Error> {
        Self::with_config(
            message,
            Config::default().with_max_fragment_length(max_fragment_length),
            ur_type,
        )
    }

    /// Creates a new [`Encoder`] with explicit fountain parameters.
    ///
    /// # Errors
    ///
    /// If the message is empty, the configuration is invalid or the type
    /// contains invalid characters, an error will be returned.
    pub fn with_config(message: &[u8], config: Config, ur_type: &str) -> Result<Self, Error> {
        validate_type(ur_type)?;
        Ok(Self {
            fountain: fountain::Encoder::with_config(message, config)?,
            ur_type: ur_type.to_string(),
        })
    }

    /// Creates a new [`bytes`](https://github.com/BlockchainCommons/Research/blob/master/papers/bcr-2020-006-urtypes.md#arbitrary-content-bytes-bytes)
    /// [`Encoder`] for given a message payload.
    ///
    /// The payload is wrapped into a CBOR byte string first.
    ///
    /// # Errors
    ///
    /// If an empty message or a zero maximum fragment length is passed, an error
    /// will be returned.
    pub fn bytes(message: &[u8], max_fragment_length: usize) -> Result<Self, Error> {
        Self::new(&cbor_bytes(message), max_fragment_length, "bytes")
    }

    /// Returns the URI corresponding to the next fountain part.
    ///
    /// A message that fits into a single fragment is emitted as a
    /// single-part UR, every time.
    ///
    /// # Examples
    ///
    /// See the [`crate::ur`] module documentation for an example.
    pub fn next_part(&mut self) -> String {
        let part = self.fountain.next_part();
        if part.sequence_count() == 1 {
            encode(part.data(), &self.ur_type)
        } else {
            encode_part(&part, &self.ur_type)
        }
    }

    /// Emits the URIs of the next
    /// [`total_part_count`](fountain::Encoder::total_part_count) parts.
    pub fn fountain_parts(&mut self) -> Vec<String> {
        (0..self.fountain.total_part_count())
            .map(|_| self.next_part())
            .collect()
    }

    /// Returns the current count of already emitted parts.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut encoder = ur_fountain::Encoder::bytes(b"data", 5).unwrap();
    /// assert_eq!(encoder.current_index(), 0);
    /// encoder.next_part();
    /// assert_eq!(encoder.current_index(), 1);
    /// ```
    #[must_use]
    pub const fn current_index(&self) -> u32 {
        self.fountain.current_sequence()
    }

    /// Returns the number of segments the original message has been split up into.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut encoder = ur_fountain::Encoder::bytes(b"data", 3).unwrap();
    /// assert_eq!(encoder.fragment_count(), 2);
    /// ```
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fountain.fragment_count()
    }

    #[must_use]
    pub fn ur_type(&self) -> &str {
        &self.ur_type
    }
}

/// A uniform resource decoder able to receive URIs that encode a fountain part.
///
/// # Examples
///
/// See the [`crate::ur`] module documentation for an example.
#[derive(Debug, Default)]
pub struct Decoder {
    fountain: fountain::Decoder,
    ur_type: Option<String>,
    single: Option<Vec<u8>>,
}

impl Decoder {
    /// Receives a URI representing a CBOR and `bytewords`-encoded fountain part
    /// into the decoder.
    ///
    /// Returns whether the part was taken into account. URs with an invalid
    /// type, a type other than the one of the first accepted part, or
    /// sequence indices disagreeing with their payload are declined, as are
    /// all URs once the decoder is complete.
    ///
    /// # Examples
    ///
    /// See the [`crate::ur`] module documentation for an example.
    ///
    /// # Errors
    ///
    /// This function may error along all the necessary decoding steps:
    ///  - bytewords to binary conversion
    ///  - CBOR decoding
    ///  - fountain part validation
    pub fn receive(&mut self, value: &str) -> Result<bool, Error> {
        if self.complete() {
            return Ok(false);
        }
        let parsed = match parse(value) {
            Ok(parsed) => parsed,
            Err(e @ (Error::TypeUnspecified | Error::InvalidCharacters)) => {
                debug!(error = %e, "dropping UR with invalid type");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        if let Some(expected) = &self.ur_type {
            if *expected != parsed.ur_type {
                debug!(%expected, received = %parsed.ur_type, "dropping UR of another type");
                return Ok(false);
            }
        }

        match parsed.sequence {
            None => {
                if self.fountain.descriptor().is_some() {
                    debug!("dropping single-part UR during a multipart transfer");
                    return Ok(false);
                }
                self.ur_type = Some(parsed.ur_type);
                self.single = Some(parsed.payload);
                Ok(true)
            }
            Some((sequence, sequence_count)) => {
                let part = Part::from_cbor(&parsed.payload)?;
                if part.sequence() != sequence || part.sequence_count() != sequence_count {
                    debug!(
                        seq_num = sequence,
                        seq_len = sequence_count,
                        part = %part.sequence_id(),
                        "dropping UR whose indices disagree with its payload"
                    );
                    return Ok(false);
                }
                let accepted = self.fountain.receive(&part)?;
                if accepted && self.ur_type.is_none() {
                    self.ur_type = Some(parsed.ur_type);
                }
                Ok(accepted)
            }
        }
    }

    /// Feeds `parts` into a fresh decoder until it is complete.
    ///
    /// # Examples
    ///
    /// ```
    /// use ur_fountain::{Decoder, Encoder};
    /// let mut encoder = Encoder::new(b"binary data", 4, "bytes").unwrap();
    /// let parts: Vec<String> = (0..3).map(|_| encoder.next_part()).collect();
    /// assert_eq!(Decoder::decode_parts(&parts).unwrap(), b"binary data");
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on the first malformed part, on a checksum mismatch, and with
    /// [`Error::NotComplete`] if the parts do not suffice.
    pub fn decode_parts<I>(parts: I) -> Result<Vec<u8>, Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut decoder = Self::default();
        for part in parts {
            decoder.receive(part.as_ref())?;
            if decoder.complete() {
                break;
            }
        }
        decoder.into_message()?.ok_or(Error::NotComplete)
    }

    /// The type fixed by the first accepted UR.
    #[must_use]
    pub fn ur_type(&self) -> Option<&str> {
        self.ur_type.as_deref()
    }

    /// Returns whether the decoder is complete and hence the message available.
    ///
    /// # Examples
    ///
    /// See the [`crate::ur`] module documentation for an example.
    #[must_use]
    pub const fn complete(&self) -> bool {
        self.single.is_some() || self.fountain.complete()
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.single.is_some() || self.fountain.is_success()
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.fountain.is_failure()
    }

    /// If [`complete`](Self::complete), returns the decoded message, `None` otherwise.
    ///
    /// # Errors
    ///
    /// If the reassembled message does not match the transfer checksum, an
    /// error is returned.
    pub fn message(&self) -> Result<Option<Vec<u8>>, Error> {
        match &self.single {
            Some(message) => Ok(Some(message.clone())),
            None => Ok(self.fountain.message()?),
        }
    }

    /// Like [`message`](Self::message), but hands over the message without
    /// copying it.
    ///
    /// # Errors
    ///
    /// If the reassembled message does not match the transfer checksum, an
    /// error is returned.
    pub fn into_message(self) -> Result<Option<Vec<u8>>, Error> {
        match self.single {
            Some(message) => Ok(Some(message)),
            None => Ok(self.fountain.into_message()?),
        }
    }

    #[must_use]
    pub fn result_error(&self) -> Option<&fountain::Error> {
        self.fountain.result_error()
    }

    #[must_use]
    pub fn expected_part_count(&self) -> usize {
        match self.single {
            Some(_) => 1,
            None => self.fountain.expected_part_count(),
        }
    }

    #[must_use]
    pub fn expected_part_indexes(&self) -> Vec<usize> {
        (0..self.expected_part_count()).collect()
    }

    #[must_use]
    pub fn received_part_indexes(&self) -> Vec<usize> {
        match self.single {
            Some(_) => vec![0],
            None => self.fountain.received_part_indexes(),
        }
    }

    #[must_use]
    pub fn last_part_indexes(&self) -> &[usize] {
        match self.single {
            Some(_) => &[0],
            None => self.fountain.last_part_indexes(),
        }
    }

    #[must_use]
    pub const fn processed_parts_count(&self) -> usize {
        match self.single {
            Some(_) => 1,
            None => self.fountain.processed_parts_count(),
        }
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        match self.single {
            Some(_) => 1.0,
            None => self.fountain.progress(),
        }
    }

    #[must_use]
    pub fn estimated_percent_complete(&self) -> f64 {
        match self.single {
            Some(_) => 1.0,
            None => self.fountain.estimated_percent_complete(),
        }
    }
}
