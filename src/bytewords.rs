//! Encode and decode byte payloads according to the [`bytewords`](https://github.com/BlockchainCommons/Research/blob/master/papers/bcr-2020-012-bytewords.md) scheme.
//!
//! Every encoding carries a trailing CRC-32 of the payload, so transcription
//! errors are caught on decode. Three styles are defined.
//!
//! # Standard style
//! ```
//! use ur_fountain::bytewords::{decode, encode, Style};
//! let data = "Some bytes".as_bytes();
//! let encoded = encode(data, Style::Standard);
//! assert_eq!(
//!     encoded,
//!     "guru jowl join inch crux iced kick jury inch junk taxi aqua kite limp"
//! );
//! assert_eq!(data, decode(&encoded, Style::Standard).unwrap());
//! ```
//!
//! # URI style
//! ```
//! use ur_fountain::bytewords::{decode, encode, Style};
//! let data = "Some bytes".as_bytes();
//! let encoded = encode(data, Style::Uri);
//! assert_eq!(
//!     encoded,
//!     "guru-jowl-join-inch-crux-iced-kick-jury-inch-junk-taxi-aqua-kite-limp"
//! );
//! assert_eq!(data, decode(&encoded, Style::Uri).unwrap());
//! ```
//!
//! # Minimal style
//! ```
//! use ur_fountain::bytewords::{decode, encode, Style};
//! let data = "Some binary data".as_bytes();
//! let encoded = encode(data, Style::Minimal);
//! assert_eq!(encoded, "gujljnihcxidinjthsjpkkcxiehsjyhsnsgdmkht");
//! assert_eq!(data, decode(&encoded, Style::Minimal).unwrap());
//! ```

use crate::constants::{MINIMALS, MINIMAL_IDXS, WORDS, WORD_IDXS};

/// The three different `bytewords` encoding styles. See the [`encode`] documentation for examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Four-letter words, separated by spaces
    Standard,
    /// Four-letter words, separated by dashes
    Uri,
    /// Two-letter words, concatenated without separators
    Minimal,
}

impl Style {
    const fn separator(self) -> &'static str {
        match self {
            Self::Standard => " ",
            Self::Uri => "-",
            Self::Minimal => "",
        }
    }
}

/// Errors that can be returned when decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Usually indicates a wrong encoding [`Style`] was passed.
    #[error("invalid word")]
    InvalidWord,
    /// The CRC32 checksum doesn't validate.
    #[error("invalid checksum")]
    InvalidChecksum,
    /// Invalid bytewords string length.
    #[error("invalid length")]
    InvalidLength,
    /// The bytewords string contains non-ASCII characters.
    #[error("bytewords string contains non-ASCII characters")]
    NonAscii,
}

/// Decodes a `bytewords`-encoded String back into a byte payload. The encoding
/// must contain a four-byte checksum.
///
/// # Examples
///
/// ```
/// use ur_fountain::bytewords::{decode, Style};
/// assert_eq!(
///     decode("able tied also webs lung", Style::Standard).unwrap(),
///     vec![0]
/// );
/// assert_eq!(
///     decode("able-tied-also-webs-lung", Style::Uri).unwrap(),
///     vec![0]
/// );
/// // Notice how the minimal encoding consists of the start and end letters of the bytewords
/// assert_eq!(decode("aetdaowslg", Style::Minimal).unwrap(), vec![0]);
/// ```
///
/// # Errors
///
/// If the encoded string contains unrecognized words, is inconsistent with
/// the provided `style`, or contains an invalid checksum, an error will be
/// returned.
pub fn decode(encoded: &str, style: Style) -> Result<Vec<u8>, Error> {
    if !encoded.is_ascii() {
        return Err(Error::NonAscii);
    }

    let data = match style {
        Style::Standard | Style::Uri => lookup(encoded.split(style.separator()), &WORD_IDXS)?,
        Style::Minimal => {
            if encoded.len() % 2 != 0 {
                return Err(Error::InvalidLength);
            }
            // ASCII was checked above, so every two-byte window is a `str`.
            let keys = encoded
                .as_bytes()
                .chunks_exact(2)
                .map(|pair| core::str::from_utf8(pair).unwrap_or_default());
            lookup(keys, &MINIMAL_IDXS)?
        }
    };
    strip_checksum(data)
}

fn lookup<'a>(
    keys: impl Iterator<Item = &'a str>,
    table: &phf::Map<&'static str, u8>,
) -> Result<Vec<u8>, Error> {
    keys.map(|k| table.get(k).copied())
        .collect::<Option<Vec<_>>>()
        .ok_or(Error::InvalidWord)
}

fn strip_checksum(mut data: Vec<u8>) -> Result<Vec<u8>, Error> {
    if data.len() < 4 {
        return Err(Error::InvalidChecksum);
    }
    let (payload, checksum) = data.split_at(data.len() - 4);
    if crate::checksum(payload).to_be_bytes() == checksum {
        data.truncate(data.len() - 4);
        Ok(data)
    } else {
        Err(Error::InvalidChecksum)
    }
}

/// Encodes a byte payload into a `bytewords` encoded String.
///
/// # Examples
///
/// ```
/// use ur_fountain::bytewords::{encode, Style};
/// assert_eq!(encode(&[0], Style::Standard), "able tied also webs lung");
/// assert_eq!(encode(&[0], Style::Uri), "able-tied-also-webs-lung");
/// // Notice how the minimal encoding consists of the start and end letters of the bytewords
/// assert_eq!(encode(&[0], Style::Minimal), "aetdaowslg");
/// ```
#[must_use]
pub fn encode(data: &[u8], style: Style) -> String {
    let checksum = crate::checksum(data).to_be_bytes();
    let table = match style {
        Style::Standard | Style::Uri => &WORDS,
        Style::Minimal => &MINIMALS,
    };
    data.iter()
        .chain(checksum.iter())
        .map(|&b| table[usize::from(b)])
        .collect::<Vec<_>>()
        .join(style.separator())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_agree() {
        for (i, (word, minimal)) in WORDS.iter().zip(MINIMALS.iter()).enumerate() {
            assert_eq!(WORD_IDXS.get(*word).copied(), Some(i as u8));
            assert_eq!(MINIMAL_IDXS.get(*minimal).copied(), Some(i as u8));
            assert_eq!(minimal.len(), 2);
            assert!(word.starts_with(&minimal[..1]) && word.ends_with(&minimal[1..]));
        }
    }

    #[test]
    fn test_bytewords() {
        let input = vec![0, 1, 2, 128, 255];
        assert_eq!(
            encode(&input, Style::Standard),
            "able acid also lava zoom jade need echo taxi"
        );
        assert_eq!(
            encode(&input, Style::Uri),
            "able-acid-also-lava-zoom-jade-need-echo-taxi"
        );
        assert_eq!(encode(&input, Style::Minimal), "aeadaolazmjendeoti");

        assert_eq!(
            decode(
                "able acid also lava zoom jade need echo taxi",
                Style::Standard
            )
            .unwrap(),
            input
        );
        assert_eq!(decode("aeadaolazmjendeoti", Style::Minimal).unwrap(), input);

        // empty payload is allowed
        assert!(decode(&encode(&[], Style::Minimal), Style::Minimal)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            decode("aeadaolazojendeowf", Style::Minimal).unwrap_err(),
            Error::InvalidChecksum
        );
        assert_eq!(
            decode("able-acid-also-lava-zero-jade-need-echo-wolf", Style::Uri).unwrap_err(),
            Error::InvalidChecksum
        );
        // too short
        assert_eq!(
            decode("wolf", Style::Standard).unwrap_err(),
            Error::InvalidChecksum
        );
        assert_eq!(decode("", Style::Standard).unwrap_err(), Error::InvalidWord);
        // a standard encoding is not a minimal one
        assert_eq!(
            decode("able acid also lava", Style::Minimal).unwrap_err(),
            Error::InvalidLength
        );
        assert_eq!(
            decode("aea", Style::Minimal).unwrap_err(),
            Error::InvalidLength
        );
        assert_eq!(decode("₿", Style::Minimal).unwrap_err(), Error::NonAscii);
        assert_eq!(decode("₿", Style::Uri).unwrap_err(), Error::NonAscii);
    }

    #[test]
    fn test_encoding() {
        let input = hex::decode(
            "f5d714c6f1eb453bd1cda512969e7487e5d4139f1125eff0fd0b6dbf25f22678df299cbdf2fe93cc42a3d8afbf48a936203c90e6d289b8c52171580e9d1fb12e0173cd45e19641eb3a9041f0854571f73f35f2a5a0901a0d4fed85475245fea58a295518",
        )
        .unwrap();

        let encoded_minimal = "yktsbbswwnwmfefrttsnonbgmtnnjyltvwtybwne\
                               bydawswtzcbdjnrsdawzdsksurdtnsrywzzemusf\
                               fwottppersfdptencxfnmhvatdldroskcljshdba\
                               ntctpadmadjksnfevymtfpwmftmhfpwtlpfejsyl\
                               fhecwzonnbmhcybtgwwelpflgmfezeonledtgocs\
                               fzhycypf";

        assert_eq!(decode(encoded_minimal, Style::Minimal).unwrap(), input);
        assert_eq!(encode(&input, Style::Minimal), encoded_minimal);
        let standard = encode(&input, Style::Standard);
        assert!(standard.starts_with("yank toys bulb skew when warm"));
        assert!(standard.ends_with("fizz holy city puff"));
    }
}
