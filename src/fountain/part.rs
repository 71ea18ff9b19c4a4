use minicbor::{decode, encode, Decoder, Encoder};

use super::Error;

/// A part emitted by a fountain [`Encoder`](super::Encoder).
///
/// On the wire a part is the CBOR array
/// `[sequence, sequence_count, message_length, checksum, data]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    sequence: u32,
    sequence_count: usize,
    message_length: usize,
    checksum: u32,
    data: Vec<u8>,
}

/// The properties every part of one transfer has in common.
///
/// The first part a decoder accepts fixes the descriptor; parts that
/// disagree with it belong to some other transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor {
    pub sequence_count: usize,
    pub message_length: usize,
    pub checksum: u32,
    pub fragment_length: usize,
}

impl Part {
    #[must_use]
    pub fn new(
        sequence: u32,
        sequence_count: usize,
        message_length: usize,
        checksum: u32,
        data: Vec<u8>,
    ) -> Self {
        Self {
            sequence,
            sequence_count,
            message_length,
            checksum,
            data,
        }
    }

    /// Decodes a part from its CBOR representation.
    ///
    /// # Errors
    ///
    /// Fails if `cbor` is not an array of two unsigned integers, two
    /// unsigned integers and a byte string.
    pub fn from_cbor(cbor: &[u8]) -> Result<Self, Error> {
        minicbor::decode(cbor).map_err(|e| Error::Cbor(e.to_string()))
    }

    /// Encodes the part as CBOR.
    #[must_use]
    pub fn to_cbor(&self) -> Vec<u8> {
        // Encoding into a `Vec` cannot fail.
        minicbor::to_vec(self).unwrap_or_default()
    }

    /// The indexes of the fragments mixed into this part.
    #[must_use]
    pub fn indexes(&self) -> Vec<usize> {
        super::choose_fragments(self.sequence, self.sequence_count, self.checksum)
    }

    /// The `sequence-count` path component of the part's UR.
    #[must_use]
    pub fn sequence_id(&self) -> String {
        format!("{}-{}", self.sequence, self.sequence_count)
    }

    #[must_use]
    pub fn descriptor(&self) -> Descriptor {
        Descriptor {
            sequence_count: self.sequence_count,
            message_length: self.message_length,
            checksum: self.checksum,
            fragment_length: self.data.len(),
        }
    }

    /// Checks that the part describes a transfer that can be decoded at all.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidPart`] on a zero sequence number or count,
    /// a count above [`MAX_SEQUENCE_COUNT`](super::MAX_SEQUENCE_COUNT), empty
    /// data, or a fragment count that does not cover the message length.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sequence == 0 {
            return Err(Error::InvalidPart("sequence number must be positive"));
        }
        if self.sequence_count == 0 {
            return Err(Error::InvalidPart("sequence count must be positive"));
        }
        if self.sequence_count > super::MAX_SEQUENCE_COUNT {
            return Err(Error::InvalidPart("sequence count exceeds the maximum"));
        }
        if self.data.is_empty() {
            return Err(Error::InvalidPart("empty fragment"));
        }
        if self.message_length.div_ceil(self.data.len()) != self.sequence_count {
            return Err(Error::InvalidPart(
                "sequence count does not match message and fragment length",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    #[must_use]
    pub const fn sequence_count(&self) -> usize {
        self.sequence_count
    }

    #[must_use]
    pub const fn message_length(&self) -> usize {
        self.message_length
    }

    #[must_use]
    pub const fn checksum(&self) -> u32 {
        self.checksum
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl<C> minicbor::Encode<C> for Part {
    fn encode<W: encode::Write>(
        &self,
        e: &mut Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), encode::Error<W::Error>> {
        e.array(5)?
            .u32(self.sequence)?
            .u64(self.sequence_count as u64)?
            .u64(self.message_length as u64)?
            .u32(self.checksum)?
            .bytes(&self.data)?;
        Ok(())
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Part {
    fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
        if d.array()? != Some(5) {
            return Err(decode::Error::message("expected an array of five items"));
        }
        let sequence = d.u32()?;
        let sequence_count = usize::try_from(d.u64()?)
            .map_err(|_| decode::Error::message("sequence count out of range"))?;
        let message_length = usize::try_from(d.u64()?)
            .map_err(|_| decode::Error::message("message length out of range"))?;
        let checksum = d.u32()?;
        let data = d.bytes()?.to_vec();
        Ok(Self {
            sequence,
            sequence_count,
            message_length,
            checksum,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_cbor() {
        let part = Part::new(12, 8, 100, 0x1234_5678, vec![1, 5, 3, 3, 5]);
        let cbor = part.to_cbor();
        assert_eq!(hex::encode(&cbor), "850c0818641a12345678450105030305");
        assert_eq!(Part::from_cbor(&cbor).unwrap(), part);
        assert_eq!(part.sequence_id(), "12-8");
    }

    #[test]
    fn test_part_cbor_errors() {
        // single-element array
        assert!(matches!(
            Part::from_cbor(&hex::decode("8501").unwrap()),
            Err(Error::Cbor(_))
        ));
        // array of four items
        assert!(matches!(
            Part::from_cbor(&hex::decode("840c081864").unwrap()),
            Err(Error::Cbor(_))
        ));
        // text instead of bytes
        assert!(matches!(
            Part::from_cbor(&hex::decode("850c0818641a1234567865686921").unwrap()),
            Err(Error::Cbor(_))
        ));
        // sequence number beyond u32
        assert!(matches!(
            Part::from_cbor(&hex::decode("851b0000000100000000081864001a0000000041").unwrap()),
            Err(Error::Cbor(_))
        ));
        assert!(matches!(Part::from_cbor(&[]), Err(Error::Cbor(_))));
    }

    #[test]
    fn test_descriptor() {
        let part = Part::new(3, 3, 13, 7, vec![0; 5]);
        assert_eq!(
            part.descriptor(),
            Descriptor {
                sequence_count: 3,
                message_length: 13,
                checksum: 7,
                fragment_length: 5,
            }
        );
    }

    #[test]
    fn test_validate() {
        assert!(Part::new(1, 3, 13, 0, vec![0; 5]).validate().is_ok());
        assert!(Part::new(9, 3, 11, 0, vec![0; 5]).validate().is_ok());
        assert_eq!(
            Part::new(0, 3, 13, 0, vec![0; 5]).validate(),
            Err(Error::InvalidPart("sequence number must be positive"))
        );
        assert_eq!(
            Part::new(1, 0, 13, 0, vec![0; 5]).validate(),
            Err(Error::InvalidPart("sequence count must be positive"))
        );
        assert_eq!(
            Part::new(1, 3, 13, 0, vec![]).validate(),
            Err(Error::InvalidPart("empty fragment"))
        );
        assert!(Part::new(1, 2, 13, 0, vec![0; 5]).validate().is_err());
        assert!(Part::new(1, 3, 0, 0, vec![0; 5]).validate().is_err());
        assert!(Part::new(1, 1 << 16, 1 << 16, 0, vec![0]).validate().is_ok());
        assert_eq!(
            Part::new(1, (1 << 16) + 1, (1 << 16) + 1, 0, vec![0]).validate(),
            Err(Error::InvalidPart("sequence count exceeds the maximum"))
        );
    }
}
