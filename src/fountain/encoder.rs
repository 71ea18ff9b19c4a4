use tracing::debug;

use super::{
    choose_fragments, fragment_length, partition, xor_into, Config, Error, Part,
    MAX_SEQUENCE_COUNT,
};

/// An encoder capable of emitting fountain-encoded transmissions.
///
/// # Examples
///
/// See the [`crate::fountain`] module documentation for an example.
#[derive(Debug)]
pub struct Encoder {
    fragments: Vec<Vec<u8>>,
    message_length: usize,
    checksum: u32,
    current_sequence: u32,
    config: Config,
}

impl Encoder {
    /// Constructs a new [`Encoder`], given a message and a maximum fragment length.
    ///
    /// # Examples
    ///
    /// ```
    /// use ur_fountain::fountain::Encoder;
    /// let encoder = Encoder::new(b"binary data", 4).unwrap();
    /// assert_eq!(encoder.fragment_count(), 3);
    /// ```
    ///
    /// Note that the effective fragment length will not always equal the maximum
    /// fragment length, since fragments are evenly sized:
    ///
    /// ```
    /// use ur_fountain::fountain::Encoder;
    /// let encoder = Encoder::new(b"data", 3).unwrap();
    /// assert_eq!(encoder.fragment_count(), 2);
    /// assert_eq!(encoder.fragment_length(), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// If an empty message or a zero maximum fragment length is passed, an error
    /// will be returned.
    pub fn new(message: &[u8], max_fragment_length: usize) -> Result<Self, Error> {
        Self::with_config(
            message,
            Config::default().with_max_fragment_length(max_fragment_length),
        )
    }

    /// Constructs a new [`Encoder`] with explicit parameters.
    ///
    /// # Errors
    ///
    /// If the message is empty, the configuration does not
    /// [`validate`](Config::validate), or the message would need more than
    /// [`MAX_SEQUENCE_COUNT`] fragments, an error will be returned.
    pub fn with_config(message: &[u8], config: Config) -> Result<Self, Error> {
        config.validate()?;
        if message.is_empty() {
            return Err(Error::EmptyMessage);
        }
        let (min, max) = config.fragment_length_bounds();
        let fragment_length = fragment_length(message.len(), min, max);
        let count = message.len().div_ceil(fragment_length);
        if count > MAX_SEQUENCE_COUNT {
            return Err(Error::TooManyFragments { count });
        }
        let fragments = partition(message.to_vec(), fragment_length);
        let checksum = crate::checksum(message);
        debug!(
            message_length = message.len(),
            fragment_length,
            fragment_count = fragments.len(),
            checksum,
            "created fountain encoder"
        );
        Ok(Self {
            fragments,
            message_length: message.len(),
            checksum,
            current_sequence: config.first_sequence,
            config,
        })
    }

    /// Returns the current count of how many parts have been emitted.
    ///
    /// # Examples
    ///
    /// ```
    /// use ur_fountain::fountain::Encoder;
    /// let mut encoder = Encoder::new(b"data", 3).unwrap();
    /// assert_eq!(encoder.current_sequence(), 0);
    /// encoder.next_part();
    /// assert_eq!(encoder.current_sequence(), 1);
    /// ```
    #[must_use]
    pub const fn current_sequence(&self) -> u32 {
        self.current_sequence
    }

    /// Returns the number of segments the original message has been split up into.
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn fragment_length(&self) -> usize {
        self.fragments.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub const fn message_length(&self) -> usize {
        self.message_length
    }

    #[must_use]
    pub const fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Whether the whole message fits into one part.
    #[must_use]
    pub fn is_single_part(&self) -> bool {
        self.fragments.len() == 1
    }

    /// Returns whether all original segments have been emitted at least once.
    /// The fountain encoding is defined as doing this before combining segments
    /// with each other. Thus, this is equivalent to checking whether
    /// [`current_sequence`](Self::current_sequence) >= [`fragment_count`](Self::fragment_count).
    #[must_use]
    pub fn complete(&self) -> bool {
        usize::try_from(self.current_sequence).map_or(true, |s| s >= self.fragments.len())
    }

    /// The number of parts [`parts`](Self::parts) emits, given the configured
    /// redundancy ratio.
    #[must_use]
    pub fn total_part_count(&self) -> usize {
        self.config.total_part_count(self.fragments.len())
    }

    /// Returns the next part to be emitted by the fountain encoder.
    /// After all parts of the original message have been emitted once,
    /// the fountain encoder will emit the result of xoring together the parts
    /// selected by the Xoshiro RNG (which could be a single part).
    ///
    /// The sequence number wraps around after `u32::MAX`, skipping zero.
    ///
    /// # Examples
    ///
    /// See the [`crate::fountain`] module documentation for an example.
    pub fn next_part(&mut self) -> Part {
        self.current_sequence = self.current_sequence.wrapping_add(1).max(1);
        let indexes = choose_fragments(self.current_sequence, self.fragments.len(), self.checksum);
        let data = match indexes.as_slice() {
            [index] => self.fragments[*index].clone(),
            _ => {
                let mut mixed = vec![0; self.fragment_length()];
                for &index in &indexes {
                    xor_into(&mut mixed, &self.fragments[index]);
                }
                mixed
            }
        };
        Part::new(
            self.current_sequence,
            self.fragments.len(),
            self.message_length,
            self.checksum,
            data,
        )
    }

    /// Emits the next [`total_part_count`](Self::total_part_count) parts.
    pub fn parts(&mut self) -> Vec<Part> {
        (0..self.total_part_count()).map(|_| self.next_part()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xoshiro::test_utils::make_message;

    #[test]
    fn test_fountain_encoder() {
        let message = make_message("Wolf", 256);
        let mut encoder = Encoder::new(&message, 30).unwrap();
        let expected_parts = vec![
            "916ec65cf77cadf55cd7f9cda1a1030026ddd42e905b77adc36e4f2d3c",
            "cba44f7f04f2de44f42d84c374a0e149136f25b01852545961d55f7f7a",
            "8cde6d0e2ec43f3b2dcb644a2209e8c9e34af5c4747984a5e873c9cf5f",
            "965e25ee29039fdf8ca74f1c769fc07eb7ebaec46e0695aea6cbd60b3e",
            "c4bbff1b9ffe8a9e7240129377b9d3711ed38d412fbb4442256f1e6f59",
            "5e0fc57fed451fb0a0101fb76b1fb1e1b88cfdfdaa946294a47de8fff1",
            "73f021c0e6f65b05c0a494e50791270a0050a73ae69b6725505a2ec8a5",
            "791457c9876dd34aadd192a53aa0dc66b556c0c215c7ceb8248b717c22",
            "951e65305b56a3706e3e86eb01c803bbf915d80edcd64d4d0000000000",
            "330f0f33a05eead4f331df229871bee733b50de71afd2e5a79f196de09",
            "3b205ce5e52d8c24a52cffa34c564fa1af3fdffcd349dc4258ee4ee828",
            "dd7bf725ea6c16d531b5f03254783803048ca08b87148daacd1cd7a006",
            "760be7ad1c6187902bbc04f539b9ee5eb8ea6833222edea36031306c01",
            "5bf4031217d2c3254b088fa7553778b5003632f46e21db129416f65b55",
            "73f021c0e6f65b05c0a494e50791270a0050a73ae69b6725505a2ec8a5",
            "b8546ebfe2048541348910267331c643133f828afec9337c318f71b7df",
            "23dedeea74e3a0fb052befabefa13e2f80e4315c9dceed4c8630612e64",
            "d01a8daee769ce34b6b35d3ca0005302724abddae405bdb419c0a6b208",
            "3171c5dc365766eff25ae47c6f10e7de48cfb8474e050e5fe997a6dc24",
            "e055c2433562184fa71b4be94f262e200f01c6f74c284b0dc6fae6673f",
        ];
        assert_eq!(encoder.fragment_count(), 9);
        for (sequence, expected) in (1..).zip(expected_parts) {
            let part = encoder.next_part();
            assert_eq!(part.sequence(), sequence);
            assert_eq!(part.sequence_count(), 9);
            assert_eq!(part.message_length(), 256);
            assert_eq!(part.checksum(), 23_570_951);
            assert_eq!(hex::encode(part.data()), expected);
        }
    }

    #[test]
    fn test_fountain_encoder_cbor() {
        let message = make_message("Wolf", 256);
        let mut encoder = Encoder::new(&message, 30).unwrap();
        let expected_parts = vec![
            "8501091901001a0167aa07581d916ec65cf77cadf55cd7f9cda1a1030026ddd42e905b77adc36e4f2d3c",
            "8502091901001a0167aa07581dcba44f7f04f2de44f42d84c374a0e149136f25b01852545961d55f7f7a",
            "8503091901001a0167aa07581d8cde6d0e2ec43f3b2dcb644a2209e8c9e34af5c4747984a5e873c9cf5f",
            "8504091901001a0167aa07581d965e25ee29039fdf8ca74f1c769fc07eb7ebaec46e0695aea6cbd60b3e",
            "8505091901001a0167aa07581dc4bbff1b9ffe8a9e7240129377b9d3711ed38d412fbb4442256f1e6f59",
            "8506091901001a0167aa07581d5e0fc57fed451fb0a0101fb76b1fb1e1b88cfdfdaa946294a47de8fff1",
            "8507091901001a0167aa07581d73f021c0e6f65b05c0a494e50791270a0050a73ae69b6725505a2ec8a5",
            "8508091901001a0167aa07581d791457c9876dd34aadd192a53aa0dc66b556c0c215c7ceb8248b717c22",
            "8509091901001a0167aa07581d951e65305b56a3706e3e86eb01c803bbf915d80edcd64d4d0000000000",
            "850a091901001a0167aa07581d330f0f33a05eead4f331df229871bee733b50de71afd2e5a79f196de09",
            "850b091901001a0167aa07581d3b205ce5e52d8c24a52cffa34c564fa1af3fdffcd349dc4258ee4ee828",
            "850c091901001a0167aa07581ddd7bf725ea6c16d531b5f03254783803048ca08b87148daacd1cd7a006",
            "850d091901001a0167aa07581d760be7ad1c6187902bbc04f539b9ee5eb8ea6833222edea36031306c01",
            "850e091901001a0167aa07581d5bf4031217d2c3254b088fa7553778b5003632f46e21db129416f65b55",
            "850f091901001a0167aa07581d73f021c0e6f65b05c0a494e50791270a0050a73ae69b6725505a2ec8a5",
            "8510091901001a0167aa07581db8546ebfe2048541348910267331c643133f828afec9337c318f71b7df",
            "8511091901001a0167aa07581d23dedeea74e3a0fb052befabefa13e2f80e4315c9dceed4c8630612e64",
            "8512091901001a0167aa07581dd01a8daee769ce34b6b35d3ca0005302724abddae405bdb419c0a6b208",
            "8513091901001a0167aa07581d3171c5dc365766eff25ae47c6f10e7de48cfb8474e050e5fe997a6dc24",
            "8514091901001a0167aa07581de055c2433562184fa71b4be94f262e200f01c6f74c284b0dc6fae6673f",
        ];
        for expected in expected_parts {
            assert_eq!(hex::encode(encoder.next_part().to_cbor()), expected);
        }
    }

    #[test]
    fn test_fountain_encoder_is_complete() {
        let message = make_message("Wolf", 256);
        let mut encoder = Encoder::new(&message, 30).unwrap();
        for _ in 0..encoder.fragment_count() {
            assert!(!encoder.complete());
            encoder.next_part();
        }
        assert!(encoder.complete());
    }

    #[test]
    fn test_first_sequence() {
        let config = Config::default()
            .with_max_fragment_length(5)
            .with_first_sequence(3);
        let mut encoder = Encoder::with_config(&[7; 13], config).unwrap();
        assert_eq!(encoder.fragment_count(), 3);
        assert!(encoder.complete());
        let part = encoder.next_part();
        assert_eq!(part.sequence(), 4);
        assert_eq!(part.data().len(), 5);
        assert!(part.indexes().iter().all(|&i| i < 3));
    }

    #[test]
    fn test_sequence_wraps_past_zero() {
        let config = Config::default().with_first_sequence(u32::MAX);
        let mut encoder = Encoder::with_config(b"data", config).unwrap();
        assert_eq!(encoder.next_part().sequence(), 1);
    }

    #[test]
    fn test_parts_with_redundancy() {
        let config = Config::default()
            .with_max_fragment_length(5)
            .with_min_fragment_length(5)
            .with_redundancy_ratio(1.0);
        let mut encoder = Encoder::with_config(&[1; 13], config).unwrap();
        let parts = encoder.parts();
        assert_eq!(parts.len(), 6);
        assert_eq!(
            parts.iter().map(Part::sequence).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
    }

    #[test]
    fn test_encoder_errors() {
        assert_eq!(Encoder::new(&[], 1).unwrap_err(), Error::EmptyMessage);
        assert_eq!(
            Encoder::new(b"foo", 0).unwrap_err(),
            Error::InvalidFragmentLength { min: 10, max: 0 }
        );
        let message = vec![0; MAX_SEQUENCE_COUNT + 1];
        assert_eq!(
            Encoder::new(&message, 1).unwrap_err(),
            Error::TooManyFragments {
                count: MAX_SEQUENCE_COUNT + 1
            }
        );
        assert_eq!(
            Encoder::new(&message[1..], 1).unwrap().fragment_count(),
            MAX_SEQUENCE_COUNT
        );
    }
}
