//! The deterministic random stream shared by fountain encoders and decoders.
//!
//! Both sides seed a [`Xoshiro256`] from the same bytes and therefore derive
//! the same mix sets without ever putting them on the wire.

use bitcoin_hashes::Hash;
use rand_xoshiro::rand_core::RngCore;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

/// A `xoshiro256**` generator seeded from the SHA-256 digest of arbitrary bytes.
#[allow(clippy::module_name_repetitions)]
pub struct Xoshiro256 {
    inner: Xoshiro256StarStar,
}

impl From<Xoshiro256StarStar> for Xoshiro256 {
    fn from(from: Xoshiro256StarStar) -> Self {
        Self { inner: from }
    }
}

impl From<&[u8]> for Xoshiro256 {
    fn from(from: &[u8]) -> Self {
        Self::from(bitcoin_hashes::sha256::Hash::hash(from).to_byte_array())
    }
}

impl From<&str> for Xoshiro256 {
    fn from(value: &str) -> Self {
        Self::from(value.as_bytes())
    }
}

impl From<[u8; 32]> for Xoshiro256 {
    /// The digest is read as four big-endian words, while `from_seed`
    /// expects little-endian ones.
    fn from(value: [u8; 32]) -> Self {
        let mut seed = [0_u8; 32];
        for (word, digest) in seed.chunks_exact_mut(8).zip(value.chunks_exact(8)) {
            word.copy_from_slice(digest);
            word.reverse();
        }
        Xoshiro256StarStar::from_seed(seed).into()
    }
}

#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
impl Xoshiro256 {
    /// Seeds the generator for fountain part `sequence` of a transfer with
    /// the given checksum.
    #[must_use]
    pub fn for_part(sequence: u32, checksum: u32) -> Self {
        let mut seed = [0_u8; 8];
        seed[..4].copy_from_slice(&sequence.to_be_bytes());
        seed[4..].copy_from_slice(&checksum.to_be_bytes());
        Self::from(&seed[..])
    }

    #[cfg(test)]
    #[must_use]
    pub fn from_crc(bytes: &[u8]) -> Self {
        Self::from(&crate::checksum(bytes).to_be_bytes()[..])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// A double in `[0, 1)`.
    pub fn next_double(&mut self) -> f64 {
        self.next() as f64 / (u64::MAX as f64 + 1.0)
    }

    /// An integer in the inclusive range `[low, high]`.
    pub fn next_int(&mut self, low: u64, high: u64) -> u64 {
        (self.next_double() * ((high - low + 1) as f64)) as u64 + low
    }

    pub fn next_byte(&mut self) -> u8 {
        self.next_int(0, 255) as u8
    }

    pub fn next_bytes(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.next_byte()).collect()
    }

    /// Shuffles `items` by repeatedly removing a random remaining element.
    #[cfg(test)]
    pub fn shuffled<T>(&mut self, items: Vec<T>) -> Vec<T> {
        let count = items.len();
        self.choose(items, count)
    }

    /// The first `count` elements of a shuffle that repeatedly removes a
    /// random remaining element, consuming exactly `count` draws.
    pub fn choose<T>(&mut self, mut items: Vec<T>, count: usize) -> Vec<T> {
        let mut chosen = Vec::<T>::with_capacity(count.min(items.len()));
        while chosen.len() < count && !items.is_empty() {
            let index = self.next_int(0, (items.len() - 1) as u64) as usize;
            chosen.push(items.remove(index));
        }
        chosen
    }

    /// Draws a mix degree in `[1, length]`, with degree `k` weighted `1/k`.
    pub fn choose_degree(&mut self, length: usize) -> usize {
        crate::sampler::Weighted::harmonic(length).next(self) + 1
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_1() {
        let mut rng = Xoshiro256::from("Wolf");
        let expected = vec![
            42, 81, 85, 8, 82, 84, 76, 73, 70, 88, 2, 74, 40, 48, 77, 54, 88, 7, 5, 88, 37, 25, 82,
            13, 69, 59, 30, 39, 11, 82, 19, 99, 45, 87, 30, 15, 32, 22, 89, 44, 92, 77, 29, 78, 4,
            92, 44, 68, 92, 69, 1, 42, 89, 50, 37, 84, 63, 34, 32, 3, 17, 62, 40, 98, 82, 89, 24,
            43, 85, 39, 15, 3, 99, 29, 20, 42, 27, 10, 85, 66, 50, 35, 69, 70, 70, 74, 30, 13, 72,
            54, 11, 5, 70, 55, 91, 52, 10, 43, 43, 52,
        ];
        for e in expected {
            assert_eq!(rng.next() % 100, e);
        }
    }

    #[test]
    fn test_rng_2() {
        let mut rng = Xoshiro256::from_crc(b"Wolf");
        let expected = vec![
            88, 44, 94, 74, 0, 99, 7, 77, 68, 35, 47, 78, 19, 21, 50, 15, 42, 36, 91, 11, 85, 39,
            64, 22, 57, 11, 25, 12, 1, 91, 17, 75, 29, 47, 88, 11, 68, 58, 27, 65, 21, 54, 47, 54,
            73, 83, 23, 58, 75, 27, 26, 15, 60, 36, 30, 21, 55, 57, 77, 76, 75, 47, 53, 76, 9, 91,
            14, 69, 3, 95, 11, 73, 20, 99, 68, 61, 3, 98, 36, 98, 56, 65, 14, 80, 74, 57, 63, 68,
            51, 56, 24, 39, 53, 80, 57, 51, 81, 3, 1, 30,
        ];
        for e in expected {
            assert_eq!(rng.next() % 100, e);
        }
    }

    #[test]
    fn test_next_int() {
        let mut rng = Xoshiro256::from("Wolf");
        let expected = vec![
            6, 5, 8, 4, 10, 5, 7, 10, 4, 9, 10, 9, 7, 7, 1, 1, 2, 9, 9, 2, 6, 4, 5, 7, 8, 5, 4, 2,
            3, 8, 7, 4, 5, 1, 10, 9, 3, 10, 2, 6, 8, 5, 7, 9, 3, 1, 5, 2, 7, 1, 4, 4, 4, 4, 9, 4,
            5, 5, 6, 9, 5, 1, 2, 8, 3, 3, 2, 8, 4, 3, 2, 1, 10, 8, 9, 3, 10, 8, 5, 5, 6, 7, 10, 5,
            8, 9, 4, 6, 4, 2, 10, 2, 1, 7, 9, 6, 7, 4, 2, 5,
        ];
        for e in expected {
            assert_eq!(rng.next_int(1, 10), e);
        }
    }

    #[test]
    fn test_shuffle() {
        let mut rng = Xoshiro256::from("Wolf");
        let values = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let expected = vec![
            vec![6, 4, 9, 3, 10, 5, 7, 8, 1, 2],
            vec![10, 8, 6, 5, 1, 2, 3, 9, 7, 4],
            vec![6, 4, 5, 8, 9, 3, 2, 1, 7, 10],
            vec![7, 3, 5, 1, 10, 9, 4, 8, 2, 6],
            vec![8, 5, 7, 10, 2, 1, 4, 3, 9, 6],
        ];
        for e in expected {
            assert_eq!(rng.shuffled(values.clone()), e);
        }
    }

    #[test]
    fn test_choose_is_shuffle_prefix() {
        let values: Vec<usize> = (0..10).collect();
        let full = Xoshiro256::from("Wolf").shuffled(values.clone());
        let prefix = Xoshiro256::from("Wolf").choose(values, 4);
        assert_eq!(prefix, full[..4]);
    }

    #[test]
    fn test_part_seed_is_deterministic() {
        let a: Vec<u64> = {
            let mut rng = Xoshiro256::for_part(17, 0xdead_beef);
            (0..4).map(|_| rng.next()).collect()
        };
        let mut rng = Xoshiro256::for_part(17, 0xdead_beef);
        for e in a {
            assert_eq!(rng.next(), e);
        }
        assert_ne!(
            Xoshiro256::for_part(17, 0xdead_beef).next(),
            Xoshiro256::for_part(18, 0xdead_beef).next()
        );
    }
}
