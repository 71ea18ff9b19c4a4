use super::Error;

/// Encoder parameters.
///
/// ```
/// use ur_fountain::fountain::Config;
/// let config = Config::default()
///     .with_max_fragment_length(100)
///     .with_redundancy_ratio(0.5);
/// assert_eq!(config.min_fragment_length, 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Upper bound for the length of a single fragment.
    ///
    /// Default: 200
    pub max_fragment_length: usize,

    /// Lower bound for the length of a single fragment, which caps the
    /// number of fragments. Clamped to `max_fragment_length`.
    ///
    /// Default: 10
    pub min_fragment_length: usize,

    /// Sequence number preceding the first emitted part.
    ///
    /// Default: 0
    pub first_sequence: u32,

    /// Extra parts generated by the exhaustive helpers, relative to the
    /// fragment count. `1.0` doubles the number of parts.
    ///
    /// Default: 0.0
    pub redundancy_ratio: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_fragment_length: 200,
            min_fragment_length: 10,
            first_sequence: 0,
            redundancy_ratio: 0.0,
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_max_fragment_length(mut self, max_fragment_length: usize) -> Self {
        self.max_fragment_length = max_fragment_length;
        self
    }

    #[must_use]
    pub fn with_min_fragment_length(mut self, min_fragment_length: usize) -> Self {
        self.min_fragment_length = min_fragment_length;
        self
    }

    #[must_use]
    pub fn with_first_sequence(mut self, first_sequence: u32) -> Self {
        self.first_sequence = first_sequence;
        self
    }

    #[must_use]
    pub fn with_redundancy_ratio(mut self, redundancy_ratio: f64) -> Self {
        self.redundancy_ratio = redundancy_ratio;
        self
    }

    /// The fragment length bounds actually used, as `(min, max)`.
    #[must_use]
    pub fn fragment_length_bounds(&self) -> (usize, usize) {
        (
            self.min_fragment_length.min(self.max_fragment_length),
            self.max_fragment_length,
        )
    }

    /// Checks the configuration for values no encoder can work with.
    ///
    /// # Errors
    ///
    /// Fails if a fragment length bound is zero or the redundancy ratio is
    /// negative or not finite.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_fragment_length == 0 || self.min_fragment_length == 0 {
            return Err(Error::InvalidFragmentLength {
                min: self.min_fragment_length,
                max: self.max_fragment_length,
            });
        }
        if !self.redundancy_ratio.is_finite() || self.redundancy_ratio < 0.0 {
            return Err(Error::InvalidRedundancyRatio);
        }
        Ok(())
    }

    /// Number of parts the exhaustive helpers emit for `fragment_count`
    /// fragments.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_precision_loss)]
    #[allow(clippy::cast_sign_loss)]
    pub fn total_part_count(&self, fragment_count: usize) -> usize {
        (fragment_count as f64 * (1.0 + self.redundancy_ratio)).ceil() as usize
    }
}
