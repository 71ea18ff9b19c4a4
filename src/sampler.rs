//! Alias-method sampling of a discrete distribution, driven by [`Xoshiro256`].
//!
//! The construction order of the alias table is part of the wire protocol:
//! any change alters which fragments a mixed part combines.

use crate::xoshiro::Xoshiro256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("negative probability encountered")]
    NegativeProbability,
    #[error("probabilities don't sum to a positive value")]
    NonPositiveSum,
}

#[derive(Debug)]
pub struct Weighted {
    aliases: Vec<usize>,
    probs: Vec<f64>,
}

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_sign_loss)]
impl Weighted {
    /// Builds an alias table over `weights`, which need not be normalized.
    ///
    /// # Errors
    ///
    /// Fails if any weight is negative or if the weights don't sum to a
    /// positive value.
    pub fn new(weights: Vec<f64>) -> Result<Self, Error> {
        if weights.iter().any(|&p| p < 0.0) {
            return Err(Error::NegativeProbability);
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(Error::NonPositiveSum);
        }
        Ok(Self::build(weights))
    }

    /// The fountain degree distribution over `count` outcomes, where outcome
    /// `k` has weight `1 / (k + 1)`.
    #[must_use]
    pub fn harmonic(count: usize) -> Self {
        Self::build((1..=count).map(|k| 1.0 / k as f64).collect())
    }

    fn build(mut weights: Vec<f64>) -> Self {
        let count = weights.len();
        let summed = weights.iter().sum::<f64>();
        for w in &mut weights {
            *w *= count as f64 / summed;
        }

        // Both work lists are filled from the highest index down and used as
        // stacks.
        let (mut small, mut large): (Vec<usize>, Vec<usize>) =
            (0..count).rev().partition(|&j| weights[j] < 1.0);

        let mut probs = vec![0.0; count];
        let mut aliases = vec![0; count];

        while let (Some(&a), Some(&g)) = (small.last(), large.last()) {
            small.pop();
            large.pop();
            probs[a] = weights[a];
            aliases[a] = g;
            weights[g] += weights[a] - 1.0;
            if weights[g] < 1.0 {
                small.push(g);
            } else {
                large.push(g);
            }
        }

        for g in large {
            probs[g] = 1.0;
        }
        for a in small {
            probs[a] = 1.0;
        }

        Self { aliases, probs }
    }

    /// Draws one outcome, consuming two doubles from `xoshiro`.
    pub fn next(&self, xoshiro: &mut Xoshiro256) -> usize {
        let r1 = xoshiro.next_double();
        let r2 = xoshiro.next_double();
        let n = self.probs.len();
        let i = ((n as f64 * r1) as usize).min(n.saturating_sub(1));
        if r2 < self.probs[i] {
            i
        } else {
            self.aliases[i]
        }
    }
}
