//! Incremental peeling decoder for fountain parts.
//!
//! Every received part is an equation over the pure fragments: the xor of
//! the fragments in its mix set. Pure equations (a single index) are stored
//! in `simple`, the others in `mixed`. Whenever an equation becomes known,
//! it is xored out of every stored equation whose mix set strictly contains
//! it; equations that collapse to a single index are queued and processed
//! as pure ones. No Gaussian elimination is attempted.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, trace, warn};

use super::{join, xor_into, Descriptor, Error, Part};

type MixSet = BTreeSet<usize>;

/// An equation waiting to be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fragment {
    Pure { index: usize, data: Vec<u8> },
    Mixed { indexes: MixSet, data: Vec<u8> },
}

impl Fragment {
    fn new(indexes: MixSet, data: Vec<u8>) -> Self {
        let mut iter = indexes.iter();
        match (iter.next(), iter.next()) {
            (Some(&index), None) => Self::Pure { index, data },
            _ => Self::Mixed { indexes, data },
        }
    }
}

/// Whether `a` is a proper subset of `b`.
fn is_strict_subset(a: &MixSet, b: &MixSet) -> bool {
    a.len() < b.len() && a.is_subset(b)
}

/// Xors the equation `(by, by_data)` out of every stored equation that
/// strictly contains it. Stored equations that collapse to a single index
/// move to `queue`.
fn reduce_stored(
    mixed: &mut BTreeMap<MixSet, Vec<u8>>,
    queue: &mut VecDeque<Fragment>,
    by: &MixSet,
    by_data: &[u8],
) {
    let reducible: Vec<MixSet> = mixed
        .keys()
        .filter(|indexes| is_strict_subset(by, indexes))
        .cloned()
        .collect();
    for indexes in reducible {
        let Some(mut data) = mixed.remove(&indexes) else {
            continue;
        };
        xor_into(&mut data, by_data);
        let remaining: MixSet = indexes.difference(by).copied().collect();
        trace!(from = ?indexes, by = ?by, to = ?remaining, "reduced mixed fragment");
        match Fragment::new(remaining, data) {
            pure @ Fragment::Pure { .. } => queue.push_back(pure),
            Fragment::Mixed { indexes, data } => {
                mixed.entry(indexes).or_insert(data);
            }
        }
    }
}

/// A decoder capable of receiving and recombining fountain-encoded transmissions.
///
/// # Examples
///
/// See the [`crate::fountain`] module documentation for an example.
#[derive(Debug, Default)]
pub struct Decoder {
    descriptor: Option<Descriptor>,
    simple: BTreeMap<usize, Vec<u8>>,
    mixed: BTreeMap<MixSet, Vec<u8>>,
    queue: VecDeque<Fragment>,
    last_indexes: Vec<usize>,
    processed_parts: usize,
    result: Option<Result<Vec<u8>, Error>>,
}

impl Decoder {
    /// Receives a fountain-encoded part into the decoder.
    ///
    /// Returns whether the part was taken into account. Parts are declined
    /// once the decoder is [`complete`](Self::complete) and when they belong
    /// to a different transfer than the first accepted part. Duplicates are
    /// accepted but change nothing.
    ///
    /// # Examples
    ///
    /// See the [`crate::fountain`] module documentation for an example.
    ///
    /// # Errors
    ///
    /// If the part is not self-consistent, an error will be returned and the
    /// decoder state is left untouched.
    pub fn receive(&mut self, part: &Part) -> Result<bool, Error> {
        if self.complete() {
            return Ok(false);
        }
        part.validate()?;

        let descriptor = part.descriptor();
        match self.descriptor {
            None => self.descriptor = Some(descriptor),
            Some(expected) if expected != descriptor => {
                debug!(
                    sequence = part.sequence(),
                    ?expected,
                    received = ?descriptor,
                    "dropping part of a foreign transfer"
                );
                return Ok(false);
            }
            Some(_) => {}
        }

        let indexes = part.indexes();
        self.last_indexes.clone_from(&indexes);
        self.queue.push_back(Fragment::new(
            indexes.into_iter().collect(),
            part.data().to_vec(),
        ));
        while !self.complete() {
            let Some(fragment) = self.queue.pop_front() else {
                break;
            };
            match fragment {
                Fragment::Pure { index, data } => self.process_pure(index, data),
                Fragment::Mixed { indexes, data } => self.process_mixed(indexes, data),
            }
        }
        self.processed_parts += 1;
        Ok(true)
    }

    fn process_pure(&mut self, index: usize, data: Vec<u8>) {
        if self.simple.contains_key(&index) {
            trace!(index, "dropping duplicate pure fragment");
            return;
        }
        if self.simple.len() + 1 == self.expected_part_count() {
            self.simple.insert(index, data);
            self.finish();
        } else {
            reduce_stored(
                &mut self.mixed,
                &mut self.queue,
                &MixSet::from([index]),
                &data,
            );
            self.simple.insert(index, data);
        }
    }

    fn process_mixed(&mut self, mut indexes: MixSet, mut data: Vec<u8>) {
        if self.mixed.contains_key(&indexes) {
            trace!(?indexes, "dropping duplicate mixed fragment");
            return;
        }

        for index in indexes.clone() {
            if indexes.len() == 1 {
                break;
            }
            if let Some(simple) = self.simple.get(&index) {
                xor_into(&mut data, simple);
                indexes.remove(&index);
            }
        }
        for (stored, stored_data) in &self.mixed {
            if is_strict_subset(stored, &indexes) {
                xor_into(&mut data, stored_data);
                indexes = indexes.difference(stored).copied().collect();
            }
        }

        match Fragment::new(indexes, data) {
            pure @ Fragment::Pure { .. } => self.queue.push_back(pure),
            Fragment::Mixed { indexes, data } => {
                if self.mixed.contains_key(&indexes) {
                    return;
                }
                reduce_stored(&mut self.mixed, &mut self.queue, &indexes, &data);
                self.mixed.insert(indexes, data);
            }
        }
    }

    fn finish(&mut self) {
        let Some(descriptor) = self.descriptor else {
            return;
        };
        let result = join(
            self.simple.values().map(Vec::as_slice),
            descriptor.message_length,
        )
        .and_then(|message| {
            let actual = crate::checksum(&message);
            if actual == descriptor.checksum {
                Ok(message)
            } else {
                Err(Error::InvalidChecksum {
                    expected: descriptor.checksum,
                    actual,
                })
            }
        });
        match &result {
            Ok(message) => debug!(
                message_length = message.len(),
                processed_parts = self.processed_parts + 1,
                "fountain decoding complete"
            ),
            Err(e) => warn!(error = %e, "fountain decoding failed"),
        }
        self.result = Some(result);
        self.mixed.clear();
        self.queue.clear();
    }

    /// Returns whether the decoder is complete and hence the message available.
    ///
    /// A decoder whose reassembled message failed the checksum is complete
    /// as well; see [`is_failure`](Self::is_failure).
    #[must_use]
    pub const fn complete(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.result, Some(Ok(_)))
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.result, Some(Err(_)))
    }

    /// If [`complete`](Self::complete), returns the decoded message, `None` otherwise.
    ///
    /// # Errors
    ///
    /// If the reassembled message does not match the transfer checksum,
    /// [`Error::InvalidChecksum`] is returned.
    pub fn message(&self) -> Result<Option<Vec<u8>>, Error> {
        self.result.clone().transpose()
    }

    /// Like [`message`](Self::message), but hands over the message without
    /// copying it.
    ///
    /// # Errors
    ///
    /// If the reassembled message does not match the transfer checksum,
    /// [`Error::InvalidChecksum`] is returned.
    pub fn into_message(self) -> Result<Option<Vec<u8>>, Error> {
        self.result.transpose()
    }

    #[must_use]
    pub fn result_error(&self) -> Option<&Error> {
        self.result.as_ref().and_then(|r| r.as_ref().err())
    }

    /// The transfer descriptor fixed by the first accepted part.
    #[must_use]
    pub const fn descriptor(&self) -> Option<Descriptor> {
        self.descriptor
    }

    #[must_use]
    pub fn expected_part_count(&self) -> usize {
        self.descriptor.map_or(0, |d| d.sequence_count)
    }

    #[must_use]
    pub fn expected_part_indexes(&self) -> Vec<usize> {
        (0..self.expected_part_count()).collect()
    }

    /// The indexes of all recovered pure fragments, in ascending order.
    #[must_use]
    pub fn received_part_indexes(&self) -> Vec<usize> {
        self.simple.keys().copied().collect()
    }

    /// The mix set of the most recently accepted part.
    #[must_use]
    pub fn last_part_indexes(&self) -> &[usize] {
        &self.last_indexes
    }

    /// The number of accepted parts, duplicates included.
    #[must_use]
    pub const fn processed_parts_count(&self) -> usize {
        self.processed_parts
    }

    /// The share of pure fragments recovered so far.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.complete() {
            return 1.0;
        }
        match self.expected_part_count() {
            0 => 0.0,
            expected => self.simple.len() as f64 / expected as f64,
        }
    }

    /// A rough estimate of how close the decoder is to completion, based on
    /// the number of processed parts. Capped at 0.99 until complete.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimated_percent_complete(&self) -> f64 {
        if self.complete() {
            return 1.0;
        }
        match self.expected_part_count() {
            0 => 0.0,
            expected => {
                (self.processed_parts as f64 / (expected as f64 * 1.75)).min(0.99)
            }
        }
    }
}
