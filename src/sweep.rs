//! Cartesian-product generation over the expanded value sets.
//!
//! The iteration order is fixed and load-bearing for the report: the
//! right-most marker varies fastest, like a rightmost-digit odometer. An
//! empty value set voids the entire product. With no markers at all the
//! product is a single empty combination, so a fully literal command still
//! runs once.

use crate::markers::ValueSet;

/// Number of combinations the sweep will produce.
pub fn count(sets: &[ValueSet]) -> usize {
    sets.iter().map(Vec::len).product()
}

/// Iterator over every combination, right-most set varying fastest.
/// No deduplication: equal values reached through different sets are
/// distinct combinations.
pub struct Combinations<'a> {
    sets: &'a [ValueSet],
    indices: Vec<usize>,
    exhausted: bool,
}

impl<'a> Combinations<'a> {
    pub fn new(sets: &'a [ValueSet]) -> Self {
        Self {
            sets,
            indices: vec![0; sets.len()],
            exhausted: sets.iter().any(Vec::is_empty),
        }
    }
}

impl<'a> Iterator for Combinations<'a> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let combo: Vec<String> = self
            .indices
            .iter()
            .zip(self.sets)
            .map(|(&i, set)| set[i].clone())
            .collect();

        // Advance the odometer from the right.
        self.exhausted = true;
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.sets[pos].len() {
                self.exhausted = false;
                break;
            }
            self.indices[pos] = 0;
        }

        Some(combo)
    }
}
