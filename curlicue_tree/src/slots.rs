// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Size tiers ("slots") leaves are quantized into.
//!
//! A [`SlotTable`] is computed once per tree. For every tier it stores a radius multiplier
//! (relative to the parent radius), the angular footprint of a leaf in that tier, and the
//! cumulative angle around the parent where the tier starts. The three sequences are
//! index-aligned and sorted so slot `0` sits closest to the end of the parent's curl.

use core::f64::consts::{FRAC_PI_6, FRAC_PI_8, TAU};

use curlicue_geom::radius_for_angular_fraction;
use rand::Rng;
use rand::rngs::StdRng;

use crate::config::FractionScheme;
use crate::params::Params;

const TRIANGULAR: [f64; 8] = [10.0, 15.0, 21.0, 28.0, 36.0, 45.0, 55.0, 66.0];
const FIBONACCI: [f64; 8] = [5.0, 8.0, 13.0, 21.0, 34.0, 55.0, 89.0, 144.0];
const FIBONACCI_HIGH: [f64; 8] = [13.0, 21.0, 34.0, 55.0, 89.0, 144.0, 233.0, 377.0];

// Even-split tables, determined by eye for 4 and 5 equal leaves.
const EVEN_SIZE_FOUR: f64 = 1.071;
const EVEN_ANGLES_FOUR: [f64; 4] = [1.262, 2.333, 3.404, 4.475];
const EVEN_SIZE_FIVE: f64 = 0.897;
const EVEN_ANGLES_FIVE: [f64; 5] = [1.153, 2.051, 2.948, 3.846, 4.744];

// Bounds, in percent, of the growth used by the moderated scheme.
const MODERATED_UPPER: f64 = 100.0;
const MODERATED_LOWER: f64 = 20.0;

/// Per-tier radius multipliers, angular sizes, and positions, plus the active tiers.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotTable {
    rad_mults: Vec<f64>,
    sizes: Vec<f64>,
    angles: Vec<f64>,
    active: Vec<usize>,
}

impl SlotTable {
    /// Compute the table for `params`.
    pub fn build(params: &Params) -> Self {
        let fractions = raw_fractions(params);
        let (mut rad_mults, mut sizes, mut angles) =
            if !params.graduated() && !params.random_sizes() {
                even_split(params)
            } else {
                uneven_split(params, &fractions)
            };
        rad_mults.sort_by(f64::total_cmp);
        sizes.sort_by(f64::total_cmp);
        angles.sort_by(f64::total_cmp);

        if params.graduated() {
            let min_mult = rad_mults.iter().copied().fold(f64::INFINITY, f64::min);
            let min_size = sizes.iter().copied().fold(f64::INFINITY, f64::min);
            let max_angle = angles.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mut shift = TAU - max_angle;
            if params.small_to_large() || !params.twin {
                let min_leaf_arc = 0.1 + (min_mult / (1.0 + min_mult)).asin();
                shift -= 1.5 * min_leaf_arc;
            } else {
                shift -= 1.5 * min_size;
            }
            for angle in &mut angles {
                *angle += shift;
            }
        }
        if params.graduated() && params.small_to_large() {
            rad_mults.reverse();
            sizes.reverse();
        }

        let mut table = Self {
            rad_mults,
            sizes,
            angles,
            active: Vec::new(),
        };
        let count = table.len();
        let mut active: Vec<usize> = if params.max_leaves < count {
            table.slot_list(params, params.max_leaves)
        } else {
            (0..count).collect()
        };
        active.reverse();
        table.active = active;
        table
    }

    /// Number of tiers.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether the table has no tiers.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Radius multiplier of every tier.
    pub fn rad_mults(&self) -> &[f64] {
        &self.rad_mults
    }

    /// Angular footprint of every tier.
    pub fn sizes(&self) -> &[f64] {
        &self.sizes
    }

    /// Relative angle where every tier starts.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Tiers in use, highest first.
    pub fn active(&self) -> &[usize] {
        &self.active
    }

    /// Highest active tier.
    pub fn max_active(&self) -> usize {
        self.active.iter().copied().max().unwrap_or(0)
    }

    /// Lowest active tier.
    pub fn min_active(&self) -> usize {
        self.active.iter().copied().min().unwrap_or(0)
    }

    /// Smallest radius multiplier.
    pub fn min_mult(&self) -> f64 {
        self.rad_mults.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest radius multiplier.
    pub fn max_mult(&self) -> f64 {
        self.rad_mults.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Tier whose start angle is the last one below the relative angle `rel_angle`.
    ///
    /// Returns `0` when `rel_angle` does not clear any tier above the first.
    pub fn find_next_slot(&self, rel_angle: f64) -> usize {
        (1..self.angles.len())
            .rev()
            .find(|&idx| rel_angle > self.angles[idx])
            .unwrap_or(0)
    }

    /// Tiers to use when a node grows only `take` leaves.
    ///
    /// As the leaf count drops, alternately trims the smallest and largest tiers so the
    /// remaining leaves stay centred on the parent.
    pub fn slot_list(&self, params: &Params, take: usize) -> Vec<usize> {
        let count = self.len();
        let graduated = params.graduated();
        let small_to_large = params.small_to_large();
        let triangular = params.scheme == FractionScheme::Triangular;

        let list: Vec<usize> = if take == 2 {
            if !graduated {
                if params.larger_max {
                    vec![2, 3]
                } else {
                    vec![2, 4]
                }
            } else if params.larger_max {
                if small_to_large {
                    vec![1, 2]
                } else {
                    vec![2, 3]
                }
            } else if small_to_large {
                vec![1, 3]
            } else if triangular {
                vec![3, 5]
            } else {
                vec![2, 4]
            }
        } else if !graduated {
            (1..=take).collect()
        } else {
            let mut spaces = count;
            if params.larger_max {
                spaces += 1;
            }
            if !small_to_large {
                spaces += 1;
            }
            if triangular {
                if small_to_large {
                    spaces -= 1;
                } else {
                    spaces += 1;
                }
            }
            let start = spaces.saturating_sub(take) / 2;
            (start..start + take).collect()
        };
        list.into_iter().filter(|&slot| slot < count).collect()
    }

    /// Radius for a leaf on a parent of `parent_radius`, in tier `slot` if any.
    pub fn next_leaf_radius(
        &self,
        params: &Params,
        parent_radius: f64,
        slot: Option<usize>,
        rng: &mut StdRng,
    ) -> f64 {
        let Some(slot) = slot else {
            return if params.random_sizes() {
                self.random_radius(params, parent_radius, rng)
            } else {
                parent_radius * params.child_proportion
            };
        };

        if params.random_large() {
            let guess = rng.gen_range(0..self.len().max(1));
            // Extra-large leaves get rarer as the tier count grows.
            let coin = if self.len() > 3 { rng.gen_range(0..2) } else { 1 };
            if guess == slot && coin > 0 {
                return uniform(
                    rng,
                    params.init_radius * 0.5,
                    params.init_radius * 0.9,
                );
            }
        }

        if params.random_sizes() {
            return if params.graduated() {
                self.random_radius_for_slot(params, parent_radius, slot, rng)
            } else {
                self.random_radius(params, parent_radius, rng)
            };
        }

        let mult = self.rad_mults.get(slot).copied().unwrap_or(params.child_proportion);
        parent_radius * mult
    }

    fn random_radius(&self, params: &Params, parent_radius: f64, rng: &mut StdRng) -> f64 {
        let tries = params.max_leaves.max(3);
        let (min, max) = (self.min_mult(), self.max_mult());
        let mut radius = 0.0;
        for _ in 0..tries {
            radius = parent_radius * uniform(rng, min, max);
            if radius.round() > params.min_radius / 2.0 {
                break;
            }
        }
        radius
    }

    fn random_radius_for_slot(
        &self,
        params: &Params,
        parent_radius: f64,
        slot: usize,
        rng: &mut StdRng,
    ) -> f64 {
        let go_high = match self.active.len() {
            2 => slot == self.min_active(),
            n if n % 2 == 1 => slot % 2 == 1,
            _ => slot % 2 == 0,
        };
        let count = self.rad_mults.len();
        let (end, mid) = if go_high {
            (count.saturating_sub(1), (count / 2).saturating_sub(1))
        } else {
            (0, count / 2 + 1)
        };
        let (lo, hi) = (end.min(mid), end.max(mid));
        let size_slot = if lo < hi { rng.gen_range(lo..hi) } else { lo };
        let radius = parent_radius * self.rad_mults.get(size_slot).copied().unwrap_or(0.0);
        if radius.round() < params.min_radius / 2.0 {
            self.random_radius(params, parent_radius, rng)
        } else {
            radius
        }
    }

    /// Leaf count for one node when counts are random.
    pub fn random_leaf_count(params: &Params, rng: &mut StdRng) -> usize {
        let mut spaces = params.slot_spaces();
        if params.scheme == FractionScheme::Triangular {
            spaces += 1;
        }
        rng.gen_range(2..spaces)
    }
}

/// Uniform draw from the range spanned by `a` and `b`, tolerating an empty range.
pub(crate) fn uniform(rng: &mut StdRng, a: f64, b: f64) -> f64 {
    let (lo, hi) = (a.min(b), a.max(b));
    if lo < hi { rng.gen_range(lo..hi) } else { lo }
}

fn raw_fractions(params: &Params) -> Vec<f64> {
    let spaces = params.slot_spaces();
    match params.scheme {
        FractionScheme::Triangular => (0..=spaces)
            .map(|i| (5.0 + index_f64(i)) / TRIANGULAR[i])
            .collect(),
        FractionScheme::Moderated => {
            let n = index_f64(spaces);
            let base = (TAU - 1.5 * params.end_at) / n;
            let growth = 0.01 * (MODERATED_UPPER - MODERATED_LOWER).abs() / n;
            (0..spaces).map(|i| base + growth * index_f64(i)).collect()
        }
        FractionScheme::Fibonacci => (0..spaces)
            .map(|i| (1.0 + index_f64(i)) / FIBONACCI[i])
            .collect(),
        FractionScheme::Harmonic => (0..spaces).map(|i| 1.0 / (4.0 + index_f64(i))).collect(),
        FractionScheme::FibonacciRatio => (0..spaces)
            .map(|i| (FIBONACCI[i] / (3.0 + index_f64(i))) / FIBONACCI_HIGH[i])
            .collect(),
    }
}

#[allow(
    clippy::cast_precision_loss,
    reason = "tier indices are tiny, far below f64's exact integer range"
)]
pub(crate) fn index_f64(i: usize) -> f64 {
    i as f64
}

fn even_split(params: &Params) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let spaces = params.slot_spaces();
    let base = (TAU - params.end_at - FRAC_PI_8 - params.halo + params.spread) / index_f64(spaces);
    let rad_mults = vec![radius_for_angular_fraction(base); spaces - 1];

    let (mut sizes, mut angles) = if params.larger_max {
        (vec![EVEN_SIZE_FOUR; 4], EVEN_ANGLES_FOUR.to_vec())
    } else {
        (vec![EVEN_SIZE_FIVE; 5], EVEN_ANGLES_FIVE.to_vec())
    };
    if params.spread != 0.0 {
        let total: f64 = angles.iter().sum();
        let factor = (total + params.spread) / total;
        for a in &mut angles {
            *a *= factor;
        }
        for s in &mut sizes {
            *s *= factor;
        }
    }
    (rad_mults, sizes, angles)
}

fn desired_total(params: &Params) -> f64 {
    let larger = params.larger_max;
    let correction = if params.small_to_large() {
        match params.scheme {
            FractionScheme::Triangular => -0.15,
            FractionScheme::Moderated => -0.25,
            FractionScheme::Fibonacci if !larger => -0.35,
            FractionScheme::Fibonacci => 0.0,
            FractionScheme::Harmonic if !larger => -0.2,
            FractionScheme::Harmonic => -0.1,
            FractionScheme::FibonacciRatio => -0.075,
        }
    } else {
        match params.scheme {
            FractionScheme::Triangular if !larger => 0.1,
            FractionScheme::Triangular => 0.225,
            FractionScheme::Moderated if !larger => 0.03,
            FractionScheme::Moderated => -0.17,
            FractionScheme::Fibonacci if !larger => -0.23,
            FractionScheme::Fibonacci => -0.17,
            FractionScheme::Harmonic | FractionScheme::FibonacciRatio => -0.125,
        }
    };
    // The reserved root base (π/6) is wider than any minimum root base.
    TAU - params.end_at - FRAC_PI_6 + correction + params.spread
}

fn uneven_split(params: &Params, fractions: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    if fractions.len() < 2 {
        return (Vec::new(), Vec::new(), Vec::new());
    }
    let halo_per_slot = if params.larger_max { 2.0 } else { 1.0 };
    let sum: f64 = fractions.iter().sum();
    let adjustment = (desired_total(params)
        - index_f64(fractions.len()) * halo_per_slot * params.halo)
        / sum;

    let mut scaled: Vec<f64> = fractions.iter().map(|f| f * adjustment).collect();
    scaled.sort_by(f64::total_cmp);
    let rad_mults: Vec<f64> = scaled
        .iter()
        .map(|&f| radius_for_angular_fraction(f))
        .collect();
    let mut sizes: Vec<f64> = scaled.iter().map(|f| f + params.halo).collect();
    if params.small_to_large() {
        sizes.reverse();
        scaled.reverse();
    }
    let angles = scaled
        .iter()
        .scan(0.0, |total, f| {
            *total += f;
            Some(*total)
        })
        .collect();
    (rad_mults, sizes, angles)
}
