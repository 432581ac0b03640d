use gcd::Gcd;
use rand::Rng;

use crate::target::PortRange;

/// Yields every port of an inclusive range exactly once, in a scattered
/// order.
///
/// The iterator walks indices `0..N` with the additive step
/// `x_{i+1} = (x_i + step) % N`. `step` is coprime with `N`, so the walk is
/// a full cycle and visits each index once. The seed `x_0` is uniform in
/// `0..N`.
///
/// For more information: <https://en.wikipedia.org/wiki/Linear_congruential_generator>
pub struct RangeIterator {
    active: bool,
    start: u32,
    total: u32,
    first_pick: u32,
    pick: u32,
    step: u32,
}

impl RangeIterator {
    pub fn new(range: PortRange) -> Self {
        let start = u32::from(range.start());
        let total = u32::from(range.end()) - start + 1;

        let step = pick_random_coprime(total);
        let first = rand::rng().random_range(0..total);

        Self {
            active: true,
            start,
            total,
            first_pick: first,
            pick: first,
            step,
        }
    }
}

impl Iterator for RangeIterator {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.active {
            return None;
        }

        let cur = self.pick;
        let next = (cur + self.step) % self.total;

        // cycle closes once we are about to revisit the seed
        if next == self.first_pick {
            self.active = false;
        }
        self.pick = next;

        u16::try_from(self.start + cur).ok()
    }
}

/// Around 61% of random integer pairs are coprime, so a handful of random
/// candidates nearly always finds one. After 10 misses we fall back to
/// `end - 1`, which is always coprime with `end` but scatters poorly.
///
/// Candidates come from the middle half of `0..end`; steps near either
/// boundary also scatter poorly.
fn pick_random_coprime(end: u32) -> u32 {
    if end <= 2 {
        return 1;
    }

    let range_boundary = end / 4;
    let lower_range = range_boundary.max(1);
    let upper_range = end - range_boundary;
    let mut rng = rand::rng();

    for _ in 0..10 {
        let candidate = rng.random_range(lower_range..upper_range);
        if end.gcd(candidate) == 1 {
            return candidate;
        }
    }

    end - 1
}
