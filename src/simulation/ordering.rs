//! Per-tick car processing order
//!
//! Every tick the world offers each car one move attempt. The order of those
//! attempts is shuffled so no car systematically wins contested cells; the
//! shuffle is injectable so runs can be replayed exactly.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;

use super::types::CarId;

/// Source of the order in which cars are processed during a tick
pub trait TickOrder: Send {
    /// Rearrange `cars` in place. Must be a permutation: no car may be
    /// dropped or duplicated.
    fn arrange(&mut self, cars: &mut [CarId]);
}

/// Uniform shuffle driven by a seeded RNG
#[derive(Debug, Clone)]
pub struct SeededShuffle {
    rng: StdRng,
}

impl SeededShuffle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from the operating system for runs that need not be reproducible
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl TickOrder for SeededShuffle {
    fn arrange(&mut self, cars: &mut [CarId]) {
        cars.shuffle(&mut self.rng);
    }
}

/// Keeps registration order. Useful for tests that reason about one car.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationOrder;

impl TickOrder for RegistrationOrder {
    fn arrange(&mut self, _cars: &mut [CarId]) {}
}

/// Replays a scripted sequence of permutations, one per tick.
///
/// Each permutation lists indices into the registration-ordered car list.
/// Indices out of range are skipped and cars the script does not mention
/// keep their relative order after the scripted ones. Once the script is
/// exhausted registration order is used.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOrder {
    script: VecDeque<Vec<usize>>,
}

impl ScriptedOrder {
    pub fn new(script: impl IntoIterator<Item = Vec<usize>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl TickOrder for ScriptedOrder {
    fn arrange(&mut self, cars: &mut [CarId]) {
        let Some(permutation) = self.script.pop_front() else {
            return;
        };
        let mut taken = vec![false; cars.len()];
        let mut arranged = Vec::with_capacity(cars.len());
        for index in permutation {
            if index < cars.len() && !taken[index] {
                taken[index] = true;
                arranged.push(cars[index]);
            }
        }
        arranged.extend(
            cars.iter()
                .zip(&taken)
                .filter(|&(_, &used)| !used)
                .map(|(&car, _)| car),
        );
        cars.copy_from_slice(&arranged);
    }
}
