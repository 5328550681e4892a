//! Replay buffer
//!
//! Holds both environment transitions and seeded demonstrations in one
//! bounded ring; the oldest entries are evicted first. Sampling is uniform
//! without replacement over the current contents.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::scoring::ACTION_DIM;

/// One stored transition. Demonstrations use the same shape as live
/// transitions so the optimizer makes no distinction when sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demonstration {
    pub state: Vec<f32>,
    pub action: [f32; ACTION_DIM],
    pub reward: f32,
    pub next_state: Vec<f32>,
}

pub struct ReplayBuffer {
    capacity: usize,
    items: VecDeque<Demonstration>,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            items: VecDeque::new(),
        }
    }

    pub fn push(&mut self, item: Demonstration) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Uniform sample of up to `batch_size` items
    pub fn sample<R: Rng>(&self, rng: &mut R, batch_size: usize) -> Vec<Demonstration> {
        let indices: Vec<usize> = (0..self.items.len()).collect();
        indices
            .choose_multiple(rng, batch_size.min(self.items.len()))
            .map(|&i| self.items[i].clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Demonstration> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<Demonstration> {
        self.items.iter().cloned().collect()
    }
}
