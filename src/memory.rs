use std::collections::VecDeque;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};

use crate::error::{DeepqError, Result};

/// How [`Memory::sample`] picks transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleMethod {
    /// Distinct indices drawn uniformly at random without replacement.
    Uniform,
    /// The most recently inserted transitions, in insertion order.
    Last,
}

impl Default for SampleMethod {
    fn default() -> Self {
        SampleMethod::Uniform
    }
}

impl FromStr for SampleMethod {
    type Err = DeepqError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uniform" => Ok(SampleMethod::Uniform),
            "last" => Ok(SampleMethod::Last),
            other => Err(DeepqError::UnsupportedSamplingMethod(other.to_string())),
        }
    }
}

/// A batch of transitions as parallel per-field blocks, aligned by row.
#[derive(Clone, Debug)]
pub struct Batch {
    pub observations: Array2<f32>,
    pub actions: Vec<usize>,
    pub rewards: Array1<f32>,
    pub dones: Vec<bool>,
    pub next_observations: Array2<f32>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Bounded FIFO replay memory.
///
/// Transitions are stored as one sequence per field; the sequences always
/// have equal length and an index refers to the same transition in each of
/// them. When an insertion exceeds `max_len`, the oldest transition is
/// evicted, making the memory a sliding window over the most recent
/// interactions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Memory {
    max_len: usize,
    observation_width: Option<usize>,
    observations: VecDeque<Array1<f32>>,
    actions: VecDeque<usize>,
    rewards: VecDeque<f32>,
    dones: VecDeque<bool>,
    next_observations: VecDeque<Array1<f32>>,
}

impl Memory {
    /// Create an empty memory holding at most `max_len` transitions.
    pub fn new(max_len: usize) -> Self {
        Memory {
            max_len,
            observation_width: None,
            observations: VecDeque::with_capacity(max_len),
            actions: VecDeque::with_capacity(max_len),
            rewards: VecDeque::with_capacity(max_len),
            dones: VecDeque::with_capacity(max_len),
            next_observations: VecDeque::with_capacity(max_len),
        }
    }

    /// Append one transition, evicting the oldest when over capacity.
    ///
    /// The first insertion establishes the observation width; later
    /// insertions must match it or fail with
    /// [`DeepqError::ShapeMismatch`], leaving the memory unmodified.
    /// A terminal transition has no successor: pass `None` and a zero
    /// vector of the observation's width is stored in its place.
    pub fn remember(
        &mut self,
        observation: ArrayView1<f32>,
        action: usize,
        reward: f32,
        done: bool,
        next_observation: Option<ArrayView1<f32>>,
    ) -> Result<()> {
        let width = observation.len();
        if let Some(expected) = self.observation_width {
            if width != expected {
                return Err(DeepqError::shape_mismatch(expected, width));
            }
        }
        if let Some(next) = &next_observation {
            if next.len() != width {
                return Err(DeepqError::shape_mismatch(width, next.len()));
            }
        }

        let next = match next_observation {
            Some(next) => next.to_owned(),
            None => Array1::zeros(width),
        };

        self.observation_width = Some(width);
        self.observations.push_back(observation.to_owned());
        self.actions.push_back(action);
        self.rewards.push_back(reward);
        self.dones.push_back(done);
        self.next_observations.push_back(next);

        while self.observations.len() > self.max_len {
            self.observations.pop_front();
            self.actions.pop_front();
            self.rewards.pop_front();
            self.dones.pop_front();
            self.next_observations.pop_front();
        }

        Ok(())
    }

    /// Return a batch of `sample_size` transitions.
    ///
    /// `sample_size == 0`, or any value at least the current length, means
    /// the whole memory. Sampling from an empty memory with
    /// `sample_size > 0` fails with [`DeepqError::InsufficientData`];
    /// otherwise whatever is available is returned. Read-only: repeated
    /// calls between mutations observe the same contents.
    pub fn sample(&self, sample_size: usize, method: SampleMethod) -> Result<Batch> {
        let len = self.len();
        if len == 0 && sample_size > 0 {
            return Err(DeepqError::InsufficientData {
                requested: sample_size,
            });
        }

        let n = if sample_size == 0 || sample_size >= len {
            len
        } else {
            sample_size
        };

        let indices: Vec<usize> = match method {
            SampleMethod::Uniform => {
                let mut rng = thread_rng();
                let mut indices: Vec<usize> = (0..len).collect();
                indices.shuffle(&mut rng);
                indices.truncate(n);
                indices
            }
            SampleMethod::Last => (len - n..len).collect(),
        };

        let width = self.observation_width.unwrap_or(0);
        let mut observations = Array2::zeros((n, width));
        let mut next_observations = Array2::zeros((n, width));
        let mut actions = Vec::with_capacity(n);
        let mut rewards = Vec::with_capacity(n);
        let mut dones = Vec::with_capacity(n);

        for (row, &index) in indices.iter().enumerate() {
            observations.row_mut(row).assign(&self.observations[index]);
            next_observations
                .row_mut(row)
                .assign(&self.next_observations[index]);
            actions.push(self.actions[index]);
            rewards.push(self.rewards[index]);
            dones.push(self.dones[index]);
        }

        Ok(Batch {
            observations,
            actions,
            rewards: Array1::from(rewards),
            dones,
            next_observations,
        })
    }

    /// Current number of stored transitions.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Maximum number of transitions the memory will hold.
    pub fn capacity(&self) -> usize {
        self.max_len
    }

    /// Observation width established by the first insertion, if any.
    pub fn observation_width(&self) -> Option<usize> {
        self.observation_width
    }

    /// Remove all transitions. Capacity is unchanged; the observation
    /// width resets with the contents, so an emptied memory accepts a
    /// fresh shape.
    pub fn forget(&mut self) {
        self.observation_width = None;
        self.observations.clear();
        self.actions.clear();
        self.rewards.clear();
        self.dones.clear();
        self.next_observations.clear();
    }
}
