//! Random draws used by the model.
//!
//! All stochastic rules go through [`Draw`], so a seeded generator makes a
//! run reproducible and [`ScriptedDraws`] pins every draw to a known value.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Source of the three kinds of randomness the model consumes
pub trait Draw {
    /// Uniform draw in `[0, 1)`
    fn uniform(&mut self) -> f64;

    /// Draw from a normal distribution
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64;

    /// Permute `items` uniformly at random
    fn shuffle<T>(&mut self, items: &mut [T]);
}

/// Create a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

impl Draw for ChaCha8Rng {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(dist) => dist.sample(self),
            Err(_) => mean,
        }
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(self);
    }
}

/// Replays a fixed sequence of uniform draws.
///
/// Once the script is exhausted the last value repeats. Normal draws return
/// the mean unless a fixed value is set, and shuffling keeps the order.
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    uniforms: Vec<f64>,
    cursor: usize,
    normal: Option<f64>,
}

impl ScriptedDraws {
    pub fn new(uniforms: Vec<f64>) -> Self {
        Self {
            uniforms,
            cursor: 0,
            normal: None,
        }
    }

    /// Every uniform draw returns `value`
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Every normal draw returns `value`
    pub fn with_normal(mut self, value: f64) -> Self {
        self.normal = Some(value);
        self
    }
}

impl Draw for ScriptedDraws {
    fn uniform(&mut self) -> f64 {
        let value = match self.uniforms.get(self.cursor) {
            Some(value) => *value,
            None => self.uniforms.last().copied().unwrap_or(0.0),
        };
        self.cursor += 1;
        value
    }

    fn normal(&mut self, mean: f64, _std_dev: f64) -> f64 {
        self.normal.unwrap_or(mean)
    }

    fn shuffle<T>(&mut self, _items: &mut [T]) {}
}
