// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, Rng, SeedableRng};

pub trait RandomSource {
    fn range(&mut self, lo: f32, hi: f32) -> f32;

    // Uniform index in `0..n`; `n` must be non-zero.
    fn index(&mut self, n: usize) -> usize {
        let v = self.range(0.0, n as f32).floor() as usize;
        v.min(n.saturating_sub(1))
    }

    fn chance(&mut self, p: f32) -> bool {
        self.range(0.0, 1.0) < p
    }

    fn sign(&mut self) -> f32 {
        if self.chance(0.5) {
            -1.0
        } else {
            1.0
        }
    }
}

pub struct ThreadRandom {
    rng: StdRng,
}

impl ThreadRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ThreadRandom {
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if !(hi > lo) {
            return lo;
        }
        self.rng.random_range(lo..hi)
    }
}

pub fn thread_random() -> Box<dyn RandomSource> {
    Box::new(ThreadRandom::new())
}


#[cfg(test)]
mod tests {
    use super::testing::{FixedRandom, ScriptedRandom};
    use super::*;

    #[test]
    fn thread_random_stays_in_range() {
        let mut r = ThreadRandom::new();
        for _ in 0..1000 {
            let v = r.range(5.0, 15.0);
            assert!((5.0..15.0).contains(&v));
        }
        assert_eq!(r.range(3.0, 3.0), 3.0);
        assert_eq!(r.range(0.0, -10.0), 0.0);
    }

    #[test]
    fn index_never_reaches_n() {
        let mut r = FixedRandom(0.999_999_9);
        assert_eq!(r.index(7), 6);
        let mut r = FixedRandom(0.0);
        assert_eq!(r.index(7), 0);
    }

    #[test]
    fn scripted_replays_then_falls_back() {
        let mut r = ScriptedRandom::new(&[0.25, 0.75], 0.5);
        assert_eq!(r.range(0.0, 4.0), 1.0);
        assert_eq!(r.range(0.0, 4.0), 3.0);
        assert_eq!(r.range(0.0, 4.0), 2.0);
        assert_eq!(r.sign(), 1.0);
    }
}
