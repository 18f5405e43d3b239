// Copyright @yucwang 2026

use rand::RngCore;

/// Small seedable stream; one per worker so traces stay reproducible.
#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Independent stream for one unit of work, e.g. one shower step.
    /// `(seed, task)` goes through SplitMix64 so neighbouring tasks start
    /// from unrelated states.
    pub fn for_task(seed: u64, task: u64) -> Self {
        Self::new(split_mix(split_mix(seed) ^ task))
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.state
    }
}

fn split_mix(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl RngCore for LcgRng {
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Float;
    use rand::Rng;

    #[test]
    fn test_lcg_is_deterministic() {
        let mut a = LcgRng::new(42);
        let mut b = LcgRng::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_lcg_unit_interval() {
        let mut rng = LcgRng::for_task(3, 11);
        let mut mean = 0.0;
        for _ in 0..10000 {
            let u: Float = rng.gen();
            assert!(u >= 0.0 && u < 1.0);
            mean += u / 10000.0;
        }
        assert!((mean - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_task_streams_differ() {
        let mut a = LcgRng::for_task(5, 0);
        let mut b = LcgRng::for_task(5, 1);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_neighbouring_tasks_are_not_shifted_copies() {
        // A constant draw offset between task k and k + 1 would replay the
        // same impact points at every shower step.
        let first = |task: u64| -> Float { LcgRng::for_task(7, task).gen() };
        let offsets: Vec<Float> = (0..64)
            .map(|k| (first(k + 1) - first(k)).rem_euclid(1.0))
            .collect();
        let repeated = offsets.windows(2)
            .filter(|w| (w[0] - w[1]).abs() < 1e-9)
            .count();
        assert_eq!(repeated, 0);

        let mut a = LcgRng::for_task(7, 0);
        let mut b = LcgRng::for_task(7, 1);
        let diffs: Vec<u32> = (0..8).map(|_| b.next_u32().wrapping_sub(a.next_u32())).collect();
        assert!(diffs.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_noise_stream_differs_from_steps() {
        let noise = LcgRng::for_task(7, u64::from(u32::MAX)).next_u64();
        for task in 0..16 {
            assert_ne!(LcgRng::for_task(7, task).next_u64(), noise);
        }
    }
}
