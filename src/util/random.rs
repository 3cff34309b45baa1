const M: u32 = 0x7fffffff;
const A: u64 = 16807;

/// Park-Miller "minimal standard" generator.
#[derive(Debug, Clone)]
pub struct Random {
    seed: u32,
}

impl Random {
    pub fn new(seed: u32) -> Self {
        let mut seed = seed & M;
        if seed == 0 || seed == M {
            seed = 1;
        }
        Self { seed }
    }

    pub fn next(&mut self) -> u32 {
        let product = self.seed as u64 * A;
        // product % M
        self.seed = ((product >> 31) + (product & M as u64)) as u32;
        if self.seed > M {
            self.seed -= M;
        }
        self.seed
    }

    pub fn one_in(&mut self, n: u32) -> bool {
        (self.next() % n) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::Random;

    #[test]
    fn test_random_deterministic() {
        let mut a = Random::new(301);
        let mut b = Random::new(301);
        for _ in 0..1000 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_random_degenerate_seeds() {
        // 0 and M would make the generator stick
        let mut zero = Random::new(0);
        let mut max = Random::new(0x7fffffff);
        assert_eq!(zero.next(), max.next());
        assert_ne!(0, zero.next());
    }
}
