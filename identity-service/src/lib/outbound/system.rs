use chrono::DateTime;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::Rng;

use crate::domain::ports::Clock;
use crate::domain::ports::RandomSource;

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random strings backed by the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn string(&self, len: usize, charset: &[u8]) -> String {
        if charset.is_empty() {
            return String::new();
        }

        let mut rng = OsRng;
        (0..len)
            .map(|_| charset[rng.gen_range(0..charset.len())] as char)
            .collect()
    }
}
