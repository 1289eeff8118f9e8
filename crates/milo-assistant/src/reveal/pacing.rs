use std::time::Duration;

use milo_config::schema::RevealConfig;
use rand::Rng;

/// Delays between revealed characters.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealPacing {
    /// Pause before the first character appears.
    pub initial_delay: Duration,
    /// After `.`, `!` or `?`.
    pub sentence_pause: Duration,
    pub comma_pause: Duration,
    pub newline_pause: Duration,
    /// Bounds (inclusive) of the random delay after any other character.
    pub char_pause_min: Duration,
    pub char_pause_max: Duration,
    /// Emit a progress signal every this many characters.
    pub progress_every: usize,
}

impl Default for RevealPacing {
    fn default() -> Self {
        Self::from(&RevealConfig::default())
    }
}

impl From<&RevealConfig> for RevealPacing {
    fn from(config: &RevealConfig) -> Self {
        let min = config.char_pause_min_ms.min(config.char_pause_max_ms);
        let max = config.char_pause_min_ms.max(config.char_pause_max_ms);
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            sentence_pause: Duration::from_millis(config.sentence_pause_ms),
            comma_pause: Duration::from_millis(config.comma_pause_ms),
            newline_pause: Duration::from_millis(config.newline_pause_ms),
            char_pause_min: Duration::from_millis(min),
            char_pause_max: Duration::from_millis(max),
            progress_every: config.progress_every.max(1) as usize,
        }
    }
}

impl RevealPacing {
    /// Delay to wait after showing `ch`.
    pub fn delay_after<R: Rng>(&self, ch: char, rng: &mut R) -> Duration {
        match ch {
            '.' | '!' | '?' => self.sentence_pause,
            ',' => self.comma_pause,
            '\n' => self.newline_pause,
            _ => {
                let (lo, hi) = if self.char_pause_min <= self.char_pause_max {
                    (self.char_pause_min, self.char_pause_max)
                } else {
                    (self.char_pause_max, self.char_pause_min)
                };
                let ms = rng.gen_range(lo.as_millis() as u64..=hi.as_millis() as u64);
                Duration::from_millis(ms)
            }
        }
    }

    /// Longest total time a text of `chars` characters can take.
    pub fn worst_case(&self, chars: usize) -> Duration {
        let per_char = self
            .sentence_pause
            .max(self.comma_pause)
            .max(self.newline_pause)
            .max(self.char_pause_max)
            .max(self.char_pause_min);
        self.initial_delay + per_char * chars as u32
    }
}
