use std::sync::Arc;
use std::time::Duration;

use milo_common::{Message, MessageId};
use rand::rngs::StdRng;
use tracing::trace;

use super::cache::RevealCache;
use super::pacing::RevealPacing;

/// Receives the output of a running `Typewriter`.
pub trait RevealSink {
    /// `visible` is everything shown so far; `ch` was just added.
    fn reveal(&mut self, visible: &str, ch: char);

    /// Sent every `progress_every` characters and once more when the
    /// reveal completes, even if that lands on a periodic boundary.
    fn progress(&mut self, _visible_chars: usize) {}

    fn finished(&mut self, _text: &str) {}
}

/// Result of revealing one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealStep {
    pub ch: char,
    /// Characters visible after this step.
    pub visible: usize,
    /// Wait this long before the next step. Zero after the last character.
    pub delay: Duration,
    /// Whether a periodic progress signal is due. The completion signal
    /// is sent separately by [`Typewriter::run`].
    pub progress: bool,
    pub finished: bool,
}

/// Reveals one assistant message a character at a time.
///
/// The message is recorded as animated when the last character is shown
/// or when the typewriter is dropped, whichever happens first, so a view
/// torn down mid-animation shows the full text next time.
pub struct Typewriter {
    id: MessageId,
    text: String,
    /// Byte offset just past each character.
    ends: Vec<usize>,
    revealed: usize,
    pacing: RevealPacing,
    rng: StdRng,
    cache: Arc<RevealCache>,
}

impl Typewriter {
    pub(crate) fn new(
        message: &Message,
        pacing: RevealPacing,
        cache: Arc<RevealCache>,
        rng: StdRng,
    ) -> Self {
        let ends = message
            .content
            .char_indices()
            .map(|(i, ch)| i + ch.len_utf8())
            .collect();
        Self {
            id: message.id.clone(),
            text: message.content.clone(),
            ends,
            revealed: 0,
            pacing,
            rng,
            cache,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn total_chars(&self) -> usize {
        self.ends.len()
    }

    pub fn revealed_chars(&self) -> usize {
        self.revealed
    }

    pub fn visible_text(&self) -> &str {
        match self.revealed {
            0 => "",
            n => &self.text[..self.ends[n - 1]],
        }
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }

    pub fn is_finished(&self) -> bool {
        self.revealed >= self.ends.len()
    }

    /// A cursor trails the text while characters remain.
    pub fn show_cursor(&self) -> bool {
        !self.is_finished()
    }

    pub fn initial_delay(&self) -> Duration {
        self.pacing.initial_delay
    }

    /// Reveal the next character. `None` once everything is visible.
    pub fn step(&mut self) -> Option<RevealStep> {
        if self.is_finished() {
            self.cache.mark_animated(&self.id);
            return None;
        }
        let start = match self.revealed {
            0 => 0,
            n => self.ends[n - 1],
        };
        let ch = self.text[start..].chars().next()?;
        self.revealed += 1;

        let finished = self.is_finished();
        let delay = if finished {
            self.cache.mark_animated(&self.id);
            Duration::ZERO
        } else {
            self.pacing.delay_after(ch, &mut self.rng)
        };
        Some(RevealStep {
            ch,
            visible: self.revealed,
            delay,
            progress: self.revealed % self.pacing.progress_every.max(1) == 0,
            finished,
        })
    }

    /// Drive the animation to completion on the tokio clock.
    pub async fn run<S: RevealSink + ?Sized>(mut self, sink: &mut S) {
        trace!(message = %self.id, chars = self.total_chars(), "reveal started");
        if self.total_chars() > 0 {
            tokio::time::sleep(self.pacing.initial_delay).await;
        }
        while let Some(step) = self.step() {
            sink.reveal(self.visible_text(), step.ch);
            if step.progress {
                sink.progress(step.visible);
            }
            if !step.delay.is_zero() {
                tokio::time::sleep(step.delay).await;
            }
        }
        self.cache.mark_animated(&self.id);
        if self.revealed > 0 {
            sink.progress(self.revealed);
        }
        trace!(message = %self.id, "reveal finished");
        sink.finished(&self.text);
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        self.cache.mark_animated(&self.id);
    }
}
