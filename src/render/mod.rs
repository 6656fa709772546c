//! Overlay presentation
//!
//! Sinks only receive draw calls. Nothing drawn here is ever read back by
//! the decision code.

pub mod colors;

use std::collections::VecDeque;

use serde::Serialize;

use crate::core::error::Result;
use crate::core::types::{Position, Tick};
use colors::Color;

/// Maximum overlay entries a [`RecordingSink`] keeps
const MAX_RECORDED: usize = 256;

/// Something to draw on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OverlayShape {
    Box {
        top_left: Position,
        bottom_right: Position,
        color: Color,
    },
    Text {
        at: Position,
        text: String,
    },
}

/// Injected capability that puts overlays on screen
pub trait PresentationSink {
    /// Draw `shape` for the next `frames` host frames
    fn draw(&mut self, shape: OverlayShape, frames: Tick) -> Result<()>;
}

/// Sink that writes every overlay to the trace log
#[derive(Debug, Default)]
pub struct LogSink;

impl PresentationSink for LogSink {
    fn draw(&mut self, shape: OverlayShape, frames: Tick) -> Result<()> {
        tracing::debug!(?shape, frames, "overlay");
        Ok(())
    }
}

/// An overlay captured by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedOverlay {
    pub shape: OverlayShape,
    pub frames: Tick,
}

/// Sink that keeps the most recent overlays in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: VecDeque<RecordedOverlay>,
    total: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_RECORDED),
            total: 0,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &RecordedOverlay> {
        self.entries.iter()
    }

    /// Overlays drawn since creation, including evicted ones
    pub fn total(&self) -> usize {
        self.total
    }
}

impl PresentationSink for RecordingSink {
    fn draw(&mut self, shape: OverlayShape, frames: Tick) -> Result<()> {
        if self.entries.len() >= MAX_RECORDED {
            self.entries.pop_front();
        }
        self.entries.push_back(RecordedOverlay { shape, frames });
        self.total += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(n: usize) -> OverlayShape {
        OverlayShape::Text {
            at: Position::new(0, 0),
            text: n.to_string(),
        }
    }

    #[test]
    fn test_recording_sink_keeps_latest() {
        let mut sink = RecordingSink::new();
        for n in 0..MAX_RECORDED + 10 {
            sink.draw(text(n), 1).expect("recording never fails");
        }

        assert_eq!(sink.total(), MAX_RECORDED + 10);
        assert_eq!(sink.entries().count(), MAX_RECORDED);
        assert_eq!(sink.entries().next().map(|e| &e.shape), Some(&text(10)));
    }

    #[test]
    fn test_log_sink_accepts_everything() {
        let mut sink = LogSink;
        assert!(sink.draw(text(1), 5).is_ok());
    }
}
