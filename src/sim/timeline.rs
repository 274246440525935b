//! Timeline recording and echo playback
//!
//! A recorder captures a live snake once per simulation tick. Saving a
//! timeline freezes those samples into an immutable [`Recording`], which an
//! [`EchoPlayback`] replays as a collidable hazard on its own clock, so echo
//! speed is unaffected by time dilation or paradox speed-ups.

use std::collections::VecDeque;
use std::sync::Arc;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::snake::Snake;
use crate::Direction;
use crate::consts::ECHO_RECORD_TIME_MS;

/// Explicitly advanced millisecond clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalClock {
    elapsed_ms: f64,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt_ms: f32) {
        self.elapsed_ms += f64::from(dt_ms.max(0.0));
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }
}

/// One captured frame of a snake's trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoSample {
    /// Milliseconds since the recording began
    pub time_ms: f64,
    pub segments: Vec<IVec2>,
    pub direction: Direction,
}

/// Frozen trajectory, shared between the saved-timeline slot and its playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    samples: Arc<[EchoSample]>,
}

impl Recording {
    pub fn new(samples: Vec<EchoSample>) -> Self {
        Self {
            samples: samples.into(),
        }
    }

    pub fn samples(&self) -> &[EchoSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of the final sample
    pub fn duration_ms(&self) -> f64 {
        self.samples.last().map(|s| s.time_ms).unwrap_or(0.0)
    }
}

/// Captures a bounded window of a snake's recent history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineRecorder {
    samples: VecDeque<EchoSample>,
    clock: LogicalClock,
    recording: bool,
    window_ms: f64,
}

impl Default for TimelineRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineRecorder {
    pub fn new() -> Self {
        Self::with_window(ECHO_RECORD_TIME_MS)
    }

    pub fn with_window(window_ms: f64) -> Self {
        Self {
            samples: VecDeque::new(),
            clock: LogicalClock::new(),
            recording: false,
            window_ms,
        }
    }

    /// Clear the buffer and begin capturing from time zero
    pub fn start(&mut self) {
        self.samples.clear();
        self.clock.reset();
        self.recording = true;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Advance the recorder clock and snapshot the snake (no-op when stopped)
    pub fn record_sample(&mut self, snake: &Snake, dt_ms: f32) {
        if !self.recording {
            return;
        }
        self.clock.advance(dt_ms);
        let now = self.clock.elapsed_ms();
        self.samples.push_back(EchoSample {
            time_ms: now,
            segments: snake.segments().iter().copied().collect(),
            direction: snake.direction(),
        });

        // Keep only the most recent window
        while let Some(front) = self.samples.front() {
            if now - front.time_ms > self.window_ms {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Halt capture and freeze the buffer, rebased so the first sample is t=0
    pub fn stop(&mut self) -> Recording {
        self.recording = false;
        let origin = self.samples.front().map(|s| s.time_ms).unwrap_or(0.0);
        let samples = self
            .samples
            .drain(..)
            .map(|mut s| {
                s.time_ms -= origin;
                s
            })
            .collect();
        Recording::new(samples)
    }

    /// Fraction of the history window filled so far (0..=1)
    pub fn progress(&self) -> f32 {
        if !self.recording || self.window_ms <= 0.0 {
            return 0.0;
        }
        (self.clock.elapsed_ms() / self.window_ms).min(1.0) as f32
    }
}

/// Replays a recording as an independent hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoPlayback {
    recording: Recording,
    clock: LogicalClock,
    cursor: usize,
    finished: bool,
}

impl EchoPlayback {
    /// An empty recording yields an already-finished playback
    pub fn new(recording: Recording) -> Self {
        let finished = recording.is_empty();
        Self {
            recording,
            clock: LogicalClock::new(),
            cursor: 0,
            finished,
        }
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.clock.elapsed_ms()
    }

    /// Move the cursor to the last sample whose timestamp has elapsed
    pub fn advance(&mut self, dt_ms: f32) {
        if self.finished {
            return;
        }
        self.clock.advance(dt_ms);
        let elapsed = self.clock.elapsed_ms();
        let samples = self.recording.samples();
        let last = samples.len().saturating_sub(1);
        while self.cursor < last && samples[self.cursor + 1].time_ms <= elapsed {
            self.cursor += 1;
        }
        if self.cursor >= last {
            self.finished = true;
        }
    }

    /// Sample the echo currently shows (`None` once finished)
    pub fn current(&self) -> Option<&EchoSample> {
        if self.finished {
            return None;
        }
        self.recording.samples().get(self.cursor)
    }

    pub fn segments(&self) -> &[IVec2] {
        self.current().map(|s| s.segments.as_slice()).unwrap_or(&[])
    }

    /// Whether `pos` overlaps the echo body; finished echoes never collide
    pub fn collides_with(&self, pos: IVec2) -> bool {
        self.segments().contains(&pos)
    }

    /// Replay from the beginning as a fresh hazard
    pub fn restart(&mut self) {
        self.clock.reset();
        self.cursor = 0;
        self.finished = self.recording.is_empty();
    }
}
