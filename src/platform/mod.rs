//! Platform abstraction layer
//!
//! Handles the parts that touch the outside world:
//! - Time (wall clock, frame pacing)
//! - Input flags written from another thread
//! - Fixed-step accumulation of variable frame times
//! - Loop cancellation

use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::sim::InputState;

/// Turns variable frame times into a whole number of fixed steps
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f64,
    max_frame_dt: f64,
    accumulator: f64,
    last_time: Option<f64>,
}

impl FixedStep {
    pub fn new(step: f64, max_frame_dt: f64) -> Self {
        Self {
            step,
            max_frame_dt,
            accumulator: 0.0,
            last_time: None,
        }
    }

    /// Feed a frame timestamp (seconds), get the number of steps to run
    ///
    /// The first frame only records the time. Deltas above `max_frame_dt`
    /// are clamped; leftover time carries into the next frame.
    pub fn frame(&mut self, now: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) => (now - last).max(0.0),
            None => 0.0,
        };
        self.last_time = Some(now);

        let dt = if dt > self.max_frame_dt {
            log::warn!(
                "Frame stall of {:.0}ms clamped to {:.0}ms",
                dt * 1000.0,
                self.max_frame_dt * 1000.0
            );
            self.max_frame_dt
        } else {
            dt
        };

        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }

    /// Leftover time not yet consumed by a step
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Drop leftover time (after a restart)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Game keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
}

impl Key {
    /// Map a DOM/winit-style key name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" | "w" | "W" => Some(Key::Up),
            "ArrowDown" | "s" | "S" => Some(Key::Down),
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            " " | "Space" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct InputFlags {
    up: AtomicBool,
    down: AtomicBool,
    left: AtomicBool,
    right: AtomicBool,
    space: AtomicBool,
    enter: AtomicBool,
}

impl InputFlags {
    fn flag(&self, key: Key) -> &AtomicBool {
        match key {
            Key::Up => &self.up,
            Key::Down => &self.down,
            Key::Left => &self.left,
            Key::Right => &self.right,
            Key::Space => &self.space,
            Key::Enter => &self.enter,
        }
    }
}

/// Shared key state: written by the input thread, read once per step
///
/// Flags are independent; no ordering between them is needed.
#[derive(Debug, Clone, Default)]
pub struct InputHandle {
    flags: Arc<InputFlags>,
}

impl InputHandle {
    pub fn set(&self, key: Key, pressed: bool) {
        self.flags.flag(key).store(pressed, Ordering::Relaxed);
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.flags.flag(key).load(Ordering::Relaxed)
    }

    pub fn release_all(&self) {
        for key in [Key::Up, Key::Down, Key::Left, Key::Right, Key::Space, Key::Enter] {
            self.set(key, false);
        }
    }

    pub fn snapshot(&self) -> InputState {
        InputState {
            up: self.is_pressed(Key::Up),
            down: self.is_pressed(Key::Down),
            left: self.is_pressed(Key::Left),
            right: self.is_pressed(Key::Right),
            space: self.is_pressed(Key::Space),
            enter: self.is_pressed(Key::Enter),
        }
    }
}

/// Wall-clock source for the frame loop
pub trait Clock {
    /// Monotonic seconds
    fn now(&self) -> f64;
    /// Pause until the next frame
    fn wait(&self, duration: Duration);
}

/// Real time, measured from construction
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only moves when waited on or advanced
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn wait(&self, duration: Duration) {
        self.advance(duration.as_secs_f64());
    }
}

/// Stops a running frame loop before its next frame
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
