//! Control overlay logic: clock formatting, pointer geometry, auto-hide
//!
//! The DOM wiring lives in the wasm crate; everything here is plain
//! arithmetic and a small state machine so it can be tested natively.

/// Idle time before the controls hide during playback
pub const AUTO_HIDE_DELAY_MS: u32 = 3000;

/// Format seconds as `M:SS`, or `H:MM:SS` once past the hour.
/// Non-finite and negative input renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Fraction of a bar at `pointer`, clamped to `[0, 1]`
pub fn bar_fraction(pointer: f64, start: f64, extent: f64) -> f64 {
    if extent <= 0.0 || !extent.is_finite() {
        return 0.0;
    }
    ((pointer - start) / extent).clamp(0.0, 1.0)
}

/// Volume for a click on the vertical slider: the top is full volume
pub fn slider_volume(pointer_y: f64, top: f64, height: f64) -> f64 {
    if height <= 0.0 || !height.is_finite() {
        return 0.0;
    }
    1.0 - (pointer_y - top) / height
}

/// Seek target for a scrubber fraction; `None` until the duration is known
pub fn seek_target(fraction: f64, duration: f64) -> Option<f64> {
    (duration.is_finite() && duration > 0.0).then(|| fraction.clamp(0.0, 1.0) * duration)
}

/// What the progress bar and clock show
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub played_percent: f64,
    pub buffered_percent: f64,
    pub current_label: String,
    pub duration_label: String,
}

impl ProgressView {
    pub fn new(current_time: f64, duration: f64, buffered_percent: f64) -> Self {
        let played_percent = if duration.is_finite() && duration > 0.0 {
            (current_time / duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            played_percent,
            buffered_percent,
            current_label: format_time(current_time),
            duration_label: format_time(duration),
        }
    }

    pub fn time_label(&self) -> String {
        format!("{} / {}", self.current_label, self.duration_label)
    }
}

/// Icon state of the volume button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    Muted,
    Low,
    High,
}

impl VolumeLevel {
    pub fn from_state(volume: f64, muted: bool) -> Self {
        if muted || volume <= 0.0 {
            VolumeLevel::Muted
        } else if volume < 0.5 {
            VolumeLevel::Low
        } else {
            VolumeLevel::High
        }
    }
}

/// Timer instruction returned by [`AutoHide`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Cancel the pending timer and start a new one
    Restart(u32),
    Cancel,
    Keep,
}

/// Chrome visibility plus the timer instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeUpdate {
    pub visible: bool,
    pub timer: TimerCommand,
}

/// Auto-hide state for the control chrome.
///
/// Controls show on pointer movement and hide after [`AUTO_HIDE_DELAY_MS`]
/// of inactivity, only while playing.
#[derive(Debug, Clone)]
pub struct AutoHide {
    visible: bool,
    armed: bool,
}

impl Default for AutoHide {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoHide {
    pub fn new() -> Self {
        Self { visible: true, armed: false }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    fn show(&mut self, playing: bool) -> ChromeUpdate {
        self.visible = true;
        self.armed = playing;
        ChromeUpdate {
            visible: true,
            timer: if playing {
                TimerCommand::Restart(AUTO_HIDE_DELAY_MS)
            } else {
                TimerCommand::Cancel
            },
        }
    }

    pub fn pointer_moved(&mut self, playing: bool) -> ChromeUpdate {
        self.show(playing)
    }

    pub fn playback_started(&mut self) -> ChromeUpdate {
        self.show(true)
    }

    /// Paused or ended: keep the controls up
    pub fn playback_stopped(&mut self) -> ChromeUpdate {
        self.show(false)
    }

    pub fn pointer_left(&mut self, playing: bool) -> ChromeUpdate {
        if playing {
            self.visible = false;
            self.armed = false;
            ChromeUpdate { visible: false, timer: TimerCommand::Cancel }
        } else {
            ChromeUpdate { visible: self.visible, timer: TimerCommand::Keep }
        }
    }

    /// The idle timer fired
    pub fn timer_elapsed(&mut self, playing: bool) -> ChromeUpdate {
        self.armed = false;
        if playing {
            self.visible = false;
        }
        ChromeUpdate { visible: self.visible, timer: TimerCommand::Keep }
    }
}
