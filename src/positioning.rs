//! Overlay placement: monitor-centered with clamping, or cursor-anchored
//!
//! Also owns the keyboard nudge step contract used by the offset dialog.

use crate::constants::{nudge, positioning};

/// Monitor geometry in X11 root-window pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl MonitorRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Stand-in used when no monitor is reported at all
    pub const fn fallback() -> Self {
        Self::new(
            0,
            0,
            positioning::FALLBACK_MONITOR_WIDTH,
            positioning::FALLBACK_MONITOR_HEIGHT,
        )
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    /// Exclusive
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    /// Exclusive
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}

/// Everything the placement depends on
#[derive(Debug, Clone, Copy)]
pub struct PlacementInput<'a> {
    pub monitors: &'a [MonitorRect],
    pub monitor_index: u32,
    pub follow_mouse: bool,
    pub cursor: (i32, i32),
    pub offset_x: f64,
    pub offset_y: f64,
    pub bitmap_width: i32,
    pub bitmap_height: i32,
}

/// Monitor `index`, or monitor 0 when out of range
pub fn select_monitor(monitors: &[MonitorRect], index: u32) -> MonitorRect {
    monitors
        .get(index as usize)
        .or_else(|| monitors.first())
        .copied()
        .unwrap_or_else(MonitorRect::fallback)
}

/// Top-left corner for the overlay window
pub fn compute_position(input: &PlacementInput<'_>) -> (i32, i32) {
    let (w, h) = if input.bitmap_width <= 0 || input.bitmap_height <= 0 {
        (
            positioning::DEGENERATE_BITMAP_SIZE,
            positioning::DEGENERATE_BITMAP_SIZE,
        )
    } else {
        (input.bitmap_width, input.bitmap_height)
    };
    let (half_w, half_h) = (w as f64 / 2.0, h as f64 / 2.0);

    if input.follow_mouse {
        let x = input.cursor.0 as f64 + input.offset_x - half_w;
        let y = input.cursor.1 as f64 + input.offset_y - half_h;
        return (round_px(x), round_px(y));
    }

    let monitor = select_monitor(input.monitors, input.monitor_index);
    let (cx, cy) = monitor.center();
    let x = cx - half_w + input.offset_x;
    let y = cy - half_h + input.offset_y;

    (
        clamp_lower_wins(x, monitor.left() as f64, (monitor.right() - w) as f64),
        clamp_lower_wins(y, monitor.top() as f64, (monitor.bottom() - h) as f64),
    )
}

/// `min` takes precedence over `max` when the range is inverted
fn clamp_lower_wins(value: f64, min: f64, max: f64) -> i32 {
    round_px(value.min(max).max(min))
}

fn round_px(value: f64) -> i32 {
    value.round() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NudgeModifiers {
    pub shift: bool,
    pub ctrl: bool,
}

/// Offset change per arrow-key press; Ctrl beats Shift
pub fn nudge_step(modifiers: NudgeModifiers) -> f64 {
    if modifiers.ctrl {
        nudge::CTRL_STEP
    } else if modifiers.shift {
        nudge::SHIFT_STEP
    } else {
        nudge::BASE_STEP
    }
}

/// Move `(offset_x, offset_y)` by `step` in `direction`
pub fn apply_nudge(offset: (f64, f64), direction: NudgeDirection, step: f64) -> (f64, f64) {
    let (x, y) = offset;
    match direction {
        NudgeDirection::Left => (x - step, y),
        NudgeDirection::Right => (x + step, y),
        NudgeDirection::Up => (x, y - step),
        NudgeDirection::Down => (x, y + step),
    }
}
