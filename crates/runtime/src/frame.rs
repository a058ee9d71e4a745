use foundation::time::Time;

/// Upper bound on a single frame step; keeps a backgrounded tab from
/// producing one huge jump when it resumes.
pub const MAX_FRAME_DT_S: f64 = 0.1;

/// Per-tick frame metadata handed to every animated subsystem.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame, clamped to `[0, MAX_FRAME_DT_S]`.
    pub dt_s: f64,
    /// Host timestamp at the start of the frame.
    pub time: Time,
}

/// Turns host timestamps (e.g. `requestAnimationFrame`) into [`Frame`]s.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    next_index: u64,
    last: Option<Time>,
    fallback_dt_s: f64,
}

impl FrameClock {
    pub fn new(fallback_dt_s: f64) -> Self {
        Self {
            next_index: 0,
            last: None,
            fallback_dt_s: fallback_dt_s.clamp(0.0, MAX_FRAME_DT_S),
        }
    }

    pub fn tick(&mut self, now: Time) -> Frame {
        let dt_s = match self.last {
            Some(prev) => now.since(prev).min(MAX_FRAME_DT_S),
            None => self.fallback_dt_s,
        };
        self.last = Some(now);
        let frame = Frame {
            index: self.next_index,
            dt_s,
            time: now,
        };
        self.next_index = self.next_index.wrapping_add(1);
        frame
    }

    pub fn last_time(&self) -> Option<Time> {
        self.last
    }
}
