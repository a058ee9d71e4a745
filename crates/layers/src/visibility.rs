/// Fires once, the first time its target is reported visible.
///
/// Drives the deferred high-resolution texture pass: intersection callbacks
/// keep arriving as the page scrolls, but the upgrade must only run once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityLatch {
    fired: bool,
}

impl VisibilityLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once: on the first call with `visible == true`.
    pub fn observe(&mut self, visible: bool) -> bool {
        if self.fired || !visible {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

/// Orders the two texture tiers: the low tier is always drawn and uploaded
/// first, and the high tier follows once the globe has been seen and the
/// geometry has loaded.
///
/// Visibility may be reported before the geometry arrives; the upgrade then
/// waits for [`HighTierSchedule::geometry_ready`] and one further frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighTierSchedule {
    latch: VisibilityLatch,
    geometry: bool,
    due: bool,
}

impl HighTierSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time the target is seen, so the caller can
    /// stop observing.
    pub fn observe(&mut self, visible: bool) -> bool {
        let fired = self.latch.observe(visible);
        if fired && self.geometry {
            self.due = true;
        }
        fired
    }

    /// Call after the low tier has been drawn from freshly loaded geometry.
    pub fn geometry_ready(&mut self) {
        self.geometry = true;
        if self.latch.has_fired() {
            self.due = true;
        }
    }

    /// `true` once, on the frame the high tier should be drawn. Call after
    /// that frame's uploads so the low tier reaches the GPU first.
    pub fn take_due(&mut self) -> bool {
        std::mem::take(&mut self.due)
    }

    pub fn has_seen(&self) -> bool {
        self.latch.has_fired()
    }
}
