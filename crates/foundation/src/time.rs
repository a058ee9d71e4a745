/// Wall-clock instant in seconds, as reported by the host's frame callback.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64);

impl Time {
    pub fn from_millis(ms: f64) -> Self {
        Self(ms / 1000.0)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    pub fn after(self, delay_s: f64) -> Self {
        Self(self.0 + delay_s)
    }

    /// Seconds elapsed since `earlier`, never negative.
    pub fn since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn elapsed_is_clamped() {
        let t0 = Time::from_millis(1500.0);
        assert_eq!(t0, Time(1.5));
        assert_eq!(t0.after(0.5).since(t0), 0.5);
        assert_eq!(t0.since(t0.after(1.0)), 0.0);
    }
}
