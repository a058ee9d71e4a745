//! Time-based scalar tweens keyed by animation target.
//!
//! Each key owns at most one running tween. Starting a tween on a key that is
//! already animating cancels the old one first, so two interpolations never
//! fight over the same property.

use std::collections::BTreeMap;

use foundation::math::lerp;
use foundation::time::Time;
use tracing::trace;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    #[default]
    EaseOutCubic,
    EaseInOutQuad,
    /// Overshoots slightly before settling.
    EaseOutBack,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseOutBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start: Time,
    pub duration_s: f64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f64, to: f64, start: Time, duration_s: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start,
            duration_s: duration_s.max(0.0),
            easing,
        }
    }

    pub fn progress(&self, now: Time) -> f64 {
        if self.duration_s <= 0.0 {
            return 1.0;
        }
        (now.since(self.start) / self.duration_s).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, now: Time) -> f64 {
        let p = self.progress(now);
        if p >= 1.0 {
            return self.to;
        }
        lerp(self.from, self.to, self.easing.apply(p))
    }

    pub fn is_finished(&self, now: Time) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Values produced by one [`Tweens::advance`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenStep<K> {
    /// Current value of every tween that was active this frame, in key order.
    pub values: Vec<(K, f64)>,
    /// Keys whose tween reached its end this frame (already removed).
    pub finished: Vec<K>,
}

impl<K> Default for TweenStep<K> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            finished: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tweens<K: Ord + Copy + std::fmt::Debug> {
    active: BTreeMap<K, Tween>,
}

impl<K: Ord + Copy + std::fmt::Debug> Default for Tweens<K> {
    fn default() -> Self {
        Self {
            active: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy + std::fmt::Debug> Tweens<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `tween` on `key`.
    ///
    /// Returns `true` if a running tween on the same key was cancelled.
    pub fn start(&mut self, key: K, tween: Tween) -> bool {
        let replaced = self.active.insert(key, tween).is_some();
        if replaced {
            trace!(?key, "tween replaced");
        }
        replaced
    }

    /// Cancels the tween on `key`, leaving the property where it is.
    pub fn cancel(&mut self, key: K) -> bool {
        self.active.remove(&key).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.active.clear();
    }

    pub fn is_active(&self, key: K) -> bool {
        self.active.contains_key(&key)
    }

    pub fn get(&self, key: K) -> Option<&Tween> {
        self.active.get(&key)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Samples every active tween at `now`, retiring the ones that finished.
    pub fn advance(&mut self, now: Time) -> TweenStep<K> {
        let mut step = TweenStep::default();
        for (key, tween) in &self.active {
            step.values.push((*key, tween.value_at(now)));
            if tween.is_finished(now) {
                step.finished.push(*key);
            }
        }
        for key in &step.finished {
            self.active.remove(key);
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::{Easing, Tween, Tweens};
    use foundation::time::Time;

    #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
    enum Key {
        A,
        B,
    }

    #[test]
    fn easings_hit_endpoints() {
        for e in [
            Easing::Linear,
            Easing::EaseOutCubic,
            Easing::EaseInOutQuad,
            Easing::EaseOutBack,
        ] {
            assert!((e.apply(0.0)).abs() < 1e-12, "{e:?}");
            assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
        }
        assert!(Easing::EaseOutBack.apply(0.8) > 1.0);
    }

    #[test]
    fn tween_interpolates_and_finishes() {
        let t = Tween::new(1.0, 2.0, Time(0.0), 1.0, Easing::Linear);
        assert_eq!(t.value_at(Time(0.5)), 1.5);
        assert_eq!(t.value_at(Time(3.0)), 2.0);
        assert!(t.is_finished(Time(1.0)));

        let instant = Tween::new(1.0, 2.0, Time(0.0), 0.0, Easing::Linear);
        assert_eq!(instant.value_at(Time(0.0)), 2.0);
    }

    #[test]
    fn starting_on_busy_key_cancels_previous() {
        let mut tweens = Tweens::new();
        assert!(!tweens.start(Key::A, Tween::new(0.0, 1.0, Time(0.0), 1.0, Easing::Linear)));
        assert!(tweens.start(Key::A, Tween::new(5.0, 6.0, Time(0.0), 1.0, Easing::Linear)));
        assert_eq!(tweens.len(), 1);

        let step = tweens.advance(Time(0.5));
        assert_eq!(step.values, vec![(Key::A, 5.5)]);
    }

    #[test]
    fn advance_retires_finished_tweens() {
        let mut tweens = Tweens::new();
        tweens.start(Key::A, Tween::new(0.0, 1.0, Time(0.0), 0.5, Easing::Linear));
        tweens.start(Key::B, Tween::new(0.0, 1.0, Time(0.0), 2.0, Easing::Linear));

        let step = tweens.advance(Time(1.0));
        assert_eq!(step.values, vec![(Key::A, 1.0), (Key::B, 0.5)]);
        assert_eq!(step.finished, vec![Key::A]);
        assert!(!tweens.is_active(Key::A));
        assert!(tweens.is_active(Key::B));

        assert!(tweens.cancel(Key::B));
        assert!(tweens.is_empty());
    }
}
