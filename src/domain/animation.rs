/// Time-based interpolation driving all smooth motion: the player's
/// position and facing, crate slides, and the screen fade.
///
/// An animation is created once per animated quantity and restarted in
/// place on every event, never recreated. `start_to` shifts `start` to
/// the previous `end` so consecutive runs stay continuous;
/// `restart_from_zero` snaps `start` back to the payload's zero value
/// instead (used by the fade overlay).
///
/// The progress curve is the cubic ease `3t² − 2t³` for every payload.

/// 2D vector in grid coordinates.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Nearest integer grid cell.
    pub fn round(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// A payload an `Animation` can blend: either a `Vec2` or a plain scalar.
pub trait Interpolate: Copy {
    const ZERO: Self;
    fn lerp(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    const ZERO: Self = 0.0;
    fn lerp(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolate for Vec2 {
    const ZERO: Self = Vec2 { x: 0.0, y: 0.0 };
    fn lerp(start: Self, end: Self, t: f32) -> Self {
        Vec2 {
            x: f32::lerp(start.x, end.x, t),
            y: f32::lerp(start.y, end.y, t),
        }
    }
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Generic interpolator. `t` runs 0 → 1 over `duration` seconds;
/// the animation is active exactly while `t < 1`.
#[derive(Clone, Copy, Debug)]
pub struct Animation<P: Interpolate> {
    t: f32,
    pub duration: f32,
    pub start: P,
    pub end: P,
}

pub type VectorAnim = Animation<Vec2>;
pub type ScalarAnim = Animation<f32>;

impl<P: Interpolate> Animation<P> {
    /// A finished animation resting at `value` (start == end == value).
    pub fn parked(value: P, duration: f32) -> Self {
        Animation { t: 1.0, duration, start: value, end: value }
    }

    pub fn active(&self) -> bool {
        self.t < 1.0
    }

    /// Restart toward `target`, carrying the previous endpoint over as
    /// the new starting point.
    pub fn start_to(&mut self, target: P) {
        self.t = 0.0;
        self.start = self.end;
        self.end = target;
    }

    /// Restart toward `target` from the payload's zero value.
    pub fn restart_from_zero(&mut self, target: P) {
        self.t = 0.0;
        self.start = P::ZERO;
        self.end = target;
    }

    /// Advance by `dt` seconds. Finished animations stay put.
    pub fn update(&mut self, dt: f32) {
        if self.t < 1.0 {
            self.t = (self.t + dt / self.duration).min(1.0);
        }
    }

    /// Current value: the smoothstep blend of `start → end` at progress `t`.
    pub fn value(&self) -> P {
        P::lerp(self.start, self.end, smoothstep(self.t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parked_animation_is_inactive() {
        let a = VectorAnim::parked(Vec2::new(3.0, 4.0), 0.2);
        assert!(!a.active());
        assert_eq!(a.value(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn endpoints_are_exact() {
        let mut a = ScalarAnim::parked(0.0, 1.0);
        a.start_to(90.0);
        assert!(a.active());
        assert_eq!(a.value(), 0.0); // t = 0 → start

        a.update(10.0); // overshoot clamps to t = 1
        assert!(!a.active());
        assert_eq!(a.value(), 90.0); // t = 1 → end
    }

    #[test]
    fn value_is_monotonic_under_smoothstep() {
        let mut a = ScalarAnim::parked(0.0, 1.0);
        a.start_to(1.0);
        let mut prev = a.value();
        for _ in 0..50 {
            a.update(0.02);
            let v = a.value();
            assert!(v >= prev, "value went backwards: {v} < {prev}");
            prev = v;
        }
        assert_eq!(prev, 1.0);
    }

    #[test]
    fn start_to_chains_from_previous_end() {
        let mut a = VectorAnim::parked(Vec2::new(1.0, 1.0), 0.1);
        a.start_to(Vec2::new(2.0, 1.0));
        a.update(1.0);
        a.start_to(Vec2::new(2.0, 2.0));
        // new run picks up exactly where the last one ended
        assert_eq!(a.start, Vec2::new(2.0, 1.0));
        assert_eq!(a.value(), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn restart_from_zero_snaps_start() {
        let mut a = ScalarAnim::parked(0.7, 0.5);
        a.restart_from_zero(1.0);
        assert_eq!(a.start, 0.0);
        assert_eq!(a.value(), 0.0);
    }
}
