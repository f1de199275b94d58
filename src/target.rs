use cgmath::{InnerSpace, Vector2};

pub struct Target {
    /// Position is in window pixel coordinates (origin top left)
    position: cgmath::Vector2<f32>,
    /// Current radius in pixels
    size: f32,
    /// True until the target reaches its full size, then it starts shrinking
    grow: bool,
}

impl Target {
    pub const MAX_SIZE: f32 = 30.0;
    pub const GROWTH_RATE: f32 = 0.2;

    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vector2::new(x, y),
            size: 0.0,
            grow: true,
        }
    }

    pub fn position(&self) -> Vector2<f32> {
        self.position
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn is_growing(&self) -> bool {
        self.grow
    }

    /// Advances the size animation by one tick.
    pub fn update(&mut self) {
        // Flip before stepping so the size never goes past MAX_SIZE
        if self.size + Self::GROWTH_RATE >= Self::MAX_SIZE {
            self.grow = false;
        }

        if self.grow {
            self.size += Self::GROWTH_RATE;
        } else {
            self.size -= Self::GROWTH_RATE;
        }
    }

    /// Returns true if the point lies inside or on the edge of the target.
    pub fn hit_test(&self, x: f32, y: f32) -> bool {
        (Vector2::new(x, y) - self.position).magnitude() <= self.size
    }

    /// True once the target has shrunk away. Only meaningful after at least
    /// one `update`: a freshly spawned target has size 0 and reports expired.
    pub fn is_expired(&self) -> bool {
        self.size <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grown(x: f32, y: f32, ticks: usize) -> Target {
        let mut target = Target::new(x, y);
        for _ in 0..ticks {
            target.update();
        }
        target
    }

    #[test]
    fn starts_empty_and_growing() {
        let target = Target::new(10.0, 20.0);
        assert_eq!(target.size(), 0.0);
        assert!(target.is_growing());
        assert_eq!(target.position(), Vector2::new(10.0, 20.0));
    }

    #[test]
    fn fresh_target_reads_as_expired_until_updated() {
        let mut target = Target::new(0.0, 0.0);
        assert!(target.is_expired());
        target.update();
        assert!(!target.is_expired());
    }

    #[test]
    fn grows_by_fixed_increment() {
        let target = grown(0.0, 0.0, 3);
        assert!((target.size() - 3.0 * Target::GROWTH_RATE).abs() < 1e-5);
        assert!(target.is_growing());
    }

    #[test]
    fn flips_once_at_threshold_then_shrinks_to_zero() {
        let mut target = Target::new(0.0, 0.0);
        let mut flips = 0;
        let mut was_growing = true;
        let mut ticks = 0;

        loop {
            let before = target.size();
            let flips_now = target.size() + Target::GROWTH_RATE >= Target::MAX_SIZE;
            target.update();
            ticks += 1;

            if was_growing && !target.is_growing() {
                flips += 1;
                assert!(flips_now, "flip happened before reaching the threshold");
            }
            if target.is_growing() {
                assert!(target.size() > before);
            } else {
                assert!(target.size() < before);
            }
            was_growing = target.is_growing();
            assert!(ticks < 1000, "target never expired");

            if target.is_expired() {
                break;
            }
        }

        assert_eq!(flips, 1);
        assert!(ticks > 1);
    }

    #[test]
    fn hit_test_inside_and_outside() {
        let target = grown(100.0, 100.0, 50);
        assert!(target.hit_test(100.0, 100.0));
        assert!(target.hit_test(105.0, 105.0));
        assert!(!target.hit_test(100.0, 111.0));
        assert!(!target.hit_test(0.0, 0.0));
    }

    #[test]
    fn hit_test_edge_counts_as_hit() {
        let target = grown(0.0, 0.0, 25);
        let radius = target.size();
        assert!(target.hit_test(radius, 0.0));
        assert!(target.hit_test(0.0, -radius));
    }

    #[test]
    fn fresh_target_only_hits_its_center() {
        let target = Target::new(50.0, 50.0);
        assert!(target.hit_test(50.0, 50.0));
        assert!(!target.hit_test(50.1, 50.0));
    }

    proptest! {
        #[test]
        fn size_never_exceeds_max(ticks in 0usize..400) {
            let mut target = Target::new(0.0, 0.0);
            for _ in 0..ticks {
                target.update();
                prop_assert!(target.size() <= Target::MAX_SIZE);
                if target.is_expired() {
                    break;
                }
            }
        }

        #[test]
        fn never_regrows_after_flip(ticks in 1usize..400) {
            let mut target = Target::new(0.0, 0.0);
            let mut flipped = false;
            for _ in 0..ticks {
                target.update();
                if flipped {
                    prop_assert!(!target.is_growing());
                }
                flipped |= !target.is_growing();
            }
        }
    }
}
