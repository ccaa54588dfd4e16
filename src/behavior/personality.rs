use super::PounceState;

/// Temperament derived from a creature's girdle count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Personality {
    /// Few legs: charges straight in and gets bolder with aggression.
    pub brute: bool,
    /// 0 for brutes, rising to 1 for eight or more girdles.
    pub sneaky: f32,
    /// Circles the pointer instead of lunging at it.
    pub anaconda: bool,
}

impl Personality {
    pub fn from_girdles(girdles: u32) -> Self {
        let sneaky = if girdles >= 8 {
            1.0
        } else {
            ((girdles as f32 - 4.0) / 4.0).max(0.0)
        };
        Self {
            brute: girdles <= 4,
            sneaky,
            anaconda: girdles >= 8,
        }
    }
}

/// Multipliers on the body's forward and rotational acceleration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub forward: f32,
    pub turn: f32,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            forward: 1.0,
            turn: 1.0,
        }
    }
}

impl Gains {
    pub fn select(
        state: PounceState,
        pouncing: bool,
        coiling: bool,
        personality: &Personality,
        aggression: f32,
    ) -> Self {
        let a = aggression;
        let k = personality.sneaky;
        let brute = personality.brute;

        let forward = if coiling {
            0.3
        } else {
            match state {
                PounceState::Wrapping => 1.8 + a * 0.3,
                PounceState::Attacking => 4.0 + a,
                PounceState::Approaching if brute => 2.5 + a,
                PounceState::Approaching => 2.0 + a * 0.5,
                PounceState::None if pouncing => 2.0,
                PounceState::None if brute => 0.8 + a * 0.3,
                PounceState::None => 0.7 + a * 0.2 * k,
            }
        };

        let turn = match state {
            PounceState::Wrapping => 1.5 * (1.0 + a * 0.3),
            PounceState::Attacking => 3.0 * (1.0 + a * 0.5),
            PounceState::Approaching => (if brute { 2.5 } else { 2.0 }) * (1.0 + a * 0.3),
            PounceState::None if pouncing => 2.0 * (1.0 + a * 0.3),
            PounceState::None if coiling => 0.6,
            PounceState::None if brute => 1.0 + a * 0.4,
            PounceState::None => 0.9 + a * 0.3 * k,
        };

        Self { forward, turn }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(2, true, 0.0, false)]
    #[case(4, true, 0.0, false)]
    #[case(6, false, 0.5, false)]
    #[case(8, false, 1.0, true)]
    #[case(12, false, 1.0, true)]
    fn personality_from_girdles(
        #[case] girdles: u32,
        #[case] brute: bool,
        #[case] sneaky: f32,
        #[case] anaconda: bool,
    ) {
        let p = Personality::from_girdles(girdles);
        assert_eq!(p.brute, brute);
        assert_relative_eq!(p.sneaky, sneaky);
        assert_eq!(p.anaconda, anaconda);
    }

    #[test]
    fn coiling_slows_the_body() {
        let p = Personality::from_girdles(2);
        let gains = Gains::select(PounceState::None, false, true, &p, 1.0);
        assert_relative_eq!(gains.forward, 0.3);
        assert_relative_eq!(gains.turn, 0.6);
    }

    #[test]
    fn attacking_outpaces_stalking() {
        let p = Personality::from_girdles(6);
        let stalk = Gains::select(PounceState::None, false, false, &p, 0.5);
        let attack = Gains::select(PounceState::Attacking, true, false, &p, 0.5);
        assert_relative_eq!(attack.forward, 4.5, epsilon = 1e-6);
        assert!(attack.forward > stalk.forward);
        assert!(attack.turn > stalk.turn);
    }

    #[test]
    fn brutes_approach_harder() {
        let brute = Personality::from_girdles(2);
        let sneak = Personality::from_girdles(10);
        let a = Gains::select(PounceState::Approaching, true, false, &brute, 1.0);
        let b = Gains::select(PounceState::Approaching, true, false, &sneak, 1.0);
        assert_relative_eq!(a.forward, 3.5, epsilon = 1e-6);
        assert_relative_eq!(b.forward, 2.5, epsilon = 1e-6);
    }
}
