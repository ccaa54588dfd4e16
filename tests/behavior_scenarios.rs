use approx::assert_abs_diff_eq;
use followers::behavior::COIL_RADIUS;
use followers::{BehaviorController, Personality, PounceState, Vec2};

const FRAME_MS: f32 = 16.0;

fn jitter(frame: usize) -> Vec2 {
    let t = frame as f32 * 0.7;
    Vec2::new(t.cos(), t.sin()) * 8.0
}

#[test]
fn resting_pointer_starts_a_coil_once_idle_passes_threshold() {
    let pointer = Vec2::new(400.0, 300.0);
    let body = pointer;
    let mut behavior = BehaviorController::new(Personality::from_girdles(2), pointer);

    let mut coiled_at = None;
    for frame in 1..=82 {
        let plan = behavior.step(body, pointer + jitter(frame), FRAME_MS);
        assert_eq!(plan.pounce_state, PounceState::None);
        if plan.coiling && coiled_at.is_none() {
            coiled_at = Some(frame);
        }
        if frame < 76 {
            assert!(!plan.coiling, "coiled early on frame {frame}");
        }
    }
    // 76 frames of 16 ms is the first total above 1200 ms.
    assert_eq!(coiled_at, Some(76));
}

#[test]
fn coiling_orbits_the_pointer() {
    let pointer = Vec2::new(400.0, 300.0);
    let mut behavior = BehaviorController::new(Personality::from_girdles(4), pointer);
    let mut plan = behavior.step(pointer, pointer, FRAME_MS);
    for _ in 0..100 {
        plan = behavior.step(pointer, pointer, FRAME_MS);
    }
    assert!(plan.coiling);
    assert!((plan.target.distance(pointer) - 25.0).abs() < 1e-3);
    assert!((plan.gains.forward - 0.3).abs() < 1e-6);
}

#[test]
fn escaping_pointer_aborts_a_pounce_on_the_same_frame() {
    let body = Vec2::new(100.0, 300.0);
    let pointer = Vec2::new(400.0, 300.0);
    let mut behavior = BehaviorController::new(Personality::from_girdles(2), body);

    let mut approaching = false;
    for _ in 0..1000 {
        if behavior.step(body, pointer, FRAME_MS).pounce_state == PounceState::Approaching {
            approaching = true;
            break;
        }
    }
    assert!(approaching, "never started a pounce");
    assert!(behavior.has_pounced());

    let escaped = body + Vec2::new(400.0, 0.0);
    let plan = behavior.step(body, escaped, FRAME_MS);
    assert_eq!(plan.pounce_state, PounceState::None);
    assert!(!plan.pouncing);
    assert!(!behavior.has_pounced());
    assert_eq!(behavior.wrap_radius(), 25.0);
}

#[test]
fn close_approach_turns_brutes_into_attackers_and_anacondas_into_wrappers() {
    for (girdles, expected) in [(2, PounceState::Attacking), (10, PounceState::Wrapping)] {
        let body = Vec2::new(300.0, 300.0);
        let pointer = Vec2::new(400.0, 300.0);
        let mut behavior = BehaviorController::new(Personality::from_girdles(girdles), body);
        let mut seen = None;
        for _ in 0..1000 {
            let plan = behavior.step(body, pointer, FRAME_MS);
            if plan.pounce_state != PounceState::None {
                seen = Some(plan.pounce_state);
                break;
            }
        }
        assert_eq!(seen, Some(expected), "girdles {girdles}");
    }
}

fn strike(girdles: u32, state: PounceState) -> (BehaviorController, Vec2) {
    let body = Vec2::new(300.0, 300.0);
    let pointer = Vec2::new(400.0, 300.0);
    let mut behavior = BehaviorController::new(Personality::from_girdles(girdles), body);
    for _ in 0..1000 {
        if behavior.step(body, pointer, FRAME_MS).pounce_state == state {
            return (behavior, pointer);
        }
    }
    panic!("never reached {state:?}");
}

#[test]
fn brute_attack_ends_in_a_coil_on_the_pointer() {
    let (mut behavior, pointer) = strike(2, PounceState::Attacking);
    assert!(behavior.idle_time() > 300.0);

    let plan = behavior.step(pointer + Vec2::new(5.0, 0.0), pointer, FRAME_MS);
    assert_eq!(plan.pounce_state, PounceState::None);
    assert!(plan.coiling);
    assert!(!plan.pouncing);
    assert!(!behavior.has_pounced());
    assert_eq!(behavior.wrap_radius(), COIL_RADIUS);
}

#[test]
fn anaconda_keeps_wrapping_instead_of_coiling() {
    let (mut behavior, pointer) = strike(10, PounceState::Wrapping);
    for _ in 0..120 {
        let plan = behavior.step(pointer + Vec2::new(5.0, 0.0), pointer, FRAME_MS);
        assert_eq!(plan.pounce_state, PounceState::Wrapping);
        assert!(plan.pouncing);
        assert!(!plan.coiling);
        let orbit = plan.target.distance(pointer);
        assert!(orbit > COIL_RADIUS * 0.85 && orbit < COIL_RADIUS * 1.35, "orbit {orbit}");
    }
}

#[test]
fn coiling_resets_aggression_at_most_once_per_cooldown() {
    let pointer = Vec2::new(400.0, 300.0);
    let far = Vec2::new(100.0, 300.0);
    let mut behavior = BehaviorController::new(Personality::from_girdles(6), pointer);

    for _ in 0..100 {
        behavior.step(far, pointer, FRAME_MS);
    }
    assert!(behavior.aggression() > 0.5);
    assert!(behavior.idle_time() > 1200.0);

    behavior.step(pointer, pointer, FRAME_MS);
    assert_eq!(behavior.aggression(), 0.0);

    for _ in 0..10 {
        behavior.step(far, pointer, FRAME_MS);
    }
    let built = behavior.aggression();
    assert_abs_diff_eq!(built, 0.08, epsilon = 1e-4);

    // 176 ms after the last coil: too soon to reset again.
    behavior.step(pointer, pointer, FRAME_MS);
    assert_eq!(behavior.aggression(), built);

    for _ in 0..60 {
        behavior.step(pointer, pointer, FRAME_MS);
    }
    assert_eq!(behavior.aggression(), 0.0);
}
