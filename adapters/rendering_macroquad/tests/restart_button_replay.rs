use dengue_patrol_rendering_macroquad::RestartLatch;

/// Feeds one button state per frame and records what the frame loop would see.
fn replay(presses: &[bool]) -> Vec<bool> {
    let mut latch = RestartLatch::default();
    let mut seen = Vec::with_capacity(presses.len() + 1);
    for &pressed in presses {
        seen.push(latch.take());
        if pressed {
            latch.press();
        }
    }
    seen.push(latch.take());
    seen
}

#[test]
fn presses_surface_on_the_following_frame_only() {
    let presses = [false, true, false, true, true, false];

    let seen = replay(&presses);

    assert_eq!(seen, vec![false, false, true, false, true, true, false]);
    assert_eq!(seen, replay(&presses));
}

#[test]
fn repeated_presses_in_one_frame_restart_once() {
    let mut latch = RestartLatch::default();
    latch.press();
    latch.press();

    assert!(latch.take());
    assert!(!latch.take());
}
