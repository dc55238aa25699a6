//! Per-instance playback steps, one per [`WrapMode`].
//!
//! Each step takes the [`Playhead`] of one instance, the active clip and the
//! delta time already selected for that instance (scaled or unscaled), and
//! mutates the playhead in place. The returned value is the frame the render
//! target must now show, or `None` when nothing needs drawing.
//!
//! Frame numbers are computed as `elapsed / frame_duration` truncated toward
//! zero, with `frame_duration = 1 / frame_rate`. All steps assume the clip has
//! at least one frame; the tick driver filters out empty clips.

use crate::resources::animationtable::AnimationState;
use crate::resources::clipstore::{FrameClip, WrapMode};

/// Mutable playback position of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Playhead {
    pub state: AnimationState,
    pub frame_index: usize,
    pub elapsed_time: f32,
    pub backward: bool,
}

#[inline]
fn frame_at(elapsed_time: f32, frame_duration: f32) -> usize {
    (elapsed_time / frame_duration) as usize
}

#[inline]
fn show_if_changed(head: &mut Playhead, index: usize) -> Option<usize> {
    if index != head.frame_index {
        head.frame_index = index;
        Some(index)
    } else {
        None
    }
}

/// Advance `head` according to the clip's wrap mode.
pub fn advance(head: &mut Playhead, clip: &FrameClip, dt: f32) -> Option<usize> {
    match clip.wrap_mode() {
        WrapMode::Default | WrapMode::Once => step_once(head, clip, dt),
        WrapMode::ClampForever => step_clamp_forever(head, clip, dt),
        WrapMode::Loop => step_loop(head, clip, dt),
        WrapMode::PingPong => step_ping_pong(head, clip, dt),
    }
}

/// Play to the end, then stop and rewind to frame 0.
///
/// The rewind always redraws frame 0, even if it was already showing.
pub fn step_once(head: &mut Playhead, clip: &FrameClip, dt: f32) -> Option<usize> {
    head.elapsed_time += dt;
    let index = frame_at(head.elapsed_time, clip.frame_duration());
    if index >= clip.frame_count() {
        head.state = AnimationState::Stopped;
        head.frame_index = 0;
        head.elapsed_time = 0.0;
        Some(0)
    } else {
        show_if_changed(head, index)
    }
}

/// Play to the end, then pause. The last frame drawn before the overflow
/// stays on screen and elapsed time is left past the end.
pub fn step_clamp_forever(head: &mut Playhead, clip: &FrameClip, dt: f32) -> Option<usize> {
    head.elapsed_time += dt;
    let index = frame_at(head.elapsed_time, clip.frame_duration());
    if index >= clip.frame_count() {
        head.state = AnimationState::Paused;
        None
    } else {
        show_if_changed(head, index)
    }
}

/// Elapsed time after adding `dt` and wrapping at the clip duration.
///
/// Shared with the tooling [`LoopClipPlayer`](crate::preview::LoopClipPlayer).
#[inline]
pub fn loop_elapsed(elapsed_time: f32, dt: f32, clip: &FrameClip) -> f32 {
    (elapsed_time + dt) % clip.duration()
}

/// Frame shown at `elapsed_time` within a looping clip.
///
/// Rounding can put a time just under the duration on the frame past the
/// end; that case shows the last frame.
#[inline]
pub fn loop_frame(elapsed_time: f32, clip: &FrameClip) -> usize {
    frame_at(elapsed_time, clip.frame_duration()).min(clip.frame_count() - 1)
}

/// Wrap around to the start after the last frame.
pub fn step_loop(head: &mut Playhead, clip: &FrameClip, dt: f32) -> Option<usize> {
    head.elapsed_time = loop_elapsed(head.elapsed_time, dt, clip);
    let index = loop_frame(head.elapsed_time, clip);
    show_if_changed(head, index)
}

/// Bounce between the ends of the clip.
///
/// The turn-around checks compare against the same literal the time was
/// clamped with (`0.0` going backward, the clip duration going forward), so
/// they hit exactly regardless of accumulated rounding. After turning, time
/// restarts one frame inside the clip so the end frame is not held twice.
pub fn step_ping_pong(head: &mut Playhead, clip: &FrameClip, dt: f32) -> Option<usize> {
    let frame_duration = clip.frame_duration();
    if head.backward {
        head.elapsed_time = f32::max(0.0, head.elapsed_time - dt);
        if head.elapsed_time == 0.0 {
            head.backward = false;
            head.elapsed_time = frame_duration;
        }
    } else {
        let max_time = clip.duration();
        head.elapsed_time = f32::min(max_time, head.elapsed_time + dt);
        if head.elapsed_time == max_time {
            head.backward = true;
            head.elapsed_time = (clip.frame_count() - 1) as f32 * frame_duration;
        }
    }
    let index = frame_at(head.elapsed_time, frame_duration).min(clip.frame_count() - 1);
    show_if_changed(head, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(frame_rate: f32, frames: usize, wrap_mode: WrapMode) -> FrameClip {
        let keys: Vec<String> = (0..frames).map(|i| format!("f{i}")).collect();
        FrameClip::from_keys("test", frame_rate, wrap_mode, keys).unwrap()
    }

    fn playing() -> Playhead {
        Playhead {
            state: AnimationState::Playing,
            ..Default::default()
        }
    }

    // ==================== ONCE ====================

    #[test]
    fn test_once_stops_and_rewinds_at_end() {
        let c = clip(1.0, 3, WrapMode::Once);
        let mut head = playing();
        assert_eq!(step_once(&mut head, &c, 1.0), Some(1));
        assert_eq!(step_once(&mut head, &c, 1.0), Some(2));
        assert_eq!(head.state, AnimationState::Playing);
        assert_eq!(step_once(&mut head, &c, 1.0), Some(0));
        assert_eq!(head.state, AnimationState::Stopped);
        assert_eq!(head.frame_index, 0);
        assert_eq!(head.elapsed_time, 0.0);
    }

    #[test]
    fn test_once_only_redraws_on_frame_change() {
        let c = clip(1.0, 3, WrapMode::Once);
        let mut head = playing();
        let draws: Vec<Option<usize>> = (0..6).map(|_| step_once(&mut head, &c, 0.5)).collect();
        assert_eq!(draws, vec![None, Some(1), None, Some(2), None, Some(0)]);
        assert_eq!(head.state, AnimationState::Stopped);
    }

    #[test]
    fn test_default_wrap_mode_behaves_like_once() {
        let c = clip(1.0, 2, WrapMode::Default);
        let mut head = playing();
        assert_eq!(advance(&mut head, &c, 1.0), Some(1));
        assert_eq!(advance(&mut head, &c, 1.0), Some(0));
        assert_eq!(head.state, AnimationState::Stopped);
    }

    // ==================== CLAMP FOREVER ====================

    #[test]
    fn test_clamp_forever_pauses_on_last_drawn_frame() {
        let c = clip(1.0, 3, WrapMode::ClampForever);
        let mut head = playing();
        assert_eq!(step_clamp_forever(&mut head, &c, 1.0), Some(1));
        assert_eq!(step_clamp_forever(&mut head, &c, 1.0), Some(2));
        assert_eq!(step_clamp_forever(&mut head, &c, 1.0), None);
        assert_eq!(head.state, AnimationState::Paused);
        assert_eq!(head.frame_index, 2);
        assert_eq!(head.elapsed_time, 3.0);
    }

    #[test]
    fn test_clamp_forever_large_step_skips_final_frame() {
        // A step that jumps from frame 1 straight past the end never draws
        // frame 2: the instance freezes on whatever was last drawn.
        let c = clip(1.0, 3, WrapMode::ClampForever);
        let mut head = playing();
        assert_eq!(step_clamp_forever(&mut head, &c, 1.5), Some(1));
        assert_eq!(step_clamp_forever(&mut head, &c, 1.5), None);
        assert_eq!(head.state, AnimationState::Paused);
        assert_eq!(head.frame_index, 1);
    }

    // ==================== LOOP ====================

    #[test]
    fn test_loop_wraps_exactly() {
        let c = clip(4.0, 4, WrapMode::Loop);
        let mut head = playing();
        let frames: Vec<Option<usize>> = (0..6).map(|_| step_loop(&mut head, &c, 0.25)).collect();
        assert_eq!(
            frames,
            vec![Some(1), Some(2), Some(3), Some(0), Some(1), Some(2)]
        );
        assert_eq!(head.elapsed_time, 0.5);
    }

    #[test]
    fn test_loop_ten_fps_sequence() {
        let c = clip(10.0, 5, WrapMode::Loop);
        let mut head = playing();
        let mut frames = vec![head.frame_index];
        for _ in 0..5 {
            step_loop(&mut head, &c, 0.12);
            frames.push(head.frame_index);
        }
        assert_eq!(frames, vec![0, 1, 2, 3, 4, 0]);
        for _ in 0..100 {
            step_loop(&mut head, &c, 0.12);
            assert!(head.elapsed_time >= 0.0 && head.elapsed_time < c.duration());
            assert!(head.frame_index < 5);
        }
    }

    #[test]
    fn test_loop_keeps_playing() {
        let c = clip(2.0, 3, WrapMode::Loop);
        let mut head = playing();
        for _ in 0..20 {
            step_loop(&mut head, &c, 0.4);
        }
        assert_eq!(head.state, AnimationState::Playing);
    }

    // ==================== PING PONG ====================

    #[test]
    fn test_ping_pong_whole_frame_steps() {
        let c = clip(1.0, 3, WrapMode::PingPong);
        let mut head = playing();
        let mut seen = Vec::new();
        for _ in 0..5 {
            step_ping_pong(&mut head, &c, 1.0);
            seen.push((head.frame_index, head.elapsed_time, head.backward));
        }
        assert_eq!(
            seen,
            vec![
                (1, 1.0, false),
                (2, 2.0, false),
                // Reached 3.0 == max: turn around at (3 - 1) / 1.
                (2, 2.0, true),
                (1, 1.0, true),
                // Reached 0.0: turn around at 1 / 1.
                (1, 1.0, false),
            ]
        );
    }

    #[test]
    fn test_ping_pong_half_frame_steps() {
        let c = clip(1.0, 3, WrapMode::PingPong);
        let mut head = playing();
        let draws: Vec<Option<usize>> =
            (0..10).map(|_| step_ping_pong(&mut head, &c, 0.5)).collect();
        assert_eq!(
            draws,
            vec![
                None,
                Some(1),
                None,
                Some(2),
                None,
                None,
                Some(1),
                None,
                Some(0),
                Some(1),
            ]
        );
        assert!(!head.backward);
        assert_eq!(head.elapsed_time, 1.0);
    }

    #[test]
    fn test_ping_pong_turns_around_despite_rounding() {
        let c = clip(10.0, 4, WrapMode::PingPong);
        let mut head = playing();
        let mut turns_forward = 0;
        let mut turns_backward = 0;
        let mut was_backward = head.backward;
        for _ in 0..200 {
            step_ping_pong(&mut head, &c, 0.05);
            assert!(head.frame_index < 4);
            assert!(head.elapsed_time >= 0.0 && head.elapsed_time <= c.duration());
            if head.backward != was_backward {
                if head.backward {
                    turns_backward += 1;
                } else {
                    turns_forward += 1;
                }
                was_backward = head.backward;
            }
        }
        assert!(turns_backward >= 5);
        assert!(turns_forward >= 5);
    }

    #[test]
    fn test_single_frame_clips_stay_on_frame_zero() {
        for mode in [WrapMode::Loop, WrapMode::PingPong] {
            let c = clip(5.0, 1, mode);
            let mut head = playing();
            for _ in 0..10 {
                advance(&mut head, &c, 0.07);
                assert_eq!(head.frame_index, 0, "{mode:?}");
            }
        }
    }
}
