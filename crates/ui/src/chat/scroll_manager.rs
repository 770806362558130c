use gpui::{Pixels, ScrollHandle, point, px};

/// Near-bottom distance used to resume follow mode deterministically.
const AUTO_FOLLOW_RESUME_THRESHOLD: Pixels = px(24.);
/// Small delta used to ignore floating-point scroll jitter.
const SCROLL_DELTA_EPSILON: f32 = 1.0;

/// One observation of the transcript scroll position.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollSample {
    offset: f32,
    max_offset: f32,
}

impl ScrollSample {
    fn is_near_bottom(self) -> bool {
        if self.max_offset <= 0. {
            return true;
        }

        // GPUI uses negative Y offsets for scrolling down, so `offset + max` approaches 0 at tail.
        (self.offset + self.max_offset).abs() <= f32::from(AUTO_FOLLOW_RESUME_THRESHOLD)
    }
}

/// Keeps the transcript pinned to the streaming answer unless the reader scrolls away.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
    pending_scroll_to_bottom: bool,
    follow_bottom: bool,
    last: ScrollSample,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
            pending_scroll_to_bottom: false,
            follow_bottom: true,
            last: ScrollSample {
                offset: 0.,
                max_offset: 0.,
            },
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    pub fn request_scroll_to_bottom_if_following(&mut self) {
        if self.follow_bottom || self.last.is_near_bottom() {
            self.pending_scroll_to_bottom = true;
        }
    }

    pub fn reset(&mut self) {
        self.last = ScrollSample {
            offset: 0.,
            max_offset: 0.,
        };
        self.follow_bottom = true;
        self.pending_scroll_to_bottom = true;
    }

    pub fn update_follow_state(&mut self) {
        let current = ScrollSample {
            offset: f32::from(self.scroll_handle.offset().y),
            max_offset: f32::from(self.scroll_handle.max_offset().height),
        };
        self.follow_bottom = next_follow_state(
            self.follow_bottom,
            self.pending_scroll_to_bottom,
            self.last,
            current,
        );
        self.last = current;
    }

    pub fn apply_pending_scroll(&mut self) -> bool {
        let should_scroll = self.follow_bottom || self.pending_scroll_to_bottom;

        if should_scroll {
            let max_offset = self.scroll_handle.max_offset().height;
            let current_x = self.scroll_handle.offset().x;
            let target_y = if max_offset > Pixels::ZERO {
                -max_offset
            } else {
                Pixels::ZERO
            };
            self.scroll_handle.set_offset(point(current_x, target_y));
        }

        self.pending_scroll_to_bottom = false;
        should_scroll
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

fn next_follow_state(
    following: bool,
    pending_scroll: bool,
    last: ScrollSample,
    current: ScrollSample,
) -> bool {
    let offset_delta = current.offset - last.offset;
    let content_size_changed = (current.max_offset - last.max_offset).abs() > SCROLL_DELTA_EPSILON;
    let user_scrolled_up = offset_delta > SCROLL_DELTA_EPSILON && !content_size_changed;
    let user_scrolled_down = offset_delta < -SCROLL_DELTA_EPSILON && !content_size_changed;

    if pending_scroll || (content_size_changed && last.is_near_bottom()) {
        true
    } else if following {
        // Pause only when the reader manually scrolls away from the tail.
        !user_scrolled_up
    } else {
        user_scrolled_down && current.is_near_bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(offset: f32, max_offset: f32) -> ScrollSample {
        ScrollSample { offset, max_offset }
    }

    #[test]
    fn scrolling_up_pauses_follow_mode() {
        let following = next_follow_state(true, false, sample(-400., 400.), sample(-200., 400.));
        assert!(!following);
    }

    #[test]
    fn growing_content_at_tail_keeps_following() {
        let following = next_follow_state(false, false, sample(-400., 400.), sample(-400., 520.));
        assert!(following);
    }

    #[test]
    fn returning_to_tail_resumes_follow_mode() {
        let paused = next_follow_state(false, false, sample(-200., 400.), sample(-300., 400.));
        assert!(!paused);

        let resumed = next_follow_state(false, false, sample(-300., 400.), sample(-390., 400.));
        assert!(resumed);
    }

    #[test]
    fn pending_request_forces_follow_mode() {
        let following = next_follow_state(false, true, sample(-100., 400.), sample(0., 400.));
        assert!(following);
    }
}
