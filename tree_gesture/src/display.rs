//! The display state machine.
//!
//! [`Display`] pairs the current layout with the focused-photo index, and
//! every transition is a pure function returning the next value.  The focus
//! index is an output of the transition taken (Mealy style): it is set by
//! Pinch and cleared by anything that leaves Focus.
//!
//! Invariant: `focus.is_some()` exactly when `state == Focus`, and the index
//! is always valid for the current photo count.

use tracing::debug;

use crate::classifier::Gesture;

/// Which layout the scene is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayState {
    #[default]
    Tree,
    Scatter,
    Focus,
}

impl DisplayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tree    => "tree",
            Self::Scatter => "scatter",
            Self::Focus   => "focus",
        }
    }
}

/// Display state plus the focused photo, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Display {
    state: DisplayState,
    focus: Option<usize>,
}

impl Display {
    /// Initial display: the tree, nothing focused.
    pub fn new() -> Self {
        Display::default()
    }

    pub fn state(&self) -> DisplayState { self.state }

    pub fn focus(&self) -> Option<usize> { self.focus }

    fn scatter() -> Self {
        Display { state: DisplayState::Scatter, focus: None }
    }

    /// Transition on one gesture, given how many photos exist.
    ///
    /// Total over every input; gestures with no rule for the current state
    /// leave the display unchanged.
    pub fn next(self, gesture: Gesture, photo_count: usize) -> Display {
        let next = match (gesture, self.state) {
            (Gesture::Fist, DisplayState::Tree) => self,
            (Gesture::Fist, _) => Display { state: DisplayState::Tree, focus: None },

            (Gesture::Open, DisplayState::Scatter) => self,
            (Gesture::Open, _) => Display::scatter(),

            // Cycling over an empty collection is undefined; stay put.
            (Gesture::Pinch, DisplayState::Scatter) if photo_count == 0 => self,
            (Gesture::Pinch, DisplayState::Scatter) => {
                let focus = match self.focus {
                    None    => 0,
                    Some(i) => (i + 1) % photo_count,
                };
                Display { state: DisplayState::Focus, focus: Some(focus) }
            }

            _ => self,
        };

        if next != self {
            debug!(
                "display {} -> {} on {} (focus {:?})",
                self.state.as_str(), next.state.as_str(), gesture.as_str(), next.focus
            );
        }
        next
    }

    /// Account for the photo at `removed` being deleted, leaving `remaining`.
    ///
    /// Removing the focused photo drops back to Scatter.  Removing an earlier
    /// photo shifts the index down so it still names the same photo.
    pub fn photo_removed(self, removed: usize, remaining: usize) -> Display {
        let next = match self.focus {
            Some(f) if f == removed => Display::scatter(),
            Some(f) if removed < f  => Display { focus: Some(f - 1), ..self },
            _ => self,
        };
        match next.focus {
            Some(f) if f >= remaining => Display::scatter(),
            _ => next,
        }
    }

    /// Short label for the status bar.
    pub fn describe(&self) -> String {
        match self.focus {
            Some(i) => format!("FOCUS #{}", i + 1),
            None    => self.state.as_str().to_uppercase(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const GESTURES: [Gesture; 4] = [Gesture::None, Gesture::Fist, Gesture::Open, Gesture::Pinch];

    fn focus(i: usize) -> Display {
        Display { state: DisplayState::Focus, focus: Some(i) }
    }

    /// Every display reachable by gestures from the start, for `n` photos.
    fn reachable(n: usize) -> Vec<Display> {
        let mut seen = vec![Display::new()];
        let mut i = 0;
        while i < seen.len() {
            for g in GESTURES {
                let d = seen[i].next(g, n);
                if !seen.contains(&d) { seen.push(d); }
            }
            i += 1;
        }
        seen
    }

    fn all_displays(n: usize) -> Vec<Display> {
        let mut v = vec![Display::new(), Display::scatter()];
        v.extend((0..n).map(focus));
        v
    }

    #[test]
    fn starts_in_tree() {
        let d = Display::new();
        assert_eq!(d.state(), DisplayState::Tree);
        assert_eq!(d.focus(), None);
    }

    #[test]
    fn next_preserves_invariant() {
        for n in 0..5 {
            for d in all_displays(n) {
                for g in GESTURES {
                    let next = d.next(g, n);
                    assert_eq!(next.focus.is_some(), next.state == DisplayState::Focus);
                    if let Some(f) = next.focus { assert!(f < n); }
                    // Deterministic
                    assert_eq!(next, d.next(g, n));
                }
            }
        }
    }

    #[test]
    fn fist_always_yields_tree() {
        for n in 0..4 {
            for d in all_displays(n) {
                assert_eq!(d.next(Gesture::Fist, n), Display::new());
            }
        }
    }

    #[test]
    fn open_from_tree_scatters() {
        let d = Display::new().next(Gesture::Open, 3);
        assert_eq!(d.state(), DisplayState::Scatter);
        assert_eq!(d.focus(), None);
    }

    #[test]
    fn open_from_focus_clears_focus() {
        let d = focus(2).next(Gesture::Open, 3);
        assert_eq!(d, Display::scatter());
    }

    #[test]
    fn open_in_scatter_is_noop() {
        let d = Display::scatter();
        assert_eq!(d.next(Gesture::Open, 3), d);
    }

    #[test]
    fn pinch_from_scatter_focuses_first() {
        let d = Display::scatter().next(Gesture::Pinch, 3);
        assert_eq!(d, focus(0));
    }

    #[test]
    fn repeated_pinch_does_not_advance() {
        let once = Display::scatter().next(Gesture::Pinch, 3);
        let twice = once.next(Gesture::Pinch, 3).next(Gesture::Pinch, 3);
        assert_eq!(twice, focus(0));
    }

    #[test]
    fn pinch_advances_cyclically_from_scatter_with_focus() {
        // Only reachable by direct construction, but the rule is defined.
        let d = Display { state: DisplayState::Scatter, focus: Some(2) };
        assert_eq!(d.next(Gesture::Pinch, 3), focus(0));
        let d = Display { state: DisplayState::Scatter, focus: Some(0) };
        assert_eq!(d.next(Gesture::Pinch, 3), focus(1));
    }

    #[test]
    fn pinch_elsewhere_is_noop() {
        assert_eq!(Display::new().next(Gesture::Pinch, 3), Display::new());
        assert_eq!(focus(1).next(Gesture::Pinch, 3), focus(1));
    }

    #[test]
    fn pinch_without_photos_is_noop() {
        assert_eq!(Display::scatter().next(Gesture::Pinch, 0), Display::scatter());
    }

    #[test]
    fn none_is_noop() {
        for d in all_displays(3) {
            assert_eq!(d.next(Gesture::None, 3), d);
        }
    }

    #[test]
    fn reachable_states_cover_all_three() {
        let r = reachable(3);
        assert!(r.contains(&Display::new()));
        assert!(r.contains(&Display::scatter()));
        assert!(r.contains(&focus(0)));
    }

    #[test]
    fn removing_focused_photo_scatters() {
        assert_eq!(focus(1).photo_removed(1, 2), Display::scatter());
    }

    #[test]
    fn removing_earlier_photo_remaps_focus() {
        assert_eq!(focus(2).photo_removed(0, 3), focus(1));
    }

    #[test]
    fn removing_later_photo_keeps_focus() {
        assert_eq!(focus(1).photo_removed(3, 3), focus(1));
    }

    #[test]
    fn removal_outside_focus_is_noop() {
        assert_eq!(Display::new().photo_removed(0, 4), Display::new());
        assert_eq!(Display::scatter().photo_removed(2, 4), Display::scatter());
    }

    #[test]
    fn stale_focus_is_dropped() {
        // Focus beyond the remaining count can't survive.
        assert_eq!(focus(4).photo_removed(5, 3), Display::scatter());
    }

    #[test]
    fn describe_labels() {
        assert_eq!(Display::new().describe(), "TREE");
        assert_eq!(Display::scatter().describe(), "SCATTER");
        assert_eq!(focus(0).describe(), "FOCUS #1");
    }
}
