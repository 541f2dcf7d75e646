use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::render::{Primitive, VisualState};

/// Outcome of routing a pointer position to the hover tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoverTransition {
    Unchanged,
    Entered { index: usize },
    Switched { from: usize, to: usize },
    Left { index: usize },
}

impl HoverTransition {
    #[must_use]
    pub fn left_index(self) -> Option<usize> {
        match self {
            Self::Left { index } | Self::Switched { from: index, .. } => Some(index),
            Self::Unchanged | Self::Entered { .. } => None,
        }
    }

    #[must_use]
    pub fn entered_index(self) -> Option<usize> {
        match self {
            Self::Entered { index } | Self::Switched { to: index, .. } => Some(index),
            Self::Unchanged | Self::Left { .. } => None,
        }
    }
}

/// Tracks the single hovered primitive of one chart's series layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverTracker {
    hovered: Option<usize>,
}

impl HoverTracker {
    #[must_use]
    pub fn hovered(self) -> Option<usize> {
        self.hovered
    }

    /// Moves hover to `target`, reverting the previously hovered primitive.
    pub fn update(&mut self, primitives: &mut [Primitive], target: Option<usize>) -> HoverTransition {
        if self.hovered == target {
            return HoverTransition::Unchanged;
        }

        let previous = self.hovered.take();
        if let Some(index) = previous {
            set_state(primitives, index, VisualState::Default);
        }
        if let Some(index) = target {
            if set_state(primitives, index, VisualState::Hovered) {
                self.hovered = Some(index);
            }
        }

        let transition = match (previous, self.hovered) {
            (None, Some(index)) => HoverTransition::Entered { index },
            (Some(from), Some(to)) => HoverTransition::Switched { from, to },
            (Some(index), None) => HoverTransition::Left { index },
            (None, None) => HoverTransition::Unchanged,
        };
        trace!(?transition, "hover transition");
        transition
    }

    pub fn leave(&mut self, primitives: &mut [Primitive]) -> HoverTransition {
        self.update(primitives, None)
    }

    /// Forgets hover without touching primitives, used after a rebuild
    /// replaces them wholesale.
    pub fn reset(&mut self) {
        self.hovered = None;
    }
}

fn set_state(primitives: &mut [Primitive], index: usize, state: VisualState) -> bool {
    match primitives.get_mut(index) {
        Some(primitive) if primitive.is_interactive() => {
            primitive.state = state;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{HoverTracker, HoverTransition};
    use crate::core::DataPoint;
    use crate::render::{Datum, Primitive, VisualState};

    fn cells(count: usize) -> Vec<Primitive> {
        (0..count)
            .map(|index| {
                Primitive::rect(index as f64 * 10.0, 0.0, 10.0, 10.0)
                    .with_datum(Datum::new(index, DataPoint::new()))
            })
            .collect()
    }

    #[test]
    fn switching_reverts_previous_primitive() {
        let mut primitives = cells(2);
        let mut tracker = HoverTracker::default();

        assert_eq!(
            tracker.update(&mut primitives, Some(0)),
            HoverTransition::Entered { index: 0 }
        );
        assert_eq!(
            tracker.update(&mut primitives, Some(1)),
            HoverTransition::Switched { from: 0, to: 1 }
        );
        assert_eq!(primitives[0].state, VisualState::Default);
        assert_eq!(primitives[1].state, VisualState::Hovered);

        assert_eq!(
            tracker.leave(&mut primitives),
            HoverTransition::Left { index: 1 }
        );
        assert!(primitives.iter().all(|p| p.state == VisualState::Default));
    }

    #[test]
    fn repeated_target_is_unchanged() {
        let mut primitives = cells(1);
        let mut tracker = HoverTracker::default();
        tracker.update(&mut primitives, Some(0));
        assert_eq!(
            tracker.update(&mut primitives, Some(0)),
            HoverTransition::Unchanged
        );
        assert_eq!(tracker.leave(&mut primitives), HoverTransition::Left { index: 0 });
        assert_eq!(tracker.leave(&mut primitives), HoverTransition::Unchanged);
    }
}
