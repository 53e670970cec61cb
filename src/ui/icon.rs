use crate::core::constants::{
    BASE_LAYER_PRIORITY, CLUSTER_BASE_SIZE, CLUSTER_GROWTH_PER_ITEM, CLUSTER_MAX_SIZE,
    HOVERED_SCALE, PIN_BASE_SIZE, SELECTED_LAYER_PRIORITY, SELECTED_SCALE,
};
use egui::Vec2;

/// The presentation flags an icon is derived from.
///
/// This tuple is the exact invalidation key for [`IconCache`]: position and
/// zoom changes do not trigger re-derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualState {
    pub is_cluster: bool,
    pub cluster_count: u32,
    pub is_selected: bool,
    pub is_hovered: bool,
}

impl VisualState {
    /// State for a single-event pin.
    pub fn pin(is_selected: bool, is_hovered: bool) -> Self {
        Self {
            is_cluster: false,
            cluster_count: 0,
            is_selected,
            is_hovered,
        }
    }

    /// State for a cluster disc aggregating `count` events.
    pub fn cluster(count: u32) -> Self {
        Self {
            is_cluster: true,
            cluster_count: count,
            is_selected: false,
            is_hovered: false,
        }
    }
}

/// The shape family of a derived icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    /// Teardrop pin whose tip touches the geographic position
    Pin,
    /// Circular disc centered on the position, labeled with a count
    Cluster,
}

/// Derived visual descriptor for one marker.
///
/// Pure function of [`VisualState`]; carries no identity and is recreated
/// whenever an input flag changes.
#[derive(Debug, Clone, PartialEq)]
pub struct IconSpec {
    pub kind: IconKind,
    /// Icon square edge in pixels
    pub size: f32,
    /// Offset from the icon's top-left corner to the geographic position
    pub anchor: Vec2,
    /// Offset from the geographic position to the popup's bottom-center
    pub popup_anchor: Vec2,
    /// Centered label (cluster count)
    pub label: Option<String>,
    /// Stacking priority; higher renders above lower
    pub layer_priority: i32,
}

impl IconSpec {
    /// Derives the icon descriptor for the given presentation state.
    pub fn derive(state: &VisualState) -> Self {
        let layer_priority = if state.is_selected {
            SELECTED_LAYER_PRIORITY
        } else {
            BASE_LAYER_PRIORITY
        };

        if state.is_cluster {
            let size = (CLUSTER_BASE_SIZE + CLUSTER_GROWTH_PER_ITEM * state.cluster_count as f32)
                .min(CLUSTER_MAX_SIZE);
            let half = (CLUSTER_BASE_SIZE / 2.0 + state.cluster_count as f32)
                .min(CLUSTER_MAX_SIZE / 2.0);

            Self {
                kind: IconKind::Cluster,
                size,
                anchor: Vec2::new(half, half),
                popup_anchor: Vec2::ZERO,
                label: Some(state.cluster_count.to_string()),
                layer_priority,
            }
        } else {
            let scale = if state.is_selected {
                SELECTED_SCALE
            } else if state.is_hovered {
                HOVERED_SCALE
            } else {
                1.0
            };
            let size = PIN_BASE_SIZE * scale;

            Self {
                kind: IconKind::Pin,
                size,
                anchor: Vec2::new(size / 2.0, size),
                popup_anchor: Vec2::new(0.0, -size),
                label: None,
                layer_priority,
            }
        }
    }
}

/// Last-key/last-result memo over [`IconSpec::derive`].
///
/// Keeps one derived descriptor per marker and re-derives only when the
/// presentation state tuple actually changes.
#[derive(Debug, Default)]
pub struct IconCache {
    last: Option<(VisualState, IconSpec)>,
    recomputes: usize,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the descriptor for `state`, deriving it only on a key change.
    pub fn icon(&mut self, state: VisualState) -> &IconSpec {
        let stale = match &self.last {
            Some((cached_state, _)) => *cached_state != state,
            None => true,
        };

        if stale {
            self.recomputes += 1;
            self.last = Some((state, IconSpec::derive(&state)));
        }

        &self.last.as_ref().expect("cache populated above").1
    }

    /// Number of derivations performed (for inspection).
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_size_grows_and_caps() {
        let mut previous = 0.0;
        for count in 0..40 {
            let icon = IconSpec::derive(&VisualState::cluster(count));
            assert!(icon.size >= previous, "size must be non-decreasing");
            assert!(icon.size <= 60.0);
            previous = icon.size;
        }

        assert_eq!(IconSpec::derive(&VisualState::cluster(0)).size, 40.0);
        assert_eq!(IconSpec::derive(&VisualState::cluster(10)).size, 60.0);
        assert_eq!(IconSpec::derive(&VisualState::cluster(100)).size, 60.0);
    }

    #[test]
    fn cluster_worked_examples() {
        let five = IconSpec::derive(&VisualState::cluster(5));
        assert_eq!(five.size, 50.0);
        assert_eq!(five.anchor, Vec2::new(25.0, 25.0));
        assert_eq!(five.label.as_deref(), Some("5"));

        let twenty = IconSpec::derive(&VisualState::cluster(20));
        assert_eq!(twenty.size, 60.0);
        assert_eq!(twenty.anchor, Vec2::new(30.0, 30.0));
    }

    #[test]
    fn pin_scale_precedence() {
        let cases = [
            (false, false, 36.0),
            (false, true, 36.0 * 1.1),
            (true, false, 36.0 * 1.2),
            // selected wins over hovered
            (true, true, 36.0 * 1.2),
        ];

        for (selected, hovered, expected) in cases {
            let icon = IconSpec::derive(&VisualState::pin(selected, hovered));
            assert_eq!(icon.kind, IconKind::Pin);
            assert!((icon.size - expected).abs() < 1e-5, "({selected},{hovered})");
        }
    }

    #[test]
    fn pin_anchors() {
        let icon = IconSpec::derive(&VisualState::pin(false, false));
        assert_eq!(icon.anchor, Vec2::new(18.0, 36.0));
        assert_eq!(icon.popup_anchor, Vec2::new(0.0, -36.0));
        assert!(icon.label.is_none());
    }

    #[test]
    fn selected_markers_stack_higher() {
        let selected = IconSpec::derive(&VisualState::pin(true, false));
        let idle = IconSpec::derive(&VisualState::pin(false, false));
        assert!(selected.layer_priority > idle.layer_priority);
    }

    #[test]
    fn cache_rederives_only_on_key_change() {
        let mut cache = IconCache::new();

        let first = cache.icon(VisualState::pin(false, false)).clone();
        assert_eq!(cache.recompute_count(), 1);

        // Same state twice: no recompute, same descriptor
        let again = cache.icon(VisualState::pin(false, false)).clone();
        assert_eq!(cache.recompute_count(), 1);
        assert_eq!(first, again);

        // Hover flips the key
        cache.icon(VisualState::pin(false, true));
        assert_eq!(cache.recompute_count(), 2);

        // And back
        cache.icon(VisualState::pin(false, false));
        assert_eq!(cache.recompute_count(), 3);
    }
}
