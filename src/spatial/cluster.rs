use crate::core::{geo::LatLng, viewport::Viewport};
use fxhash::FxHashMap;

/// An aggregated group of nearby markers, labeled with its member count.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterGroup {
    /// Stable id derived from the grid cell
    pub id: String,
    /// Arithmetic mean of the member positions
    pub center: LatLng,
    /// Ids of the member events
    pub members: Vec<String>,
}

impl ClusterGroup {
    pub fn count(&self) -> u32 {
        self.members.len() as u32
    }

    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }
}

/// Configuration for the grid cluster pass
#[derive(Debug, Clone)]
pub struct GridClustererConfig {
    /// Grid cell edge in screen pixels
    pub cell_size: f64,
    /// Zoom level at or above which clustering is skipped entirely
    pub disable_at_zoom: f64,
}

impl Default for GridClustererConfig {
    fn default() -> Self {
        Self {
            cell_size: 60.0,
            disable_at_zoom: 15.0,
        }
    }
}

// Grouping happens in world pixel space, so only the zoom (projection
// scale) and the entry count can change the outcome; panning cannot.
#[derive(Debug, Clone, PartialEq)]
struct PassKey {
    zoom: u64,
    entry_count: usize,
}

impl PassKey {
    fn new(viewport: &Viewport, entry_count: usize) -> Self {
        Self {
            zoom: viewport.zoom.to_bits(),
            entry_count,
        }
    }
}

/// Groups markers by projected pixel grid cell.
///
/// The last result is cached against the zoom and the entry count; callers
/// that move or replace entries without changing their number must call
/// [`GridClusterer::invalidate`].
#[derive(Debug, Default)]
pub struct GridClusterer {
    config: GridClustererConfig,
    last_key: Option<PassKey>,
    last_groups: Vec<ClusterGroup>,
    passes: usize,
}

impl GridClusterer {
    pub fn new(config: GridClustererConfig) -> Self {
        Self {
            config,
            last_key: None,
            last_groups: Vec::new(),
            passes: 0,
        }
    }

    pub fn config(&self) -> &GridClustererConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GridClustererConfig) {
        self.config = config;
        self.invalidate();
    }

    /// Drops the cached result; call after membership changes the key
    /// cannot see.
    pub fn invalidate(&mut self) {
        self.last_key = None;
        self.last_groups.clear();
    }

    /// Number of full cluster passes performed (for inspection).
    pub fn pass_count(&self) -> usize {
        self.passes
    }

    /// Groups `entries` for the given viewport.
    ///
    /// At or above the disable zoom every entry passes through as its own
    /// single-member group; otherwise entries sharing a pixel grid cell are
    /// merged into one [`ClusterGroup`] centered on their mean position.
    pub fn cluster(
        &mut self,
        entries: &[(String, LatLng)],
        viewport: &Viewport,
    ) -> Vec<ClusterGroup> {
        let key = PassKey::new(viewport, entries.len());
        if self.last_key.as_ref() == Some(&key) {
            return self.last_groups.clone();
        }

        log::debug!(
            "cluster pass over {} entries at zoom {:.1}",
            entries.len(),
            viewport.zoom
        );

        let groups = if viewport.zoom >= self.config.disable_at_zoom {
            entries
                .iter()
                .map(|(id, position)| ClusterGroup {
                    id: id.clone(),
                    center: *position,
                    members: vec![id.clone()],
                })
                .collect()
        } else {
            self.grid_pass(entries, viewport)
        };

        self.passes += 1;
        self.last_key = Some(key);
        self.last_groups = groups.clone();
        groups
    }

    fn grid_pass(
        &self,
        entries: &[(String, LatLng)],
        viewport: &Viewport,
    ) -> Vec<ClusterGroup> {
        let cell_size = self.config.cell_size;
        let mut cells: FxHashMap<(i64, i64), Vec<(&String, &LatLng)>> = FxHashMap::default();

        for (id, position) in entries {
            let pixel = viewport.project(position);
            let cell = (
                (pixel.x / cell_size).floor() as i64,
                (pixel.y / cell_size).floor() as i64,
            );
            cells.entry(cell).or_default().push((id, position));
        }

        let mut groups: Vec<ClusterGroup> = cells
            .into_iter()
            .map(|((cell_x, cell_y), members)| {
                if members.len() == 1 {
                    let (id, position) = members[0];
                    ClusterGroup {
                        id: id.clone(),
                        center: *position,
                        members: vec![id.clone()],
                    }
                } else {
                    let n = members.len() as f64;
                    let (lat_sum, lng_sum) = members.iter().fold((0.0, 0.0), |acc, (_, p)| {
                        (acc.0 + p.lat, acc.1 + p.lng)
                    });
                    ClusterGroup {
                        id: format!("cluster_{}_{}", cell_x, cell_y),
                        center: LatLng::new(lat_sum / n, lng_sum / n),
                        members: members.iter().map(|(id, _)| (*id).clone()).collect(),
                    }
                }
            })
            .collect();

        // Stable output order regardless of hash iteration
        groups.sort_by(|a, b| a.id.cmp(&b.id));
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;

    fn entries() -> Vec<(String, LatLng)> {
        vec![
            ("a".to_string(), LatLng::new(40.7128, -74.0060)),
            ("b".to_string(), LatLng::new(40.7129, -74.0061)),
            ("c".to_string(), LatLng::new(34.0522, -118.2437)),
        ]
    }

    fn viewport_at(zoom: f64) -> Viewport {
        Viewport::new(LatLng::new(40.0, -95.0), zoom, Point::new(800.0, 600.0))
    }

    #[test]
    fn nearby_entries_merge_below_disable_zoom() {
        let mut clusterer = GridClusterer::default();
        let groups = clusterer.cluster(&entries(), &viewport_at(4.0));

        let cluster = groups.iter().find(|g| !g.is_single()).expect("a cluster");
        assert_eq!(cluster.count(), 2);
        assert!(cluster.members.contains(&"a".to_string()));
        assert!(cluster.members.contains(&"b".to_string()));
        assert!(cluster.id.starts_with("cluster_"));

        // Mean of the members
        assert!((cluster.center.lat - 40.71285).abs() < 1e-6);

        let single = groups.iter().find(|g| g.is_single()).expect("a single");
        assert_eq!(single.id, "c");
    }

    #[test]
    fn clustering_disabled_at_high_zoom() {
        let mut clusterer = GridClusterer::default();
        let groups = clusterer.cluster(&entries(), &viewport_at(16.0));

        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(ClusterGroup::is_single));
    }

    #[test]
    fn repeat_pass_hits_the_cache() {
        let mut clusterer = GridClusterer::default();
        let viewport = viewport_at(4.0);
        let input = entries();

        let first = clusterer.cluster(&input, &viewport);
        let second = clusterer.cluster(&input, &viewport);

        assert_eq!(clusterer.pass_count(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn zoom_change_recomputes() {
        let mut clusterer = GridClusterer::default();
        let input = entries();

        clusterer.cluster(&input, &viewport_at(4.0));
        clusterer.cluster(&input, &viewport_at(5.0));

        assert_eq!(clusterer.pass_count(), 2);
    }

    #[test]
    fn invalidate_forces_a_fresh_pass() {
        let mut clusterer = GridClusterer::default();
        let viewport = viewport_at(4.0);
        let input = entries();

        clusterer.cluster(&input, &viewport);
        clusterer.invalidate();
        clusterer.cluster(&input, &viewport);

        assert_eq!(clusterer.pass_count(), 2);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let mut clusterer = GridClusterer::default();
        assert!(clusterer.cluster(&[], &viewport_at(4.0)).is_empty());
    }
}
