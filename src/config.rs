//! Tunables of the SAH builder.

/// Parameters of the binned SAH split search.
///
/// The defaults are the values the flattened format and its consumers were
/// tuned for; changing them only changes the shape of the tree, never the
/// layout of the buffer.
///
/// # Examples
/// ```
/// use mesh_bvh::BuildConfig;
///
/// let config = BuildConfig {
///     leaf_threshold: 8,
///     ..Default::default()
/// };
/// assert_eq!(config.bin_resolution, 1024);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildConfig {
    /// Sets of fewer triangles than this always become a leaf.
    pub leaf_threshold: usize,

    /// Number of candidate bins across an axis at the root. At depth `d` the
    /// search uses `bin_resolution / (d + 1)` bins.
    pub bin_resolution: u32,

    /// Axes whose extent is below this value are not searched.
    pub min_axis_extent: f32,
}

impl BuildConfig {
    /// Returns the number of bins used at `depth`, or `0` if the depth is so
    /// large that no bins remain.
    pub fn bins_at_depth(&self, depth: u32) -> u32 {
        self.bin_resolution / depth.saturating_add(1)
    }
}

impl Default for BuildConfig {
    fn default() -> BuildConfig {
        BuildConfig {
            leaf_threshold: 4,
            bin_resolution: 1024,
            min_axis_extent: 1e-4,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuildConfig;

    #[test]
    fn test_bins_get_coarser_with_depth() {
        let config = BuildConfig::default();
        assert_eq!(config.bins_at_depth(0), 1024);
        assert_eq!(config.bins_at_depth(1), 512);
        assert_eq!(config.bins_at_depth(3), 256);
        assert_eq!(config.bins_at_depth(1023), 1);
        assert_eq!(config.bins_at_depth(1024), 0);
        assert_eq!(config.bins_at_depth(u32::MAX), 0);
    }
}
