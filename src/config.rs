//! Run configuration
//!
//! All tunables live in an explicit [`Config`] passed by reference into the
//! component entry points. There is no file-scoped or process-wide state.

/// Configuration for a border-dissolve run
///
/// # Example
///
/// ```
/// use geo_border_dissolve::Config;
///
/// let config = Config {
///     expected_county_count: 2,
///     ..Config::default()
/// };
/// assert_eq!(config.resolved_value, 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Authoritative number of counties both input layers must contain.
    /// A mismatch at load time is a fatal precondition failure.
    pub expected_county_count: usize,

    /// Extent-raster cell value meaning "fully resolved interior". Cells at
    /// this value are zeroed before vectorization.
    pub resolved_value: f64,

    /// Property holding the county key on the authoritative layer
    pub geoid_property: String,

    /// Property holding the county key on the rasterized-then-vectorized
    /// layer (the grid code assigned during rasterization)
    pub gridcode_property: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expected_county_count: 205,
            resolved_value: 100.0,
            geoid_property: "GEOID".to_string(),
            gridcode_property: "gridcode".to_string(),
        }
    }
}

impl Config {
    /// Create a configuration for a given authoritative county count,
    /// keeping the default sentinel value and property names
    pub fn with_expected_count(expected_county_count: usize) -> Self {
        Self {
            expected_county_count,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_phase_conventions() {
        let config = Config::default();
        assert_eq!(config.expected_county_count, 205);
        assert_eq!(config.resolved_value, 100.0);
        assert_eq!(config.geoid_property, "GEOID");
        assert_eq!(config.gridcode_property, "gridcode");
    }

    #[test]
    fn test_with_expected_count() {
        let config = Config::with_expected_count(7);
        assert_eq!(config.expected_county_count, 7);
        assert_eq!(config.resolved_value, 100.0);
    }
}
