use foundation::geo::LatLng;

use crate::location::QueryParams;

pub const MAP_CENTER_KEY: &str = "mapCenter";
pub const MAP_ZOOM_KEY: &str = "mapZoom";

/// Map camera as carried in the URL query.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(lat: f64, lng: f64, zoom: f64) -> Self {
        Self {
            center: LatLng::new(lat, lng),
            zoom,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.center.is_finite() && self.zoom.is_finite() && self.zoom >= 0.0
    }

    /// Reads `mapCenter` and `mapZoom`; both must be present and parse.
    pub fn from_query(query: &QueryParams) -> Option<Self> {
        let center = LatLng::parse_pair(query.get(MAP_CENTER_KEY)?)?;
        let zoom: f64 = query.get(MAP_ZOOM_KEY)?.trim().parse().ok()?;
        let vp = Self { center, zoom };
        vp.is_valid().then_some(vp)
    }

    /// Writes `mapCenter` (6 decimals) and `mapZoom` (2 decimals).
    pub fn write_query(&self, query: &mut QueryParams) {
        query.set(MAP_CENTER_KEY, self.center.normalized().format_pair());
        query.set(MAP_ZOOM_KEY, format!("{:.2}", self.zoom));
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;
    use crate::location::QueryParams;

    #[test]
    fn writes_fixed_precision() {
        let mut q = QueryParams::parse("keep=1");
        Viewport::new(51.5074, -0.1278, 9.876).write_query(&mut q);
        assert_eq!(
            q.to_query_string(),
            "keep=1&mapCenter=51.507400,-0.127800&mapZoom=9.88"
        );
    }

    #[test]
    fn reads_back_what_it_wrote() {
        let mut q = QueryParams::new();
        let vp = Viewport::new(10.5, 20.25, 3.5);
        vp.write_query(&mut q);
        assert_eq!(Viewport::from_query(&q), Some(vp));
    }

    #[test]
    fn partial_or_invalid_params_are_ignored() {
        assert_eq!(
            Viewport::from_query(&QueryParams::parse("mapCenter=1,2")),
            None
        );
        assert_eq!(
            Viewport::from_query(&QueryParams::parse("mapCenter=1,2&mapZoom=-1")),
            None
        );
        assert_eq!(
            Viewport::from_query(&QueryParams::parse("mapCenter=x&mapZoom=2")),
            None
        );
    }
}
