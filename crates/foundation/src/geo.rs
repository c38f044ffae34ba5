/// Geographic position in degrees (WGS84).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Clamps latitude to [-90, 90] and wraps longitude into [-180, 180).
    ///
    /// Slippy maps happily report longitudes outside the canonical range after
    /// the user pans across the antimeridian a few times.
    pub fn normalized(self) -> Self {
        let lat = self.lat.clamp(-90.0, 90.0);
        let lng = (self.lng + 180.0).rem_euclid(360.0) - 180.0;
        Self { lat, lng }
    }

    /// `"lat,lng"` with 6 decimal places.
    pub fn format_pair(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }

    pub fn parse_pair(s: &str) -> Option<Self> {
        let (lat, lng) = s.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lng: f64 = lng.trim().parse().ok()?;
        let out = Self { lat, lng };
        out.is_finite().then_some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::LatLng;

    #[test]
    fn formats_with_six_decimals() {
        let p = LatLng::new(48.8566, 2.3522);
        assert_eq!(p.format_pair(), "48.856600,2.352200");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(LatLng::parse_pair("1.5, -2.25"), Some(LatLng::new(1.5, -2.25)));
        assert_eq!(LatLng::parse_pair("1.5"), None);
        assert_eq!(LatLng::parse_pair("a,b"), None);
        assert_eq!(LatLng::parse_pair("NaN,1"), None);
    }

    #[test]
    fn normalization_wraps_longitude() {
        let p = LatLng::new(95.0, 190.0).normalized();
        assert_eq!(p.lat, 90.0);
        assert!((p.lng - -170.0).abs() < 1e-9);

        let q = LatLng::new(0.0, -180.0).normalized();
        assert_eq!(q.lng, -180.0);
    }
}
