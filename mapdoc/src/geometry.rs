//! Geographic primitives shared by every layer kind
//!
//! Coordinates are WGS84 decimal degrees. Bounding boxes are axis-aligned
//! and aware of the antimeridian: aggregating longitudes always chooses the
//! smaller of the two candidate arcs.

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in decimal degrees.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Normalize a longitude into the [-180, 180) range.
pub fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// An axis-aligned geographic bounding box.
///
/// `west` may lie numerically east of `east`; that encodes a box crossing
/// the antimeridian. [`BoundingBox::lon_span`] accounts for the wrap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Compute the tightest box containing all coordinates.
    ///
    /// Latitudes are a plain min/max. Longitudes are normalized to [0, 360),
    /// sorted, and the box spans the complement of the largest gap between
    /// consecutive values, so a pair at 179.9 and -179.9 yields a span of
    /// 0.2 degrees across the antimeridian rather than 359.8 around the
    /// long way.
    ///
    /// Returns `None` for an empty input.
    pub fn from_coordinates(coords: &[Coordinate]) -> Option<Self> {
        if coords.is_empty() {
            return None;
        }

        let mut south = f64::INFINITY;
        let mut north = f64::NEG_INFINITY;
        for c in coords {
            south = south.min(c.lat);
            north = north.max(c.lat);
        }

        // Longitudes shifted into [0, 360) so the gap scan is linear.
        let mut lons: Vec<f64> = coords
            .iter()
            .map(|c| (c.lon + 180.0).rem_euclid(360.0))
            .collect();
        lons.sort_by(f64::total_cmp);

        let first = lons[0];
        let last = lons[lons.len() - 1];

        // The wrap gap closes the circle between the last and first value.
        let mut largest_gap = first + 360.0 - last;
        let mut west_shifted = first;
        let mut east_shifted = last;

        for pair in lons.windows(2) {
            let gap = pair[1] - pair[0];
            if gap > largest_gap {
                largest_gap = gap;
                west_shifted = pair[1];
                east_shifted = pair[0];
            }
        }

        Some(Self {
            south,
            west: west_shifted - 180.0,
            north,
            east: east_shifted - 180.0,
        })
    }

    /// Width of the box in degrees of longitude, following the wrap.
    pub fn lon_span(&self) -> f64 {
        (self.east - self.west).rem_euclid(360.0)
    }

    /// Height of the box in degrees of latitude.
    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    /// Geographic center of the box.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            normalize_lon(self.west + self.lon_span() / 2.0),
        )
    }

    /// Whether the box degenerates to a single point.
    pub fn is_point(&self) -> bool {
        self.lat_span() == 0.0 && self.lon_span() == 0.0
    }
}

/// The initial framing of a rendered document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    /// A pinned center coordinate and zoom level.
    CenterZoom { center: Coordinate, zoom: u8 },
    /// An explicit bounding box the renderer should fit.
    Bounds(BoundingBox),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lon() {
        assert_eq!(normalize_lon(0.0), 0.0);
        assert_eq!(normalize_lon(190.0), -170.0);
        assert_eq!(normalize_lon(-190.0), 170.0);
        assert_eq!(normalize_lon(360.0), 0.0);
    }

    #[test]
    fn test_bbox_simple() {
        let coords = [
            Coordinate::new(48.0, 2.0),
            Coordinate::new(52.0, 13.0),
            Coordinate::new(35.0, 51.0),
        ];
        let bbox = BoundingBox::from_coordinates(&coords).unwrap();
        assert_eq!(bbox.south, 35.0);
        assert_eq!(bbox.north, 52.0);
        assert_eq!(bbox.west, 2.0);
        assert_eq!(bbox.east, 51.0);
        assert!((bbox.lon_span() - 49.0).abs() < 1e-9);
    }

    #[test]
    fn test_bbox_antimeridian_short_arc() {
        let coords = [Coordinate::new(0.0, 179.9), Coordinate::new(0.0, -179.9)];
        let bbox = BoundingBox::from_coordinates(&coords).unwrap();
        assert!((bbox.lon_span() - 0.2).abs() < 1e-6);
        assert!((bbox.west - 179.9).abs() < 1e-9);
        assert!((bbox.east - -179.9).abs() < 1e-9);
    }

    #[test]
    fn test_bbox_antimeridian_center() {
        let coords = [Coordinate::new(0.0, 179.9), Coordinate::new(0.0, -179.9)];
        let bbox = BoundingBox::from_coordinates(&coords).unwrap();
        let center = bbox.center();
        assert!(center.lon.abs() > 179.9 || (center.lon + 180.0).abs() < 0.2);
    }

    #[test]
    fn test_bbox_empty() {
        assert!(BoundingBox::from_coordinates(&[]).is_none());
    }

    #[test]
    fn test_bbox_single_point() {
        let bbox =
            BoundingBox::from_coordinates(&[Coordinate::new(48.8566, 2.3522)]).unwrap();
        assert!(bbox.is_point());
        let center = bbox.center();
        assert!((center.lat - 48.8566).abs() < 1e-9);
        assert!((center.lon - 2.3522).abs() < 1e-9);
    }
}
