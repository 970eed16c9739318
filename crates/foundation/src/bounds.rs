use serde::{Deserialize, Serialize};

/// Spatial reference by well-known id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialReference {
    pub wkid: u32,
}

impl SpatialReference {
    /// Mexico ITRF2008 / LCC.
    pub const MEXICO_ITRF2008_LCC: SpatialReference = SpatialReference { wkid: 6368 };

    pub const fn new(wkid: u32) -> Self {
        Self { wkid }
    }
}

/// Projected point in map units.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "spatialReference")]
    pub spatial_reference: SpatialReference,
}

impl MapPoint {
    pub const fn new(x: f64, y: f64, spatial_reference: SpatialReference) -> Self {
        Self {
            x,
            y,
            spatial_reference,
        }
    }
}

/// Axis-aligned extent in map units.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    #[serde(rename = "spatialReference")]
    pub spatial_reference: SpatialReference,
}

impl Extent {
    pub const fn new(
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
        spatial_reference: SpatialReference,
    ) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            spatial_reference,
        }
    }

    pub fn width(&self) -> f64 {
        (self.xmax - self.xmin).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.ymax - self.ymin).max(0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.xmin + self.xmax) * 0.5,
            (self.ymin + self.ymax) * 0.5,
        )
    }

    /// Points in a different spatial reference are never contained.
    pub fn contains(&self, p: &MapPoint) -> bool {
        p.spatial_reference == self.spatial_reference
            && p.x >= self.xmin
            && p.x <= self.xmax
            && p.y >= self.ymin
            && p.y <= self.ymax
    }
}

#[cfg(test)]
mod tests {
    use super::{Extent, MapPoint, SpatialReference};

    const SR: SpatialReference = SpatialReference::MEXICO_ITRF2008_LCC;

    #[test]
    fn contains_checks_bounds_and_reference() {
        let e = Extent::new(-10.0, -5.0, 10.0, 5.0, SR);
        assert!(e.contains(&MapPoint::new(0.0, 0.0, SR)));
        assert!(e.contains(&MapPoint::new(10.0, 5.0, SR)));
        assert!(!e.contains(&MapPoint::new(10.1, 0.0, SR)));
        assert!(!e.contains(&MapPoint::new(0.0, 0.0, SpatialReference::new(4326))));
    }

    #[test]
    fn serializes_with_camel_case_reference() {
        let p = MapPoint::new(1.0, 2.0, SR);
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["spatialReference"]["wkid"], 6368);
    }
}
