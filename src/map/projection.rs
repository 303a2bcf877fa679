use crate::config::Margins;
use crate::data::GeoFeature;
use glam::DVec2;
use rayon::prelude::*;
use std::f64::consts::FRAC_PI_4;

/// Latitude at which Web Mercator becomes square
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Size of the drawing surface, in surface units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportDimensions {
    pub width: f64,
    pub height: f64,
}

impl ViewportDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Area left for the map once margins are taken out
    pub fn inner_size(&self, margins: &Margins) -> DVec2 {
        DVec2::new(
            self.width - margins.left - margins.right,
            self.height - margins.top - margins.bottom,
        )
        .max(DVec2::ZERO)
    }
}

/// Mercator projection with a solved scale and translate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorProjection {
    pub scale: f64,
    pub translate: DVec2,
}

impl MercatorProjection {
    /// Scale the fit starts from before solving for the target size
    pub const REFERENCE_SCALE: f64 = 150.0;

    pub fn new(scale: f64, translate: DVec2) -> Self {
        Self { scale, translate }
    }

    /// Unscaled Mercator: radians east, stretched radians north
    fn raw(lonlat: DVec2) -> DVec2 {
        let lat = lonlat.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        DVec2::new(lonlat.x.to_radians(), (FRAC_PI_4 + lat / 2.0).tan().ln())
    }

    /// Project (lon, lat) in degrees to surface coordinates (y grows down)
    pub fn project(&self, lonlat: DVec2) -> DVec2 {
        let r = Self::raw(lonlat);
        DVec2::new(self.translate.x + self.scale * r.x, self.translate.y - self.scale * r.y)
    }

    /// Surface coordinates back to (lon, lat); `None` for a collapsed projection
    pub fn invert(&self, point: DVec2) -> Option<DVec2> {
        if self.scale <= 0.0 || !self.scale.is_finite() {
            return None;
        }
        let x = (point.x - self.translate.x) / self.scale;
        let y = (self.translate.y - point.y) / self.scale;
        let lat = 2.0 * y.exp().atan() - std::f64::consts::FRAC_PI_2;
        Some(DVec2::new(x.to_degrees(), lat.to_degrees()))
    }

    /// Solve scale and translate so the projected bounds of `features`
    /// exactly fill `[0, 0] .. size`, centered along the slack axis.
    pub fn fit_size(features: &[GeoFeature], size: DVec2) -> Self {
        let reference = Self::new(Self::REFERENCE_SCALE, DVec2::ZERO);
        let (min, max) = features
            .iter()
            .flat_map(|f| f.positions())
            .map(|p| reference.project(p))
            .fold((DVec2::INFINITY, DVec2::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            });

        if !min.is_finite() || !max.is_finite() {
            // Nothing to fit
            return Self::new(Self::REFERENCE_SCALE, size / 2.0);
        }

        let span = max - min;
        let k = [size.x / span.x, size.y / span.y]
            .into_iter()
            .filter(|r| r.is_finite())
            .fold(f64::INFINITY, f64::min);
        let k = if k.is_finite() { k } else { 1.0 };

        let translate = (size - k * (max + min)) / 2.0;
        Self::new(Self::REFERENCE_SCALE * k, translate)
    }

    /// Fit to the viewport less margins
    pub fn fit(features: &[GeoFeature], viewport: ViewportDimensions, margins: &Margins) -> Self {
        Self::fit_size(features, viewport.inner_size(margins))
    }
}

/// One drawing command of a projected outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(DVec2),
    LineTo(DVec2),
    ClosePath,
}

/// Projected outline of a feature: closed rings in surface coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeaturePath {
    pub rings: Vec<Vec<DVec2>>,
}

impl FeaturePath {
    /// Move/line/close sequence, one closed subpath per ring
    pub fn commands(&self) -> impl Iterator<Item = PathCommand> + '_ {
        self.rings.iter().filter(|r| !r.is_empty()).flat_map(|ring| {
            let closed = ring.len() > 1 && ring.first() == ring.last();
            let body = if closed { &ring[..ring.len() - 1] } else { &ring[..] };
            body.iter()
                .enumerate()
                .map(|(i, &p)| if i == 0 { PathCommand::MoveTo(p) } else { PathCommand::LineTo(p) })
                .chain(std::iter::once(PathCommand::ClosePath))
        })
    }

    /// Bounding box, `None` for an empty path
    pub fn bounds(&self) -> Option<(DVec2, DVec2)> {
        let mut points = self.rings.iter().flatten();
        let first = *points.next()?;
        Some(points.fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))))
    }

    /// Even-odd point containment over all rings
    pub fn contains(&self, point: DVec2) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            if ring.len() < 3 {
                continue;
            }
            let mut j = ring.len() - 1;
            for i in 0..ring.len() {
                let (a, b) = (ring[i], ring[j]);
                if (a.y > point.y) != (b.y > point.y)
                    && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
                {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}

/// Turns features into projected paths for one projection
#[derive(Debug, Clone, Copy)]
pub struct PathGenerator {
    pub projection: MercatorProjection,
}

impl PathGenerator {
    pub fn new(projection: MercatorProjection) -> Self {
        Self { projection }
    }

    pub fn path(&self, feature: &GeoFeature) -> FeaturePath {
        FeaturePath {
            rings: feature
                .polygons
                .iter()
                .flatten()
                .map(|ring| ring.iter().map(|&p| self.projection.project(p)).collect())
                .collect(),
        }
    }

    /// Paths for every feature, in feature order
    pub fn paths(&self, features: &[GeoFeature]) -> Vec<FeaturePath> {
        features.par_iter().map(|f| self.path(f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geometry::square;

    fn approx(a: DVec2, b: DVec2) -> bool {
        (a - b).abs().max_element() < 1e-6
    }

    #[test]
    fn test_fit_fills_target() {
        let features = vec![
            square("AAA", "A", -60.0, -20.0, 20.0),
            square("BBB", "B", 40.0, 30.0, 20.0),
        ];
        let size = DVec2::new(740.0, 530.0);
        let projection = MercatorProjection::fit_size(&features, size);
        let path = PathGenerator::new(projection);
        let (min, max) = features
            .iter()
            .map(|f| path.path(f).bounds().unwrap())
            .fold((DVec2::INFINITY, DVec2::NEG_INFINITY), |(lo, hi), (a, b)| {
                (lo.min(a), hi.max(b))
            });

        // One axis touches both edges, the other is centered
        let touches_x = (min.x).abs() < 1e-6 && (max.x - size.x).abs() < 1e-6;
        let touches_y = (min.y).abs() < 1e-6 && (max.y - size.y).abs() < 1e-6;
        assert!(touches_x || touches_y);
        assert!(((min + max) / 2.0 - size / 2.0).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_project_invert_round_trip() {
        let projection = MercatorProjection::new(120.0, DVec2::new(400.0, 300.0));
        let lonlat = DVec2::new(-73.9, 40.7);
        let back = projection.invert(projection.project(lonlat)).unwrap();
        assert!(approx(lonlat, back));
    }

    #[test]
    fn test_north_is_up() {
        let projection = MercatorProjection::new(100.0, DVec2::ZERO);
        let south = projection.project(DVec2::new(0.0, -10.0));
        let north = projection.project(DVec2::new(0.0, 10.0));
        assert!(north.y < south.y);
    }

    #[test]
    fn test_poles_are_clamped() {
        let projection = MercatorProjection::new(100.0, DVec2::ZERO);
        assert!(projection.project(DVec2::new(0.0, 90.0)).is_finite());
        assert!(projection.project(DVec2::new(0.0, -90.0)).is_finite());
    }

    #[test]
    fn test_fit_empty_collection() {
        let projection = MercatorProjection::fit_size(&[], DVec2::new(100.0, 50.0));
        assert!(projection.scale.is_finite());
        assert_eq!(projection.translate, DVec2::new(50.0, 25.0));
    }

    #[test]
    fn test_fit_zero_size_viewport() {
        let features = vec![square("AAA", "A", 0.0, 0.0, 10.0)];
        let projection = MercatorProjection::fit_size(&features, DVec2::ZERO);
        assert_eq!(projection.scale, 0.0);
        assert!(projection.invert(DVec2::ZERO).is_none());
    }

    #[test]
    fn test_commands_close_each_ring() {
        let feature = square("AAA", "A", 0.0, 0.0, 10.0);
        let path = PathGenerator::new(MercatorProjection::new(100.0, DVec2::ZERO)).path(&feature);
        let commands: Vec<_> = path.commands().collect();
        assert_eq!(commands.len(), 5);
        assert!(matches!(commands[0], PathCommand::MoveTo(_)));
        assert!(matches!(commands[3], PathCommand::LineTo(_)));
        assert_eq!(commands[4], PathCommand::ClosePath);
    }

    #[test]
    fn test_contains_even_odd() {
        let path = FeaturePath {
            rings: vec![
                vec![
                    DVec2::new(0.0, 0.0),
                    DVec2::new(10.0, 0.0),
                    DVec2::new(10.0, 10.0),
                    DVec2::new(0.0, 10.0),
                ],
                vec![
                    DVec2::new(4.0, 4.0),
                    DVec2::new(6.0, 4.0),
                    DVec2::new(6.0, 6.0),
                    DVec2::new(4.0, 6.0),
                ],
            ],
        };
        assert!(path.contains(DVec2::new(1.0, 1.0)));
        assert!(!path.contains(DVec2::new(5.0, 5.0)));
        assert!(!path.contains(DVec2::new(11.0, 5.0)));
    }

    #[test]
    fn test_inner_size_never_negative() {
        let vp = ViewportDimensions::new(30.0, 600.0);
        let inner = vp.inner_size(&Margins::default());
        assert_eq!(inner, DVec2::new(0.0, 530.0));
    }
}
