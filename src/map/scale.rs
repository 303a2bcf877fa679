use crate::data::StatRow;
use glam::DVec3;
use std::fmt;
use std::str::FromStr;

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let mut it = digits.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
                Some(Self::new(it.next()??, it.next()??, it.next()??))
            }
            6 => Some(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => None,
        }
    }

    fn to_vec(self) -> DVec3 {
        DVec3::new(self.r as f64, self.g as f64, self.b as f64)
    }

    fn from_vec(v: DVec3) -> Self {
        let c = v.round().clamp(DVec3::ZERO, DVec3::splat(255.0));
        Self::new(c.x as u8, c.y as u8, c.z as u8)
    }
}

impl fmt::Display for Rgb {
    /// CSS hex form: #rrggbb
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Named two-color gradients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gradient {
    #[default]
    YellowPurple,
    Blues,
    Greens,
    Reds,
    ViridisEnds,
}

impl Gradient {
    pub const ALL: [Gradient; 5] = [
        Gradient::YellowPurple,
        Gradient::Blues,
        Gradient::Greens,
        Gradient::Reds,
        Gradient::ViridisEnds,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Gradient::YellowPurple => "yellow-purple",
            Gradient::Blues => "blues",
            Gradient::Greens => "greens",
            Gradient::Reds => "reds",
            Gradient::ViridisEnds => "viridis-ends",
        }
    }

    /// Start and end colors (low value, high value)
    pub fn endpoints(self) -> (Rgb, Rgb) {
        match self {
            Gradient::YellowPurple => (Rgb::new(0xff, 0xff, 0x00), Rgb::new(0xa6, 0x2b, 0xff)),
            Gradient::Blues => (Rgb::new(0xde, 0xeb, 0xf7), Rgb::new(0x08, 0x51, 0x9c)),
            Gradient::Greens => (Rgb::new(0xe5, 0xf5, 0xe0), Rgb::new(0x00, 0x6d, 0x2c)),
            Gradient::Reds => (Rgb::new(0xfe, 0xe0, 0xd2), Rgb::new(0xa5, 0x0f, 0x15)),
            Gradient::ViridisEnds => (Rgb::new(0xfd, 0xe7, 0x25), Rgb::new(0x44, 0x01, 0x54)),
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|g| *g == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl FromStr for Gradient {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|g| g.name()).collect();
                format!("unknown gradient '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Color space the gradient is interpolated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationSpace {
    #[default]
    Rgb,
    Lab,
}

impl FromStr for InterpolationSpace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "lab" => Ok(Self::Lab),
            _ => Err(format!("unknown interpolation '{}', expected rgb or lab", s)),
        }
    }
}

// CIE Lab against the D50 white point, via Bradford-adapted sRGB matrices
const XN: f64 = 0.96422;
const YN: f64 = 1.0;
const ZN: f64 = 0.82521;
const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

fn srgb_to_linear(c: f64) -> f64 {
    let c = c / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    255.0
        * if c <= 0.003_130_8 {
            12.92 * c
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
}

fn xyz_to_lab_f(t: f64) -> f64 {
    if t > T3 {
        t.cbrt()
    } else {
        t / T2 + T0
    }
}

fn lab_to_xyz_f(t: f64) -> f64 {
    if t > T1 {
        t * t * t
    } else {
        T2 * (t - T0)
    }
}

fn to_lab(c: Rgb) -> DVec3 {
    let r = srgb_to_linear(c.r as f64);
    let g = srgb_to_linear(c.g as f64);
    let b = srgb_to_linear(c.b as f64);
    let y = xyz_to_lab_f((0.222_504_5 * r + 0.716_878_6 * g + 0.060_616_9 * b) / YN);
    let (x, z) = if c.r == c.g && c.g == c.b {
        (y, y)
    } else {
        (
            xyz_to_lab_f((0.436_074_7 * r + 0.385_064_9 * g + 0.143_080_4 * b) / XN),
            xyz_to_lab_f((0.013_932_2 * r + 0.097_104_5 * g + 0.714_173_3 * b) / ZN),
        )
    };
    DVec3::new(116.0 * y - 16.0, 500.0 * (x - y), 200.0 * (y - z))
}

fn from_lab(lab: DVec3) -> Rgb {
    let y = (lab.x + 16.0) / 116.0;
    let x = y + lab.y / 500.0;
    let z = y - lab.z / 200.0;
    let x = XN * lab_to_xyz_f(x);
    let y = YN * lab_to_xyz_f(y);
    let z = ZN * lab_to_xyz_f(z);
    Rgb::from_vec(DVec3::new(
        linear_to_srgb(3.133_856_1 * x - 1.616_866_7 * y - 0.490_614_6 * z),
        linear_to_srgb(-0.978_768_4 * x + 1.916_141_5 * y + 0.033_454_0 * z),
        linear_to_srgb(0.071_945_3 * x - 0.228_991_4 * y + 1.405_242_7 * z),
    ))
}

/// A gradient plus the space it is interpolated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorRamp {
    pub gradient: Gradient,
    pub space: InterpolationSpace,
}

impl ColorRamp {
    /// Color at `t` in `[0, 1]`
    pub fn at(&self, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let (start, end) = self.gradient.endpoints();
        match self.space {
            InterpolationSpace::Rgb => Rgb::from_vec(start.to_vec().lerp(end.to_vec(), t)),
            InterpolationSpace::Lab => from_lab(to_lab(start).lerp(to_lab(end), t)),
        }
    }
}

/// Continuous value-to-color mapping for one render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorScale {
    /// `neutral` colors non-finite values, which have no place on the ramp
    Sequential {
        min: f64,
        max: f64,
        ramp: ColorRamp,
        neutral: Rgb,
    },
    /// No domain (nothing passed the filter): every value gets one color
    Neutral(Rgb),
}

impl ColorScale {
    /// Fit the domain to the finite values in `rows`.
    pub fn build(rows: &[&StatRow], ramp: ColorRamp, neutral: Rgb) -> Self {
        let domain = rows
            .iter()
            .map(|row| row.value)
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            });
        match domain {
            Some((min, max)) => ColorScale::Sequential {
                min,
                max,
                ramp,
                neutral,
            },
            None => ColorScale::Neutral(neutral),
        }
    }

    pub fn domain(&self) -> Option<(f64, f64)> {
        match *self {
            ColorScale::Sequential { min, max, .. } => Some((min, max)),
            ColorScale::Neutral(_) => None,
        }
    }

    /// Interpolation parameter for `value`. A single-valued domain maps
    /// everything to the midpoint; out-of-domain values are clamped.
    pub fn position(&self, value: f64) -> Option<f64> {
        match *self {
            ColorScale::Sequential { min, max, .. } if value.is_finite() => {
                if max == min {
                    Some(0.5)
                } else {
                    Some(((value - min) / (max - min)).clamp(0.0, 1.0))
                }
            }
            _ => None,
        }
    }

    pub fn color(&self, value: f64) -> Rgb {
        match (self, self.position(value)) {
            (ColorScale::Sequential { ramp, .. }, Some(t)) => ramp.at(t),
            (ColorScale::Neutral(neutral), _) | (ColorScale::Sequential { neutral, .. }, None) => *neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NEUTRAL_FILL;
    use crate::data::stats::row;

    fn scale_of(values: &[f64]) -> ColorScale {
        let rows: Vec<StatRow> = values.iter().map(|v| row("USA", *v)).collect();
        let refs: Vec<&StatRow> = rows.iter().collect();
        ColorScale::build(&refs, ColorRamp::default(), NEUTRAL_FILL)
    }

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(Rgb::from_hex("#ddd"), Some(Rgb::new(0xdd, 0xdd, 0xdd)));
        assert_eq!(Rgb::from_hex("#a62bff"), Some(Rgb::new(0xa6, 0x2b, 0xff)));
        assert_eq!(Rgb::from_hex("#a62bff").unwrap().to_string(), "#a62bff");
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#aééa"), None);
        assert_eq!(Rgb::from_hex("éé"), None);
    }

    #[test]
    fn test_domain_from_filtered_rows() {
        let scale = scale_of(&[3.0, -1.0, 7.5, f64::NAN]);
        assert_eq!(scale.domain(), Some((-1.0, 7.5)));
        assert_eq!(scale.color(-1.0), Rgb::new(0xff, 0xff, 0x00));
        assert_eq!(scale.color(7.5), Rgb::new(0xa6, 0x2b, 0xff));
    }

    #[test]
    fn test_monotonic_positions() {
        let scale = scale_of(&[1.0, 5.0, 10.0]);
        let (a, b, c) = (
            scale.position(1.0).unwrap(),
            scale.position(5.0).unwrap(),
            scale.position(10.0).unwrap(),
        );
        assert!(a < b && b < c);
        assert_ne!(scale.color(1.0), scale.color(5.0));
        assert_ne!(scale.color(5.0), scale.color(10.0));
    }

    #[test]
    fn test_empty_rows_give_neutral_scale() {
        let scale = scale_of(&[]);
        assert_eq!(scale, ColorScale::Neutral(NEUTRAL_FILL));
        assert_eq!(scale.color(0.0), NEUTRAL_FILL);
        assert_eq!(scale.color(1e9), NEUTRAL_FILL);
        assert!(scale.position(1.0).is_none());
    }

    #[test]
    fn test_nan_under_sequential_scale_uses_configured_neutral() {
        let rows = [row("USA", 1.0), row("FRA", 2.0)];
        let refs: Vec<&StatRow> = rows.iter().collect();
        let grey = Rgb::new(0x12, 0x34, 0x56);
        let scale = ColorScale::build(&refs, ColorRamp::default(), grey);
        assert_eq!(scale.domain(), Some((1.0, 2.0)));
        assert_eq!(scale.color(f64::NAN), grey);
        assert_eq!(scale.color(f64::INFINITY), grey);
    }

    #[test]
    fn test_single_value_maps_to_midpoint() {
        let scale = scale_of(&[10.0]);
        assert_eq!(scale.position(10.0), Some(0.5));
        assert_eq!(scale.color(10.0), ColorRamp::default().at(0.5));
    }

    #[test]
    fn test_rgb_midpoint() {
        // (255 + 166) / 2 = 210.5, (255 + 43) / 2 = 149, (0 + 255) / 2 = 127.5
        assert_eq!(ColorRamp::default().at(0.5), Rgb::new(211, 149, 128));
    }

    #[test]
    fn test_lab_endpoints_survive_round_trip() {
        let ramp = ColorRamp {
            gradient: Gradient::YellowPurple,
            space: InterpolationSpace::Lab,
        };
        let (start, end) = Gradient::YellowPurple.endpoints();
        let close = |a: Rgb, b: Rgb| {
            (a.r as i16 - b.r as i16).abs() <= 1
                && (a.g as i16 - b.g as i16).abs() <= 1
                && (a.b as i16 - b.b as i16).abs() <= 1
        };
        assert!(close(ramp.at(0.0), start));
        assert!(close(ramp.at(1.0), end));
        assert_ne!(ramp.at(0.5), ColorRamp::default().at(0.5));
    }

    #[test]
    fn test_gradient_names() {
        assert_eq!("Blues".parse::<Gradient>(), Ok(Gradient::Blues));
        assert!("plaid".parse::<Gradient>().is_err());
        assert_eq!("lab".parse::<InterpolationSpace>(), Ok(InterpolationSpace::Lab));
        assert_eq!(Gradient::ViridisEnds.next(), Gradient::YellowPurple);
    }
}
