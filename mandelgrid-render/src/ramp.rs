use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use image::Rgb;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Hex colors
// ---------------------------------------------------------------------------

/// Parse an `RRGGBB` hex color. A leading `#` is accepted.
pub fn parse_hex(hex: &str) -> crate::Result<Rgb<u8>> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RenderError::InvalidColor(hex.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| RenderError::InvalidColor(hex.to_string()))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// Format a color as uppercase `RRGGBB`.
pub fn to_hex(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("{r:02X}{g:02X}{b:02X}")
}

// ---------------------------------------------------------------------------
// Stops
// ---------------------------------------------------------------------------

/// A color pinned to an index of the ramp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub position: u32,
    pub color: String,
}

impl Stop {
    pub fn new(position: u32, color: impl Into<String>) -> Self {
        Self {
            position,
            color: color.into(),
        }
    }

    pub fn rgb(&self) -> crate::Result<Rgb<u8>> {
        parse_hex(&self.color)
    }
}

/// Blue, white, orange and back to near-black over 256 entries.
pub fn default_stops() -> Vec<Stop> {
    vec![
        Stop::new(0, "000764"),
        Stop::new(64, "206BCB"),
        Stop::new(128, "EDFFFF"),
        Stop::new(192, "FFAA00"),
        Stop::new(256, "000200"),
    ]
}

pub fn read_stops(path: &Path) -> crate::Result<Vec<Stop>> {
    let stops: Vec<Stop> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    debug!(path = %path.display(), stops = stops.len(), "color stops loaded");
    Ok(stops)
}

pub fn write_stops(stops: &[Stop], path: &Path) -> crate::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, stops)?;
    writer.flush()?;
    Ok(())
}

/// Interpolate a ramp between consecutive stops.
///
/// Each segment starts with the current stop's color and advances by a
/// per-channel step of `round(Δ / gap)` where `gap` is the distance to the
/// next stop; the last stop's color is appended at the end. Indices are
/// counted from the first stop, so with a first stop at `0` every stop's
/// color lands exactly at its position. Positions must strictly increase.
/// A single stop yields a one-color ramp.
pub fn make_ramp(stops: &[Stop]) -> crate::Result<Vec<Rgb<u8>>> {
    let (last, _) = stops.split_last().ok_or(RenderError::EmptyRamp)?;
    if stops.len() == 1 {
        return Ok(vec![last.rgb()?]);
    }

    let mut ramp = Vec::new();
    for pair in stops.windows(2) {
        let (cur, next) = (&pair[0], &pair[1]);
        if next.position <= cur.position {
            return Err(RenderError::InvalidStops(format!(
                "positions must increase, got {} then {}",
                cur.position, next.position
            )));
        }
        let gap = (next.position - cur.position) as f64;
        let (from, to) = (cur.rgb()?, next.rgb()?);
        let delta: [i32; 3] =
            std::array::from_fn(|ch| ((to[ch] as f64 - from[ch] as f64) / gap).round() as i32);

        for i in 0..next.position - cur.position {
            let i = i as i32;
            ramp.push(Rgb(std::array::from_fn(|ch| {
                (from[ch] as i32 + i * delta[ch]).clamp(0, 255) as u8
            })));
        }
    }
    ramp.push(last.rgb()?);
    Ok(ramp)
}

// ---------------------------------------------------------------------------
// Ramp
// ---------------------------------------------------------------------------

/// An ordered, non-empty list of colors indexed by iteration count.
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp {
    colors: Vec<Rgb<u8>>,
}

impl Ramp {
    pub fn from_colors(colors: Vec<Rgb<u8>>) -> crate::Result<Self> {
        if colors.is_empty() {
            return Err(RenderError::EmptyRamp);
        }
        Ok(Self { colors })
    }

    pub fn from_stops(stops: &[Stop]) -> crate::Result<Self> {
        Self::from_colors(make_ramp(stops)?)
    }

    /// Read stops from a JSON file and interpolate them.
    pub fn load(path: &Path) -> crate::Result<Self> {
        Self::from_stops(&read_stops(path)?)
    }

    /// Color for an escaped point; iteration counts wrap around the ramp.
    #[inline]
    pub fn color_for(&self, iterations: u32) -> Rgb<u8> {
        self.colors[iterations as usize % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_ramp(stops: &[Stop], want_len: usize) {
        let ramp = make_ramp(stops).unwrap();
        assert_eq!(ramp.len(), want_len);
        for s in stops {
            assert_eq!(ramp[s.position as usize], s.rgb().unwrap(), "stop at {}", s.position);
        }
    }

    #[test]
    fn ramp_lengths_and_stop_positions() {
        check_ramp(&[Stop::new(0, "000000"), Stop::new(16, "FFFFFF")], 17);
        check_ramp(
            &[Stop::new(0, "FFFFFF"), Stop::new(16, "000000"), Stop::new(32, "FFFFFF")],
            33,
        );
        check_ramp(
            &[Stop::new(0, "FF0000"), Stop::new(64, "00FF00"), Stop::new(128, "0000FF")],
            129,
        );
        check_ramp(&[Stop::new(0, "FF0000"), Stop::new(32, "0000FF")], 33);
        check_ramp(&[Stop::new(0, "000000"), Stop::new(1, "FFFFFF")], 2);
        check_ramp(
            &[Stop::new(0, "FFFFFF"), Stop::new(128, "000000"), Stop::new(256, "FFFFFF")],
            257,
        );
        check_ramp(&default_stops(), 257);
    }

    #[test]
    fn interpolation_steps() {
        let ramp = make_ramp(&[Stop::new(0, "000000"), Stop::new(16, "FFFFFF")]).unwrap();
        // round(255 / 16) = 16
        assert_eq!(ramp[1], Rgb([16, 16, 16]));
        assert_eq!(ramp[15], Rgb([240, 240, 240]));
        assert_eq!(ramp[16], Rgb([255, 255, 255]));
    }

    #[test]
    fn invalid_stops() {
        assert!(matches!(make_ramp(&[]), Err(RenderError::EmptyRamp)));
        assert!(matches!(
            make_ramp(&[Stop::new(4, "000000"), Stop::new(4, "FFFFFF")]),
            Err(RenderError::InvalidStops(_))
        ));
        assert!(matches!(
            make_ramp(&[Stop::new(0, "000000"), Stop::new(8, "nothex")]),
            Err(RenderError::InvalidColor(_))
        ));
        assert_eq!(make_ramp(&[Stop::new(3, "808080")]).unwrap(), vec![Rgb([128, 128, 128])]);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex("000000").unwrap(), Rgb([0, 0, 0]));
        assert_eq!(parse_hex("FFFFFF").unwrap(), Rgb([255, 255, 255]));
        assert_eq!(parse_hex("0000FF").unwrap(), Rgb([0, 0, 255]));
        assert_eq!(parse_hex("808080").unwrap(), Rgb([128, 128, 128]));
        assert_eq!(parse_hex("#ff8000").unwrap(), Rgb([255, 128, 0]));
        for bad in ["", "FFF", "GGGGGG", "+FFFFF", "FFFFFFFF", "ÿÿÿ"] {
            assert!(parse_hex(bad).is_err(), "{bad:?}");
        }
        assert_eq!(to_hex(Rgb([255, 128, 0])), "FF8000");
    }

    #[test]
    fn ramp_wraps_iterations() {
        let ramp = Ramp::from_colors(vec![Rgb([1, 1, 1]), Rgb([2, 2, 2]), Rgb([3, 3, 3])]).unwrap();
        assert_eq!(ramp.color_for(0), Rgb([1, 1, 1]));
        assert_eq!(ramp.color_for(4), Rgb([2, 2, 2]));
        assert_eq!(ramp.len(), 3);
        assert!(Ramp::from_colors(Vec::new()).is_err());
    }

    #[test]
    fn stops_file_round_trip() {
        let dir = std::env::temp_dir().join("mandelgrid_test_ramp");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ramp.json");

        write_stops(&default_stops(), &path).unwrap();
        assert_eq!(read_stops(&path).unwrap(), default_stops());
        assert_eq!(Ramp::load(&path).unwrap().len(), 257);

        std::fs::remove_dir_all(&dir).ok();
    }
}
