//! Coordinate value type and encoded-polyline path codec
//!
//! A routing backend returns its path geometry as a compact ASCII string:
//! per point, a latitude delta then a longitude delta from the previous
//! point, each delta zig-zag encoded, split into 5-bit groups emitted
//! low-to-high, every group biased by +63 with bit 6 marking continuation.
//! Integer values are degrees scaled by 1e5.
//!
//! The string is opaque to every other layer; only this crate reads or
//! writes it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Degrees-to-integer scale used by the encoding (5 decimal places)
const SCALE: f64 = 1e5;

/// Mean Earth radius in meters, used for great-circle distances
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Errors produced while decoding an encoded path string
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// Input ended while a value's continuation bit was still set
    #[error("encoded path truncated mid-value at byte {offset}")]
    Truncated { offset: usize },

    /// Byte outside the printable biased range, or one that would push a
    /// value past 64 bits
    #[error("invalid byte {byte:#04x} in encoded path at offset {offset}")]
    InvalidByte { byte: u8, offset: usize },

    /// Running coordinate sums left the valid latitude/longitude ranges
    #[error("decoded point ({lat}, {lon}) outside valid coordinate ranges")]
    OutOfRange { lat: f64, lon: f64 },
}

/// A geographic position in degrees
///
/// Valid latitudes are [-90, 90], valid longitudes [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate from degrees
    ///
    /// Validity is the caller's responsibility; use [`Coordinate::checked`]
    /// for untrusted input.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a coordinate, rejecting out-of-range degrees
    pub fn checked(lat: f64, lon: f64) -> Option<Self> {
        let c = Self { lat, lon };
        c.is_valid().then_some(c)
    }

    /// Whether both components are within valid ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance to another coordinate in meters
    ///
    /// Haversine on a sphere of mean Earth radius. Flat per-degree math is
    /// not a substitute: a degree of longitude shrinks with latitude.
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }
}

/// Decode an encoded path string into its coordinate sequence
///
/// Reconstructs running latitude/longitude sums from the per-point deltas;
/// the first point's delta is taken from (0, 0). An empty string decodes to
/// an empty sequence. Fails without partial output on truncated or invalid
/// input.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PathError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut offset = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while offset < bytes.len() {
        let (dlat, next) = decode_value(bytes, offset)?;
        let (dlon, next) = decode_value(bytes, next)?;
        offset = next;

        lat += dlat;
        lon += dlon;

        let point = Coordinate::new(lat as f64 / SCALE, lon as f64 / SCALE);
        if !point.is_valid() {
            return Err(PathError::OutOfRange {
                lat: point.lat,
                lon: point.lon,
            });
        }
        points.push(point);
    }

    Ok(points)
}

/// Encode a coordinate sequence into the compact path string
///
/// Exact inverse of [`decode`] for input quantized to 1e-5 degrees:
/// `decode(&encode(&seq))` reproduces `seq` up to that quantization.
pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lon: i64 = 0;

    for point in points {
        let lat = (point.lat * SCALE).round() as i64;
        let lon = (point.lon * SCALE).round() as i64;
        encode_value(lat - prev_lat, &mut out);
        encode_value(lon - prev_lon, &mut out);
        prev_lat = lat;
        prev_lon = lon;
    }

    out
}

/// Decode one zig-zag varint starting at `offset`, returning the signed
/// value and the offset of the next value
fn decode_value(bytes: &[u8], mut offset: usize) -> Result<(i64, usize), PathError> {
    let mut accum: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(offset) else {
            return Err(PathError::Truncated { offset });
        };
        if !(63..=127).contains(&byte) {
            return Err(PathError::InvalidByte { byte, offset });
        }
        // 12 groups carry 60 bits, far beyond any scaled coordinate delta;
        // a 13th would shift past the accumulator
        if shift > 58 {
            return Err(PathError::InvalidByte { byte, offset });
        }

        let group = (byte - 63) as u64;
        accum |= (group & 0x1f) << shift;
        shift += 5;
        offset += 1;

        if group & 0x20 == 0 {
            break;
        }
    }

    let value = (accum >> 1) as i64 ^ -((accum & 1) as i64);
    Ok((value, offset))
}

/// Append one signed value as a zig-zag varint
fn encode_value(value: i64, out: &mut String) {
    let mut accum = ((value << 1) ^ (value >> 63)) as u64;

    loop {
        let mut group = (accum & 0x1f) as u8;
        accum >>= 5;
        if accum != 0 {
            group |= 0x20;
        }
        out.push((group + 63) as char);
        if accum == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // The reference vector for this encoding, three points in the Sierra
    // Nevada published with the format's definition.
    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn reference_points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(38.5, -120.2),
            Coordinate::new(40.7, -120.95),
            Coordinate::new(43.252, -126.453),
        ]
    }

    #[test]
    fn test_decode_empty_string() {
        assert_eq!(decode("").unwrap(), vec![]);
    }

    #[test]
    fn test_decode_reference_vector() {
        let points = decode(REFERENCE).unwrap();
        assert_eq!(points.len(), 3);
        for (got, want) in points.iter().zip(reference_points()) {
            assert!((got.lat - want.lat).abs() < 1e-9, "lat {} != {}", got.lat, want.lat);
            assert!((got.lon - want.lon).abs() < 1e-9, "lon {} != {}", got.lon, want.lon);
        }
    }

    #[test]
    fn test_encode_reference_vector() {
        assert_eq!(encode(&reference_points()), REFERENCE);
    }

    #[test]
    fn test_decode_single_point() {
        // One point at (0.00001, -0.00001): deltas +1 and -1
        let points = decode(&encode(&[Coordinate::new(0.00001, -0.00001)])).unwrap();
        assert_eq!(points.len(), 1);
        assert!((points[0].lat - 0.00001).abs() < 1e-9);
        assert!((points[0].lon + 0.00001).abs() < 1e-9);
    }

    #[test]
    fn test_truncated_mid_value_is_error() {
        // '_' is 95: group 0x20, continuation bit set with no byte after it
        assert_eq!(decode("_"), Err(PathError::Truncated { offset: 1 }));
    }

    #[test]
    fn test_truncated_reference_is_error() {
        // Drop the final byte so the last longitude value never terminates
        let cut = &REFERENCE[..REFERENCE.len() - 1];
        assert!(matches!(decode(cut), Err(PathError::Truncated { .. })));
    }

    #[test]
    fn test_byte_below_bias_is_error() {
        assert_eq!(
            decode(" "),
            Err(PathError::InvalidByte { byte: b' ', offset: 0 })
        );
    }

    #[test]
    fn test_out_of_range_sum_is_error() {
        // A single delta of 100 degrees latitude leaves the valid range
        let mut s = String::new();
        encode_value(100_00000, &mut s);
        encode_value(0, &mut s);
        assert!(matches!(decode(&s), Err(PathError::OutOfRange { .. })));
    }

    #[test]
    fn test_decode_does_not_partially_apply() {
        // Valid first point followed by a truncated second one: the whole
        // decode fails rather than returning one point
        let mut s = encode(&[Coordinate::new(48.0, 2.0)]);
        s.push('_');
        assert!(decode(&s).is_err());
    }

    #[test]
    fn test_coordinate_checked() {
        assert!(Coordinate::checked(48.85, 2.35).is_some());
        assert!(Coordinate::checked(90.1, 0.0).is_none());
        assert!(Coordinate::checked(0.0, -180.5).is_none());
    }

    #[test]
    fn test_distance_one_millidegree_at_equator() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.001, 0.0);
        let d = a.distance_m(&b);
        // 6371000 * pi / 180 * 0.001 ~ 111.19 m
        assert!((d - 111.19).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn test_distance_longitude_shrinks_with_latitude() {
        let eq = Coordinate::new(0.0, 0.0).distance_m(&Coordinate::new(0.0, 1.0));
        let north = Coordinate::new(60.0, 0.0).distance_m(&Coordinate::new(60.0, 1.0));
        // cos(60 deg) = 0.5
        assert!((north / eq - 0.5).abs() < 0.01, "ratio {}", north / eq);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = Coordinate::new(48.8566, 2.3522);
        let b = Coordinate::new(51.5074, -0.1278);
        assert!((a.distance_m(&b) - b.distance_m(&a)).abs() < 1e-6);
    }

    fn quantized(value: f64) -> f64 {
        (value * 1e5).round() / 1e5
    }

    proptest! {
        #[test]
        fn prop_round_trip(points in prop::collection::vec((-90.0f64..90.0, -180.0f64..180.0), 0..50)) {
            let seq: Vec<Coordinate> = points
                .iter()
                .map(|&(lat, lon)| Coordinate::new(quantized(lat), quantized(lon)))
                .collect();

            let decoded = decode(&encode(&seq)).unwrap();
            prop_assert_eq!(decoded.len(), seq.len());
            for (got, want) in decoded.iter().zip(&seq) {
                prop_assert!((got.lat - want.lat).abs() < 1e-9);
                prop_assert!((got.lon - want.lon).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_encode_deterministic(points in prop::collection::vec((-90.0f64..90.0, -180.0f64..180.0), 0..20)) {
            let seq: Vec<Coordinate> = points
                .iter()
                .map(|&(lat, lon)| Coordinate::new(quantized(lat), quantized(lon)))
                .collect();
            prop_assert_eq!(encode(&seq), encode(&seq));
        }
    }
}
