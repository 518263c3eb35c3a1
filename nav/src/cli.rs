//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pathcodec::Coordinate;

/// NavSession - live navigation session runner
#[derive(Parser)]
#[command(
    name = "nav",
    about = "Run live navigation sessions against a routing backend",
    version,
    after_help = "Logs are written to: ~/.local/share/navsession/logs/nav.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run a session against the live routing backend, walking a
    /// simulated position from start to destination
    Run {
        /// Start position as LAT,LON
        #[arg(long, value_parser = parse_coordinate)]
        start: Coordinate,

        /// Destination as LAT,LON
        #[arg(long, value_parser = parse_coordinate)]
        dest: Coordinate,
    },

    /// Run a session fully offline against a canned route
    Simulate {
        /// Start position as LAT,LON
        #[arg(long, value_parser = parse_coordinate)]
        start: Coordinate,

        /// Destination as LAT,LON
        #[arg(long, value_parser = parse_coordinate)]
        dest: Coordinate,
    },

    /// Decode an encoded path string and print its coordinates
    Decode {
        /// Encoded path (defaults to the reference sample)
        path: Option<String>,
    },
}

/// Parse "LAT,LON" into a validated coordinate
pub fn parse_coordinate(value: &str) -> Result<Coordinate, String> {
    let (lat_str, lon_str) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{value}'"))?;

    let lat: f64 = lat_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{lat_str}'"))?;
    let lon: f64 = lon_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{lon_str}'"))?;

    Coordinate::checked(lat, lon).ok_or_else(|| format!("coordinate ({lat}, {lon}) out of range"))
}

/// Path to the log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("navsession")
        .join("logs")
        .join("nav.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        let c = parse_coordinate("48.8566,2.3522").unwrap();
        assert!((c.lat - 48.8566).abs() < 1e-9);
        assert!((c.lon - 2.3522).abs() < 1e-9);
    }

    #[test]
    fn test_parse_coordinate_with_spaces() {
        let c = parse_coordinate("48.0, 0.2").unwrap();
        assert!((c.lon - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_parse_coordinate_rejects_bad_input() {
        assert!(parse_coordinate("48.0").is_err());
        assert!(parse_coordinate("abc,def").is_err());
        assert!(parse_coordinate("91.0,0.0").is_err());
        assert!(parse_coordinate("0.0,181.0").is_err());
    }
}
