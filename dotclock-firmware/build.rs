//! Build script for dotclock-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates display.toml at compile time
//! - Generates the default `DisplayConfig` from display.toml

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const TILINGS: [(&str, &str); 3] = [
    ("horizontal", "Horizontal"),
    ("vertical", "Vertical"),
    ("vertical-flip", "VerticalFlip"),
];

const SAMPLE_SIZES: [i64; 6] = [16, 32, 64, 128, 256, 512];

const INTERVALS: [&str; 7] = [
    "colon_blink_ms",
    "setting_blink_ms",
    "dither_ms",
    "decay_ms",
    "debounce_ms",
    "loop_slice_ms",
    "loading_frame_ms",
];

fn main() {
    setup_linker();
    let config = validate_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated display.toml values
struct Config {
    chain_length: i64,
    tiling: &'static str,
    intensity: i64,
    width: i64,
    height: i64,
    sample_size: i64,
    sample_rate_hz: i64,
    gain: i64,
    utc_offset_minutes: i64,
    intervals: Vec<(&'static str, i64)>,
}

/// Validate display.toml configuration at compile time
fn validate_config() -> Config {
    // Re-run if display.toml changes
    println!("cargo:rerun-if-changed=display.toml");

    let config_path = Path::new("display.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: display.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a display.toml configuration file.        ║\n\
            ║  Please create one in the dotclock-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read display.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in display.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let chain_length = integer(&config, "chain", "length", 1..=16, &mut errors);
    let intensity = integer(&config, "chain", "intensity", 0..=15, &mut errors);
    let tiling = match config.get("chain").and_then(|c| c.get("tiling")) {
        Some(toml::Value::String(name)) => match TILINGS.iter().find(|(n, _)| n == name) {
            Some((_, variant)) => *variant,
            None => {
                errors.push(
                    "[chain] tiling must be 'horizontal', 'vertical' or 'vertical-flip'"
                        .to_string(),
                );
                "Horizontal"
            }
        },
        _ => {
            errors.push("[chain] missing 'tiling'".to_string());
            "Horizontal"
        }
    };

    let width = integer(&config, "canvas", "width", 8..=1024, &mut errors);
    let height = integer(&config, "canvas", "height", 8..=1024, &mut errors);
    if width % 8 != 0 || height % 8 != 0 {
        errors.push("[canvas] width and height must be multiples of 8".to_string());
    } else if width * height / 8 > 128 {
        errors.push("[canvas] width * height / 8 must not exceed 128 bytes".to_string());
    }

    let sample_size = integer(&config, "spectrum", "sample_size", 16..=512, &mut errors);
    if !SAMPLE_SIZES.contains(&sample_size) {
        errors.push("[spectrum] sample_size must be 16, 32, 64, 128, 256 or 512".to_string());
    }
    let sample_rate_hz = integer(&config, "spectrum", "sample_rate_hz", 1..=500_000, &mut errors);
    let gain = integer(&config, "spectrum", "gain", 0..=100, &mut errors);

    let utc_offset_minutes =
        integer(&config, "clock", "utc_offset_minutes", -720..=840, &mut errors);

    let intervals = INTERVALS
        .iter()
        .map(|key| (*key, integer(&config, "intervals", key, 1..=60_000, &mut errors)))
        .collect();

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid display configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    // Uncovered cells are legal but usually a wiring mistake
    if width * height != 64 * chain_length {
        println!(
            "cargo:warning=display.toml: {}x{} canvas does not match {} modules",
            width, height, chain_length
        );
    }

    println!("cargo:warning=display.toml validated successfully");

    Config {
        chain_length,
        tiling,
        intensity,
        width,
        height,
        sample_size,
        sample_rate_hz,
        gain,
        utc_offset_minutes,
        intervals,
    }
}

/// Read an integer field and check its range
fn integer(
    config: &toml::Value,
    section: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> i64 {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(value)) if range.contains(value) => *value,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "[{}] {} must be {}-{}",
                section,
                key,
                range.start(),
                range.end()
            ));
            *range.start()
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            *range.start()
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            *range.start()
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the default configuration and the build time into OUT_DIR
fn generate_config(config: &Config) {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    // The clock has no RTC, so it boots at the build time
    let build_time = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0)
        });

    let intervals = config
        .intervals
        .iter()
        .map(|(key, value)| format!("        {}: {},\n", key, value))
        .collect::<String>();

    let source = format!(
        "/// Display configuration compiled from display.toml\n\
         pub const DISPLAY_CONFIG: dotclock_core::config::DisplayConfig =\n    \
         dotclock_core::config::DisplayConfig {{\n    \
         chain_length: {},\n    \
         width: {},\n    \
         height: {},\n    \
         tiling: dotclock_core::config::Tiling::{},\n    \
         sample_size: {},\n    \
         sample_rate_hz: {},\n    \
         default_gain: {},\n    \
         intensity: {},\n    \
         utc_offset_minutes: {},\n    \
         intervals: dotclock_core::config::Intervals {{\n{}    }},\n}};\n\n\
         /// Unix time the firmware was built at\n\
         pub const BUILD_UNIX_TIME: i64 = {};\n",
        config.chain_length,
        config.width,
        config.height,
        config.tiling,
        config.sample_size,
        config.sample_rate_hz,
        config.gain,
        config.intensity,
        config.utc_offset_minutes,
        intervals,
        build_time,
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("display_config.rs"), source).unwrap();
}
