//! Build script for biphase-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates bridge.toml and turns it into the `LINK_CONFIG` constant

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use biphase_core::config::LinkConfig;
use serde::Deserialize;

/// Top-level layout of bridge.toml
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BridgeFile {
    #[serde(default)]
    link: LinkConfig,
}

fn main() {
    setup_linker();
    let config = load_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse and validate bridge.toml
fn load_config() -> LinkConfig {
    println!("cargo:rerun-if-changed=bridge.toml");

    let config_path = Path::new("bridge.toml");

    // A missing file means "all defaults"
    if !config_path.exists() {
        println!("cargo:warning=bridge.toml not found, using default link settings");
        return LinkConfig::default();
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read bridge.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let file: BridgeFile = match toml::from_str(&content) {
        Ok(file) => file,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid bridge.toml                                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let config = file.link;
    if let Err(e) = config.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid [link] settings in bridge.toml                   ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&describe(&config, e))
        );
    }

    let (int_part, frac_part) = config.clock_divider();
    println!(
        "cargo:warning=bridge.toml validated: {} bit/s, PIO divider {}+{}/256",
        config.bit_rate_hz, int_part, frac_part
    );
    config
}

/// Human-readable explanation of a validation failure
fn describe(config: &LinkConfig, error: biphase_core::ConfigError) -> String {
    use biphase_core::ConfigError::*;
    match error {
        InvalidPin => format!(
            "tx_pin = {} / rx_pin = {}: GPIO must be 0..=29",
            config.tx_pin, config.rx_pin
        ),
        InvalidStateMachine => format!(
            "pio = {}, tx_sm = {}, rx_sm = {}: pio must be 0..=1, state machines 0..=3",
            config.pio, config.tx_sm, config.rx_sm
        ),
        PinConflict => "tx and rx must use different pins and state machines".to_string(),
        InvalidBitRate => format!(
            "bit_rate_hz = {} at {} cycles/bit needs a PIO divider below 1.0",
            config.bit_rate_hz, config.cycles_per_bit
        ),
        other => format!("{:?}", other),
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

/// Write `link_config.rs` into OUT_DIR
fn generate_config(config: &LinkConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let code = format!(
        "/// Link settings from bridge.toml\n\
        pub const LINK_CONFIG: LinkConfig = LinkConfig {{\n\
        \x20   tx_pin: {},\n\
        \x20   rx_pin: {},\n\
        \x20   pio: {},\n\
        \x20   tx_sm: {},\n\
        \x20   rx_sm: {},\n\
        \x20   bit_rate_hz: {},\n\
        \x20   cycles_per_bit: {},\n\
        \x20   sys_clk_hz: {},\n\
        \x20   self_test_on_boot: {},\n\
        }};\n",
        config.tx_pin,
        config.rx_pin,
        config.pio,
        config.tx_sm,
        config.rx_sm,
        config.bit_rate_hz,
        config.cycles_per_bit,
        config.sys_clk_hz,
        config.self_test_on_boot,
    );
    fs::write(out_dir.join("link_config.rs"), code).unwrap();
}
