//! Build script for aria-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates arm.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use aria_core::config::{ArmConfig, DriveType};

/// Servo outputs wired on the board (GPIO2..=GPIO6)
const BOARD_SERVOS: usize = 5;

/// STEP/DIR outputs wired on the board (GPIO10/GPIO11)
const BOARD_STEPPERS: usize = 1;

fn main() {
    setup_linker();
    validate_config();
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
    #[cfg(feature = "defmt")]
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate arm.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=arm.toml");

    let config_path = Path::new("arm.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: arm.toml not found!                                      ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds arm.toml as its joint configuration.        ║\n\
            ║  Please create one in the aria-firmware directory.               ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read arm.toml                                  ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Syntax and types, through the same serde model the firmware uses
    let config: ArmConfig = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid arm.toml                                         ║\n\
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

    if let Err(e) = config.validate() {
        errors.push(format!("Invalid configuration: {:?}", e));
    }
    validate_board_fit(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: arm.toml does not describe a usable arm                  ║\n\
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

    println!(
        "cargo:warning=arm.toml validated successfully ({} joints)",
        config.joint_count()
    );
}

/// Check the joints match the outputs the board has
fn validate_board_fit(config: &ArmConfig, errors: &mut Vec<String>) {
    let steppers = config
        .joints
        .iter()
        .filter(|j| j.drive == DriveType::Stepper)
        .count();
    let servos = config.joint_count() - steppers;

    if steppers != BOARD_STEPPERS {
        errors.push(format!(
            "Board drives {} stepper joint, arm.toml has {}",
            BOARD_STEPPERS, steppers
        ));
    }
    if servos != BOARD_SERVOS {
        errors.push(format!(
            "Board drives {} servo joints, arm.toml has {}",
            BOARD_SERVOS, servos
        ));
    }

    for (i, joint) in config.joints.iter().enumerate() {
        if joint.name.is_empty() {
            errors.push(format!("[[joint]] #{} has no name", i + 1));
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
