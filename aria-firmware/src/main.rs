//! A.R.I.A. - Arm motion controller firmware
//!
//! Main firmware binary for RP2040-based arm controller boards. A stepper
//! turns the base; hobby servos drive the shoulder, elbow, wrist and
//! gripper. The host sends text commands over UART0.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::Pwm;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use heapless::Vec;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use aria_core::config::{parse_config, ArmConfig, DriveType};
use aria_core::controller::Controller;
use aria_drivers::servo::PwmServo;
use aria_drivers::stepper::{AccelStepper, StepperPins};

use crate::board::{EmbassyClock, JointServo, SERVO_COUNT};

mod board;
mod channels;
mod tasks;

/// Embedded arm configuration (compiled into firmware)
/// Edit arm.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../arm.toml");

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("A.R.I.A. firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    info!(
        "Configuration loaded: {} joints, stepper {} steps/deg",
        config.joint_count(),
        config.stepper.steps_per_degree
    );

    // Setup UART for the host link
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.serial.baud;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", config.serial.baud);

    // Base stepper (STEP=GPIO10, DIR=GPIO11)
    let pins = StepperPins {
        step: Output::new(p.PIN_10, Level::Low),
        dir: Output::new(p.PIN_11, Level::Low),
    };
    let stepper = AccelStepper::new(pins, EmbassyClock, Delay, config.stepper.pulse_width_us);

    info!("Stepper initialized");

    // Servo PWM: slice 1 (GPIO2/3), slice 2 (GPIO4/5), slice 3 (GPIO6)
    let pwm_config = board::servo_pwm_config(&config.servo);
    let (shoulder, elbow) =
        Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, pwm_config.clone()).split();
    let (wrist_roll, wrist_pitch) =
        Pwm::new_output_ab(p.PWM_SLICE2, p.PIN_4, p.PIN_5, pwm_config.clone()).split();
    let (gripper, _) = Pwm::new_output_a(p.PWM_SLICE3, p.PIN_6, pwm_config).split();

    let mut servos: Vec<JointServo, SERVO_COUNT> = Vec::new();
    for output in [shoulder, elbow, wrist_roll, wrist_pitch, gripper]
        .into_iter()
        .flatten()
    {
        let _ = servos.push(PwmServo::new(output, &config.servo));
    }

    info!("{} servo channels initialized", servos.len());

    let controller = match Controller::new(&config, [stepper], servos, Delay) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Failed to bind joints to board outputs: {:?}", e);
            loop {
                embassy_time::Timer::after_secs(60).await;
            }
        }
    };

    // Spawn tasks
    unwrap!(spawner.spawn(tasks::serial_rx_task(rx)));
    unwrap!(spawner.spawn(tasks::serial_tx_task(tx)));
    unwrap!(spawner.spawn(tasks::control_task(controller)));

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!(
            "Heartbeat: rx dropped {}, tx dropped {}",
            channels::RX_DROPPED.load(core::sync::atomic::Ordering::Relaxed),
            channels::TX_DROPPED.load(core::sync::atomic::Ordering::Relaxed)
        );
    }
}

/// Parse the embedded configuration
///
/// Falls back to the built-in defaults if arm.toml is unusable or does not
/// match the board's outputs.
fn load_config() -> ArmConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) if fits_board(&config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Ok(_) => {
            error!("Embedded config does not match board outputs");
            error!("Using default configuration");
            ArmConfig::default()
        }
        Err(e) => {
            // build.rs rejects a broken arm.toml, so this is a parser mismatch
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            ArmConfig::default()
        }
    }
}

/// One stepper joint and exactly as many servo joints as the board has
fn fits_board(config: &ArmConfig) -> bool {
    let steppers = config
        .joints
        .iter()
        .filter(|j| j.drive == DriveType::Stepper)
        .count();
    steppers == 1 && config.joint_count() - steppers == SERVO_COUNT
}
