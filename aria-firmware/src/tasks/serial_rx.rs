//! Host UART receive task
//!
//! Forwards raw bytes to the control task. Parsing happens there so the
//! parser state has a single owner.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use crate::channels::{RX_BYTES, RX_DROPPED};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Serial RX task - moves received bytes into the byte channel
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    info!("Serial RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    // Never wait here; a stalled control task must not back
                    // up into the UART ring buffer
                    if RX_BYTES.try_send(byte).is_err() {
                        let dropped = RX_DROPPED.fetch_add(1, Ordering::Relaxed) + 1;
                        warn!("RX channel full, dropped {} bytes so far", dropped);
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
