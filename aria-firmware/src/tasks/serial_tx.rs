//! Host UART transmit task
//!
//! Renders reply lines and writes them out as they arrive.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::REPLIES;

/// Serial TX task - sends reply lines to the host
#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx) {
    info!("Serial TX task started");

    loop {
        let reply = REPLIES.receive().await;

        let line = match reply.render() {
            Ok(line) => line,
            Err(_) => {
                warn!("Reply too long to render: {:?}", reply);
                continue;
            }
        };

        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("Failed to send reply: {:?}", e);
        } else {
            trace!("TX: {}", line.as_str().trim_end());
        }
    }
}
