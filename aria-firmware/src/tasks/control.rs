//! Arm control task
//!
//! Runs the controller loop as fast as the executor allows. Every pass
//! services the stepper, feeds whatever bytes have arrived through the
//! parser, advances the active move, then hands the queued replies to the
//! transmit task and yields.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_futures::yield_now;
use embassy_time::Instant;

use crate::board::ArmController;
use crate::channels::{REPLIES, RX_BYTES, TX_DROPPED};

/// Control task - owns the joint model and every actuator
#[embassy_executor::task]
pub async fn control_task(mut controller: ArmController) {
    info!(
        "Control task started ({} joints)",
        controller.joint_count()
    );

    controller.boot();
    let mut dropped_replies = controller.dropped_replies();

    loop {
        let now_ms = Instant::now().as_millis() as u32;

        // Only what is already buffered; waiting here would starve the stepper
        controller.tick(now_ms, core::iter::from_fn(|| RX_BYTES.try_receive().ok()));

        while let Some(reply) = controller.pop_reply() {
            debug!("Reply: {:?}", reply);
            if REPLIES.try_send(reply).is_err() {
                let dropped = TX_DROPPED.fetch_add(1, Ordering::Relaxed) + 1;
                warn!("Reply channel full, dropped {} lines so far", dropped);
            }
        }

        if controller.dropped_replies() != dropped_replies {
            dropped_replies = controller.dropped_replies();
            warn!("Reply queue overflowed, {} replies lost", dropped_replies);
        }

        yield_now().await;
    }
}
