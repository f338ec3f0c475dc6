//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::AtomicU32;

use aria_protocol::Reply;

/// Channel capacity for received bytes
const RX_CHANNEL_SIZE: usize = 64;

/// Channel capacity for outgoing reply lines
const REPLY_CHANNEL_SIZE: usize = 16;

/// Raw bytes from the host, in arrival order
pub static RX_BYTES: Channel<CriticalSectionRawMutex, u8, RX_CHANNEL_SIZE> = Channel::new();

/// Reply lines waiting for the UART
pub static REPLIES: Channel<CriticalSectionRawMutex, Reply, REPLY_CHANNEL_SIZE> = Channel::new();

/// Received bytes dropped because the control task fell behind
pub static RX_DROPPED: AtomicU32 = AtomicU32::new(0);

/// Reply lines dropped on the way to the UART
pub static TX_DROPPED: AtomicU32 = AtomicU32::new(0);
