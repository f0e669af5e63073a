//! Real-time channel management and polling fallback.
//!
//! Every live feed pairs a best-effort push channel with a pull loop over
//! the same authoritative REST resource. The channel may drop at any time
//! without affecting correctness; polling self-heals whatever it missed.

pub mod channel;
pub mod polling;
mod runtime;

pub use self::channel::{
    ChannelHandle, ChannelState, RealtimeChannel, RealtimeChannelConfig, RealtimeHandler,
};
pub use self::polling::{PollTarget, PollingHandle, PollingSync, PollingSyncConfig};
pub use self::runtime::{BackoffJitter, ReconnectJitter, Sleeper, TokioSleeper};
