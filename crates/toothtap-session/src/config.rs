//! Session tuning knobs.

use serde::Deserialize;

use toothtap_economy::DEFAULT_MAX_IDLE_MS;

/// Configuration for player sessions and their event ledgers.
///
/// Loaded from the `session:` section of `toothtap.yaml`; every field
/// has a default matching the design values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Sustained tap-rate ceiling enforced against server wall time.
    #[serde(default = "default_max_taps_per_second")]
    pub max_taps_per_second: u32,

    /// Extra taps tolerated above the sustained ceiling so one
    /// client-side flush interval never trips the limit.
    #[serde(default = "default_tap_burst_allowance")]
    pub tap_burst_allowance: u32,

    /// Ceiling on the idle-earnings window in milliseconds.
    #[serde(default = "default_max_idle_ms")]
    pub max_idle_ms: i64,

    /// Maximum purchase request IDs remembered per player.
    #[serde(default = "default_ledger_max_requests")]
    pub ledger_max_requests: usize,

    /// Age after which a remembered purchase request is evicted, seconds.
    #[serde(default = "default_ledger_request_ttl_secs")]
    pub ledger_request_ttl_secs: i64,

    /// Width of the per-session replay window: applied tap sequence
    /// numbers this far below the highest one are remembered for
    /// deduplication; anything older is rejected as out of order.
    #[serde(default = "default_ledger_sequence_window")]
    pub ledger_sequence_window: u64,

    /// Maximum connection-session sequence records remembered per player.
    #[serde(default = "default_ledger_max_sessions")]
    pub ledger_max_sessions: usize,

    /// Age after which an untouched session record is evicted, seconds.
    #[serde(default = "default_ledger_session_ttl_secs")]
    pub ledger_session_ttl_secs: i64,

    /// Capacity of each session actor's command mailbox.
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    /// How long an actor with zero connections lingers before it
    /// persists and exits, in milliseconds. The linger keeps the event
    /// ledger alive across quick reconnects and back-to-back REST
    /// calls, preserving the replay window.
    #[serde(default = "default_actor_linger_ms")]
    pub actor_linger_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_taps_per_second: default_max_taps_per_second(),
            tap_burst_allowance: default_tap_burst_allowance(),
            max_idle_ms: default_max_idle_ms(),
            ledger_max_requests: default_ledger_max_requests(),
            ledger_request_ttl_secs: default_ledger_request_ttl_secs(),
            ledger_sequence_window: default_ledger_sequence_window(),
            ledger_max_sessions: default_ledger_max_sessions(),
            ledger_session_ttl_secs: default_ledger_session_ttl_secs(),
            mailbox_capacity: default_mailbox_capacity(),
            actor_linger_ms: default_actor_linger_ms(),
        }
    }
}

const fn default_max_taps_per_second() -> u32 {
    10
}

const fn default_tap_burst_allowance() -> u32 {
    30
}

const fn default_max_idle_ms() -> i64 {
    DEFAULT_MAX_IDLE_MS
}

const fn default_ledger_max_requests() -> usize {
    256
}

const fn default_ledger_request_ttl_secs() -> i64 {
    900
}

const fn default_ledger_sequence_window() -> u64 {
    256
}

const fn default_ledger_max_sessions() -> usize {
    16
}

const fn default_ledger_session_ttl_secs() -> i64 {
    3_600
}

const fn default_mailbox_capacity() -> usize {
    64
}

const fn default_actor_linger_ms() -> u64 {
    30_000
}
