//! Canonical structured event names used across `call-control`.

// Event hub.
pub const HUB_LISTENER_REGISTERED: &str = "hub_listener_registered";
pub const HUB_LISTENER_UNREGISTERED: &str = "hub_listener_unregistered";
pub const HUB_LISTENER_UNKNOWN: &str = "hub_listener_unknown";
pub const HUB_DELIVERY_STOPPED: &str = "hub_delivery_stopped";
pub const HUB_DISPATCH: &str = "hub_dispatch";

// Origination correlation.
pub const ORIGINATE_START: &str = "originate_start";
pub const ORIGINATE_SKIPPED_HUNGUP: &str = "originate_skipped_hungup";
pub const ORIGINATE_TIMEOUT_FALLBACK: &str = "originate_timeout_fallback";
pub const ORIGINATE_SEND_FAILED: &str = "originate_send_failed";
pub const ORIGINATE_REJECTED: &str = "originate_rejected";
pub const ORIGINATE_WAIT_EXPIRED: &str = "originate_wait_expired";
pub const ORIGINATE_OK: &str = "originate_ok";
pub const ORIGINATE_FAILED: &str = "originate_failed";
pub const ORIGINATE_ABORT: &str = "originate_abort";
pub const ORIGINATE_RESPONSE_MATCHED: &str = "originate_response_matched";
pub const ORIGINATE_RESPONSE_FOREIGN: &str = "originate_response_foreign";
pub const ORIGINATE_TOKEN_UNSET: &str = "originate_token_unset";
pub const DISCOVERY_CANDIDATE_SKIPPED: &str = "discovery_candidate_skipped";
pub const DISCOVERY_LOOKUP_EXHAUSTED: &str = "discovery_lookup_exhausted";
pub const DISCOVERY_FOREIGN_TOKEN: &str = "discovery_foreign_token";
pub const DISCOVERY_CHANNEL_MATCHED: &str = "discovery_channel_matched";
pub const DESTINATION_HANGUP: &str = "destination_hangup";
pub const MONITOR_HANGUP: &str = "monitor_hangup";
pub const CLEANUP_HANGUP_FAILED: &str = "cleanup_hangup_failed";
pub const REGISTRATION_RELEASE_FAILED: &str = "registration_release_failed";

// Split activity.
pub const SPLIT_START: &str = "split_start";
pub const SPLIT_PRECONDITION_FAILED: &str = "split_precondition_failed";
pub const SPLIT_QUIESCENCE_FAILED: &str = "split_quiescence_failed";
pub const SPLIT_TAG_FAILED: &str = "split_tag_failed";
pub const SPLIT_REDIRECT_FAILED: &str = "split_redirect_failed";
pub const SPLIT_REDIRECT_REJECTED: &str = "split_redirect_rejected";
pub const SPLIT_WAITING_ON_CHANNEL: &str = "split_waiting_on_channel";
pub const SPLIT_OK: &str = "split_ok";
pub const SPLIT_FAILED: &str = "split_failed";
pub const HOLD_REACHED: &str = "hold_reached";

// Activity runner.
pub const ACTIVITY_STATUS: &str = "activity_status";
