//! Effective priority of an in-app activity.
//!
//! Priorities run from 1 (most visible) to 10. Everything from
//! [`LOW_VISIBILITY_FLOOR`] up is kept out of the default inbox view.

/// Lowest priority of the low-visibility band.
pub const LOW_VISIBILITY_FLOOR: u8 = 7;

/// Highest valid priority.
pub const MAX_PRIORITY: u8 = 10;

/// How far a muted notification is pushed down.
pub const DEMOTION_STEP: u8 = 4;

/// Resolve the priority stored for one recipient.
///
/// An explicit `override_` wins. Otherwise a recipient who disabled the
/// in-app channel still gets the activity, demoted into
/// `[LOW_VISIBILITY_FLOOR, MAX_PRIORITY]`.
pub fn resolve_priority(base: u8, in_app_enabled: bool, override_: Option<u8>) -> u8 {
    if let Some(priority) = override_ {
        return priority;
    }
    if in_app_enabled {
        return base;
    }
    base.saturating_add(DEMOTION_STEP)
        .max(LOW_VISIBILITY_FLOOR)
        .min(MAX_PRIORITY)
}
