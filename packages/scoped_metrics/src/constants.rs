// A poisoned lock means another thread panicked while mutating metrics state.
// The state may be incomplete, so continued execution is not safe (we panic).
pub(crate) const ERR_POISONED_LOCK: &str =
    "encountered poisoned lock - metrics state may be incomplete and can no longer be trusted";
