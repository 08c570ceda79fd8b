#![allow(unused_macros)]

/// Helper macro for locking items, turning a poisoned lock into [`crate::Error::LockError`]
///
/// Only usable inside functions returning [`crate::Result`].
///
/// ```rust, ignore
///  let mut slot = lock!(module.container);
///  slot.handle = Some(opened);
/// ```
macro_rules! lock {
    ($lock:expr) => {
        $lock.lock().map_err(|_| crate::Error::LockError)?
    };
}

/// Helper macro for running a closure on a locked item
///
/// ```rust, ignore
///  let opened = with_lock!(module.container, |slot| slot.handle.is_some());
/// ```
macro_rules! with_lock {
    ($lock:expr, $closure:expr) => {{
        let mut guard = lock!($lock);
        $closure(&mut *guard)
    }};
}
