use std::{thread, time::Duration};

/// Time source for the sort cycle's waits.
///
/// The workflow never calls `thread::sleep` directly so that tests can record
/// the waits instead of spending them.
pub trait Clock {
    fn sleep(&self, d: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn sleep(&self, d: Duration) {
        (**self).sleep(d)
    }
}
