use std::{
    sync::{Arc, Condvar, Mutex},
    time::{Duration, Instant},
};

/// Cloneable flag stopping the notifier loop, waking it up when it
/// sleeps between two ticks.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (cancelled, cvar) = &*self.inner;
        *cancelled.lock().unwrap_or_else(|err| err.into_inner()) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Sleeps for the given duration unless cancelled in the meantime.
    /// Returns whether the token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (cancelled, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut guard = cancelled.lock().unwrap_or_else(|err| err.into_inner());

        while !*guard {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            guard = match cvar.wait_timeout(guard, deadline - now) {
                Ok((guard, _)) => guard,
                Err(err) => err.into_inner().0,
            };
        }

        *guard
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn it_should_wake_up_on_cancel() {
        let token = CancellationToken::new();
        assert!(!token.wait_timeout(Duration::from_millis(10)));

        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.cancel();
        });

        let start = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(token.is_cancelled());
        handle.join().unwrap();
    }
}
