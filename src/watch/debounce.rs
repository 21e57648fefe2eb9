//! Debouncing of save-file change signals
//!
//! The game writes its save files in bursts. A burst is collapsed into one
//! firing once no signal arrived for the quiet period, or once the burst has
//! lasted for the max wait, whichever comes first.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Debounce state with a quiet-period deadline and a max-wait ceiling
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_period: Duration,
    max_wait: Duration,
    last_signal: Option<Instant>,
    burst_start: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration, max_wait: Duration) -> Self {
        Self {
            quiet_period,
            max_wait,
            last_signal: None,
            burst_start: None,
        }
    }

    /// Record a signal received at `now`
    pub fn signal(&mut self, now: Instant) {
        self.last_signal = Some(now);
        self.burst_start.get_or_insert(now);
    }

    /// Whether signals were received since the last firing
    pub fn is_pending(&self) -> bool {
        self.last_signal.is_some()
    }

    /// When the pending burst fires, `None` if nothing is pending
    pub fn deadline(&self) -> Option<Instant> {
        let quiet = self.last_signal? + self.quiet_period;
        let ceiling = self.burst_start? + self.max_wait;
        Some(quiet.min(ceiling))
    }

    /// Fire if the deadline has passed at `now`
    ///
    /// Returns true at most once per burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.last_signal = None;
        self.burst_start = None;
    }
}

/// Run `fire` for every debounced burst of messages on `signals`
///
/// Blocks until the sending side disconnects. A burst still pending at that
/// point fires once before returning.
pub fn drive<T, F>(debouncer: &mut Debouncer, signals: &Receiver<T>, mut fire: F)
where
    F: FnMut(),
{
    loop {
        match debouncer.deadline() {
            None => match signals.recv() {
                Ok(_) => debouncer.signal(Instant::now()),
                Err(_) => return,
            },
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match signals.recv_timeout(timeout) {
                    Ok(_) => debouncer.signal(Instant::now()),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        debouncer.reset();
                        fire();
                        return;
                    }
                }
            }
        }

        if debouncer.poll(Instant::now()) {
            fire();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(secs(5), secs(30));
        assert_eq!(debouncer.deadline(), None);

        debouncer.signal(t0);
        debouncer.signal(t0 + secs(2));
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.deadline(), Some(t0 + secs(7)));

        assert!(!debouncer.poll(t0 + secs(6)));
        assert!(debouncer.poll(t0 + secs(7)));
        assert!(!debouncer.poll(t0 + secs(8)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_fires_at_max_wait_under_continuous_signals() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(secs(5), secs(30));

        let mut fired = Vec::new();
        for s in 0..=40 {
            let now = t0 + secs(s);
            if debouncer.poll(now) {
                fired.push(s);
            }
            debouncer.signal(now);
        }
        assert_eq!(fired, vec![30]);

        // Signals after the firing form a new burst
        assert_eq!(debouncer.deadline(), Some(t0 + secs(45)));
        assert!(debouncer.poll(t0 + secs(45)));
    }

    #[test]
    fn test_drive_returns_without_signals() {
        let (tx, rx) = mpsc::channel::<()>();
        drop(tx);

        let mut fired = 0;
        drive(&mut Debouncer::new(secs(5), secs(30)), &rx, || fired += 1);
        assert_eq!(fired, 0);
    }

    #[test]
    fn test_drive_flushes_pending_on_disconnect() {
        let (tx, rx) = mpsc::channel();
        tx.send(()).unwrap();
        tx.send(()).unwrap();
        drop(tx);

        let mut fired = 0;
        drive(&mut Debouncer::new(secs(60), secs(600)), &rx, || fired += 1);
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_drive_fires_after_quiet_period() {
        let (tx, rx) = mpsc::channel();
        let (fired_tx, fired_rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let mut debouncer = Debouncer::new(Duration::from_millis(20), secs(30));
            drive(&mut debouncer, &rx, || fired_tx.send(()).unwrap());
        });

        tx.send(()).unwrap();
        fired_rx.recv_timeout(secs(5)).unwrap();

        drop(tx);
        handle.join().unwrap();
        assert_eq!(fired_rx.try_iter().count(), 0);
    }
}
