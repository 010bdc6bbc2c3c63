//! Client-side request throttle.
//!
//! Combines a semaphore bounding in-flight attempts with a rolling window of
//! admission timestamps. The two limits are independent. At most
//! `max_requests` admissions are granted in any
//! trailing `period`; a caller that would exceed it sleeps until the oldest
//! timestamp leaves the window and checks again.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use tokio::time::Instant;

/// Returned by [`Throttle::acquire`] once [`Throttle::close`] has been called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleClosed;

#[derive(Debug)]
pub struct Throttle {
    permits: Semaphore,
    window: Mutex<VecDeque<Instant>>,
    max_in_flight: usize,
    max_requests: usize,
    period: Duration,
}

/// Proof of admission. Holds one in-flight permit until dropped.
#[derive(Debug)]
pub struct Admission<'a> {
    _permit: SemaphorePermit<'a>,
}

impl Throttle {
    /// Both limits are clamped to at least one.
    pub fn new(max_in_flight: usize, max_requests: usize, period: Duration) -> Self {
        let max_in_flight = max_in_flight.max(1);
        let max_requests = max_requests.max(1);
        Self {
            permits: Semaphore::new(max_in_flight),
            window: Mutex::new(VecDeque::with_capacity(max_requests)),
            max_in_flight,
            max_requests,
            period,
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for an in-flight permit and a free slot in the rolling window.
    pub async fn acquire(&self) -> Result<Admission<'_>, ThrottleClosed> {
        let permit = self.permits.acquire().await.map_err(|_| ThrottleClosed)?;

        loop {
            let wait = {
                let mut window = self.window.lock().await;
                let now = Instant::now();
                while window
                    .front()
                    .is_some_and(|oldest| now.duration_since(*oldest) >= self.period)
                {
                    window.pop_front();
                }

                if window.len() < self.max_requests {
                    window.push_back(now);
                    return Ok(Admission { _permit: permit });
                }

                // Window is full, so it has a front entry.
                match window.front() {
                    Some(oldest) => self.period.saturating_sub(now.duration_since(*oldest)),
                    None => Duration::ZERO,
                }
            };

            tracing::debug!(
                wait_ms = wait.as_millis() as u64,
                "Request throttled, waiting for a free slot"
            );
            tokio::time::sleep(wait).await;

            if self.permits.is_closed() {
                return Err(ThrottleClosed);
            }
        }
    }

    /// Stop admitting requests. Pending and future `acquire` calls fail.
    pub fn close(&self) {
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn assert_window_respected(stamps: &[Instant], max: usize, period: Duration) {
        for pair in stamps.windows(max + 1) {
            let spread = pair[max].duration_since(pair[0]);
            assert!(
                spread >= period,
                "{} admissions within {:?}",
                max + 1,
                spread
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_burst_is_admitted_immediately() {
        let throttle = Throttle::new(5, 5, Duration::from_secs(1));
        let start = Instant::now();
        for _ in 0..5 {
            let _admission = throttle.acquire().await.unwrap();
        }
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn sixth_request_waits_for_oldest_to_expire() {
        let throttle = Throttle::new(5, 5, Duration::from_secs(1));
        let start = Instant::now();
        for _ in 0..5 {
            let _admission = throttle.acquire().await.unwrap();
        }
        let _admission = throttle.acquire().await.unwrap();
        assert!(Instant::now().duration_since(start) >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_admissions_respect_window() {
        let throttle = Throttle::new(5, 5, Duration::from_secs(1));
        let mut stamps = Vec::new();
        for _ in 0..17 {
            let _admission = throttle.acquire().await.unwrap();
            stamps.push(Instant::now());
        }
        assert_window_respected(&stamps, 5, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_admissions_respect_window() {
        let throttle = Arc::new(Throttle::new(5, 5, Duration::from_secs(1)));
        let mut handles = Vec::new();
        for _ in 0..20 {
            let throttle = Arc::clone(&throttle);
            handles.push(tokio::spawn(async move {
                let _admission = throttle.acquire().await.unwrap();
                Instant::now()
            }));
        }

        let mut stamps = Vec::new();
        for handle in handles {
            stamps.push(handle.await.unwrap());
        }
        stamps.sort();
        assert_window_respected(&stamps, 5, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn permits_bound_in_flight_attempts() {
        let throttle = Throttle::new(2, 100, Duration::from_millis(10));
        let first = throttle.acquire().await.unwrap();
        let _second = throttle.acquire().await.unwrap();

        let blocked =
            tokio::time::timeout(Duration::from_secs(5), throttle.acquire()).await;
        assert!(blocked.is_err(), "third attempt admitted while two in flight");

        drop(first);
        assert!(throttle.acquire().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_throttle_rejects_callers() {
        let throttle = Throttle::new(5, 5, Duration::from_secs(1));
        throttle.close();
        assert_eq!(throttle.acquire().await.unwrap_err(), ThrottleClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn raising_rate_does_not_raise_in_flight_cap() {
        let throttle = Throttle::new(5, 100, Duration::from_secs(1));
        let mut held = Vec::new();
        for _ in 0..5 {
            held.push(throttle.acquire().await.unwrap());
        }

        let blocked =
            tokio::time::timeout(Duration::from_secs(5), throttle.acquire()).await;
        assert!(blocked.is_err(), "sixth attempt admitted while five in flight");
    }

    #[test]
    fn zero_limits_are_clamped() {
        let throttle = Throttle::new(0, 0, Duration::from_secs(1));
        assert_eq!(throttle.max_in_flight(), 1);
        assert_eq!(throttle.max_requests(), 1);
    }
}
