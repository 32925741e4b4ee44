use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// At most `permits` requests per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub permits: usize,
    pub period: Duration,
}

impl RateLimit {
    pub fn per_second(permits: usize) -> Self {
        Self {
            permits,
            period: Duration::from_secs(1),
        }
    }
}

/// Sliding-window limiter shared by every request made through one client.
pub struct RateLimiter {
    limit: RateLimit,
    issued: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        let limit = RateLimit {
            permits: limit.permits.max(1),
            period: limit.period,
        };
        Self {
            limit,
            issued: Mutex::new(VecDeque::with_capacity(limit.permits)),
        }
    }

    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Waits until another request fits in the window, then records it.
    pub async fn acquire(&self) {
        // Held while sleeping so waiters are served in order.
        let mut issued = self.issued.lock().await;
        loop {
            let now = Instant::now();
            while let Some(&oldest) = issued.front() {
                if now.duration_since(oldest) >= self.limit.period {
                    issued.pop_front();
                } else {
                    break;
                }
            }

            if issued.len() < self.limit.permits {
                issued.push_back(now);
                return;
            }

            if let Some(&oldest) = issued.front() {
                let wait = self.limit.period.saturating_sub(now.duration_since(oldest));
                log::debug!("Rate limit reached, waiting {}ms", wait.as_millis());
                sleep(wait).await;
            }
        }
    }
}
