use std::num::NonZeroU32;

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};

/// Client-side cap on outbound admin-API calls
pub struct RequestThrottle {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    per_second: NonZeroU32,
}

impl RequestThrottle {
    /// `None` when `per_second` is 0 (throttling disabled)
    pub fn per_second(per_second: u32) -> Option<Self> {
        let per_second = NonZeroU32::new(per_second)?;

        Some(Self {
            limiter: RateLimiter::direct(Quota::per_second(per_second)),
            per_second,
        })
    }

    /// Wait until the next call is allowed
    pub async fn acquire(&self) {
        if self.limiter.check().is_err() {
            log::debug!(
                "Provider throttle reached ({}/s), waiting for capacity",
                self.per_second
            );
            self.limiter.until_ready().await;
        }
    }

    pub fn limit(&self) -> u32 {
        self.per_second.get()
    }
}
