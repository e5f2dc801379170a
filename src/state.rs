use crate::rate_limit::RateLimiter;
use crate::store::Store;
use crate::wilson::Confidence;
// app's shared state

pub struct AppState {
    pub store: Store,
    pub rate_limiter: RateLimiter, // process-lifetime quota records
    pub confidence: Confidence,    // Wilson ranking confidence
    pub identity_salt: String,     // mixed into client IP hashes
}
