use clap::Parser;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::AppError;
use crate::rate_limit::{ActionKind, Limit};
use crate::wilson::Confidence;

const MAX_WINDOW_SECS: u64 = 10 * 365 * 24 * 60 * 60;

// CLI argument structure, read once at startup
#[derive(Parser, Debug, Clone)]
#[command(name = "heard-api")]
#[command(about = "Anonymous church experience sharing API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Max experiences one client may share per window
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub submission_limit: u32,

    // Max votes one client may cast per window
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..))]
    pub vote_limit: u32,

    // Rate limit window in seconds (defaults to one day, at most ten years)
    #[arg(long, default_value_t = 86_400, value_parser = clap::value_parser!(u64).range(1..=MAX_WINDOW_SECS))]
    pub rate_window: u64,

    // Confidence level used for Wilson ranking
    #[arg(long, default_value_t = 0.95)]
    pub wilson_confidence: f64,

    // Salt mixed into client IP hashes
    #[arg(long, env = "HEARD_IDENTITY_SALT", default_value = "heard")]
    pub identity_salt: String,
}

impl Args {
    pub fn limits(&self) -> HashMap<ActionKind, Limit> {
        let window = Duration::from_secs(self.rate_window);
        HashMap::from([
            (ActionKind::Submissions, Limit::new(self.submission_limit, window)),
            (ActionKind::Votes, Limit::new(self.vote_limit, window)),
        ])
    }

    pub fn confidence(&self) -> Result<Confidence, AppError> {
        Ok(Confidence::new(self.wilson_confidence)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::DAY;

    #[test]
    fn defaults_match_production_limits() {
        let args = Args::parse_from(["heard-api"]);
        let limits = args.limits();
        assert_eq!(limits[&ActionKind::Submissions], Limit::new(5, DAY));
        assert_eq!(limits[&ActionKind::Votes], Limit::new(50, DAY));
        assert_eq!(args.confidence().unwrap(), Confidence::default());
    }

    #[test]
    fn rejects_bad_confidence() {
        let args = Args::parse_from(["heard-api", "--wilson-confidence", "1.5"]);
        assert!(matches!(args.confidence(), Err(AppError::Config(_))));
    }

    #[test]
    fn rejects_zero_limits() {
        assert!(Args::try_parse_from(["heard-api", "--vote-limit", "0"]).is_err());
    }

    #[test]
    fn rate_window_is_bounded() {
        assert!(Args::try_parse_from(["heard-api", "--rate-window", "0"]).is_err());
        let too_long = u64::MAX.to_string();
        assert!(Args::try_parse_from(["heard-api", "--rate-window", too_long.as_str()]).is_err());
        assert!(Args::try_parse_from(["heard-api", "--rate-window", "3600"]).is_ok());
    }
}
