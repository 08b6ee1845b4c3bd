//! Telemetry & Alert Recorder
//!
//! One `tick` per external schedule: fetch period-to-date usage, append it to
//! the history, and raise a threshold alert when the prepaid ceiling is close
//! to exhausted. A failed fetch fails open (usage reads as zero for this tick)
//! and the alert line records why.

pub mod alerts;
pub mod history;
pub mod notifier;
pub mod source;

use tracing::{debug, info, warn};

pub use alerts::AlertLog;
pub use history::{UsageHistory, UsageRecord};
pub use notifier::{Notifier, TelegramNotifier};
pub use source::{HttpUsageSource, UsageFetchError, UsageSource, API_KEY_ENV};

use crate::config::FleetConfig;
use crate::utils::{env_f64_or_zero, env_opt, log_error};

/// Environment variable holding the prepaid credit ceiling in USD
pub const CREDITS_ENV: &str = "USAGE_CREDITS_PREPAID_USD";

/// Fraction of the ceiling used; a zero (or negative) ceiling is defined as 0
pub fn percent_used(spent: f64, credits: f64) -> f64 {
    if credits > 0.0 {
        spent / credits
    } else {
        0.0
    }
}

/// Whether a tick with these figures raises the threshold alert
pub fn crosses_threshold(fraction_used: f64, credits: f64, threshold: f64) -> bool {
    credits > 0.0 && fraction_used >= threshold
}

/// What one tick observed
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    pub spent: f64,
    pub fraction_used: f64,
    pub threshold_alert: bool,
}

pub struct UsageRecorder {
    source: Box<dyn UsageSource>,
    notifier: Option<Box<dyn Notifier>>,
    history: UsageHistory,
    alerts: AlertLog,
    credits: f64,
    threshold: f64,
}

impl UsageRecorder {
    pub fn new(
        source: Box<dyn UsageSource>,
        notifier: Option<Box<dyn Notifier>>,
        history: UsageHistory,
        alerts: AlertLog,
        credits: f64,
        threshold: f64,
    ) -> Self {
        Self {
            source,
            notifier,
            history,
            alerts,
            credits,
            threshold,
        }
    }

    /// Recorder wired to the HTTP usage endpoint and secrets from the environment
    pub fn from_env(config: &FleetConfig) -> Self {
        let telemetry = &config.telemetry;
        let source = HttpUsageSource::new(
            &telemetry.usage_endpoint,
            env_opt(API_KEY_ENV),
            telemetry.request_timeout(),
        );
        let notifier = TelegramNotifier::from_env(
            &telemetry.notifier_endpoint,
            telemetry.notify_timeout(),
        )
        .map(|n| Box::new(n) as Box<dyn Notifier>);

        Self::new(
            Box::new(source),
            notifier,
            UsageHistory::new(config.usage_history_path()),
            AlertLog::new(config.alerts_log_path()),
            env_f64_or_zero(CREDITS_ENV),
            telemetry.alert_threshold,
        )
    }

    pub fn history(&self) -> &UsageHistory {
        &self.history
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub async fn tick(&self) -> TickSummary {
        let spent = match self.source.period_to_date().await {
            Ok(spent) if spent.is_finite() && spent >= 0.0 => spent,
            Ok(spent) => {
                self.alert(&format!("usage endpoint returned invalid amount {}", spent))
                    .await;
                0.0
            }
            Err(e) => {
                warn!("Usage fetch failed: {}", e);
                self.alert(&e.to_string()).await;
                0.0
            }
        };

        let fraction_used = percent_used(spent, self.credits);
        log_error(
            || {
                self.history
                    .append(UsageRecord::new(spent, self.credits, fraction_used))
            },
            "Failed to record usage history",
        );
        info!(
            "Usage {:.2} USD ({:.1}% of {:.2})",
            spent,
            fraction_used * 100.0,
            self.credits
        );

        let threshold_alert = crosses_threshold(fraction_used, self.credits, self.threshold);
        if threshold_alert {
            self.alert(&format!(
                "usage {:.2} USD reached {:.1}% of {:.2} USD prepaid",
                spent,
                fraction_used * 100.0,
                self.credits
            ))
            .await;
        }

        TickSummary {
            spent,
            fraction_used,
            threshold_alert,
        }
    }

    /// Append to the alert log and forward to the notifier, both best-effort
    async fn alert(&self, message: &str) {
        log_error(|| self.alerts.append(message), "Failed to append alert log");
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify(message).await {
                debug!("Alert notification dropped: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_percent_used_zero_ceiling() {
        assert_eq!(percent_used(123.0, 0.0), 0.0);
        assert_eq!(percent_used(40.0, 50.0), 0.8);
    }

    #[test]
    fn test_threshold_inclusive() {
        assert!(crosses_threshold(0.80, 50.0, 0.80));
        assert!(!crosses_threshold(0.79, 50.0, 0.80));
        assert!(!crosses_threshold(5.0, 0.0, 0.80));
    }

    proptest! {
        #[test]
        fn zero_ceiling_never_alerts(spent in 0.0f64..1.0e9) {
            let fraction = percent_used(spent, 0.0);
            prop_assert_eq!(fraction, 0.0);
            prop_assert!(!crosses_threshold(fraction, 0.0, 0.80));
        }

        #[test]
        fn positive_ceiling_alerts_iff_at_or_over_threshold(
            credits in 0.01f64..1.0e6,
            fraction in 0.0f64..2.0,
        ) {
            let spent = credits * fraction;
            let used = percent_used(spent, credits);
            prop_assert_eq!(crosses_threshold(used, credits, 0.80), used >= 0.80);
        }
    }
}
