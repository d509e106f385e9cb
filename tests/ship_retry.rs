// tests/ship_retry.rs
mod common;

use common::{Behavior, MockShipper};
use std::time::Duration;
use weather_shipper::{ship_with_retry, RetryPolicy, ShipError, UnifiedRecord};

fn batch() -> Vec<UnifiedRecord> {
    vec![UnifiedRecord::new("Berlin", 22.86, "clear sky", "openweathermap")]
}

#[tokio::test(start_paused = true)]
async fn first_success_returns_immediately() {
    let shipper = MockShipper::new(Behavior::Succeed);
    let start = tokio::time::Instant::now();
    let ok = ship_with_retry(&shipper, &batch(), &RetryPolicy::default()).await.unwrap();
    assert!(ok);
    assert_eq!(shipper.call_count(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn exhausts_attempts_with_exponential_backoff() {
    let shipper = MockShipper::new(Behavior::Fail);
    let policy = RetryPolicy { attempts: 4, delay_base: 2.0 };
    let ok = ship_with_retry(&shipper, &batch(), &policy).await.unwrap();
    assert!(!ok);

    let times = shipper.call_times();
    assert_eq!(times.len(), 4);
    let gaps: Vec<u64> = times.windows(2).map(|w| (w[1] - w[0]).as_secs()).collect();
    assert_eq!(gaps, vec![2, 4, 8]);
}

#[tokio::test(start_paused = true)]
async fn default_policy_waits_2_then_4_seconds() {
    let shipper = MockShipper::new(Behavior::Fail);
    let start = tokio::time::Instant::now();
    let ok = ship_with_retry(&shipper, &batch(), &RetryPolicy::default()).await.unwrap();
    assert!(!ok);
    assert_eq!(shipper.call_count(), 3);
    // no sleep after the last attempt
    assert_eq!(start.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn fractional_base_backs_off_in_fractions() {
    let shipper = MockShipper::new(Behavior::Fail);
    let policy = RetryPolicy { attempts: 3, delay_base: 1.5 };
    let start = tokio::time::Instant::now();
    assert!(!ship_with_retry(&shipper, &batch(), &policy).await.unwrap());
    assert_eq!(shipper.call_count(), 3);
    // 1.5 + 2.25
    assert_eq!(start.elapsed(), Duration::from_millis(3750));
}

#[tokio::test(start_paused = true)]
async fn recovers_on_later_attempt() {
    let shipper = MockShipper::new(Behavior::FailFirst(2));
    let ok = ship_with_retry(&shipper, &batch(), &RetryPolicy::default()).await.unwrap();
    assert!(ok);
    assert_eq!(shipper.call_count(), 3);
}

#[tokio::test]
async fn empty_batch_is_noop_success() {
    let shipper = MockShipper::new(Behavior::Fail);
    let ok = ship_with_retry(&shipper, &[], &RetryPolicy::default()).await.unwrap();
    assert!(ok);
    assert_eq!(shipper.call_count(), 0);
}

#[tokio::test]
async fn configuration_error_is_not_retried() {
    let shipper = MockShipper::new(Behavior::Misconfigured);
    let res = ship_with_retry(&shipper, &batch(), &RetryPolicy::default()).await;
    assert!(matches!(res, Err(ShipError::MissingEndpoint(_))));
    assert_eq!(shipper.call_count(), 1);
}

#[tokio::test]
async fn zero_attempts_still_tries_once() {
    let shipper = MockShipper::new(Behavior::Succeed);
    let policy = RetryPolicy { attempts: 0, delay_base: 2.0 };
    assert!(ship_with_retry(&shipper, &batch(), &policy).await.unwrap());
    assert_eq!(shipper.call_count(), 1);
}
