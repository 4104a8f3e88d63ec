// src/utils/delay.rs

//! Randomized politeness sleeps.
//!
//! Every inter-request pause is drawn from a configured range so the
//! watcher never hits the origin on a fixed cadence.

use crate::config::DelayRange;

/// Sleep for a duration drawn from the given range.
pub async fn polite_sleep(range: &DelayRange) {
    let pause = range.sample();
    if !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }
}
