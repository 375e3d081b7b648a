// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marshalling deadlines.
//!
//! A deadline is polled, never waited on: the encoder asks
//! [`Deadline::is_expired`] before a write that extends its buffer.

use std::fmt;
use std::time::{Duration, Instant};

/// One-shot expiry check.
pub trait Deadline: fmt::Debug + Send {
    fn is_expired(&self) -> bool;
}

impl Deadline for Instant {
    fn is_expired(&self) -> bool {
        Instant::now() >= *self
    }
}

/// Deadline relative to the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct Timeout {
    expires_at: Instant,
}

impl Timeout {
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

impl Deadline for Timeout {
    fn is_expired(&self) -> bool {
        self.expires_at.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_in_the_past_is_expired() {
        assert!(Instant::now().is_expired());
        assert!(Timeout::after(Duration::ZERO).is_expired());
    }

    #[test]
    fn test_future_deadline_is_not_expired() {
        let deadline = Timeout::after(Duration::from_secs(3600));
        assert!(!deadline.is_expired());
        assert!(deadline.expires_at() > Instant::now());
    }
}
