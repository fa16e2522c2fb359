//! Review session selection.
//!
//! Tiered policy: overdue cards first (most overdue, weakest on ties),
//! then unseen cards oldest-first, then upcoming cards soonest-first.
//! Each tier is exhausted before the next is consulted, so overdue cards
//! are never starved while new material arrives at a bounded rate.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The scheduling facts the selector needs about one card.
#[derive(Debug, Clone)]
pub struct SessionCandidate {
    pub id: Uuid,
    pub next_review: Option<DateTime<Utc>>,
    pub review_count: u32,
    pub mastery_percent: u8,
    pub created_at: DateTime<Utc>,
}

impl SessionCandidate {
    fn is_new(&self) -> bool {
        self.next_review.is_none() || self.review_count == 0
    }
}

/// Pick at most `requested_count` card ids for a review session.
pub fn select_session(
    candidates: &[SessionCandidate],
    requested_count: usize,
    include_new: bool,
    now: DateTime<Utc>,
) -> Vec<Uuid> {
    let mut overdue: Vec<&SessionCandidate> = Vec::new();
    let mut fresh: Vec<&SessionCandidate> = Vec::new();
    let mut upcoming: Vec<&SessionCandidate> = Vec::new();

    for card in candidates {
        if card.is_new() {
            if include_new {
                fresh.push(card);
            }
        } else if let Some(due) = card.next_review {
            if due <= now {
                overdue.push(card);
            } else {
                upcoming.push(card);
            }
        }
    }

    overdue.sort_by(|a, b| {
        a.next_review
            .cmp(&b.next_review)
            .then_with(|| a.mastery_percent.cmp(&b.mastery_percent))
    });
    fresh.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    upcoming.sort_by(|a, b| a.next_review.cmp(&b.next_review));

    overdue
        .into_iter()
        .chain(fresh)
        .chain(upcoming)
        .take(requested_count)
        .map(|c| c.id)
        .collect()
}
