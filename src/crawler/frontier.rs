//! The crawl frontier
//!
//! Two disjoint sets of URL strings: `todo`, drained in insertion order, and
//! `done`, which only answers membership. A URL moves from `todo` to `done` when
//! it is dequeued and never comes back.

use std::collections::{HashSet, VecDeque};

/// Referrer recorded for the seed URL
pub const ROOT_REFERRER: &str = "[root page]";

/// A URL waiting to be visited, with the page that linked to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The URL to visit
    pub url: String,

    /// The discovering page, or `[root page]`
    pub referrer: String,
}

/// To-visit queue and visited set for one session
#[derive(Debug, Default)]
pub struct Frontier {
    todo: VecDeque<FrontierEntry>,
    pending: HashSet<String>,
    done: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the frontier to hold only the seed
    pub fn add_seed(&mut self, url: &str) {
        self.clear();
        self.pending.insert(url.to_string());
        self.todo.push_back(FrontierEntry {
            url: url.to_string(),
            referrer: ROOT_REFERRER.to_string(),
        });
    }

    /// Dequeues the oldest pending entry and marks it done
    ///
    /// Returns `None` once nothing is pending, which ends the session.
    pub fn next(&mut self) -> Option<FrontierEntry> {
        let entry = self.todo.pop_front()?;
        self.pending.remove(&entry.url);
        self.done.insert(entry.url.clone());
        Some(entry)
    }

    /// Queues a URL unless it is already pending or done
    ///
    /// Returns true if the URL was added.
    pub fn offer(&mut self, url: &str, referrer: &str) -> bool {
        if self.done.contains(url) || self.pending.contains(url) {
            return false;
        }

        self.pending.insert(url.to_string());
        self.todo.push_back(FrontierEntry {
            url: url.to_string(),
            referrer: referrer.to_string(),
        });
        true
    }

    /// Marks a URL as visited without dequeuing it
    ///
    /// Used for the address a page redirected to; if that address was still
    /// pending it is dropped from the queue.
    pub fn mark_done_alias(&mut self, url: &str) {
        if self.pending.remove(url) {
            self.todo.retain(|entry| entry.url != url);
        }
        self.done.insert(url.to_string());
    }

    /// Number of pending entries
    pub fn size(&self) -> usize {
        self.todo.len()
    }

    /// Number of URLs marked done
    pub fn done_count(&self) -> usize {
        self.done.len()
    }

    pub fn is_done(&self, url: &str) -> bool {
        self.done.contains(url)
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending.contains(url)
    }

    /// Forgets every pending and visited URL
    pub fn clear(&mut self) {
        self.todo.clear();
        self.pending.clear();
        self.done.clear();
    }
}
