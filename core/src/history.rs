use std::collections::VecDeque;

use crate::types::{HistoryPoint, Quote};

pub const HISTORY_CAPACITY: usize = 50;

/// Direction of the last price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Flat => "■",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Flat => "flat",
        }
    }
}

/// Bounded, append-only price history. Oldest samples are evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistoryWindow {
    capacity: usize,
    samples: VecDeque<HistoryPoint>,
}

impl Default for PriceHistoryWindow {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl PriceHistoryWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: HistoryPoint) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(point);
    }

    pub fn record(&mut self, quote: &Quote) {
        self.push(quote.into());
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.samples.back()
    }

    pub fn previous(&self) -> Option<&HistoryPoint> {
        self.samples.len().checked_sub(2).and_then(|idx| self.samples.get(idx))
    }

    /// `None` until two samples exist.
    pub fn trend(&self) -> Option<Trend> {
        let last = self.latest()?.price;
        let prev = self.previous()?.price;
        Some(if last > prev {
            Trend::Up
        } else if last < prev {
            Trend::Down
        } else {
            Trend::Flat
        })
    }

    /// Absolute and percentage change between the last two samples.
    pub fn last_change(&self) -> Option<(f64, f64)> {
        let last = self.latest()?.price;
        let prev = self.previous()?.price;
        let delta = last - prev;
        let pct = if prev != 0.0 { delta / prev * 100.0 } else { 0.0 };
        Some((delta, pct))
    }

    pub fn price_range(&self) -> Option<(f64, f64)> {
        if self.samples.is_empty() {
            return None;
        }
        let min = self.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let max = self.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }

    pub fn to_vec(&self) -> Vec<HistoryPoint> {
        self.samples.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
