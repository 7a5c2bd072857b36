use super::report::RunReport;
use std::collections::VecDeque;

/// Bounded history of past run reports, oldest first.
#[derive(Debug, Clone)]
pub struct ReportArchive {
    reports: VecDeque<RunReport>,
    capacity: usize,
}

impl ReportArchive {
    pub fn new(capacity: usize) -> Self {
        Self {
            reports: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Stores a report, evicting the oldest one when full
    pub fn push(&mut self, report: RunReport) {
        if self.capacity == 0 {
            return;
        }
        if self.reports.len() == self.capacity {
            self.reports.pop_front();
        }
        self.reports.push_back(report);
    }

    /// The last `limit` reports, oldest first
    pub fn recent(&self, limit: usize) -> Vec<RunReport> {
        let skip = self.reports.len().saturating_sub(limit);
        self.reports.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }
}
