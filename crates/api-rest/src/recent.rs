use api_shared::TriageRes;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Bounded in-memory history of the most recent triage results, newest first.
#[derive(Debug)]
pub struct RecentCases {
    capacity: usize,
    entries: Mutex<VecDeque<TriageRes>>,
}

impl RecentCases {
    /// `capacity` is expected to be validated already; zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a result, evicting the oldest once full.
    pub fn push(&self, result: TriageRes) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push_front(result);
        entries.truncate(self.capacity);
    }

    /// Copy of the buffer, newest first.
    pub fn snapshot(&self) -> Vec<TriageRes> {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_shared::TriageReq;
    use triage_types::TriageLevel;

    fn result(description: &str) -> TriageRes {
        TriageRes {
            triage_level: TriageLevel::Minor,
            reason_code: "ambulatory".into(),
            actions: vec![],
            reasoning: String::new(),
            disclaimer: String::new(),
            confidence: 0.9,
            ts: String::new(),
            input: TriageReq {
                description: description.into(),
                vitals: None,
            },
        }
    }

    #[test]
    fn newest_first_and_bounded() {
        let recent = RecentCases::new(3);
        for i in 0..5 {
            recent.push(result(&format!("case {i}")));
        }

        let descriptions: Vec<_> = recent
            .snapshot()
            .into_iter()
            .map(|r| r.input.description)
            .collect();
        assert_eq!(descriptions, ["case 4", "case 3", "case 2"]);
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let recent = RecentCases::new(0);
        recent.push(result("a"));
        recent.push(result("b"));
        assert_eq!(recent.capacity(), 1);
        assert_eq!(recent.snapshot().len(), 1);
    }
}
