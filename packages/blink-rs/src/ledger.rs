// Bounded event history for downstream consumption
//
// Two independent FIFOs record candidate indices and confirmed blinks.
// Oldest entries are silently dropped at capacity: only a sliding window
// of recent events is retained, long-term archival belongs to whatever
// consumes them.

use crate::ring::RingBuffer;
use crate::types::BlinkEvent;

#[derive(Debug, Clone)]
pub struct EventLedger {
    candidates: RingBuffer<u64>,
    blinks: RingBuffer<BlinkEvent>,
    total_candidates: u64,
    total_blinks: u64,
}

impl EventLedger {
    pub fn new(candidate_capacity: usize, blink_capacity: usize) -> Self {
        Self {
            candidates: RingBuffer::new(candidate_capacity),
            blinks: RingBuffer::new(blink_capacity),
            total_candidates: 0,
            total_blinks: 0,
        }
    }

    pub fn record_candidate(&mut self, index: u64) {
        self.candidates.push(index);
        self.total_candidates += 1;
    }

    pub fn record_blink(&mut self, event: BlinkEvent) {
        self.blinks.push(event);
        self.total_blinks += 1;
    }

    /// Retained candidate indices, oldest first.
    pub fn candidates(&self) -> Vec<u64> {
        self.candidates.iter().copied().collect()
    }

    /// Retained confirmed blinks, oldest first.
    pub fn blinks(&self) -> Vec<BlinkEvent> {
        self.blinks.iter().cloned().collect()
    }

    pub fn latest_blink(&self) -> Option<&BlinkEvent> {
        self.blinks.latest()
    }

    /// Candidates recorded over the ledger's lifetime, including evicted.
    pub fn total_candidates(&self) -> u64 {
        self.total_candidates
    }

    /// Blinks recorded over the ledger's lifetime, including evicted.
    pub fn total_blinks(&self) -> u64 {
        self.total_blinks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_are_ordered() {
        let mut ledger = EventLedger::new(8, 8);
        ledger.record_candidate(10);
        ledger.record_candidate(25);
        assert_eq!(ledger.candidates(), vec![10, 25]);
    }

    #[test]
    fn test_oldest_entries_dropped_at_capacity() {
        let mut ledger = EventLedger::new(3, 3);
        for i in 0..5 {
            ledger.record_candidate(i);
        }
        assert_eq!(ledger.candidates(), vec![2, 3, 4]);
        // Lifetime counter still covers the evicted entries
        assert_eq!(ledger.total_candidates(), 5);
    }

    #[test]
    fn test_blink_ledger_independent_of_candidates() {
        let mut ledger = EventLedger::new(2, 2);
        ledger.record_candidate(1);
        ledger.record_blink(BlinkEvent {
            index: 1,
            score: 0.5,
        });
        assert_eq!(ledger.total_candidates(), 1);
        assert_eq!(ledger.total_blinks(), 1);
        assert_eq!(ledger.latest_blink().unwrap().index, 1);
    }
}
