// Fri Feb 6 2026 - Alex

use crate::memory::{peek, MemoryError, PidMem, PtracePeeker, WINDOW_BYTES};
use crate::scan::{NarrowPredicate, ScanEngine, ScanError};
use crate::store::MatchStore;
use crate::value::{Value, ValueFlags};

/// Point reader for revisiting candidates, picked with the same policy
/// as the scan-side window source.
enum CandidateReader {
    File(PidMem),
    Peek(PtracePeeker),
}

impl CandidateReader {
    fn open(pid: libc::pid_t) -> Self {
        if PidMem::accessible(pid) {
            match PidMem::open(pid) {
                Ok(mem) => return Self::File(mem),
                Err(err) => {
                    log::warn!(
                        "pid {}: mem pseudo-file unusable ({}), falling back to peeks",
                        pid,
                        err
                    );
                }
            }
        }
        Self::Peek(PtracePeeker::new(pid))
    }

    fn read(&mut self, addr: u64, buf: &mut [u8; WINDOW_BYTES]) -> Result<usize, MemoryError> {
        match self {
            Self::File(mem) => mem.read_at(addr, buf),
            Self::Peek(peeker) => {
                peek::read_words(peeker, addr, buf)?;
                Ok(WINDOW_BYTES)
            }
        }
    }
}

impl ScanEngine {
    /// Re-read every candidate and drop those the predicate rejects.
    ///
    /// Survivors take the freshly read value as their new snapshot. A
    /// candidate whose address can no longer be read is dropped;
    /// process-level failures abort the pass with the store left valid
    /// and partially narrowed. Emptied chunks are freed and the rest
    /// compacted.
    pub fn narrow(
        &self,
        store: &mut MatchStore,
        predicate: &NarrowPredicate,
    ) -> Result<(), ScanError> {
        if store.is_empty() {
            return Ok(());
        }

        let mut reader = CandidateReader::open(self.pid());
        let before = store.len();

        store.for_each_retain(|entry| {
            if self.cancel_token().is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let mut buf = [0u8; WINDOW_BYTES];
            let len = match reader.read(entry.addr, &mut buf) {
                Ok(n) => n,
                Err(err) if err.is_fatal_for_pass() => return Err(err.into()),
                Err(err) => {
                    log::debug!("candidate at 0x{:x} unreadable: {}", entry.addr, err);
                    return Ok(false);
                }
            };

            if len == 0 {
                return Ok(false);
            }

            let fresh = Value::observe(&buf[..len]);

            if predicate.matches(entry, &fresh) {
                entry.value = fresh;
                entry.flags = ValueFlags::observe(&fresh, len);
                Ok(true)
            } else {
                Ok(false)
            }
        })?;

        store.compact();

        log::debug!(
            "narrow pass kept {} of {} candidate(s)",
            store.len(),
            before
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Alignment, Perms, Region, RegionView};
    use crate::scan::ScanPredicate;
    use crate::value::Needle;

    fn own_engine() -> ScanEngine {
        ScanEngine::new(std::process::id() as libc::pid_t)
    }

    fn region_over_u64s(data: &[u64]) -> Region {
        let start = data.as_ptr() as u64;
        Region::new(start, start + (data.len() * 8) as u64, Perms::rw())
    }

    fn scan_eq(data: &[u64], text: &str) -> MatchStore {
        let region = region_over_u64s(data);
        let view = RegionView::from_regions(vec![&region]).unwrap();
        let mut store = MatchStore::new();
        own_engine()
            .scan(&mut store, &view, &ScanPredicate::Eq(Needle::parse(text).unwrap()))
            .unwrap();
        store
    }

    fn narrow_needle(text: &str) -> NarrowPredicate {
        NarrowPredicate::Eq(Needle::parse(text).unwrap())
    }

    #[test]
    fn test_narrow_decreased_tracks_new_snapshot() {
        let mut data: Vec<u64> = vec![41, 42, 43];
        let mut store = scan_eq(&data, "42");
        assert_eq!(store.len(), 1);

        data[1] = 40;
        own_engine()
            .narrow(&mut store, &NarrowPredicate::Decreased)
            .unwrap();

        assert_eq!(store.len(), 1);
        let hit = store.iter().next().unwrap();
        assert_eq!(hit.value.u64(), 40);
    }

    #[test]
    fn test_scan_eq_then_narrow_ne_empties_store() {
        let data: Vec<u64> = vec![41, 42, 42, 43];
        let mut store = scan_eq(&data, "42");
        assert_eq!(store.len(), 2);

        own_engine()
            .narrow(&mut store, &NarrowPredicate::Ne(Needle::parse("42").unwrap()))
            .unwrap();
        assert!(store.is_empty());
        assert!(store.chunks().is_empty());
    }

    #[test]
    fn test_narrow_unchanged_is_idempotent_on_static_target() {
        let data: Vec<u64> = vec![42, 42, 7, 42];
        let mut store = scan_eq(&data, "42");
        assert_eq!(store.len(), 3);

        own_engine()
            .narrow(&mut store, &NarrowPredicate::Unchanged)
            .unwrap();
        assert_eq!(store.len(), 3);

        own_engine()
            .narrow(&mut store, &NarrowPredicate::Unchanged)
            .unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_narrow_changed_on_static_target_empties_store() {
        let data: Vec<u64> = vec![42, 42];
        let mut store = scan_eq(&data, "42");

        own_engine()
            .narrow(&mut store, &NarrowPredicate::Changed)
            .unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_narrow_eq_after_mutation() {
        let mut data: Vec<u64> = vec![42, 42, 42];
        let mut store = scan_eq(&data, "42");
        assert_eq!(store.len(), 3);

        data[0] = 9;
        data[2] = 9;
        own_engine().narrow(&mut store, &narrow_needle("42")).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.iter().next().unwrap().addr,
            data.as_ptr() as u64 + 8
        );
    }

    #[test]
    fn test_narrow_empty_store_is_noop() {
        let mut store = MatchStore::new();
        own_engine()
            .narrow(&mut store, &NarrowPredicate::Changed)
            .unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_narrow_range_keeps_interval() {
        let mut data: Vec<u64> = vec![42, 42, 42, 42];
        let mut store = scan_eq(&data, "42");

        data[0] = 10;
        data[1] = 15;
        data[2] = 20;
        data[3] = 25;

        let pred = NarrowPredicate::Range(
            Needle::parse("10").unwrap(),
            Needle::parse("20").unwrap(),
            crate::scan::RangeBounds::GtLe,
        );
        own_engine().narrow(&mut store, &pred).unwrap();

        let mut kept: Vec<u64> = store.iter().map(|e| e.value.u64()).collect();
        kept.sort_unstable();
        assert_eq!(kept, vec![15, 20]);
    }

    #[test]
    fn test_narrow_unaligned_store_roundtrip() {
        // Unaligned scan then a narrow on the byte-offset candidates.
        let data: Vec<u8> = (0u8..16).collect();
        let start = data.as_ptr() as u64;
        let region = Region::new(start, start + 16, Perms::rw());
        let view = RegionView::from_regions(vec![&region]).unwrap();

        let engine = own_engine().with_alignment(Alignment::Unaligned);
        let mut store = MatchStore::new();
        engine
            .scan(
                &mut store,
                &view,
                &ScanPredicate::Eq(Needle::parse("0x0504030201").unwrap()),
            )
            .unwrap();
        assert_eq!(store.len(), 1);

        engine
            .narrow(&mut store, &NarrowPredicate::Unchanged)
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next().unwrap().addr, start + 1);
    }

    #[test]
    fn test_narrow_cancelled_leaves_store_valid() {
        let data: Vec<u64> = vec![42, 42];
        let mut store = scan_eq(&data, "42");

        let cancel = crate::scan::CancelToken::new();
        cancel.cancel();
        let engine = own_engine().with_cancel(cancel);

        let result = engine.narrow(&mut store, &NarrowPredicate::Unchanged);
        assert!(matches!(result, Err(ScanError::Cancelled)));
        assert_eq!(store.len(), 2);
    }
}
