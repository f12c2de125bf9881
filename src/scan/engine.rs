// Fri Feb 6 2026 - Alex

use crate::memory::{
    Alignment, FileWindows, PeekWindows, PidMem, PtracePeeker, RegionView, WindowSource,
};
use crate::scan::{CancelToken, ScanError, ScanPredicate};
use crate::store::{MatchEntry, MatchStore};
use crate::value::{Value, ValueFlags};

/// One attached, stopped target and the pass options to use on it.
///
/// The engine owns nothing across passes: each scan or narrow opens its
/// own reader and closes it on every exit path. Stopping the target is
/// the caller's responsibility; reads against a running target race.
#[derive(Debug)]
pub struct ScanEngine {
    pid: libc::pid_t,
    alignment: Alignment,
    cancel: CancelToken,
}

impl ScanEngine {
    pub fn new(pid: libc::pid_t) -> Self {
        Self {
            pid,
            alignment: Alignment::Aligned,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn pid(&self) -> libc::pid_t {
        self.pid
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub(crate) fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Pick the reader for this pass: the mem pseudo-file when it is
    /// both accessible and openable, single-word peeks otherwise.
    fn window_source(&self) -> Box<dyn WindowSource> {
        if PidMem::accessible(self.pid) {
            match PidMem::open(self.pid) {
                Ok(mem) => {
                    log::debug!("pid {}: scanning via mem pseudo-file", self.pid);
                    return Box::new(FileWindows::new(mem, self.alignment));
                }
                Err(err) => {
                    log::warn!(
                        "pid {}: mem pseudo-file unusable ({}), falling back to peeks",
                        self.pid,
                        err
                    );
                }
            }
        } else {
            log::debug!("pid {}: scanning via debugger peeks", self.pid);
        }

        Box::new(PeekWindows::new(PtracePeeker::new(self.pid), self.alignment))
    }

    /// Walk every window of every region and append the matches.
    ///
    /// Appending is deliberate: replaying a scan against another region
    /// set unions into the same store.
    pub fn scan(
        &self,
        store: &mut MatchStore,
        regions: &RegionView<'_>,
        predicate: &ScanPredicate,
    ) -> Result<(), ScanError> {
        let mut source = self.window_source();

        for region in regions.iter() {
            source.set_region(region)?;
            let mut hits = 0usize;

            loop {
                if self.cancel.is_cancelled() {
                    return Err(ScanError::Cancelled);
                }

                let Some(window) = source.next_window()? else {
                    break;
                };

                let value = Value::observe(&window.bytes[..window.len]);

                if predicate.matches(&value) {
                    let flags = ValueFlags::observe(&value, window.len);
                    store.push(MatchEntry {
                        addr: window.addr,
                        value,
                        flags,
                    })?;
                    hits += 1;
                }
            }

            log::debug!(
                "region {} [{:x}-{:x}]: {} match(es)",
                region.id(),
                region.start(),
                region.end(),
                hits
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Perms, Region};
    use crate::value::Needle;

    fn own_engine() -> ScanEngine {
        ScanEngine::new(std::process::id() as libc::pid_t)
    }

    fn region_over_u64s(data: &[u64]) -> Region {
        let start = data.as_ptr() as u64;
        Region::new(start, start + (data.len() * 8) as u64, Perms::rw())
    }

    fn region_over_bytes(data: &[u8]) -> Region {
        let start = data.as_ptr() as u64;
        Region::new(start, start + data.len() as u64, Perms::rw())
    }

    fn eq(text: &str) -> ScanPredicate {
        ScanPredicate::Eq(Needle::parse(text).unwrap())
    }

    #[test]
    fn test_scan_eq_aligned_finds_single_word() {
        let data: Vec<u64> = vec![41, 42, 43];
        let region = region_over_u64s(&data);
        let view = RegionView::from_regions(vec![&region]).unwrap();

        let mut store = MatchStore::new();
        own_engine().scan(&mut store, &view, &eq("42")).unwrap();

        assert_eq!(store.len(), 1);
        let hit = store.iter().next().unwrap();
        assert_eq!(hit.addr, data.as_ptr() as u64 + 8);
        assert_eq!(hit.value.u64(), 42);
        assert!(hit.flags.contains(
            ValueFlags::I8
                | ValueFlags::I16
                | ValueFlags::I32
                | ValueFlags::I64
                | ValueFlags::F32
                | ValueFlags::F64
        ));
    }

    #[test]
    fn test_scan_unaligned_byte_offsets() {
        let data: Vec<u8> = (0u8..16).collect();
        let region = region_over_bytes(&data);
        let start = data.as_ptr() as u64;

        let engine = own_engine().with_alignment(Alignment::Unaligned);
        let mut store = MatchStore::new();
        let view = RegionView::from_regions(vec![&region]).unwrap();
        engine.scan(&mut store, &view, &eq("0x0403020100")).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next().unwrap().addr, start);

        let mut store = MatchStore::new();
        engine.scan(&mut store, &view, &eq("0x0504030201")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next().unwrap().addr, start + 1);
    }

    #[test]
    fn test_scan_aligned_misses_shifted_pattern() {
        let data: Vec<u8> = (0u8..16).collect();
        let region = region_over_bytes(&data);
        let view = RegionView::from_regions(vec![&region]).unwrap();

        let engine = own_engine();
        let mut store = MatchStore::new();
        engine.scan(&mut store, &view, &eq("0x0403020100")).unwrap();
        assert_eq!(store.len(), 1);

        let mut store = MatchStore::new();
        engine.scan(&mut store, &view, &eq("0x0504030201")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_scan_short_tail_trims_flags() {
        let data: Vec<u8> = vec![0x2a, 0, 0, 0, 0];
        let region = region_over_bytes(&data);
        let view = RegionView::from_regions(vec![&region]).unwrap();

        let mut store = MatchStore::new();
        own_engine().scan(&mut store, &view, &eq("42")).unwrap();

        assert_eq!(store.len(), 1);
        let hit = store.iter().next().unwrap();
        assert!(hit
            .flags
            .contains(ValueFlags::I8 | ValueFlags::I16 | ValueFlags::I32 | ValueFlags::F32));
        assert!(!hit.flags.intersects(ValueFlags::I64 | ValueFlags::F64));
    }

    #[test]
    fn test_scan_float_needle() {
        let data: Vec<u64> = vec![1.0f64.to_bits(), 3.14f64.to_bits(), 9.0f64.to_bits()];
        let region = region_over_u64s(&data);
        let view = RegionView::from_regions(vec![&region]).unwrap();

        let mut store = MatchStore::new();
        own_engine().scan(&mut store, &view, &eq("3.14")).unwrap();

        assert_eq!(store.len(), 1);
        let hit = store.iter().next().unwrap();
        assert_eq!(hit.addr, data.as_ptr() as u64 + 8);
        assert_eq!(hit.value.f64(), 3.14);
    }

    #[test]
    fn test_scan_replay_appends() {
        let data: Vec<u64> = vec![42];
        let region = region_over_u64s(&data);
        let view = RegionView::from_regions(vec![&region]).unwrap();

        let engine = own_engine();
        let mut store = MatchStore::new();
        engine.scan(&mut store, &view, &eq("42")).unwrap();
        engine.scan(&mut store, &view, &eq("42")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_scan_cancelled_before_first_window() {
        let data: Vec<u64> = vec![42];
        let region = region_over_u64s(&data);
        let view = RegionView::from_regions(vec![&region]).unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let engine = own_engine().with_cancel(cancel);

        let mut store = MatchStore::new();
        let result = engine.scan(&mut store, &view, &eq("42"));
        assert!(matches!(result, Err(ScanError::Cancelled)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_scan_multiple_regions_in_order() {
        let first: Vec<u64> = vec![7, 42];
        let second: Vec<u64> = vec![42, 9];
        let r1 = region_over_u64s(&first);
        let r2 = region_over_u64s(&second);
        let view = RegionView::from_regions(vec![&r1, &r2]).unwrap();

        let mut store = MatchStore::new();
        own_engine().scan(&mut store, &view, &eq("42")).unwrap();

        let addrs: Vec<u64> = store.iter().map(|e| e.addr).collect();
        assert_eq!(
            addrs,
            vec![first.as_ptr() as u64 + 8, second.as_ptr() as u64]
        );
    }
}
