// Wed Feb 4 2026 - Alex

use std::ffi::CString;
use std::fs::File;
use std::io::ErrorKind;
use std::os::unix::fs::FileExt;

use crate::memory::MemoryError;

/// Positional reader over `/proc/<pid>/mem`.
///
/// The handle is scoped to one scan or narrow pass. Short reads happen
/// at the end of a mapping and are surfaced as byte counts, never as
/// errors.
#[derive(Debug)]
pub struct PidMem {
    file: File,
    pid: i32,
}

impl PidMem {
    /// Whether the caller may read the target's mem pseudo-file at all.
    pub fn accessible(pid: i32) -> bool {
        let Ok(path) = CString::new(format!("/proc/{}/mem", pid)) else {
            return false;
        };
        unsafe { libc::access(path.as_ptr(), libc::R_OK) == 0 }
    }

    pub fn open(pid: i32) -> Result<Self, MemoryError> {
        let file =
            File::open(format!("/proc/{}/mem", pid)).map_err(|e| MemoryError::from_os(pid, e))?;
        Ok(Self { file, pid })
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    /// Read at a virtual address, looping until the buffer is full or the
    /// mapping ends. Returns the number of bytes actually read.
    pub fn read_at(&self, addr: u64, buf: &mut [u8]) -> Result<usize, MemoryError> {
        let mut done = 0;

        while done < buf.len() {
            match self.file.read_at(&mut buf[done..], addr + done as u64) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(MemoryError::from_os(self.pid, e)),
            }
        }

        Ok(done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_process_accessible() {
        let pid = std::process::id() as i32;
        assert!(PidMem::accessible(pid));
    }

    #[test]
    fn test_read_own_memory() {
        let pid = std::process::id() as i32;
        let mem = PidMem::open(pid).unwrap();

        let local: u64 = 0xdead_beef_cafe_f00d;
        let mut buf = [0u8; 8];
        let got = mem.read_at(&local as *const u64 as u64, &mut buf).unwrap();
        assert_eq!(got, 8);
        assert_eq!(u64::from_ne_bytes(buf), local);
    }
}
