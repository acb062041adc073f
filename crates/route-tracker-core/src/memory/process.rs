//! Attachment to the running game process.
//!
//! Discovery is by executable name via a ToolHelp snapshot. The main module
//! base and the target's pointer width are captured once at open time and
//! stay fixed for the lifetime of the handle.

use crate::error::{Error, Result};
use crate::memory::{PointerWidth, ReadMemory};

#[cfg(target_os = "windows")]
use windows::Win32::Foundation::{BOOL, CloseHandle, HANDLE};

/// Read-only handle to the game process
pub struct ProcessHandle {
    #[cfg(target_os = "windows")]
    handle: HANDLE,
    pub pid: u32,
    pub base_address: u64,
    pub pointer_width: PointerWidth,
}

// SAFETY: the handle is only used for ReadProcessMemory, which may be called
// from any thread, and it is closed exactly once in Drop.
#[cfg(target_os = "windows")]
unsafe impl Send for ProcessHandle {}
#[cfg(target_os = "windows")]
unsafe impl Sync for ProcessHandle {}

/// Compare a ToolHelp executable name against a configured process name,
/// ignoring case and an optional `.exe` suffix.
pub fn process_name_matches(exe_file: &str, wanted: &str) -> bool {
    fn stem(name: &str) -> &str {
        let split = name.len().saturating_sub(4);
        match (name.get(..split), name.get(split..)) {
            (Some(head), Some(ext)) if !head.is_empty() && ext.eq_ignore_ascii_case(".exe") => head,
            _ => name,
        }
    }
    stem(exe_file).eq_ignore_ascii_case(stem(wanted))
}

#[cfg(target_os = "windows")]
struct SnapshotHandle(HANDLE);

#[cfg(target_os = "windows")]
impl Drop for SnapshotHandle {
    fn drop(&mut self) {
        // SAFETY: the snapshot handle was returned by CreateToolhelp32Snapshot
        // and is not used after this point.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

#[cfg(target_os = "windows")]
fn utf16_name(raw: &[u16]) -> String {
    let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    String::from_utf16_lossy(&raw[..len])
}

#[cfg(target_os = "windows")]
impl ProcessHandle {
    /// Find a running process by executable name and open it for reading
    pub fn find_and_open(process_name: &str) -> Result<Self> {
        let pid = Self::find_pid(process_name)?
            .ok_or_else(|| Error::ProcessNotFound(process_name.to_string()))?;
        Self::open(pid)
    }

    /// Check whether a process with this executable name is running
    pub fn is_running(process_name: &str) -> bool {
        matches!(Self::find_pid(process_name), Ok(Some(_)))
    }

    /// Open a process by PID
    pub fn open(pid: u32) -> Result<Self> {
        use windows::Win32::System::Threading::{
            OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_VM_READ,
        };

        // SAFETY: OpenProcess has no memory-safety preconditions; failure is
        // reported through the returned Result.
        let handle = unsafe {
            OpenProcess(
                PROCESS_VM_READ | PROCESS_QUERY_LIMITED_INFORMATION,
                false,
                pid,
            )
        }
        .map_err(|e| Error::ProcessOpenFailed(format!("pid {}: {}", pid, e)))?;

        let base_address = match Self::main_module_base(pid) {
            Ok(base) => base,
            Err(e) => {
                // SAFETY: handle was just opened and is not stored anywhere
                unsafe {
                    let _ = CloseHandle(handle);
                }
                return Err(e);
            }
        };

        let pointer_width = Self::detect_pointer_width(handle);
        tracing::debug!(
            "Opened process {} (base: {:#x}, {})",
            pid,
            base_address,
            pointer_width
        );

        Ok(Self {
            handle,
            pid,
            base_address,
            pointer_width,
        })
    }

    /// Probe the module base; fails once the process has exited
    pub fn is_alive(&self) -> bool {
        self.read_bytes(self.base_address, 4).is_ok()
    }

    fn find_pid(process_name: &str) -> Result<Option<u32>> {
        use windows::Win32::System::Diagnostics::ToolHelp::{
            CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
            TH32CS_SNAPPROCESS,
        };

        // SAFETY: CreateToolhelp32Snapshot has no preconditions
        let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
            .map_err(|e| Error::ProcessOpenFailed(format!("process snapshot: {}", e)))?;
        let snapshot = SnapshotHandle(snapshot);

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        // SAFETY: entry.dwSize is initialised as the API requires and the
        // snapshot handle stays open for the whole enumeration.
        let mut next = unsafe { Process32FirstW(snapshot.0, &mut entry) };
        while next.is_ok() {
            if process_name_matches(&utf16_name(&entry.szExeFile), process_name) {
                return Ok(Some(entry.th32ProcessID));
            }
            // SAFETY: as above
            next = unsafe { Process32NextW(snapshot.0, &mut entry) };
        }

        Ok(None)
    }

    fn main_module_base(pid: u32) -> Result<u64> {
        use windows::Win32::System::Diagnostics::ToolHelp::{
            CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, TH32CS_SNAPMODULE,
            TH32CS_SNAPMODULE32,
        };

        // SAFETY: CreateToolhelp32Snapshot has no preconditions
        let snapshot =
            unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid) }
                .map_err(|e| {
                    Error::ProcessOpenFailed(format!("module snapshot for pid {}: {}", pid, e))
                })?;
        let snapshot = SnapshotHandle(snapshot);

        let mut entry = MODULEENTRY32W {
            dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };

        // SAFETY: entry.dwSize is initialised and the snapshot is open. The
        // first module of a process snapshot is its main executable.
        unsafe { Module32FirstW(snapshot.0, &mut entry) }.map_err(|e| {
            Error::ProcessOpenFailed(format!("cannot access main module of pid {}: {}", pid, e))
        })?;

        Ok(entry.modBaseAddr as u64)
    }

    fn detect_pointer_width(handle: HANDLE) -> PointerWidth {
        use windows::Win32::System::Threading::IsWow64Process;

        let mut wow64 = BOOL(0);
        // SAFETY: handle is a valid process handle with query rights and
        // wow64 outlives the call.
        match unsafe { IsWow64Process(handle, &mut wow64) } {
            // 32-bit processes on 64-bit Windows run under WOW64
            Ok(()) if wow64.as_bool() => PointerWidth::Bits32,
            Ok(()) => PointerWidth::native(),
            Err(e) => {
                tracing::warn!(
                    "IsWow64Process failed ({}), assuming {}",
                    e,
                    PointerWidth::native()
                );
                PointerWidth::native()
            }
        }
    }
}

#[cfg(target_os = "windows")]
impl ReadMemory for ProcessHandle {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;

        let mut buffer = vec![0u8; size];
        let mut bytes_read = 0usize;

        // SAFETY: buffer holds `size` writable bytes and bytes_read outlives
        // the call. The foreign address is only read by the kernel.
        let result = unsafe {
            ReadProcessMemory(
                self.handle,
                address as usize as *const std::ffi::c_void,
                buffer.as_mut_ptr().cast(),
                size,
                Some(&mut bytes_read),
            )
        };

        if let Err(e) = result {
            return Err(Error::MemoryReadFailed {
                address,
                message: e.to_string(),
            });
        }
        if bytes_read != size {
            return Err(Error::short_read(address, size, bytes_read));
        }

        Ok(buffer)
    }
}

#[cfg(target_os = "windows")]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was opened in `open` and is closed only here
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

#[cfg(not(target_os = "windows"))]
impl ProcessHandle {
    pub fn find_and_open(_process_name: &str) -> Result<Self> {
        Err(Error::UnsupportedPlatform)
    }

    pub fn is_running(_process_name: &str) -> bool {
        false
    }

    pub fn open(_pid: u32) -> Result<Self> {
        Err(Error::UnsupportedPlatform)
    }

    pub fn is_alive(&self) -> bool {
        false
    }
}

#[cfg(not(target_os = "windows"))]
impl ReadMemory for ProcessHandle {
    fn read_bytes(&self, _address: u64, _size: usize) -> Result<Vec<u8>> {
        Err(Error::UnsupportedPlatform)
    }
}
