//! Utility functions used to extract process information from the system.

use std::io;

use nix::unistd::Pid;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcfsError {
    #[error("reading {path} failed")]
    ReadFile {
        #[source]
        source: io::Error,
        path: String,
    },
    #[error("name for process {0} not found")]
    NameNotFound(Pid),
}

/// Returns the command name for the given process.
#[cfg(target_os = "macos")]
pub fn get_process_comm(pid: Pid) -> Result<String, ProcfsError> {
    use std::ffi::{c_int, c_void};

    // From libproc, part of libSystem.
    unsafe extern "C" {
        fn proc_name(pid: c_int, buffer: *mut c_void, buffersize: u32) -> c_int;
    }

    // MAXCOMLEN is 16, proc_name accepts up to twice that.
    let mut buffer = [0_u8; 64];
    let len = unsafe {
        proc_name(
            pid.as_raw(),
            buffer.as_mut_ptr().cast(),
            buffer.len() as u32,
        )
    };
    if len <= 0 {
        return Err(ProcfsError::NameNotFound(pid));
    }
    let name = super::nul_terminated(&buffer[..len as usize]);
    Ok(String::from_utf8_lossy(name).into_owned())
}

/// Returns the command name for the given process.
#[cfg(not(target_os = "macos"))]
pub fn get_process_comm(pid: Pid) -> Result<String, ProcfsError> {
    let path = format!("/proc/{}/comm", pid);
    let data =
        std::fs::read_to_string(&path).map_err(|source| ProcfsError::ReadFile { source, path })?;
    let name = data.trim();
    if name.is_empty() {
        return Err(ProcfsError::NameNotFound(pid));
    }
    Ok(name.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_has_a_name() {
        let name = get_process_comm(nix::unistd::getpid()).unwrap();
        assert!(!name.is_empty());
    }
}
