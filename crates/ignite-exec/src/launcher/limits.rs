//! POSIX rlimits for the launched daemon.
//!
//! Limits are raised inside a `pre_exec` hook, after `fork()` and before
//! `execve()`. A limit that cannot be raised is reported on stderr and the
//! daemon still starts; it decides itself whether it can run without it.
use tokio::process::Command;
#[cfg(not(unix))]
use tracing::warn;

/// Limits requested for the daemon process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaemonLimits {
    /// Raise `RLIMIT_MEMLOCK` to unlimited so the daemon can lock its memory.
    pub unlimited_memlock: bool,
}

impl DaemonLimits {
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.unlimited_memlock
    }
}

/// Attach the limits to `cmd`; a no-op on non-Unix targets.
pub fn attach_limits(cmd: &mut Command, limits: DaemonLimits) {
    if limits.is_empty() {
        return;
    }

    #[cfg(unix)]
    {
        unix_impl::attach_limits(cmd, limits);
    }

    #[cfg(not(unix))]
    {
        let _ = cmd;
        warn!(?limits, "rlimits requested on a non-Unix OS; ignored");
    }
}

#[cfg(unix)]
mod unix_impl {
    use super::DaemonLimits;
    use std::io;
    use tokio::process::Command;

    pub fn attach_limits(cmd: &mut Command, limits: DaemonLimits) {
        let memlock = limits.unlimited_memlock;

        unsafe {
            cmd.pre_exec(move || {
                if memlock {
                    if let Err(e) = raise_to_infinity(rlimit_memlock()) {
                        pre_exec_log(b"ignite: failed to raise RLIMIT_MEMLOCK: ");
                        pre_exec_log_errno(e.raw_os_error().unwrap_or(0));
                    }
                }
                Ok(())
            });
        }
    }

    #[inline]
    fn rlimit_memlock() -> libc::c_int {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            libc::RLIMIT_MEMLOCK as libc::c_int
        }
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        {
            libc::RLIMIT_MEMLOCK
        }
    }

    /// Set both soft and hard limit to `RLIM_INFINITY`, falling back to the
    /// current hard limit when the process may not raise it.
    fn raise_to_infinity(resource: libc::c_int) -> io::Result<()> {
        let mut current = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        if unsafe { getrlimit_compat(resource, &mut current) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let unlimited = libc::rlimit {
            rlim_cur: libc::RLIM_INFINITY,
            rlim_max: libc::RLIM_INFINITY,
        };
        if unsafe { setrlimit_compat(resource, &unlimited) } == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();

        let soft_to_hard = libc::rlimit {
            rlim_cur: current.rlim_max,
            rlim_max: current.rlim_max,
        };
        unsafe { setrlimit_compat(resource, &soft_to_hard) };
        Err(err)
    }

    #[inline]
    unsafe fn getrlimit_compat(resource: libc::c_int, rlim: *mut libc::rlimit) -> libc::c_int {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            unsafe { libc::getrlimit(resource as libc::__rlimit_resource_t, rlim) }
        }
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        {
            unsafe { libc::getrlimit(resource, rlim) }
        }
    }

    #[inline]
    unsafe fn setrlimit_compat(resource: libc::c_int, rlim: *const libc::rlimit) -> libc::c_int {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            unsafe { libc::setrlimit(resource as libc::__rlimit_resource_t, rlim) }
        }
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        {
            unsafe { libc::setrlimit(resource, rlim) }
        }
    }

    /// Raw stderr write, safe between `fork()` and `execve()`.
    fn pre_exec_log(msg: &[u8]) {
        unsafe {
            libc::write(
                libc::STDERR_FILENO,
                msg.as_ptr() as *const libc::c_void,
                msg.len(),
            );
        }
    }

    /// Write `errno=<n>\n` using only a stack buffer.
    fn pre_exec_log_errno(errno: i32) {
        let mut buf = [0u8; 24];
        let mut idx = buf.len() - 1;
        buf[idx] = b'\n';
        let mut n = errno.unsigned_abs();
        loop {
            idx -= 1;
            buf[idx] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        pre_exec_log(b"errno=");
        pre_exec_log(&buf[idx..]);
    }
}
