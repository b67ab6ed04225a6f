//! Process-level syscall wrappers: forking, session creation, privilege
//! manipulation, and file-descriptor hygiene.

/// Outcome of a `fork()` call, seen from the caller's side.
#[derive(Debug, Clone, Copy)]
pub enum Fork {
    /// We are the original process; `pid` is the child's process ID.
    Parent { pid: i32 },
    /// We are the newly forked child.
    Child,
}

/// Fork the current process.
pub fn fork() -> std::io::Result<Fork> {
    // SAFETY: plain fork(2); the caller is single-threaded during
    // daemonization, so no locks can be left held in the child.
    let pid = unsafe { libc::fork() };
    match pid {
        -1 => Err(std::io::Error::last_os_error()),
        0 => Ok(Fork::Child),
        pid => Ok(Fork::Parent { pid }),
    }
}

/// Create a new session, detaching from the controlling terminal.
/// Fails if the calling process is already a session leader.
pub fn setsid() -> std::io::Result<()> {
    let ret = unsafe { libc::setsid() };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Return the real user ID of the calling process.
pub fn getuid() -> u32 {
    // SAFETY: getuid() is always safe to call and cannot fail
    unsafe { libc::getuid() }
}

/// Return the real group ID of the calling process.
pub fn getgid() -> u32 {
    // SAFETY: getgid() is always safe to call and cannot fail
    unsafe { libc::getgid() }
}

/// Set the group ID.
pub fn setgid(gid: u32) -> std::io::Result<()> {
    let ret = unsafe { libc::setgid(gid) };
    if ret == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

/// Set the user ID.
pub fn setuid(uid: u32) -> std::io::Result<()> {
    let ret = unsafe { libc::setuid(uid) };
    if ret == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

/// Probe whether the process can regain root by calling `seteuid(0)`.
///
/// Returns `true` if the call succeeds, meaning the privilege drop did not
/// stick (or the process never dropped). After a correct drop to an
/// unprivileged account this must return `false`.
pub fn reescalation_possible() -> bool {
    // SAFETY: seteuid(0) either fails with EPERM (expected after a drop)
    // or succeeds, in which case the effective UID is already 0.
    unsafe { libc::seteuid(0) == 0 }
}

/// Close every inherited file descriptor, stdio included.
///
/// Platform strategies:
/// - BSDs: `closefrom(3)`, then the stdio triple by hand
/// - Linux: `close_range` syscall (5.9+) → `/proc/self/fd` enumeration
/// - macOS and fallback: fd-directory enumeration → brute-force over
///   `sysconf(_SC_OPEN_MAX)`
pub fn close_all_fds() {
    #[cfg(any(target_os = "freebsd", target_os = "openbsd", target_os = "netbsd"))]
    {
        unsafe {
            libc::closefrom(3);
            libc::close(2);
            libc::close(1);
            libc::close(0);
        }
        return;
    }

    #[cfg(target_os = "linux")]
    {
        let ret = unsafe { libc::syscall(libc::SYS_close_range, 0u32, u32::MAX, 0u32) };
        if ret == 0 {
            return;
        }
    }

    #[cfg(not(any(target_os = "freebsd", target_os = "openbsd", target_os = "netbsd")))]
    {
        let fd_dir = if cfg!(target_os = "linux") {
            "/proc/self/fd"
        } else {
            "/dev/fd"
        };

        if let Ok(entries) = std::fs::read_dir(fd_dir) {
            let fds_to_close: Vec<i32> = entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().to_str().and_then(|s| s.parse::<i32>().ok()))
                .collect();

            for fd in fds_to_close {
                unsafe {
                    libc::close(fd);
                }
            }
            return;
        }

        let max_fd = unsafe { libc::sysconf(libc::_SC_OPEN_MAX) } as i32;
        let max_fd = if max_fd > 0 { max_fd } else { 1024 };
        for fd in 0..max_fd {
            unsafe {
                libc::close(fd);
            }
        }
    }
}

/// Point fds 0, 1, and 2 at `/dev/null`.
///
/// Called right after [`close_all_fds`] so that later writes to stdio (from
/// logging, library code, or error paths) go nowhere instead of landing on
/// whatever descriptor was opened next.
pub fn redirect_stdio_dev_null() -> std::io::Result<()> {
    let devnull = std::ffi::CString::new("/dev/null").expect("static path has no NUL");
    // SAFETY: with all descriptors closed, open(2) returns the lowest free
    // fd, which is 0; the dup2 calls then clone it onto 1 and 2.
    unsafe {
        let fd = libc::open(devnull.as_ptr(), libc::O_RDWR);
        if fd == -1 {
            return Err(std::io::Error::last_os_error());
        }
        if libc::dup2(fd, 1) == -1 || libc::dup2(fd, 2) == -1 {
            return Err(std::io::Error::last_os_error());
        }
        if fd > 2 {
            libc::close(fd);
        }
    }
    Ok(())
}
