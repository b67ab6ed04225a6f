//! Privileged TCP listener setup.

use std::net::TcpListener;
use std::os::fd::FromRawFd;

/// Pending-connection queue depth handed to `listen(2)`.
pub const LISTEN_BACKLOG: i32 = 50;

/// Create a TCP listener bound to all interfaces on `port`.
///
/// Sets `SO_REUSEADDR` so a fast restart is not blocked by the previous
/// instance's socket lingering in TIME_WAIT, then binds and listens with a
/// backlog of [`LISTEN_BACKLOG`]. Must be called before privileges are
/// dropped when `port` is below 1024.
///
/// Any syscall failure (socket, setsockopt, bind, listen) is reported as a
/// single error; the caller does not get to distinguish the causes.
pub fn bind_listen(port: u16) -> std::io::Result<TcpListener> {
    // SAFETY: raw BSD socket calls; the fd is either handed to TcpListener
    // (which takes ownership) or closed on every error path.
    unsafe {
        let fd = libc::socket(libc::AF_INET, libc::SOCK_STREAM, 0);
        if fd == -1 {
            return Err(std::io::Error::last_os_error());
        }

        let reuse: libc::c_int = 1;
        if libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_REUSEADDR,
            &reuse as *const libc::c_int as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        ) == -1
        {
            let err = std::io::Error::last_os_error();
            libc::close(fd);
            return Err(err);
        }

        let mut addr: libc::sockaddr_in = std::mem::zeroed();
        addr.sin_family = libc::AF_INET as libc::sa_family_t;
        addr.sin_addr.s_addr = libc::INADDR_ANY.to_be();
        addr.sin_port = port.to_be();

        if libc::bind(
            fd,
            &addr as *const libc::sockaddr_in as *const libc::sockaddr,
            std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        ) == -1
        {
            let err = std::io::Error::last_os_error();
            libc::close(fd);
            return Err(err);
        }

        if libc::listen(fd, LISTEN_BACKLOG) == -1 {
            let err = std::io::Error::last_os_error();
            libc::close(fd);
            return Err(err);
        }

        Ok(TcpListener::from_raw_fd(fd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpStream;

    #[test]
    fn binds_ephemeral_port_and_accepts() {
        let listener = bind_listen(0).unwrap();
        let addr = listener.local_addr().unwrap();
        assert_ne!(addr.port(), 0);

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"hello").unwrap();
        let (conn, peer) = listener.accept().unwrap();
        assert!(peer.ip().is_loopback());
        drop(conn);
    }

    #[test]
    fn rebinding_same_port_after_drop_succeeds() {
        let port = {
            let listener = bind_listen(0).unwrap();
            listener.local_addr().unwrap().port()
        };
        // SO_REUSEADDR means the immediate rebind must not fail
        bind_listen(port).unwrap();
    }

    #[test]
    fn bind_conflict_is_reported() {
        let listener = bind_listen(0).unwrap();
        let port = listener.local_addr().unwrap().port();
        // Second listener on the same live port must fail
        assert!(bind_listen(port).is_err());
    }
}
