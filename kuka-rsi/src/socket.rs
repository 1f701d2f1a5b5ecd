//! Socket setup tuned for minimal-latency UDP exchange.

use std::net::UdpSocket;

use crate::config::Config;
use crate::error::Error;

/// Socket buffer size requested for both directions, 1 MiB.
const SOCKET_BUFFER_BYTES: usize = 1024 * 1024;

/// Bind a UDP socket per `config`: `SO_REUSEADDR` on, 1 MiB send/receive
/// buffers, non-blocking mode. Buffer-enlargement failures are logged and
/// otherwise ignored — they degrade headroom under load, not correctness.
pub fn bind(config: &Config) -> Result<UdpSocket, Error> {
    let addr = format!("{}:{}", config.local_ip, config.local_port);
    tracing::debug!(verbose = config.verbose, %addr, "RSI: binding socket");

    let socket = UdpSocket::bind(&addr).map_err(|e| {
        tracing::warn!("RSI: bind failed for {addr}: {e}");
        Error::SocketFailed
    })?;

    apply_reuseaddr(&socket, config.verbose);
    enlarge_buffers(&socket, config.verbose);

    socket.set_nonblocking(true).map_err(|e| {
        tracing::warn!("RSI: set_nonblocking failed: {e}");
        Error::SocketFailed
    })?;

    if config.verbose {
        tracing::info!("RSI: socket configured for minimal latency on {addr}");
    }

    Ok(socket)
}

#[cfg(unix)]
fn apply_reuseaddr(socket: &UdpSocket, verbose: bool) {
    use std::os::unix::io::AsRawFd;

    let fd = socket.as_raw_fd();
    let reuse: libc::c_int = 1;
    let rc = unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_REUSEADDR,
            &reuse as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if rc != 0 && verbose {
        tracing::warn!("RSI: setsockopt(SO_REUSEADDR) failed: {}", std::io::Error::last_os_error());
    }
}

#[cfg(unix)]
fn enlarge_buffers(socket: &UdpSocket, verbose: bool) {
    use std::os::unix::io::AsRawFd;

    let fd = socket.as_raw_fd();
    let size = SOCKET_BUFFER_BYTES as libc::c_int;

    for (name, opt) in [("SO_RCVBUF", libc::SO_RCVBUF), ("SO_SNDBUF", libc::SO_SNDBUF)] {
        let rc = unsafe {
            libc::setsockopt(
                fd,
                libc::SOL_SOCKET,
                opt,
                &size as *const _ as *const libc::c_void,
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if rc != 0 && verbose {
            tracing::warn!("RSI: setsockopt({name}) failed: {}", std::io::Error::last_os_error());
        }
    }
}

#[cfg(windows)]
fn apply_reuseaddr(_socket: &UdpSocket, _verbose: bool) {
    // std's UdpSocket::bind on Windows does not set SO_EXCLUSIVEADDRUSE,
    // so rebinding a just-closed port already behaves like SO_REUSEADDR
    // on POSIX; no extra option is needed here.
}

#[cfg(windows)]
fn enlarge_buffers(socket: &UdpSocket, verbose: bool) {
    use std::os::windows::io::AsRawSocket;
    use windows_sys::Win32::Networking::WinSock::{
        setsockopt, SOCKET, SOL_SOCKET, SO_RCVBUF, SO_SNDBUF,
    };

    let sock = socket.as_raw_socket() as SOCKET;
    let size: i32 = SOCKET_BUFFER_BYTES as i32;

    for (name, opt) in [("SO_RCVBUF", SO_RCVBUF), ("SO_SNDBUF", SO_SNDBUF)] {
        let rc = unsafe {
            setsockopt(
                sock,
                SOL_SOCKET as i32,
                opt as i32,
                &size as *const i32 as *const i8,
                std::mem::size_of::<i32>() as i32,
            )
        };
        if rc != 0 && verbose {
            tracing::warn!("RSI: setsockopt({name}) failed: {}", std::io::Error::last_os_error());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_to_ephemeral_loopback_port() {
        let config = Config { local_ip: "127.0.0.1".to_string(), local_port: 0, ..Config::default() };
        let socket = bind(&config).expect("loopback bind should succeed");
        assert!(socket.local_addr().unwrap().port() > 0);
    }

    #[test]
    fn socket_is_nonblocking_after_bind() {
        let config = Config { local_ip: "127.0.0.1".to_string(), local_port: 0, ..Config::default() };
        let socket = bind(&config).unwrap();
        let mut buf = [0u8; 4];
        let err = socket.recv_from(&mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::WouldBlock);
    }
}
