//! UDP socket setup and polling.

use std::io;
use std::net::{SocketAddr, UdpSocket};

use socket2::{Domain, Protocol, Socket, Type};

use crate::config::ListenerConfig;
use crate::error::ListenerError;

/// Bind the listening socket described by `config`.
///
/// With `reuse_address` set, `SO_REUSEADDR` (and `SO_REUSEPORT` on Unix) is
/// enabled before binding so other tools can listen on the same port. Reads
/// time out after the poll interval, which bounds how long the worker can go
/// without checking its stop flag.
pub(crate) fn bind(config: &ListenerConfig) -> Result<UdpSocket, ListenerError> {
    let addr = config.socket_addr();
    let bind_err = |source: io::Error| ListenerError::Bind { addr, source };

    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(bind_err)?;
    if config.reuse_address {
        socket.set_reuse_address(true).map_err(bind_err)?;
        #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
        socket.set_reuse_port(true).map_err(bind_err)?;
    }
    socket.bind(&addr.into()).map_err(bind_err)?;

    let socket = UdpSocket::from(socket);
    socket
        .set_read_timeout(Some(config.poll_interval()))
        .map_err(bind_err)?;
    Ok(socket)
}

/// `WSAEMSGSIZE`: the datagram was larger than the receive buffer.
#[cfg(windows)]
const WSAEMSGSIZE: i32 = 10040;

/// Wait up to the socket's read timeout for one datagram.
///
/// `Ok(None)` means nothing arrived in time. A datagram larger than `buf` is
/// reported as a full buffer, as Unix truncation does; on Windows the sender
/// is unknown in that case.
pub(crate) fn poll_datagram(
    socket: &UdpSocket,
    buf: &mut [u8],
) -> io::Result<Option<(usize, Option<SocketAddr>)>> {
    match socket.recv_from(buf) {
        Ok((len, from)) => Ok(Some((len, Some(from)))),
        #[cfg(windows)]
        Err(e) if e.raw_os_error() == Some(WSAEMSGSIZE) => Ok(Some((buf.len(), None))),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
            ) =>
        {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
