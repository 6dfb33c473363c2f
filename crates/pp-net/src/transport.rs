//! TCP connection setup for the proxy hop.

use pp_core::LocatorError;
use pp_core::LocatorResult;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::time::Duration;
use tracing::debug;

pub(crate) fn resolve(host: &str, port: u16) -> LocatorResult<Vec<SocketAddr>> {
    // `Url::host_str` keeps brackets around IPv6 literals.
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let failed = |detail: String| {
        LocatorError::fetch(
            "fetch.proxy_unresolved",
            format!("cannot resolve proxy host `{host}:{port}`: {detail}"),
        )
    };

    let addresses = (host, port)
        .to_socket_addrs()
        .map_err(|error| failed(error.to_string()))?
        .collect::<Vec<_>>();
    if addresses.is_empty() {
        return Err(failed("no addresses".to_owned()));
    }
    Ok(addresses)
}

/// Tries each address in turn; the last failure is reported if none answers.
pub(crate) fn connect_first_available(
    addresses: &[SocketAddr],
    timeout: Duration,
) -> LocatorResult<TcpStream> {
    let mut failure = LocatorError::fetch(
        "fetch.proxy_unreachable",
        "proxy host resolved to no addresses",
    );
    for &address in addresses {
        match connect(address, timeout) {
            Ok(stream) => {
                debug!(%address, "connected to proxy");
                return Ok(stream);
            }
            Err(error) => failure = error,
        }
    }
    Err(failure)
}

fn connect(address: SocketAddr, timeout: Duration) -> LocatorResult<TcpStream> {
    let configure = |stream: &TcpStream| -> std::io::Result<()> {
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))
    };

    TcpStream::connect_timeout(&address, timeout)
        .and_then(|stream| configure(&stream).map(|()| stream))
        .map_err(|error| {
            LocatorError::fetch(
                "fetch.proxy_unreachable",
                format!("cannot reach proxy at {address}: {error}"),
            )
        })
}
