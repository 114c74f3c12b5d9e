//! Hostname resolution.
//!
//! Thin wrapper over `ToSocketAddrs`; failure is a fatal configuration
//! error, never a protocol concern.

use std::net::{SocketAddr, ToSocketAddrs};

use super::NetError;

/// 解析 `host:port` 为 IPv4 套接字地址。
///
/// 只取第一个 IPv4 结果（协议栈不支持 IPv6）。
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr, NetError> {
    let resolve_err = || NetError::Resolve {
        host: host.to_string(),
        port,
    };
    (host, port)
        .to_socket_addrs()
        .map_err(|_| resolve_err())?
        .find(|addr| addr.is_ipv4())
        .ok_or_else(resolve_err)
}
