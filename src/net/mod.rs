//! 传输层
//!
//! UDP 端点封装、主机名解析与网络损伤中继。协议逻辑不在这里：
//! 本模块只负责把 [`crate::wire::Packet`] 搬进搬出套接字。

pub mod endpoint;
pub mod relay;
pub mod resolve;
pub mod stats;

use std::io;

use thiserror::Error;

use crate::wire::WireError;

pub use endpoint::{Endpoint, RecvOutcome};
pub use relay::{Impairments, Relay};
pub use resolve::resolve;
pub use stats::RelayStats;

/// 传输层错误。
///
/// 这些都是致命错误：协议异常（损坏、错序号、超时）由 ARQ 状态机
/// 自行恢复，不会出现在这里。
#[derive(Debug, Error)]
pub enum NetError {
    #[error("unable to bind UDP socket to port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("send failed: {0}")]
    Send(#[source] io::Error),
    #[error("receive failed: {0}")]
    Recv(#[source] io::Error),
    #[error("unable to resolve host {host}:{port}")]
    Resolve { host: String, port: u16 },
    #[error(transparent)]
    Wire(#[from] WireError),
}
