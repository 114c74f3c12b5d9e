//! UDP 端点
//!
//! [`Endpoint`] 是对一个已绑定 UDP 套接字的薄封装：立即发送、延迟发送、
//! 带超时的阻塞接收。发送端、接收端与网络中继各持有一个，进程生命周期内
//! 不重建。

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::thread;
use std::time::Duration;

use tracing::trace;

use super::NetError;
use crate::wire::{self, PACKET_LEN, Packet};

/// 一次接收的结果。
#[derive(Debug)]
pub enum RecvOutcome {
    /// 收到并成功解码一帧；附带数据报的物理来源地址
    Packet(Packet, SocketAddr),
    /// 等待超时（仅当调用方给定了超时）
    TimedOut,
}

/// 已绑定的 UDP 端点。
pub struct Endpoint {
    sock: UdpSocket,
    local: SocketAddr,
}

impl Endpoint {
    /// 绑定 `0.0.0.0:port`。`port = 0` 时由系统分配临时端口（测试用）。
    pub fn bind(port: u16) -> Result<Endpoint, NetError> {
        let sock = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port))
            .map_err(|source| NetError::Bind { port, source })?;
        let local = sock
            .local_addr()
            .map_err(|source| NetError::Bind { port, source })?;
        trace!(%local, "端口绑定成功");
        Ok(Endpoint { sock, local })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    /// 本端 IPv4 地址，填入帧的源地址字段。
    ///
    /// 绑定在 `0.0.0.0` 时就是 `0.0.0.0`；网络中继转发时会把源地址
    /// 改写为实际观测到的来源，所以这里不需要更精确。
    pub fn local_ip(&self) -> Ipv4Addr {
        match self.local.ip() {
            std::net::IpAddr::V4(ip) => ip,
            std::net::IpAddr::V6(_) => Ipv4Addr::UNSPECIFIED,
        }
    }

    pub fn local_port(&self) -> u16 {
        self.local.port()
    }

    /// 立即发送一帧到 `dest`，不等待、不重试。
    pub fn send_now(&self, pkt: &Packet, dest: SocketAddr) -> Result<usize, NetError> {
        let buf = wire::encode(pkt);
        self.sock.send_to(&buf, dest).map_err(NetError::Send)
    }

    /// 延迟 `delay` 后发送一帧到 `dest`。
    ///
    /// 帧被深拷贝、套接字被克隆后交给一个独立线程，调用方立即返回，
    /// 也不会得知延迟发送的结果。仅网络中继用它来模拟抖动。
    pub fn send_delayed(
        &self,
        pkt: Packet,
        dest: SocketAddr,
        delay: Duration,
    ) -> Result<(), NetError> {
        let sock = self.sock.try_clone().map_err(NetError::Send)?;
        thread::spawn(move || {
            thread::sleep(delay);
            let buf = wire::encode(&pkt);
            let _ = sock.send_to(&buf, dest);
        });
        Ok(())
    }

    /// 阻塞接收下一帧。
    ///
    /// `timeout = None` 时无限等待。返回 [`RecvOutcome::TimedOut`] 表示
    /// 等待超时；解码失败按 [`NetError::Wire`] 上抛，由调用方决定是忽略
    /// 还是中止。
    pub fn recv(&self, timeout: Option<Duration>) -> Result<RecvOutcome, NetError> {
        self.sock.set_read_timeout(timeout).map_err(NetError::Recv)?;

        // 多留一个字节：超长数据报会读出 PACKET_LEN + 1 字节，
        // 在解码时按长度错误拒绝，而不是被悄悄截断。
        let mut buf = [0u8; PACKET_LEN + 1];
        match self.sock.recv_from(&mut buf) {
            Ok((n, from)) => {
                let pkt = wire::decode(&buf[..n])?;
                Ok(RecvOutcome::Packet(pkt, from))
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Ok(RecvOutcome::TimedOut)
            }
            Err(e) => Err(NetError::Recv(e)),
        }
    }
}
