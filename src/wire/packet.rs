//! 数据包类型
//!
//! 定义 RDT 帧的内存表示及交替位序号。

use std::net::{Ipv4Addr, SocketAddr};

/// 地址字段宽度（点分十进制 ASCII，NUL 填充）。
pub const ADDR_LEN: usize = 16;
/// 端口字段宽度（十进制 ASCII，NUL 填充）。
pub const PORT_LEN: usize = 6;
/// 单个分片的最大载荷字节数。
pub const PAYLOAD_LEN: usize = 8;

/// 交替位序号：stop-and-wait 协议的全部序号空间。
///
/// 反方向复用为 ACK 号。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqBit {
    Zero,
    One,
}

impl SeqBit {
    /// 翻转到另一个序号
    pub fn flip(self) -> SeqBit {
        match self {
            SeqBit::Zero => SeqBit::One,
            SeqBit::One => SeqBit::Zero,
        }
    }

    /// 线上的原始字节表示
    pub fn as_byte(self) -> u8 {
        match self {
            SeqBit::Zero => 0,
            SeqBit::One => 1,
        }
    }

    /// 从线上的字节解析；非 0/1 返回 `None`
    pub fn from_byte(b: u8) -> Option<SeqBit> {
        match b {
            0 => Some(SeqBit::Zero),
            1 => Some(SeqBit::One),
            _ => None,
        }
    }
}

/// 一个 RDT 帧。
///
/// 数据帧与 ACK 帧共用同一结构：ACK 的载荷为空、`last` 恒为 false、
/// 源/目的字段与对应数据帧互换。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// 发送方 UDP 套接字的 IPv4 地址（网络中继会改写为实际观测到的源地址）
    pub src_ip: Ipv4Addr,
    pub src_port: u16,
    /// 最终目的地址：中继据此转发，而不看数据报的物理来源
    pub dest_ip: Ipv4Addr,
    pub dest_port: u16,
    /// 交替位序号 / ACK 号
    pub seq: SeqBit,
    /// 损坏标志，只由网络中继置位
    pub corrupt: bool,
    /// 终端分片标志，只由发送端置位
    pub last: bool,
    /// 消息分片，至多 [`PAYLOAD_LEN`] 字节
    pub payload: Vec<u8>,
}

impl Packet {
    /// 帧内目的字段对应的套接字地址（中继转发用）
    pub fn dest_addr(&self) -> SocketAddr {
        SocketAddr::from((self.dest_ip, self.dest_port))
    }
}
