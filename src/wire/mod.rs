//! # RDT 3.0 线格式
//!
//! 固定 55 字节的帧，三个进程（发送端、网络、接收端）各自独立编解码，
//! 字段偏移就是互操作契约。
//!
//! ```text
//! 0        16    22       38    44 45 46 47      55 (BYTE)
//! +--------+-----+--------+-----+--+--+--+--------+
//! | src_ip |sport| dst_ip |dport|sq|cr|ls|payload |
//! +--------+-----+--------+-----+--+--+--+--------+
//! ```
//!
//! - 地址与端口为 ASCII 文本、NUL 填充（历史格式，保持可读性）。
//! - `sq`/`cr`/`ls` 为原始 0/1 字节：交替位序号、损坏标志、终端分片标志。
//! - ACK 与数据帧同构：载荷为空、源/目的互换，帧长不变。
//!
//! # Invariants
//!
//! - 非终端分片的载荷恰好填满 8 字节。
//! - 终端分片（`ls = 1`）的载荷止于首个 NUL，消息文本不得含 NUL。

pub mod codec;
pub mod packet;

pub use codec::{PACKET_LEN, WireError, decode, encode};
pub use packet::{ADDR_LEN, PAYLOAD_LEN, PORT_LEN, Packet, SeqBit};
