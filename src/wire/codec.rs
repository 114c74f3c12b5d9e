//! 帧编解码
//!
//! 按 [`crate::wire`] 的固定布局做字节精确的编解码。没有长度字段：
//! 帧本身恒为 [`PACKET_LEN`] 字节，终端分片的载荷长度由首个 NUL 决定。

use std::net::Ipv4Addr;

use thiserror::Error;

use super::packet::{ADDR_LEN, PAYLOAD_LEN, PORT_LEN, Packet, SeqBit};

/// 帧总长（字节）。数据帧与 ACK 帧相同。
pub const PACKET_LEN: usize = ADDR_LEN + PORT_LEN + ADDR_LEN + PORT_LEN + 3 + PAYLOAD_LEN;

// 各字段在帧内的偏移
const OFF_SRC_IP: usize = 0;
const OFF_SRC_PORT: usize = OFF_SRC_IP + ADDR_LEN;
const OFF_DEST_IP: usize = OFF_SRC_PORT + PORT_LEN;
const OFF_DEST_PORT: usize = OFF_DEST_IP + ADDR_LEN;
const OFF_SEQ: usize = OFF_DEST_PORT + PORT_LEN;
const OFF_CORRUPT: usize = OFF_SEQ + 1;
const OFF_LAST: usize = OFF_CORRUPT + 1;
const OFF_PAYLOAD: usize = OFF_LAST + 1;

/// 帧级错误：长度不符或字段无法解析。
#[derive(Debug, Error)]
pub enum WireError {
    #[error("bad frame length: expected {PACKET_LEN} bytes, got {actual}")]
    BadLength { actual: usize },
    #[error("bad field `{field}`")]
    BadField { field: &'static str },
}

/// 编码为固定 55 字节的帧。
///
/// 载荷超出 [`PAYLOAD_LEN`] 属于构造错误，debug 构建下直接 panic。
pub fn encode(pkt: &Packet) -> [u8; PACKET_LEN] {
    debug_assert!(pkt.payload.len() <= PAYLOAD_LEN);

    let mut buf = [0u8; PACKET_LEN];
    put_text(&mut buf[OFF_SRC_IP..OFF_SRC_PORT], &pkt.src_ip.to_string());
    put_text(&mut buf[OFF_SRC_PORT..OFF_DEST_IP], &pkt.src_port.to_string());
    put_text(&mut buf[OFF_DEST_IP..OFF_DEST_PORT], &pkt.dest_ip.to_string());
    put_text(&mut buf[OFF_DEST_PORT..OFF_SEQ], &pkt.dest_port.to_string());
    buf[OFF_SEQ] = pkt.seq.as_byte();
    buf[OFF_CORRUPT] = pkt.corrupt as u8;
    buf[OFF_LAST] = pkt.last as u8;
    buf[OFF_PAYLOAD..OFF_PAYLOAD + pkt.payload.len()].copy_from_slice(&pkt.payload);
    buf
}

/// 从一个完整的数据报解码。
///
/// 载荷长度恢复规则（历史契约）：非终端分片恒为满载 8 字节；
/// 终端分片取首个 NUL 之前的字节。
pub fn decode(buf: &[u8]) -> Result<Packet, WireError> {
    if buf.len() != PACKET_LEN {
        return Err(WireError::BadLength { actual: buf.len() });
    }

    let src_ip = take_ip(&buf[OFF_SRC_IP..OFF_SRC_PORT], "src_ip")?;
    let src_port = take_port(&buf[OFF_SRC_PORT..OFF_DEST_IP], "src_port")?;
    let dest_ip = take_ip(&buf[OFF_DEST_IP..OFF_DEST_PORT], "dest_ip")?;
    let dest_port = take_port(&buf[OFF_DEST_PORT..OFF_SEQ], "dest_port")?;
    let seq = SeqBit::from_byte(buf[OFF_SEQ]).ok_or(WireError::BadField { field: "seq" })?;
    let corrupt = take_flag(buf[OFF_CORRUPT], "corrupt")?;
    let last = take_flag(buf[OFF_LAST], "last")?;

    let raw = &buf[OFF_PAYLOAD..];
    let payload = if last {
        let len = raw.iter().position(|&b| b == 0).unwrap_or(PAYLOAD_LEN);
        raw[..len].to_vec()
    } else {
        raw.to_vec()
    };

    Ok(Packet {
        src_ip,
        src_port,
        dest_ip,
        dest_port,
        seq,
        corrupt,
        last,
        payload,
    })
}

fn put_text(field: &mut [u8], text: &str) {
    // 字段宽度按构造保证足够（IPv4 至多 15 字符，端口至多 5 字符）
    field[..text.len()].copy_from_slice(text.as_bytes());
}

fn take_text<'a>(field: &'a [u8], name: &'static str) -> Result<&'a str, WireError> {
    let len = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..len]).map_err(|_| WireError::BadField { field: name })
}

fn take_ip(field: &[u8], name: &'static str) -> Result<Ipv4Addr, WireError> {
    take_text(field, name)?
        .parse()
        .map_err(|_| WireError::BadField { field: name })
}

fn take_port(field: &[u8], name: &'static str) -> Result<u16, WireError> {
    take_text(field, name)?
        .parse()
        .map_err(|_| WireError::BadField { field: name })
}

fn take_flag(b: u8, name: &'static str) -> Result<bool, WireError> {
    match b {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(WireError::BadField { field: name }),
    }
}
