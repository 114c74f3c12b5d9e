//! 发送端状态机
//!
//! 把消息切成 ≤8 字节的分片逐个发送，每个分片等到带相同序号的干净
//! ACK 才前进。超时回滚游标重传；损坏或错序号的 ACK 一律忽略，且
//! 不重置等待计时器。

use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{ACK_TIMEOUT_MS, MAX_FINAL_TIMEOUTS};
use crate::net::endpoint::{Endpoint, RecvOutcome};
use crate::net::NetError;
use crate::wire::{PAYLOAD_LEN, Packet, SeqBit};

/// 一次消息传输的结局。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// 终端分片的 ACK 已收到，整条消息确认送达
    Completed { bytes: usize },
    /// 终端分片连续超时耗尽重试额度。
    ///
    /// 交替位协议无法区分 "数据丢了" 和 "最后一个 ACK 丢了"，
    /// 历史实现在这里乐观放弃；调用方自行决定如何上报。
    GaveUp { final_timeouts: u32 },
}

/// 发送端会话。
///
/// 出站帧物理上发往 `next_hop`（网络中继），帧内目的字段填最终
/// 接收端，由中继按字段转发。
pub struct Sender {
    endpoint: Endpoint,
    next_hop: SocketAddr,
    dest_ip: Ipv4Addr,
    dest_port: u16,
    ack_timeout: Duration,
}

impl Sender {
    pub fn new(endpoint: Endpoint, next_hop: SocketAddr, dest: SocketAddr) -> Sender {
        let dest_ip = match dest.ip() {
            std::net::IpAddr::V4(ip) => ip,
            std::net::IpAddr::V6(_) => Ipv4Addr::UNSPECIFIED,
        };
        Sender {
            endpoint,
            next_hop,
            dest_ip,
            dest_port: dest.port(),
            ack_timeout: Duration::from_millis(ACK_TIMEOUT_MS),
        }
    }

    /// 覆盖 ACK 等待超时（测试用短超时）。
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Sender {
        self.ack_timeout = timeout;
        self
    }

    /// 发送整条消息，直到终端分片被确认或重试额度耗尽。
    ///
    /// 长度为分片大小整数倍的消息（含空消息）以一个空的终端分片收尾，
    /// 否则最后一个不满载的分片自带终端标志。
    pub fn send_message(&mut self, msg: &[u8]) -> Result<TransferOutcome, NetError> {
        let mut seq = SeqBit::Zero;
        let mut cursor = 0usize;
        let mut acked_to = 0usize;
        let mut final_timeouts = 0u32;

        loop {
            // SEND_x：切片并发送
            let take = (msg.len() - cursor).min(PAYLOAD_LEN);
            let last = take < PAYLOAD_LEN;
            let payload = msg[cursor..cursor + take].to_vec();
            cursor += take;

            let pkt = Packet {
                src_ip: self.endpoint.local_ip(),
                src_port: self.endpoint.local_port(),
                dest_ip: self.dest_ip,
                dest_port: self.dest_port,
                seq,
                corrupt: false,
                last,
                payload,
            };
            self.endpoint.send_now(&pkt, self.next_hop)?;
            debug!(seq = seq.as_byte(), bytes = take, last, "分片已发送");
            if last {
                debug!("终端分片已发送");
            }

            // ACK_x：在一个固定期限内等待干净且序号正确的 ACK。
            // 损坏或错序号的到达不重置计时器，只消耗剩余等待时间。
            let deadline = Instant::now() + self.ack_timeout;
            let acked = loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break false;
                }
                match self.endpoint.recv(Some(remaining)) {
                    Ok(RecvOutcome::TimedOut) => break false,
                    Ok(RecvOutcome::Packet(ack, _from)) => {
                        if ack.corrupt {
                            debug!(seq = seq.as_byte(), "丢弃损坏的 ACK，继续等待");
                        } else if ack.seq == seq {
                            break true;
                        } else {
                            debug!(
                                got = ack.seq.as_byte(),
                                expected = seq.as_byte(),
                                "错序号 ACK，丢弃"
                            );
                        }
                    }
                    Err(NetError::Wire(e)) => {
                        warn!(%e, "忽略无法解码的数据报");
                    }
                    Err(e) => return Err(e),
                }
            };

            if acked {
                acked_to = cursor;
                if last {
                    info!(bytes = acked_to, "终端 ACK 已收到，消息发送完成");
                    return Ok(TransferOutcome::Completed { bytes: acked_to });
                }
                seq = seq.flip();
            } else {
                if last {
                    final_timeouts += 1;
                    warn!(final_timeouts, "终端分片等待 ACK 超时");
                    if final_timeouts >= MAX_FINAL_TIMEOUTS {
                        return Ok(TransferOutcome::GaveUp { final_timeouts });
                    }
                } else {
                    warn!(seq = seq.as_byte(), "等待 ACK 超时，重传");
                }
                // 回滚到最后确认的位置重传同一分片
                cursor = acked_to;
            }
        }
    }
}
