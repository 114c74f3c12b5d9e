//! 接收端状态机
//!
//! 只做被动响应：按期望序号拼装消息，重复分片不追加但补发 ACK，
//! 损坏的分片静默丢弃（不发 ACK，留给发送端超时重传）。

use std::net::SocketAddr;

use tracing::{debug, info, warn};

use super::MAX_MSG_SIZE;
use crate::net::endpoint::{Endpoint, RecvOutcome};
use crate::net::NetError;
use crate::wire::{Packet, SeqBit};

/// 接收端会话。
pub struct Receiver {
    endpoint: Endpoint,
    expected: SeqBit,
    max_len: usize,
}

impl Receiver {
    pub fn new(endpoint: Endpoint) -> Receiver {
        Receiver {
            endpoint,
            expected: SeqBit::Zero,
            max_len: MAX_MSG_SIZE,
        }
    }

    /// 接收一条完整消息。
    ///
    /// 无限阻塞直到终端分片被接受（或缓冲被填满，历史上限
    /// [`MAX_MSG_SIZE`]）。
    pub fn receive_message(&mut self) -> Result<Vec<u8>, NetError> {
        let mut message = Vec::new();

        loop {
            let (pkt, from) = match self.endpoint.recv(None) {
                Ok(RecvOutcome::Packet(pkt, from)) => (pkt, from),
                Ok(RecvOutcome::TimedOut) => continue,
                Err(NetError::Wire(e)) => {
                    warn!(%e, "忽略无法解码的数据报");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if pkt.corrupt {
                // 不追加、不换状态、不发 ACK：发送端会超时重传
                debug!(seq = pkt.seq.as_byte(), "丢弃损坏的分片");
                continue;
            }

            if pkt.seq == self.expected {
                let mut complete = pkt.last;
                if !pkt.payload.is_empty() {
                    if message.len() + pkt.payload.len() <= self.max_len {
                        message.extend_from_slice(&pkt.payload);
                        debug!(
                            seq = pkt.seq.as_byte(),
                            bytes = pkt.payload.len(),
                            total = message.len(),
                            "分片已接受"
                        );
                    } else {
                        // 缓冲满：停止接收（历史行为），仍然确认该分片
                        warn!(total = message.len(), "消息缓冲已满，提前结束");
                        complete = true;
                    }
                }
                self.expected = self.expected.flip();
                self.send_ack(&pkt, from, pkt.seq)?;
                if complete {
                    info!(bytes = message.len(), "消息接收完成");
                    return Ok(message);
                }
            } else {
                // 上一个分片的重复：ACK 丢了，补发上次的确认但不追加数据
                debug!(
                    got = pkt.seq.as_byte(),
                    expected = self.expected.as_byte(),
                    "重复分片，补发 ACK"
                );
                self.send_ack(&pkt, from, pkt.seq)?;
            }
        }
    }

    /// 回一个 ACK：源/目的互换的空载荷帧，物理上发回数据报的来源
    /// （通常是网络中继）。
    fn send_ack(&self, data: &Packet, from: SocketAddr, bit: SeqBit) -> Result<(), NetError> {
        let ack = Packet {
            src_ip: self.endpoint.local_ip(),
            src_port: self.endpoint.local_port(),
            dest_ip: data.src_ip,
            dest_port: data.src_port,
            seq: bit,
            corrupt: false,
            last: false,
            payload: Vec::new(),
        };
        self.endpoint.send_now(&ack, from)?;
        Ok(())
    }
}
