//! 统计信息
//!
//! 网络中继的流量统计。只由中继的处理循环改写。

use serde::Serialize;

/// 中继统计信息
#[derive(Debug, Default, Clone, Serialize)]
pub struct RelayStats {
    /// 来自发送端（首个观测到的源）的包数
    pub sender_pkts: u64,
    /// 来自其他源（视为接收端）的包数
    pub receiver_pkts: u64,
    pub corrupted: u64,
    pub delayed: u64,
    pub dropped: u64,
}

impl RelayStats {
    /// 已处理的包总数
    pub fn total(&self) -> u64 {
        self.sender_pkts + self.receiver_pkts
    }
}
