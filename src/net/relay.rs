//! 网络损伤中继
//!
//! 在发送端与接收端之间做对称转发，按配置的概率丢弃、损坏或延迟
//! 每一帧，用来检验两侧 ARQ 状态机在非理想网络下的行为。
//!
//! 中继是地址透明的：转发目的地完全取自帧内的目的字段，事先不知道
//! 谁是发送端、谁是接收端；"首个观测到的源是发送端" 只是统计口径，
//! 与正确性无关。

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use rand::Rng;
use rand::rngs::ThreadRng;
use tracing::{debug, info, warn};

use super::endpoint::{Endpoint, RecvOutcome};
use super::stats::RelayStats;
use super::NetError;
use crate::wire::Packet;

/// 延迟转发的固定时长（毫秒）。
pub const DELAY_MS: u64 = 3_000;
/// 默认每处理多少个包上报一次统计。
pub const STATS_INTERVAL: u64 = 3;
/// 概率上限（百分比）。
pub const MAX_PERCENT: u8 = 100;

/// 损伤配置：三个相互独立的百分比概率，范围 [0, 100]。
#[derive(Debug, Clone, Copy, Default)]
pub struct Impairments {
    pub loss_percent: u8,
    pub delay_percent: u8,
    pub corrupt_percent: u8,
}

/// 按百分比概率掷一次骰子。
///
/// `uniform(0..100) < percent`，即 100 必然为真、0 必然为假。
pub fn chance<R: Rng>(rng: &mut R, percent: u8) -> bool {
    rng.random_range(0..MAX_PERCENT) < percent
}

/// 损伤中继本体。
///
/// 统计计数归中继自己所有，主循环单线程改写；延迟转发在独立线程上
/// 持有帧与套接字的拷贝，与主循环不共享可变状态。
pub struct Relay {
    endpoint: Endpoint,
    imp: Impairments,
    delay: Duration,
    stats: RelayStats,
    /// 首个观测到的帧内源地址，用于区分发送端/接收端（仅统计）
    first_source: Option<(Ipv4Addr, u16)>,
    rng: ThreadRng,
}

impl Relay {
    pub fn new(endpoint: Endpoint, imp: Impairments) -> Relay {
        Relay {
            endpoint,
            imp,
            delay: Duration::from_millis(DELAY_MS),
            stats: RelayStats::default(),
            first_source: None,
            rng: rand::rng(),
        }
    }

    pub fn stats(&self) -> &RelayStats {
        &self.stats
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.endpoint.local_addr()
    }

    /// 接收并处理一帧：分类统计、掷损坏/丢弃/延迟骰子、转发。
    pub fn process_one(&mut self) -> Result<(), NetError> {
        let (mut pkt, from) = match self.endpoint.recv(None)? {
            RecvOutcome::Packet(pkt, from) => (pkt, from),
            // 无超时的接收不会超时
            RecvOutcome::TimedOut => return Ok(()),
        };

        self.classify(&pkt);

        if chance(&mut self.rng, self.imp.corrupt_percent) {
            pkt.corrupt = true;
            self.stats.corrupted += 1;
            debug!(seq = pkt.seq.as_byte(), "帧被标记为损坏");
        }

        // 把源地址改写为实际观测到的来源，接收端据此填写 ACK 的目的字段
        if let IpAddr::V4(observed) = from.ip() {
            pkt.src_ip = observed;
        }

        if chance(&mut self.rng, self.imp.loss_percent) {
            self.stats.dropped += 1;
            debug!(seq = pkt.seq.as_byte(), "帧在网络中丢失");
            return Ok(());
        }

        let dest = pkt.dest_addr();
        if chance(&mut self.rng, self.imp.delay_percent) {
            self.stats.delayed += 1;
            debug!(seq = pkt.seq.as_byte(), %dest, delay_ms = DELAY_MS, "延迟转发");
            self.endpoint.send_delayed(pkt, dest, self.delay)?;
        } else {
            debug!(seq = pkt.seq.as_byte(), %dest, "立即转发");
            self.endpoint.send_now(&pkt, dest)?;
        }
        Ok(())
    }

    /// 无限中继循环。
    ///
    /// 每处理 `stats_every` 个包调用一次 `on_stats`（0 表示不上报）。
    /// 无法解码的数据报记一条警告后继续，只有套接字错误才会返回。
    pub fn run<F>(&mut self, stats_every: u64, mut on_stats: F) -> Result<(), NetError>
    where
        F: FnMut(&RelayStats),
    {
        let mut since_report = 0u64;
        loop {
            match self.process_one() {
                Ok(()) => {}
                Err(NetError::Wire(e)) => {
                    warn!(%e, "忽略无法解码的数据报");
                    continue;
                }
                Err(e) => return Err(e),
            }

            info!(
                sender = self.stats.sender_pkts,
                receiver = self.stats.receiver_pkts,
                corrupted = self.stats.corrupted,
                delayed = self.stats.delayed,
                dropped = self.stats.dropped,
                "📡 转发统计"
            );

            since_report += 1;
            if stats_every > 0 && since_report >= stats_every {
                since_report = 0;
                on_stats(&self.stats);
            }
        }
    }

    fn classify(&mut self, pkt: &Packet) {
        let source = (pkt.src_ip, pkt.src_port);
        let first = *self.first_source.get_or_insert(source);
        if first == source {
            self.stats.sender_pkts += 1;
        } else {
            self.stats.receiver_pkts += 1;
        }
    }
}
