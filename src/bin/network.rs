//! 网络损伤模拟器
//!
//! 在发送端与接收端之间中继，按概率丢弃/损坏/延迟数据包

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use rdt_rs::net::relay::{Impairments, Relay, STATS_INTERVAL};
use rdt_rs::net::Endpoint;
use tracing::{error, warn};

#[derive(Debug, Parser)]
#[command(
    name = "network",
    about = "网络损伤模拟器：按概率丢弃/损坏/延迟转发数据包"
)]
struct Args {
    /// 本地 UDP 端口
    local_port: u16,
    /// 丢包概率（百分比）
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    lost_percent: u8,
    /// 延迟转发概率（百分比）
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    delayed_percent: u8,
    /// 损坏概率（百分比）
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    error_percent: u8,
    /// 统计信息 JSON 输出路径（可选）
    #[arg(long)]
    stats_json: Option<PathBuf>,
    /// 每处理多少个包写一次统计
    #[arg(long, default_value_t = STATS_INTERVAL)]
    stats_interval: u64,
}

fn main() {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .init();

    let args = Args::parse();

    let endpoint = match Endpoint::bind(args.local_port) {
        Ok(ep) => ep,
        Err(e) => {
            error!(%e, "绑定端口失败");
            std::process::exit(1);
        }
    };

    let imp = Impairments {
        loss_percent: args.lost_percent,
        delay_percent: args.delayed_percent,
        corrupt_percent: args.error_percent,
    };
    let mut relay = Relay::new(endpoint, imp);

    let stats_json = args.stats_json;
    let result = relay.run(args.stats_interval, |stats| {
        if let Some(path) = &stats_json {
            match serde_json::to_string_pretty(stats) {
                Ok(json) => {
                    if let Err(e) = fs::write(path, json) {
                        warn!(%e, path = %path.display(), "写入统计 JSON 失败");
                    }
                }
                Err(e) => warn!(%e, "序列化统计失败"),
            }
        }
    });

    if let Err(e) = result {
        error!(%e, "中继循环异常退出");
        std::process::exit(1);
    }
}
