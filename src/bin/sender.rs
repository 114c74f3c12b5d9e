//! RDT 发送端
//!
//! 从标准输入读一行消息，经网络模拟器发给接收端

use std::io::{self, BufRead, Write};

use clap::Parser;
use rdt_rs::arq::{Sender, TransferOutcome};
use rdt_rs::net::{self, Endpoint};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "sender",
    about = "RDT 发送端：stop-and-wait 经网络模拟器发送一条消息"
)]
struct Args {
    /// 本地 UDP 端口
    local_port: u16,
    /// 接收端主机名
    rcv_host: String,
    /// 接收端端口
    rcv_port: u16,
    /// 网络模拟器主机名
    network_host: String,
    /// 网络模拟器端口
    network_port: u16,
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

    let dest = match net::resolve(&args.rcv_host, args.rcv_port) {
        Ok(addr) => addr,
        Err(e) => {
            error!(%e, "无法解析接收端主机名");
            std::process::exit(1);
        }
    };
    let next_hop = match net::resolve(&args.network_host, args.network_port) {
        Ok(addr) => addr,
        Err(e) => {
            error!(%e, "无法解析网络模拟器主机名");
            std::process::exit(1);
        }
    };
    let endpoint = match Endpoint::bind(args.local_port) {
        Ok(ep) => ep,
        Err(e) => {
            error!(%e, "绑定端口失败");
            std::process::exit(1);
        }
    };

    print!("Enter message: ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        error!("读取消息失败");
        std::process::exit(1);
    }
    let message = line.trim_end_matches(['\n', '\r']);

    let mut sender = Sender::new(endpoint, next_hop, dest);
    match sender.send_message(message.as_bytes()) {
        Ok(TransferOutcome::Completed { bytes }) => {
            info!(bytes, "消息发送完成");
        }
        Ok(TransferOutcome::GaveUp { final_timeouts }) => {
            // 交替位终止的已知弱点：最后一个 ACK 永远收不到时乐观放弃
            warn!(
                final_timeouts,
                "终端 ACK 始终未到达，放弃重试并假定对端已收到消息"
            );
        }
        Err(e) => {
            error!(%e, "传输失败");
            std::process::exit(1);
        }
    }
}
