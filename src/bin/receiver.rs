//! RDT 接收端
//!
//! 在本地端口上接收一条完整消息并打印

use clap::Parser;
use rdt_rs::arq::Receiver;
use rdt_rs::net::Endpoint;
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "receiver", about = "RDT 接收端：接收一条消息并打印")]
struct Args {
    /// 本地 UDP 端口
    local_port: u16,
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

    let mut receiver = Receiver::new(endpoint);
    match receiver.receive_message() {
        Ok(message) => {
            println!("Final Message: {}", String::from_utf8_lossy(&message));
        }
        Err(e) => {
            error!(%e, "接收失败");
            std::process::exit(1);
        }
    }
}
