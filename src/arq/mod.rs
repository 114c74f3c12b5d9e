//! 交替位 ARQ
//!
//! stop-and-wait 协议的两侧状态机。协议状态只有一个 2 值的期望序号，
//! 由各自的会话结构体持有，随一次消息传输存续。
//!
//! 发送端：`SEND_0 → ACK_0 → SEND_1 → ACK_1 → SEND_0 → …`，
//! 终端分片的 ACK 到达后结束。接收端只有 `ACK_0 ⇄ ACK_1` 两个状态。

pub mod receiver;
pub mod sender;

pub use receiver::Receiver;
pub use sender::{Sender, TransferOutcome};

/// 发送端等待 ACK 的超时（毫秒）。
pub const ACK_TIMEOUT_MS: u64 = 2_000;
/// 终端分片连续超时的放弃阈值。
pub const MAX_FINAL_TIMEOUTS: u32 = 3;
/// 接收端消息缓冲上限（字节）。
pub const MAX_MSG_SIZE: usize = 2_000;
