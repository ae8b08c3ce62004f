//! 回路事件上报
//!
//! 回路在有界运行结束或故障时向前台发送通知。通道有界且发送端
//! 只用 `try_send`：上报永远不能阻塞控制 tick，前台不消费时事件
//! 被丢弃（状态本身仍可通过模式寄存器和故障标志轮询到）。

use crate::fault::FaultKind;

/// 回路向前台上报的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// CurrentTest 波形播放完毕，模式已回到 Idle
    CurrentTestCompleted,
    /// 轨迹播放完毕，模式已转入 PositionHold
    TrajectoryCompleted,
    /// 某回路在 tick 内置位了故障标志
    Fault(FaultKind),
}
