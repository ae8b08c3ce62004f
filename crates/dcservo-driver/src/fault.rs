//! 进程级故障标志
//!
//! 回路在 tick 内检测到的故障通过一个位掩码标志上报，前台任务
//! 轮询并清除。故障从不跨越 tick 边界传播异常；每个 tick 无论
//! 如何都会执行完。

use std::sync::atomic::{AtomicU8, Ordering};

/// 故障种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// 传感器读取失败或越界（当 tick 降级，不致命）
    SensorFault,
    /// 模式寄存器持有未知原始值（执行器已强制安全状态）
    UnknownMode,
}

impl FaultKind {
    const fn bit(self) -> u8 {
        match self {
            Self::SensorFault => 0b0000_0001,
            Self::UnknownMode => 0b0000_0010,
        }
    }
}

/// 故障标志位掩码（原子，多任务共享）
#[derive(Debug, Default)]
pub struct FaultFlags {
    bits: AtomicU8,
}

impl FaultFlags {
    /// 创建无故障标志
    pub fn new() -> Self {
        Self::default()
    }

    /// 置位一个故障（幂等）
    pub fn raise(&self, kind: FaultKind) {
        self.bits.fetch_or(kind.bit(), Ordering::Relaxed);
    }

    /// 查询某故障是否置位
    pub fn is_raised(&self, kind: FaultKind) -> bool {
        self.bits.load(Ordering::Relaxed) & kind.bit() != 0
    }

    /// 是否有任何故障
    pub fn any(&self) -> bool {
        self.bits.load(Ordering::Relaxed) != 0
    }

    /// 清除所有故障（前台确认后调用）
    pub fn clear(&self) {
        self.bits.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_and_clear() {
        let flags = FaultFlags::new();
        assert!(!flags.any());

        flags.raise(FaultKind::SensorFault);
        assert!(flags.is_raised(FaultKind::SensorFault));
        assert!(!flags.is_raised(FaultKind::UnknownMode));
        assert!(flags.any());

        // 幂等
        flags.raise(FaultKind::SensorFault);
        flags.raise(FaultKind::UnknownMode);
        assert!(flags.is_raised(FaultKind::UnknownMode));

        flags.clear();
        assert!(!flags.any());
    }
}
