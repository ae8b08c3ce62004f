//! 工作模式定义
//!
//! 定义控制器的工作模式，供两个控制回路在每个 tick 开始时读取。
//!
//! # 模式说明
//!
//! - **Idle**: 空闲模式，电流回路强制占空比为 0
//! - **OpenLoopPwm**: 开环 PWM 模式，外部指令直通执行器
//! - **CurrentTest**: 电流测试模式，跟踪合成方波并记录响应
//! - **PositionHold**: 位置保持模式，外环激活，生成力矩请求
//! - **TrajectoryTrack**: 轨迹跟踪模式，外环按轨迹样本逐 tick 更新目标角
//!
//! # 转换规则
//!
//! 所有转换由外部指令接口驱动，除两个内部转换：
//! - `CurrentTest -> Idle`（波形耗尽）
//! - `TrajectoryTrack -> PositionHold`（轨迹耗尽）
//!
//! 模式寄存器本身不做校验，合法转换由调用方负责。

use std::sync::atomic::{AtomicU8, Ordering};

/// 控制器工作模式
///
/// 闭合枚举，两个回路的 tick 行为对其做穷尽分发。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Mode {
    /// 空闲（默认）：执行器占空比强制为 0
    #[default]
    Idle = 0,

    /// 开环 PWM：外部有符号百分比直通，无反馈
    OpenLoopPwm = 1,

    /// 电流测试：内环跟踪合成方波，逐样本记录
    CurrentTest = 2,

    /// 位置保持：外环对固定目标角做 PID，输出力矩请求
    PositionHold = 3,

    /// 轨迹跟踪：外环逐 tick 从轨迹缓冲取目标角
    TrajectoryTrack = 4,
}

impl Mode {
    /// 从 u8 转换
    ///
    /// 枚举之外的原始值返回 `None`，由调用方走未知模式的防御分支。
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::OpenLoopPwm),
            2 => Some(Self::CurrentTest),
            3 => Some(Self::PositionHold),
            4 => Some(Self::TrajectoryTrack),
            _ => None,
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 外环（位置回路）在此模式下是否激活
    pub fn outer_loop_active(self) -> bool {
        matches!(self, Self::PositionHold | Self::TrajectoryTrack)
    }
}

/// 模式寄存器（原子版本，用于任务间共享）
///
/// # 使用场景
///
/// - 两个控制回路在每个 tick 开始时读取一次
/// - 前台指令任务通过 `set()` 切换模式
/// - 回路自身在有界运行结束时写入内部转换
///
/// 单字节存储保证读写永不撕裂；模式变更在下一个 tick 生效，
/// 从不在 tick 中途生效。
///
/// # 示例
///
/// ```rust
/// use dcservo_control::mode::{AtomicMode, Mode};
///
/// let reg = AtomicMode::new(Mode::Idle);
/// reg.set(Mode::PositionHold);
/// assert_eq!(reg.get(), Ok(Mode::PositionHold));
/// ```
#[derive(Debug)]
pub struct AtomicMode {
    inner: AtomicU8,
}

impl AtomicMode {
    /// 创建新的模式寄存器
    pub fn new(mode: Mode) -> Self {
        Self {
            inner: AtomicU8::new(mode.as_u8()),
        }
    }

    /// 获取当前模式
    ///
    /// # 返回
    ///
    /// 原始字节不在枚举内时返回 `Err(raw)`，调用方必须进入
    /// 安全状态并上报故障。
    pub fn get(&self) -> Result<Mode, u8> {
        let raw = self.inner.load(Ordering::Relaxed);
        Mode::from_u8(raw).ok_or(raw)
    }

    /// 设置模式
    ///
    /// 原子替换，读者看到旧值或新值，从不撕裂。
    pub fn set(&self, mode: Mode) {
        self.inner.store(mode.as_u8(), Ordering::Relaxed);
    }

    /// 写入原始字节
    ///
    /// 仅用于测试中的故障注入（构造未知模式）。正常代码只通过
    /// `set()` 写入合法变体。
    pub fn store_raw(&self, raw: u8) {
        self.inner.store(raw, Ordering::Relaxed);
    }
}

impl Default for AtomicMode {
    fn default() -> Self {
        Self::new(Mode::Idle)
    }
}
