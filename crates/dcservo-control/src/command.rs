//! 执行器指令推导
//!
//! 把有符号控制输出 `u` 转换为 `(占空比, 方向)` 对。占空比无条件
//! 钳位到 [0, 100]，方向由符号决定：`u >= 0` 为正转。

/// 电机旋转方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// 正转（`u >= 0`）
    #[default]
    Forward,
    /// 反转（`u < 0`）
    Reverse,
}

/// 执行器指令
///
/// 电流回路每个 tick 写出一次，立即作用到物理执行器接口。
///
/// # 不变量
///
/// `duty_percent` 恒在 [0, 100] 内，与输入幅值无关。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorCommand {
    /// PWM 占空比（百分比，[0, 100]）
    pub duty_percent: f32,
    /// 旋转方向
    pub direction: Direction,
}

impl ActuatorCommand {
    /// 从有符号控制输出推导指令
    ///
    /// `|u|` 先钳位到 100，符号提取为方向。`u = -0.0` 按 `>= 0`
    /// 处理（正转）。
    pub fn from_output(u: f32) -> Self {
        let duty = u.abs().clamp(0.0, 100.0);
        let direction = if u >= 0.0 {
            Direction::Forward
        } else {
            Direction::Reverse
        };
        Self {
            duty_percent: duty,
            direction,
        }
    }

    /// 空闲指令：占空比 0，方向保持不变
    pub fn idle(direction: Direction) -> Self {
        Self {
            duty_percent: 0.0,
            direction,
        }
    }

    /// 是否为安全（零占空比）指令
    pub fn is_zero(&self) -> bool {
        self.duty_percent == 0.0
    }
}

impl Default for ActuatorCommand {
    fn default() -> Self {
        Self::idle(Direction::Forward)
    }
}
