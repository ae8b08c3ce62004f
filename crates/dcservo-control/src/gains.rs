//! PID 增益组
//!
//! 每个回路一组 `(Kp, Ki, Kd)`，前台可随时整组替换，回路每个 tick
//! 读取一次。除实数范围外无其他约束；回路必须容忍增益在两个 tick
//! 之间发生变化。

use serde::{Deserialize, Serialize};

/// 单回路 PID 增益
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    /// 比例增益
    pub kp: f32,
    /// 积分增益
    pub ki: f32,
    /// 微分增益
    pub kd: f32,
}

impl Gains {
    /// 创建增益组
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }

    /// 全零增益（上电默认，回路输出恒为 0）
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl Default for Gains {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gains_new() {
        let g = Gains::new(4.0, 0.32, 0.1);
        assert_eq!(g.kp, 4.0);
        assert_eq!(g.ki, 0.32);
        assert_eq!(g.kd, 0.1);
    }

    #[test]
    fn test_gains_default_is_zero() {
        let g: Gains = Default::default();
        assert_eq!(g, Gains::zero());
    }
}
