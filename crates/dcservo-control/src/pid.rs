//! 单回路 PID 状态
//!
//! 实现离散 PID 计算：
//!
//! ```text
//! integral += error            （随后立即钳位到 ±integral_limit）
//! u = Kp*error + Ki*integral + Kd*(error - previous_error)
//! ```
//!
//! # 特性
//!
//! - **积分抗饱和**: 每次累积后无条件钳位，防止执行器饱和时积分失控
//! - **无 dt 缩放**: 回路周期固定，增益按 tick 离散形式标定
//! - **独占所有权**: 状态只属于所属回路任务，其他任务不得读写
//!
//! 积分钳位在计算控制输出 **之前** 执行，因此输出中的积分项
//! 永远不会超出界限。

use crate::gains::Gains;

/// PID 控制器状态
///
/// 每个回路持有一个实例；在进入该回路的激活模式时以及有界运行
/// （测试/跟踪）结束时调用 [`reset`](PidState::reset)。
#[derive(Debug, Clone)]
pub struct PidState {
    /// 误差积分
    integral: f32,

    /// 上一个 tick 的误差（用于微分项）
    previous_error: f32,

    /// 积分钳位界限（对称，电流回路 150，位置回路 100）
    integral_limit: f32,
}

impl PidState {
    /// 创建新的 PID 状态
    ///
    /// # 参数
    ///
    /// - `integral_limit`: 积分绝对值上界
    pub fn new(integral_limit: f32) -> Self {
        Self {
            integral: 0.0,
            previous_error: 0.0,
            integral_limit,
        }
    }

    /// 执行一个 tick 的 PID 计算
    ///
    /// 积分累积并钳位，随后计算控制输出，最后更新上次误差。
    pub fn step(&mut self, gains: Gains, error: f32) -> f32 {
        self.integral = (self.integral + error).clamp(-self.integral_limit, self.integral_limit);

        let u = gains.kp * error
            + gains.ki * self.integral
            + gains.kd * (error - self.previous_error);

        self.previous_error = error;
        u
    }

    /// 重置控制器状态（积分和上次误差归零）
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
    }

    /// 获取当前积分值
    ///
    /// 用于调试、测试和稳态验证。
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// 获取上一个 tick 的误差
    pub fn previous_error(&self) -> f32 {
        self.previous_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_only() {
        let mut pid = PidState::new(150.0);
        let gains = Gains::new(10.0, 0.0, 0.0);

        // 误差 = 0.5, 输出 = 10.0 * 0.5 = 5.0
        let u = pid.step(gains, 0.5);
        assert!((u - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_integral_accumulation() {
        let mut pid = PidState::new(150.0);
        let gains = Gains::new(0.0, 1.0, 0.0); // 只有积分项

        // 第一次: 积分 = 0.5, 输出 = 0.5
        let u1 = pid.step(gains, 0.5);
        assert!((u1 - 0.5).abs() < 1e-6);

        // 第二次: 积分 = 1.0, 输出 = 1.0
        let u2 = pid.step(gains, 0.5);
        assert!((u2 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_integral_clamp_positive_and_negative() {
        let mut pid = PidState::new(150.0);
        let gains = Gains::new(0.0, 1.0, 0.0);

        // 100 次大误差累积，积分必须停在 +150
        for _ in 0..100 {
            pid.step(gains, 40.0);
        }
        assert!((pid.integral() - 150.0).abs() < 1e-6);

        // 反向同理，停在 -150
        for _ in 0..100 {
            pid.step(gains, -40.0);
        }
        assert!((pid.integral() + 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_applied_before_output() {
        let mut pid = PidState::new(100.0);
        let gains = Gains::new(0.0, 1.0, 0.0);

        // 单次超界误差：积分钳位到 100，输出也是 100（而非 500）
        let u = pid.step(gains, 500.0);
        assert!((u - 100.0).abs() < 1e-6);
        assert!((pid.integral() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_derivative_term() {
        let mut pid = PidState::new(150.0);
        let gains = Gains::new(0.0, 0.0, 1.0); // 只有微分项

        // 第一次: 误差变化 0.5 - 0 = 0.5
        let u1 = pid.step(gains, 0.5);
        assert!((u1 - 0.5).abs() < 1e-6);

        // 第二次: 误差不变，微分为 0
        let u2 = pid.step(gains, 0.5);
        assert!(u2.abs() < 1e-6);
    }

    #[test]
    fn test_reset() {
        let mut pid = PidState::new(150.0);
        let gains = Gains::new(1.0, 1.0, 1.0);

        pid.step(gains, 3.0);
        assert!(pid.integral() != 0.0);
        assert!(pid.previous_error() != 0.0);

        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.previous_error(), 0.0);
    }

    #[test]
    fn test_gains_change_between_ticks() {
        let mut pid = PidState::new(150.0);

        pid.step(Gains::new(1.0, 0.0, 0.0), 1.0);
        // 增益整组替换后回路继续正常计算
        let u = pid.step(Gains::new(2.0, 0.0, 0.0), 1.0);
        assert!((u - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_steady_state_output_is_ki_times_integral() {
        let mut pid = PidState::new(100.0);
        let gains = Gains::new(5.0, 0.2, 0.1);

        // 先累积一些积分
        for _ in 0..10 {
            pid.step(gains, 2.0);
        }
        let integral = pid.integral();

        // 误差收敛到 0 后: u = Kp*0 + Ki*integral + Kd*0
        pid.step(gains, 0.0); // 微分项消耗一次非零 prev_error
        let u = pid.step(gains, 0.0);
        assert!((u - gains.ki * integral).abs() < 1e-5);
    }
}
