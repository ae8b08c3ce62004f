//! 钳位不变量的属性测试
//!
//! 对任意误差序列，积分必须始终落在回路的固定界限内；对任意控制
//! 输出，占空比必须落在 [0, 100]，方向由符号决定。

use dcservo_control::command::{ActuatorCommand, Direction};
use dcservo_control::gains::Gains;
use dcservo_control::pid::PidState;
use dcservo_control::waveform::generate_test_waveform;
use proptest::prelude::*;

proptest! {
    /// 任意误差序列下，电流回路积分恒在 ±150 内
    #[test]
    fn integral_stays_within_current_loop_bound(
        errors in prop::collection::vec(-1000.0f32..1000.0, 0..200)
    ) {
        let mut pid = PidState::new(150.0);
        let gains = Gains::new(1.0, 1.0, 1.0);

        for error in errors {
            pid.step(gains, error);
            prop_assert!(pid.integral() >= -150.0);
            prop_assert!(pid.integral() <= 150.0);
        }
    }

    /// 任意误差序列下，位置回路积分恒在 ±100 内
    #[test]
    fn integral_stays_within_position_loop_bound(
        errors in prop::collection::vec(-360i32..360, 0..200)
    ) {
        let mut pid = PidState::new(100.0);
        let gains = Gains::new(2.0, 0.5, 0.1);

        for error in errors {
            // 位置回路误差保持整数度语义
            pid.step(gains, error as f32);
            prop_assert!(pid.integral() >= -100.0);
            prop_assert!(pid.integral() <= 100.0);
        }
    }

    /// 任意控制输出的占空比恒在 [0, 100]，方向跟随符号
    #[test]
    fn duty_cycle_invariant(u in -1e6f32..1e6) {
        let cmd = ActuatorCommand::from_output(u);
        prop_assert!(cmd.duty_percent >= 0.0);
        prop_assert!(cmd.duty_percent <= 100.0);

        let expected = if u >= 0.0 { Direction::Forward } else { Direction::Reverse };
        prop_assert_eq!(cmd.direction, expected);
    }

    /// 波形样本只取 ±A 两个值，且首样本为 +A
    #[test]
    fn waveform_samples_are_plateaus(
        amplitude in 1.0f32..500.0,
        n in 4usize..512
    ) {
        let wave = generate_test_waveform(amplitude, n);
        prop_assert_eq!(wave.len(), n);
        prop_assert_eq!(wave[0], amplitude);
        for v in wave {
            prop_assert!(v == amplitude || v == -amplitude);
        }
    }
}
