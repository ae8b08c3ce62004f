//! 电流测试方波生成
//!
//! CurrentTest 模式的合成参考信号：n 个样本均分为 4 个等宽相位，
//! 相位符号交替（偶数相位 +A，奇数相位 -A）：
//!
//! ```text
//! [0, n/4)      = +A
//! [n/4, 2n/4)   = -A
//! [2n/4, 3n/4)  = +A
//! [3n/4, n)     = -A
//! ```
//!
//! 生成是确定性的，在进入 CurrentTest 之前完成一次，播放期间只读。

/// 生成测试方波
///
/// # 参数
///
/// - `amplitude`: 平台幅值 A（传感器单位，通常 mA）
/// - `n`: 样本总数
///
/// # 示例
///
/// ```rust
/// use dcservo_control::waveform::generate_test_waveform;
///
/// let wave = generate_test_waveform(200.0, 100);
/// assert_eq!(wave[0], 200.0);    // [0, 25)   = +200
/// assert_eq!(wave[25], -200.0);  // [25, 50)  = -200
/// assert_eq!(wave[50], 200.0);   // [50, 75)  = +200
/// assert_eq!(wave[75], -200.0);  // [75, 100) = -200
/// ```
pub fn generate_test_waveform(amplitude: f32, n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| {
            // 相位索引 0..=3，样本数不是 4 的倍数时末相位吸收余数
            let phase = (i * 4) / n;
            if phase % 2 == 0 { amplitude } else { -amplitude }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_pattern_a200_n100() {
        let wave = generate_test_waveform(200.0, 100);
        assert_eq!(wave.len(), 100);

        for (i, &v) in wave.iter().enumerate() {
            let expected = if (25..50).contains(&i) || (75..100).contains(&i) {
                -200.0
            } else {
                200.0
            };
            assert_eq!(v, expected, "index {}", i);
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            generate_test_waveform(150.0, 64),
            generate_test_waveform(150.0, 64)
        );
    }

    #[test]
    fn test_small_n() {
        // n=8: 相位宽 2
        let wave = generate_test_waveform(1.0, 8);
        assert_eq!(wave, vec![1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_n_not_divisible_by_four() {
        // n=10: 相位边界 (i*4)/10，末相位吸收余数
        let wave = generate_test_waveform(1.0, 10);
        assert_eq!(wave.len(), 10);
        // 首样本始终 +A，末样本始终 -A
        assert_eq!(wave[0], 1.0);
        assert_eq!(wave[9], -1.0);
    }

    #[test]
    fn test_empty() {
        assert!(generate_test_waveform(200.0, 0).is_empty());
    }
}
