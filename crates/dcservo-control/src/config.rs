//! # 控制器配置
//!
//! 回路速率、波形参数、缓冲容量和默认增益的集中配置，支持 TOML
//! 文件加载/保存。

use crate::gains::Gains;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读写失败
    #[error("Config file IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 字段取值非法
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 控制器配置
///
/// 进程级参数，启动时确定；运行期可变的只有增益（经 driver 的
/// 增益单元）和模式。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServoConfig {
    /// 电流回路频率（Hz），默认 5000
    pub current_loop_hz: f64,

    /// 位置回路分频比（Tp = divisor × Tc），默认 25（200 Hz）
    pub position_divisor: u32,

    /// 测试方波幅值（传感器单位），默认 200
    pub waveform_amplitude: f32,

    /// 测试方波样本数，默认 100
    pub waveform_samples: usize,

    /// 轨迹缓冲容量（样本数），默认 2000
    pub trajectory_capacity: usize,

    /// 电流回路积分钳位界限，默认 150
    pub current_integral_limit: f32,

    /// 位置回路积分钳位界限，默认 100
    pub position_integral_limit: f32,

    /// 电流回路初始增益
    pub current_gains: Gains,

    /// 位置回路初始增益
    pub position_gains: Gains,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            current_loop_hz: 5000.0,
            position_divisor: 25,
            waveform_amplitude: 200.0,
            waveform_samples: 100,
            trajectory_capacity: 2000,
            current_integral_limit: 150.0,
            position_integral_limit: 100.0,
            current_gains: Gains::zero(),
            position_gains: Gains::zero(),
        }
    }
}

impl ServoConfig {
    /// 电流回路周期 Tc
    pub fn current_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.current_loop_hz)
    }

    /// 位置回路周期 Tp = divisor × Tc
    pub fn position_period(&self) -> Duration {
        self.current_period() * self.position_divisor
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.current_loop_hz > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "current_loop_hz must be positive, got {}",
                self.current_loop_hz
            )));
        }
        if self.position_divisor == 0 {
            return Err(ConfigError::Invalid(
                "position_divisor must be at least 1".to_string(),
            ));
        }
        if self.waveform_samples == 0 {
            return Err(ConfigError::Invalid(
                "waveform_samples must be at least 1".to_string(),
            ));
        }
        if self.trajectory_capacity == 0 {
            return Err(ConfigError::Invalid(
                "trajectory_capacity must be at least 1".to_string(),
            ));
        }
        if !(self.current_integral_limit > 0.0) || !(self.position_integral_limit > 0.0) {
            return Err(ConfigError::Invalid(
                "integral limits must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// 从 TOML 文件加载并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: ServoConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存为 TOML 文件
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates() {
        let config = ServoConfig::default();
        config.validate().unwrap();

        // 5 kHz 内环，25 分频 = 200 Hz 外环
        assert_eq!(config.current_period(), Duration::from_micros(200));
        assert_eq!(config.position_period(), Duration::from_millis(5));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServoConfig::default();
        config.current_loop_hz = 0.0;
        assert!(config.validate().is_err());

        let mut config = ServoConfig::default();
        config.position_divisor = 0;
        assert!(config.validate().is_err());

        let mut config = ServoConfig::default();
        config.current_integral_limit = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servo.toml");

        let mut config = ServoConfig::default();
        config.waveform_amplitude = 180.0;
        config.position_gains = Gains::new(4.0, 0.3, 0.05);
        config.to_file(&path).unwrap();

        let loaded = ServoConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servo.toml");

        let mut config = ServoConfig::default();
        config.waveform_samples = 0;
        // to_file 不校验（允许保存草稿），from_file 必须拒绝
        config.to_file(&path).unwrap();
        assert!(ServoConfig::from_file(&path).is_err());
    }
}
