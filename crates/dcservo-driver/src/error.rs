//! 运行时错误类型定义

use dcservo_control::{ConfigError, ControlError};
use thiserror::Error;

/// 运行时错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 控制域错误（轨迹长度、未知模式）
    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 无效输入（如 PWM 指令超出 [-100, 100]）
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 轨迹正在播放，拒绝并发加载
    #[error("Trajectory playback active, load rejected")]
    TrackingActive,

    /// 回路线程创建失败
    #[error("Failed to spawn loop thread: {0}")]
    Spawn(#[from] std::io::Error),
}
