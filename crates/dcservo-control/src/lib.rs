//! # dcservo-control - 控制域数据结构和算法
//!
//! 本 crate 包含级联电机控制器的纯控制域部分：模式定义、PID 状态、
//! 增益组、执行器指令推导、测试波形生成和轨迹/回放缓冲。
//!
//! **依赖原则**: 无线程、无 I/O、无硬件抽象，这些属于 `dcservo-driver`。
//!
//! ## 包含模块
//!
//! - `mode` - 工作模式枚举和原子模式寄存器
//! - `gains` - PID 增益组
//! - `pid` - 单回路 PID 状态（积分抗饱和）
//! - `command` - 执行器指令（占空比 + 方向）推导
//! - `waveform` - 电流测试方波生成
//! - `trajectory` - 轨迹/回放缓冲和导出快照
//! - `config` - 控制器配置（TOML）
//! - `error` - 控制域错误类型

// ⚠️ 禁止引入 dcservo-driver
// use dcservo_driver::*;  // ❌ 禁止

pub mod command;
pub mod config;
pub mod error;
pub mod gains;
pub mod mode;
pub mod pid;
pub mod trajectory;
pub mod waveform;

// 重新导出常用类型
pub use command::{ActuatorCommand, Direction};
pub use config::{ConfigError, ServoConfig};
pub use error::ControlError;
pub use gains::Gains;
pub use mode::{AtomicMode, Mode};
pub use pid::PidState;
pub use trajectory::{ExportSample, PlaybackLog};
pub use waveform::generate_test_waveform;
