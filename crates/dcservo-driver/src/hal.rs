//! 硬件抽象层
//!
//! 控制引擎对外部 I/O 适配器的最小契约。具体驱动（PWM 外设、
//! INA219 电流传感器、编码器串口）由外部模块实现，这里只规定
//! 读写语义。

use dcservo_control::ActuatorCommand;
use thiserror::Error;

/// 传感器读取错误
///
/// 瞬态故障：回路降级处理（保持上一指令、跳过状态更新），
/// 不终止后续 tick。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    /// 读取失败或返回陈旧数据
    #[error("Sensor read failed: {0}")]
    ReadFailed(String),

    /// 读数超出合理量程
    #[error("Sensor value out of range: {0}")]
    OutOfRange(f32),
}

/// 执行器接口
///
/// 指令必须在下一个电流回路 tick 之前生效，无需应答。
pub trait Actuator {
    /// 应用占空比 + 方向指令
    fn apply(&mut self, command: ActuatorCommand);
}

/// 电流传感器接口
///
/// 返回值单位须与电流回路增益标定一致（通常 mA）。允许瞬态失败。
pub trait CurrentSensor {
    /// 读取当前电流
    fn read_current(&mut self) -> Result<f32, SensorError>;
}

/// 编码器接口
///
/// 每次调用都假定有效（外设侧重试在外部完成），角度为整数度。
pub trait Encoder {
    /// 读取当前角度（度）
    fn read_angle_degrees(&mut self) -> i32;
}
