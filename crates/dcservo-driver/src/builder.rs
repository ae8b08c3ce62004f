//! 控制器构建器
//!
//! 收集三个硬件适配器和可选配置，校验后启动运行时。

use crate::error::DriverError;
use crate::hal::{Actuator, CurrentSensor, Encoder};
use crate::servo::Servo;
use dcservo_control::ServoConfig;

/// [`Servo`] 的构建器
///
/// 三个硬件适配器在 `new` 时一次给齐（缺一不可，类型上保证），
/// 配置可选，默认值对应标准工况（5 kHz 内环、25 分频外环）。
pub struct ServoBuilder<S, A, E> {
    sensor: S,
    actuator: A,
    encoder: E,
    config: ServoConfig,
}

impl<S, A, E> ServoBuilder<S, A, E>
where
    S: CurrentSensor + Send + 'static,
    A: Actuator + Send + 'static,
    E: Encoder + Send + 'static,
{
    /// 创建构建器
    pub fn new(sensor: S, actuator: A, encoder: E) -> Self {
        Self {
            sensor,
            actuator,
            encoder,
            config: ServoConfig::default(),
        }
    }

    /// 使用自定义配置
    pub fn config(mut self, config: ServoConfig) -> Self {
        self.config = config;
        self
    }

    /// 校验配置并启动两个回路线程
    ///
    /// # 错误
    ///
    /// 配置不合法（如分频为 0、容量为 0）时返回
    /// [`ConfigError::Invalid`](dcservo_control::ConfigError::Invalid)。
    pub fn build(self) -> Result<Servo, DriverError> {
        Servo::spawn(self.config, self.sensor, self.actuator, self.encoder)
    }
}
