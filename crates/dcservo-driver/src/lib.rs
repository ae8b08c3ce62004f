//! 控制运行时模块
//!
//! 本 crate 提供级联电机控制器的运行时，包括：
//! - 硬件抽象（执行器 / 电流传感器 / 编码器 trait）
//! - 共享上下文（原子设点、ArcSwap 增益单元、回放缓冲）
//! - 两个周期性控制回路任务（5 kHz 电流内环，200 Hz 位置外环）
//! - 线程生命周期管理（spin_sleep 定时，可选实时优先级）
//! - 回路事件上报通道（完成 / 故障通知）
//!
//! # 调度模型
//!
//! 两个独立的周期任务，各自跑到 tick 结束再等下一个周期；电流回路
//! 线程优先级严格高于位置回路线程（`realtime` feature），任何 tick
//! 内都不会阻塞或让出。跨回路量全部是单标量最后写入者获胜的原子
//! 单元，读者看到旧值或新值，从不撕裂。

mod builder;
pub mod context;
pub mod current_loop;
mod error;
pub mod event;
pub mod fault;
pub mod hal;
pub mod position_loop;
mod servo;

pub use builder::ServoBuilder;
pub use context::{AtomicF32, ServoContext};
pub use current_loop::CurrentLoop;
pub use error::DriverError;
pub use event::LoopEvent;
pub use fault::{FaultFlags, FaultKind};
pub use hal::{Actuator, CurrentSensor, Encoder, SensorError};
pub use position_loop::PositionLoop;
pub use servo::Servo;
