//! 共享上下文
//!
//! 两个回路任务和前台指令任务之间的全部共享状态，按访问模式
//! 分为三类共享单元：
//!
//! - 单标量设点（力矩请求 / PWM 指令 / 目标角 / 模式）→ 原子单元，
//!   最后写入者获胜，无队列无背压，读写永不撕裂
//! - 增益组 → `ArcSwap`，前台整组替换，回路每 tick 无锁读取
//! - 回放缓冲 → `parking_lot::RwLock`，播放期间由写入回路独占
//!   （调用方纪律：前台只在活动回到终止模式后读取）
//!
//! 每个回路自己的 PID 状态 **不在** 这里，它由回路任务独占持有，
//! 编译器保证没有其他任务能碰到它。

use crate::event::LoopEvent;
use crate::fault::FaultFlags;
use arc_swap::ArcSwap;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use dcservo_control::{AtomicMode, Gains, PlaybackLog, ServoConfig, generate_test_waveform};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use tracing::trace;

/// 事件通道容量（有界，发送端只用 try_send）
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// f32 原子单元
///
/// 以位模式存入 `AtomicU32`，单条加载/存储指令完成读写，保证
/// "从不撕裂"的跨回路设点契约。
#[derive(Debug)]
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    /// 创建新单元
    pub fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    /// 读取（消费者在采样瞬间拿到最近一次写入的值）
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// 写入（生产者可以任意速率覆盖）
    pub fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// 控制器共享上下文
///
/// 进程级状态，启动时创建，进程生命周期内存活。
#[derive(Debug)]
pub struct ServoContext {
    /// 模式寄存器（两个回路每 tick 读一次，前台写）
    pub mode: AtomicMode,

    /// 力矩请求：位置回路 → 电流回路
    pub torque_request: AtomicF32,

    /// PWM 指令：前台 → 电流回路（有符号百分比 [-100, 100]）
    pub pwm_command: AtomicF32,

    /// 目标角（整数度）：前台或轨迹缓冲 → 位置回路
    pub angle_request: AtomicI32,

    /// 电流回路增益（前台整组替换，回路每 tick 读取）
    pub current_gains: ArcSwap<Gains>,

    /// 位置回路增益
    pub position_gains: ArcSwap<Gains>,

    /// 进程级故障标志
    pub faults: FaultFlags,

    /// 电流测试缓冲对（参考 = 方波，记录 = 实测电流）
    pub test_log: RwLock<PlaybackLog>,

    /// 轨迹缓冲对（参考 = 角度样本，记录 = 实际角度）
    pub trajectory: RwLock<PlaybackLog>,

    /// 事件发送端（回路侧，非阻塞）
    events: Sender<LoopEvent>,
}

impl ServoContext {
    /// 根据配置创建上下文
    ///
    /// 测试波形在这里生成一次，播放期间只读。
    ///
    /// # 返回
    ///
    /// `(上下文, 事件接收端)`，接收端交给前台（`Servo`）消费。
    pub fn new(config: &ServoConfig) -> (Arc<Self>, Receiver<LoopEvent>) {
        let (events, event_rx) = crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY);

        let waveform = generate_test_waveform(config.waveform_amplitude, config.waveform_samples);

        let ctx = Arc::new(Self {
            mode: AtomicMode::default(),
            torque_request: AtomicF32::default(),
            pwm_command: AtomicF32::default(),
            angle_request: AtomicI32::new(0),
            current_gains: ArcSwap::from_pointee(config.current_gains),
            position_gains: ArcSwap::from_pointee(config.position_gains),
            faults: FaultFlags::new(),
            test_log: RwLock::new(PlaybackLog::from_reference(waveform)),
            trajectory: RwLock::new(PlaybackLog::new(config.trajectory_capacity)),
            events,
        });

        (ctx, event_rx)
    }

    /// 发送回路事件（非阻塞）
    ///
    /// 通道满或断开时丢弃，上报绝不能拖慢控制 tick。
    pub fn emit(&self, event: LoopEvent) {
        match self.events.try_send(event) {
            Ok(()) => {},
            Err(TrySendError::Full(ev)) => {
                trace!("Event channel full, dropping {:?}", ev);
            },
            Err(TrySendError::Disconnected(_)) => {},
        }
    }
}
