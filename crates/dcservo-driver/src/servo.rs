//! 控制器运行时（对外 API）
//!
//! `Servo` 封装两个回路线程的生命周期，并把共享上下文包装成前台
//! 指令接口：模式切换、增益更新、轨迹加载、导出快照、故障轮询。
//!
//! # 线程模型
//!
//! - 电流回路线程：周期 Tc（默认 200 µs），`realtime` feature 下
//!   优先级 Max，可以抢占位置回路的 tick，反之不行
//! - 位置回路线程：周期 Tp = 25 × Tc（默认 5 ms），较低优先级
//! - 前台（调用方线程）：只通过共享单元通信，优先级低于两者
//!
//! 每个 tick 跑到结束再用 `spin_sleep` 等待累积截止时刻，不忙等、
//! 不漂移；`is_running` 用 Acquire/Release 联动线程退出。

use crate::builder::ServoBuilder;
use crate::context::ServoContext;
use crate::current_loop::CurrentLoop;
use crate::error::DriverError;
use crate::event::LoopEvent;
use crate::fault::FaultKind;
use crate::hal::{Actuator, CurrentSensor, Encoder};
use crate::position_loop::PositionLoop;
use crossbeam_channel::Receiver;
use dcservo_control::{ControlError, ExportSample, Gains, Mode, ServoConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{info, trace, warn};

/// 周期任务骨架：tick 到结束，再睡到下一个累积截止时刻
///
/// 截止时刻按 `period` 累加而不是从"现在"起算，避免长期漂移；
/// tick 超期时与当前时间重新同步，不补偿积压的 tick。
fn run_periodic(
    name: &str,
    period: Duration,
    is_running: Arc<AtomicBool>,
    mut tick: impl FnMut(),
) {
    let sleeper = spin_sleep::SpinSleeper::default();
    let mut next_deadline = Instant::now() + period;

    // Acquire: 看到 false 时必须同时看到其他线程的全部清理写入
    while is_running.load(Ordering::Acquire) {
        tick();

        let now = Instant::now();
        if next_deadline > now {
            sleeper.sleep(next_deadline - now);
        } else {
            trace!("{} tick overrun by {:?}, resyncing", name, now - next_deadline);
            next_deadline = now;
        }
        next_deadline += period;
    }

    trace!("{} loop exited", name);
}

/// 设置回路线程优先级（可选 feature）
#[cfg(feature = "realtime")]
fn set_loop_priority(name: &str, priority: thread_priority::ThreadPriority) {
    match thread_priority::set_current_thread_priority(priority) {
        Ok(_) => {
            info!("{} thread priority set to {:?} (realtime)", name, priority);
        },
        Err(e) => {
            warn!(
                "Failed to set {} thread priority: {:?}. \
                On Linux, you may need to run with CAP_SYS_NICE or use rtkit.",
                name, e
            );
        },
    }
}

/// 级联控制器运行时
///
/// # 示例
///
/// ```rust,no_run
/// use dcservo_driver::ServoBuilder;
/// use dcservo_control::Gains;
/// # use dcservo_driver::{Actuator, CurrentSensor, Encoder};
/// # fn example(
/// #     sensor: impl CurrentSensor + Send + 'static,
/// #     actuator: impl Actuator + Send + 'static,
/// #     encoder: impl Encoder + Send + 'static,
/// # ) -> Result<(), Box<dyn std::error::Error>> {
/// let servo = ServoBuilder::new(sensor, actuator, encoder).build()?;
///
/// servo.set_position_gains(Gains::new(4.0, 0.3, 0.05));
/// servo.set_current_gains(Gains::new(0.6, 0.04, 0.0));
/// servo.hold_at(90)?;
/// # Ok(())
/// # }
/// ```
pub struct Servo {
    ctx: Arc<ServoContext>,
    events: Receiver<LoopEvent>,
    config: ServoConfig,
    is_running: Arc<AtomicBool>,
    current_thread: Option<JoinHandle<()>>,
    position_thread: Option<JoinHandle<()>>,
}

impl Servo {
    /// 创建 builder
    pub fn builder<S, A, E>(sensor: S, actuator: A, encoder: E) -> ServoBuilder<S, A, E>
    where
        S: CurrentSensor + Send + 'static,
        A: Actuator + Send + 'static,
        E: Encoder + Send + 'static,
    {
        ServoBuilder::new(sensor, actuator, encoder)
    }

    /// 启动两个回路线程（由 builder 调用）
    pub(crate) fn spawn<S, A, E>(
        config: ServoConfig,
        sensor: S,
        actuator: A,
        encoder: E,
    ) -> Result<Self, DriverError>
    where
        S: CurrentSensor + Send + 'static,
        A: Actuator + Send + 'static,
        E: Encoder + Send + 'static,
    {
        config.validate()?;

        let (ctx, events) = ServoContext::new(&config);
        let is_running = Arc::new(AtomicBool::new(true));

        let mut current = CurrentLoop::new(
            ctx.clone(),
            sensor,
            actuator,
            config.current_integral_limit,
        );
        let mut position =
            PositionLoop::new(ctx.clone(), encoder, config.position_integral_limit);

        let current_period = config.current_period();
        let position_period = config.position_period();

        let current_running = is_running.clone();
        let current_thread = std::thread::Builder::new()
            .name("dcservo-current".to_string())
            .spawn(move || {
                #[cfg(feature = "realtime")]
                set_loop_priority("current loop", thread_priority::ThreadPriority::Max);

                run_periodic("current loop", current_period, current_running, move || {
                    current.tick()
                });
            })?;

        let position_running = is_running.clone();
        let position_thread = std::thread::Builder::new()
            .name("dcservo-position".to_string())
            .spawn(move || {
                // 位置回路优先级严格低于电流回路：内环可以抢占外环的
                // tick，反之不行
                #[cfg(feature = "realtime")]
                {
                    let priority = thread_priority::ThreadPriorityValue::try_from(60u8)
                        .map(thread_priority::ThreadPriority::Crossplatform)
                        .unwrap_or(thread_priority::ThreadPriority::Min);
                    set_loop_priority("position loop", priority);
                }

                run_periodic(
                    "position loop",
                    position_period,
                    position_running,
                    move || position.tick(),
                );
            })?;

        info!(
            "Servo started: current loop {:?}, position loop {:?}",
            current_period, position_period
        );

        Ok(Self {
            ctx,
            events,
            config,
            is_running,
            current_thread: Some(current_thread),
            position_thread: Some(position_thread),
        })
    }

    // === 模式 ===

    /// 设置工作模式（下一个 tick 生效）
    pub fn set_mode(&self, mode: Mode) {
        self.ctx.mode.set(mode);
    }

    /// 读取当前模式
    pub fn mode(&self) -> Result<Mode, DriverError> {
        self.ctx
            .mode
            .get()
            .map_err(|raw| ControlError::UnknownMode { raw }.into())
    }

    // === 设点 ===

    /// 设置开环 PWM 指令并切换到 OpenLoopPwm 模式
    ///
    /// # 错误
    ///
    /// 指令必须在 [-100, 100] 内。
    pub fn set_pwm_command(&self, pwm: f32) -> Result<(), DriverError> {
        if !(-100.0..=100.0).contains(&pwm) {
            return Err(DriverError::InvalidInput(format!(
                "pwm out of range [-100, 100]: {pwm}"
            )));
        }
        self.ctx.pwm_command.store(pwm);
        self.ctx.mode.set(Mode::OpenLoopPwm);
        Ok(())
    }

    /// 设置目标角并进入 PositionHold
    pub fn hold_at(&self, angle_degrees: i32) -> Result<(), DriverError> {
        self.ctx.angle_request.store(angle_degrees, Ordering::Relaxed);
        self.ctx.mode.set(Mode::PositionHold);
        Ok(())
    }

    /// 读取当前力矩请求（调试/监控）
    pub fn torque_request(&self) -> f32 {
        self.ctx.torque_request.load()
    }

    // === 增益 ===

    /// 替换电流回路增益（整组原子替换，回路下一 tick 读到）
    pub fn set_current_gains(&self, gains: Gains) {
        self.ctx.current_gains.store(Arc::new(gains));
    }

    /// 读取电流回路增益
    pub fn current_gains(&self) -> Gains {
        **self.ctx.current_gains.load()
    }

    /// 替换位置回路增益
    pub fn set_position_gains(&self, gains: Gains) {
        self.ctx.position_gains.store(Arc::new(gains));
    }

    /// 读取位置回路增益
    pub fn position_gains(&self) -> Gains {
        **self.ctx.position_gains.load()
    }

    // === 测试 / 轨迹 ===

    /// 启动电流测试（播放合成方波，结束后自动回 Idle）
    pub fn start_current_test(&self) {
        self.ctx.mode.set(Mode::CurrentTest);
    }

    /// 加载轨迹（角度样本，度）
    ///
    /// # 错误
    ///
    /// - [`DriverError::TrackingActive`]: 正在播放轨迹
    /// - [`ControlError::InvalidLength`]: 超出缓冲容量
    pub fn load_trajectory(&self, samples: Vec<f32>) -> Result<(), DriverError> {
        if self.mode()? == Mode::TrajectoryTrack {
            return Err(DriverError::TrackingActive);
        }
        self.ctx.trajectory.write().load(samples)?;
        Ok(())
    }

    /// 开始跟踪已加载的轨迹
    pub fn start_trajectory(&self) -> Result<(), DriverError> {
        if self.ctx.trajectory.read().is_empty() {
            return Err(DriverError::InvalidInput(
                "no trajectory loaded".to_string(),
            ));
        }
        self.ctx.mode.set(Mode::TrajectoryTrack);
        Ok(())
    }

    /// 导出轨迹回放快照 `(索引, 参考角, 实际角)`
    ///
    /// 只应在模式离开 TrajectoryTrack 之后调用（调用方纪律）。
    pub fn export_trajectory(&self) -> Vec<ExportSample> {
        self.ctx.trajectory.read().export()
    }

    /// 导出电流测试快照 `(索引, 参考电流, 实测电流)`
    pub fn export_current_test(&self) -> Vec<ExportSample> {
        self.ctx.test_log.read().export()
    }

    // === 故障 / 事件 ===

    /// 查询某故障是否置位
    pub fn fault_raised(&self, kind: FaultKind) -> bool {
        self.ctx.faults.is_raised(kind)
    }

    /// 是否有任何故障
    pub fn any_fault(&self) -> bool {
        self.ctx.faults.any()
    }

    /// 清除全部故障标志
    pub fn clear_faults(&self) {
        self.ctx.faults.clear()
    }

    /// 取下一个回路事件（非阻塞）
    pub fn try_next_event(&self) -> Option<LoopEvent> {
        self.events.try_recv().ok()
    }

    /// 生效配置
    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    /// 共享上下文（高级用法 / 测试）
    pub fn context(&self) -> &Arc<ServoContext> {
        &self.ctx
    }

    /// 停止两个回路线程并等待退出
    ///
    /// 幂等；`Drop` 时自动调用。
    pub fn stop(&mut self) {
        // Release: 此前的全部写入对看到 false 的线程可见
        self.is_running.store(false, Ordering::Release);

        if let Some(handle) = self.current_thread.take() {
            if handle.join().is_err() {
                warn!("Current loop thread panicked");
            }
        }
        if let Some(handle) = self.position_thread.take() {
            if handle.join().is_err() {
                warn!("Position loop thread panicked");
            }
        }
    }
}

impl Drop for Servo {
    fn drop(&mut self) {
        self.stop();
    }
}
