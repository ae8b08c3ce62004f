//! 位置控制回路（外环）
//!
//! 慢速回路（默认 200 Hz，电流回路的 1/25 速率，优先级更低），把
//! 目标角转换为力矩请求，供电流回路在下一个 tick 消费。
//!
//! 25:1 的速率拆分依据：位置（机械）动力学远慢于电流（电气）动力
//! 学，外环降一个数量级速率不破坏级联稳定性，而内环必须足够快以
//! 抑制 PWM 开关带来的电流纹波。
//!
//! # 整数度误差
//!
//! 角度误差在 i32 域内计算（`angle_request - read_angle_degrees()`），
//! 随后才进入浮点 PID；亚度误差在进入控制器之前即被离散掉。

use crate::context::ServoContext;
use crate::event::LoopEvent;
use crate::fault::FaultKind;
use crate::hal::Encoder;
use dcservo_control::{Mode, PidState};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{error, info};

/// 位置回路任务状态
pub struct PositionLoop<E> {
    ctx: Arc<ServoContext>,
    encoder: E,
    pid: PidState,
    /// TrajectoryTrack 样本计数 i
    traj_index: usize,
    /// 上一 tick 的模式（检测模式进入边界）
    prev_mode: Option<Mode>,
}

impl<E: Encoder> PositionLoop<E> {
    /// 创建位置回路任务
    pub fn new(ctx: Arc<ServoContext>, encoder: E, integral_limit: f32) -> Self {
        Self {
            ctx,
            encoder,
            pid: PidState::new(integral_limit),
            traj_index: 0,
            prev_mode: None,
        }
    }

    /// 执行一个控制 tick
    ///
    /// 非激活模式下完全不动状态、不写力矩；电流回路在无关模式下
    /// 本来就忽略力矩请求，这是有意为之。
    pub fn tick(&mut self) {
        let mode = match self.ctx.mode.get() {
            Ok(mode) => mode,
            Err(raw) => {
                // 防御分支：不写力矩，只上报
                if !self.ctx.faults.is_raised(FaultKind::UnknownMode) {
                    error!("Position loop observed unknown mode value {}", raw);
                    self.ctx.emit(LoopEvent::Fault(FaultKind::UnknownMode));
                }
                self.ctx.faults.raise(FaultKind::UnknownMode);
                self.prev_mode = None;
                return;
            },
        };

        if self.prev_mode != Some(mode) {
            self.enter_mode(mode);
            self.prev_mode = Some(mode);
        }

        match mode {
            Mode::PositionHold => self.tick_hold(),
            Mode::TrajectoryTrack => self.tick_track(),
            // 其他模式：回路空闲，不动任何状态
            Mode::Idle | Mode::OpenLoopPwm | Mode::CurrentTest => {},
        }
    }

    fn enter_mode(&mut self, mode: Mode) {
        match mode {
            Mode::PositionHold => self.pid.reset(),
            Mode::TrajectoryTrack => {
                self.pid.reset();
                self.traj_index = 0;
            },
            Mode::Idle | Mode::OpenLoopPwm | Mode::CurrentTest => {},
        }
    }

    /// PositionHold：对固定目标角做 PID，写出力矩请求
    fn tick_hold(&mut self) {
        let current_angle = self.encoder.read_angle_degrees();
        let error = self.ctx.angle_request.load(Ordering::Relaxed) - current_angle;
        let u = self.step(error);
        self.ctx.torque_request.store(u);
    }

    /// TrajectoryTrack：先用轨迹样本覆盖目标角，再做同样的 PID
    fn tick_track(&mut self) {
        let mut log = self.ctx.trajectory.write();
        let Some(reference) = log.reference_at(self.traj_index) else {
            // 空轨迹：无事可播，直接转入保持
            drop(log);
            self.ctx.mode.set(Mode::PositionHold);
            return;
        };

        // 目标角取整数度后写回设点（误差随后在 i32 域计算）
        let target = reference as i32;
        self.ctx.angle_request.store(target, Ordering::Relaxed);

        let current_angle = self.encoder.read_angle_degrees();
        log.record(self.traj_index, current_angle as f32);

        let finished = self.traj_index + 1 == log.len();
        drop(log);

        let error = target - current_angle;
        let u = self.step(error);
        self.ctx.torque_request.store(u);

        if finished {
            // 轨迹耗尽：计数清零，转入 PositionHold 继续保持末样本
            self.traj_index = 0;
            self.pid.reset();
            self.ctx.mode.set(Mode::PositionHold);
            self.ctx.emit(LoopEvent::TrajectoryCompleted);
            info!("Trajectory exhausted, holding final setpoint");
        } else {
            self.traj_index += 1;
        }
    }

    /// 整数度误差进入浮点 PID
    fn step(&mut self, error: i32) -> f32 {
        let gains = **self.ctx.position_gains.load();
        self.pid.step(gains, error as f32)
    }

    /// 当前积分值（测试/诊断）
    pub fn integral(&self) -> f32 {
        self.pid.integral()
    }
}
