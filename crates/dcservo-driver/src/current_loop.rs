//! 电流控制回路（内环）
//!
//! 快速回路（默认 5 kHz），把电流设点转换为执行器指令。设点来源
//! 按模式选择：外部 PWM 指令直通、外环的力矩请求、或测试方波样本。
//!
//! # 每 tick 契约
//!
//! - tick 开始处读模式恰好一次，整个 tick 按读到的值确定性执行
//! - PID 积分每次累积后立即钳位到 ±integral_limit（默认 ±150）
//! - 执行器指令每 tick 写出一次，占空比恒在 [0, 100]
//! - 传感器读取失败时当 tick 降级：保持上一有效指令、跳过全部
//!   状态更新、置位故障标志，绝不终止后续 tick

use crate::context::ServoContext;
use crate::event::LoopEvent;
use crate::fault::FaultKind;
use crate::hal::{Actuator, CurrentSensor, SensorError};
use dcservo_control::{ActuatorCommand, Mode, PidState};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 电流回路任务状态
///
/// PID 状态和样本计数由本任务独占持有，其他任务不可访问。
pub struct CurrentLoop<S, A> {
    ctx: Arc<ServoContext>,
    sensor: S,
    actuator: A,
    pid: PidState,
    /// CurrentTest 样本计数 k
    sample_index: usize,
    /// 上一次写出的执行器指令（Idle 方向保持、故障降级用）
    last_command: ActuatorCommand,
    /// 上一 tick 的模式（检测模式进入边界；`None` = 首个 tick 或未知模式之后）
    prev_mode: Option<Mode>,
}

impl<S: CurrentSensor, A: Actuator> CurrentLoop<S, A> {
    /// 创建电流回路任务
    pub fn new(ctx: Arc<ServoContext>, sensor: S, actuator: A, integral_limit: f32) -> Self {
        Self {
            ctx,
            sensor,
            actuator,
            pid: PidState::new(integral_limit),
            sample_index: 0,
            last_command: ActuatorCommand::default(),
            prev_mode: None,
        }
    }

    /// 执行一个控制 tick
    ///
    /// 有界、不挂起的计算；一旦开始必然跑完。模式切换只在下一个
    /// tick 生效，从不在 tick 中途。
    pub fn tick(&mut self) {
        let mode = match self.ctx.mode.get() {
            Ok(mode) => mode,
            Err(raw) => {
                self.unknown_mode(raw);
                return;
            },
        };

        // 模式进入边界：激活模式的控制器状态清零（不是每个 tick）
        if self.prev_mode != Some(mode) {
            self.enter_mode(mode);
            self.prev_mode = Some(mode);
        }

        match mode {
            Mode::Idle => {
                // 占空比强制 0，方向保持，控制器状态不动
                self.apply(ActuatorCommand::idle(self.last_command.direction));
            },
            Mode::OpenLoopPwm => {
                // 外部有符号百分比直通，无反馈、无积分
                let pwm = self.ctx.pwm_command.load();
                self.apply(ActuatorCommand::from_output(pwm));
            },
            Mode::CurrentTest => self.tick_current_test(),
            Mode::PositionHold | Mode::TrajectoryTrack => self.tick_torque_follow(),
        }
    }

    /// 进入新模式时的状态复位
    fn enter_mode(&mut self, mode: Mode) {
        match mode {
            Mode::CurrentTest => {
                self.pid.reset();
                self.sample_index = 0;
            },
            Mode::PositionHold | Mode::TrajectoryTrack => self.pid.reset(),
            Mode::Idle | Mode::OpenLoopPwm => {},
        }
    }

    /// CurrentTest：跟踪方波样本并记录参考/实测对
    fn tick_current_test(&mut self) {
        let measured = match self.sensor.read_current() {
            Ok(value) => value,
            Err(e) => {
                self.degrade(e);
                return;
            },
        };

        let mut log = self.ctx.test_log.write();
        let Some(reference) = log.reference_at(self.sample_index) else {
            // 空波形（配置校验下不可达），直接回到 Idle
            drop(log);
            self.ctx.mode.set(Mode::Idle);
            return;
        };

        let error = reference - measured;
        let gains = **self.ctx.current_gains.load();
        let u = self.pid.step(gains, error);
        log.record(self.sample_index, measured);

        let finished = self.sample_index == log.len() - 1;
        drop(log);

        self.apply(ActuatorCommand::from_output(u));

        if finished {
            // 波形耗尽：计数和积分清零，内部转换到 Idle
            self.sample_index = 0;
            self.pid.reset();
            self.ctx.mode.set(Mode::Idle);
            self.ctx.emit(LoopEvent::CurrentTestCompleted);
            info!("Current test waveform exhausted, returning to Idle");
        } else {
            self.sample_index += 1;
        }
    }

    /// PositionHold / TrajectoryTrack：外环力矩请求充当电流设点
    fn tick_torque_follow(&mut self) {
        let measured = match self.sensor.read_current() {
            Ok(value) => value,
            Err(e) => {
                self.degrade(e);
                return;
            },
        };

        // 采样瞬间最近一次写入的力矩请求（最后写入者获胜）
        let torque_request = self.ctx.torque_request.load();
        let error = torque_request - measured;
        let gains = **self.ctx.current_gains.load();
        let u = self.pid.step(gains, error);
        self.apply(ActuatorCommand::from_output(u));
    }

    /// 写出执行器指令并记住它
    fn apply(&mut self, command: ActuatorCommand) {
        self.actuator.apply(command);
        self.last_command = command;
    }

    /// 传感器故障降级：保持上一指令一个 tick，跳过状态更新
    fn degrade(&mut self, e: SensorError) {
        if !self.ctx.faults.is_raised(FaultKind::SensorFault) {
            warn!("Current sensor fault, holding last command: {}", e);
            self.ctx.emit(LoopEvent::Fault(FaultKind::SensorFault));
        }
        self.ctx.faults.raise(FaultKind::SensorFault);
        self.actuator.apply(self.last_command);
    }

    /// 未知模式：执行器强制安全状态并置故障
    fn unknown_mode(&mut self, raw: u8) {
        if !self.ctx.faults.is_raised(FaultKind::UnknownMode) {
            error!("Unknown mode value {}, forcing actuator to safe state", raw);
            self.ctx.emit(LoopEvent::Fault(FaultKind::UnknownMode));
        }
        self.ctx.faults.raise(FaultKind::UnknownMode);
        self.apply(ActuatorCommand::idle(self.last_command.direction));
        self.prev_mode = None;
    }

    /// 当前积分值（测试/诊断）
    pub fn integral(&self) -> f32 {
        self.pid.integral()
    }
}
