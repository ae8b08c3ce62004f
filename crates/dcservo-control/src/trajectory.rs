//! 轨迹 / 回放缓冲
//!
//! 固定容量的参考序列加上等长的实测记录序列，按 tick 计数索引。
//! 两个回路各用一对：
//!
//! - 电流回路（CurrentTest）：参考 = 合成方波，记录 = 实测电流
//! - 位置回路（TrajectoryTrack）：参考 = 用户轨迹角度，记录 = 实际角度
//!
//! # 所有权约定
//!
//! 播放期间缓冲由写入它的回路独占；前台只能在该活动回到终止/空闲
//! 模式后读取导出快照。加载新轨迹必须在非跟踪模式下进行（由指令
//! 接口串行化保证，数据结构本身不强制）。

use crate::error::ControlError;

/// 导出快照中的一行：`(索引, 参考值, 实测值)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSample {
    /// tick 索引
    pub index: usize,
    /// 参考信号样本
    pub reference: f32,
    /// 回放时记录的实测样本
    pub recorded: f32,
}

/// 参考 + 记录缓冲对
#[derive(Debug, Clone)]
pub struct PlaybackLog {
    /// 参考序列（播放期间只读）
    reference: Vec<f32>,
    /// 实测记录，与参考等长，每 tick 写一个样本
    recorded: Vec<f32>,
    /// 最大可加载长度
    capacity: usize,
}

impl PlaybackLog {
    /// 创建空缓冲对
    pub fn new(capacity: usize) -> Self {
        Self {
            reference: Vec::new(),
            recorded: Vec::new(),
            capacity,
        }
    }

    /// 用给定参考序列创建（容量 = 序列长度，用于固定波形）
    pub fn from_reference(reference: Vec<f32>) -> Self {
        let len = reference.len();
        Self {
            recorded: vec![0.0; len],
            capacity: len,
            reference,
        }
    }

    /// 加载新的参考序列，替换之前的内容
    ///
    /// # 错误
    ///
    /// 长度超过容量时返回 [`ControlError::InvalidLength`]，
    /// 原有内容保持不变。
    pub fn load(&mut self, samples: Vec<f32>) -> Result<(), ControlError> {
        if samples.len() > self.capacity {
            return Err(ControlError::InvalidLength {
                len: samples.len(),
                capacity: self.capacity,
            });
        }
        self.recorded = vec![0.0; samples.len()];
        self.reference = samples;
        Ok(())
    }

    /// 当前激活长度
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    /// 容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 读取参考样本
    ///
    /// 越界索引返回 `None`（回路在使用前保证索引有效）。
    pub fn reference_at(&self, index: usize) -> Option<f32> {
        self.reference.get(index).copied()
    }

    /// 记录一个实测样本
    ///
    /// 越界写入静默丢弃。回路索引由长度检查保证，不应发生。
    pub fn record(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.recorded.get_mut(index) {
            *slot = value;
        }
    }

    /// 只读导出快照，不改变任何状态
    pub fn export(&self) -> Vec<ExportSample> {
        self.reference
            .iter()
            .zip(self.recorded.iter())
            .enumerate()
            .map(|(index, (&reference, &recorded))| ExportSample {
                index,
                reference,
                recorded,
            })
            .collect()
    }
}
