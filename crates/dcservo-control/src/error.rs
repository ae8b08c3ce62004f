//! 控制域错误类型定义

use thiserror::Error;

/// 控制域错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    /// 轨迹加载长度超过缓冲容量
    #[error("Invalid trajectory length: {len} exceeds capacity {capacity}")]
    InvalidLength { len: usize, capacity: usize },

    /// 模式寄存器持有枚举之外的原始值
    ///
    /// 正常写入路径下不可达，保留防御分支供故障注入和诊断。
    #[error("Unknown mode value: {raw}")]
    UnknownMode { raw: u8 },
}

#[cfg(test)]
mod tests {
    use super::ControlError;

    #[test]
    fn test_error_display() {
        let err = ControlError::InvalidLength {
            len: 3000,
            capacity: 2000,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("3000") && msg.contains("2000"));

        let err = ControlError::UnknownMode { raw: 9 };
        assert_eq!(format!("{}", err), "Unknown mode value: 9");
    }
}
