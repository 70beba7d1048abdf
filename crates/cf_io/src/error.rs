// crates/cf_io/src/error.rs
//! IO 错误类型定义
//!
//! 写出失败被视为环境故障，不在本层重试，直接向上传播。

use std::path::PathBuf;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 底层文件系统错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化失败
    #[error("序列化失败: {path}: {message}")]
    Serialization {
        /// 目标文件
        path: PathBuf,
        /// 错误信息
        message: String,
    },

    /// 无效的输出目录
    #[error("无效的输出目录: {path}, 原因: {reason}")]
    InvalidFolder {
        /// 目录路径
        path: PathBuf,
        /// 原因
        reason: String,
    },

    /// 渲染器失败
    #[error("渲染器 {renderer} 失败: {message}")]
    Render {
        /// 渲染器名称
        renderer: String,
        /// 错误信息
        message: String,
    },
}
