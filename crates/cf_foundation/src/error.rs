// crates/cf_foundation/src/error.rs

//! 基础层错误类型
//!
//! 只覆盖离散层自身能发现的问题。物理计算相关的错误
//! 在 `cf_physics` 中扩展，IO 相关错误在 `cf_io` 中扩展。

use thiserror::Error;

/// 统一结果类型
pub type CfResult<T> = Result<T, CfError>;

/// ChannelFlow 基础错误类型
#[derive(Error, Debug)]
pub enum CfError {
    /// 无效网格
    #[error("无效的网格: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },
}

impl CfError {
    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }
}
