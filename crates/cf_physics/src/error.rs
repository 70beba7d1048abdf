// crates/cf_physics/src/error.rs

//! 物理层错误类型
//!
//! 错误只有两类去向：致命并终止模拟，或记录日志后继续。
//! 本层不做任何重试。

use cf_foundation::CfError;
use cf_io::IoError;
use thiserror::Error;

use crate::solvers::SolveKind;

/// 物理层结果类型
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// 物理层错误
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// 求解器未收敛且配置为报错（压力修正）
    #[error("{kind} 求解未收敛: 迭代 {iterations} 次, 残差 {residual:.3e}")]
    NonConvergence {
        /// 求解类型
        kind: SolveKind,
        /// 迭代次数
        iterations: usize,
        /// 最终残差
        residual: f64,
    },

    /// 场长度与函数空间不一致
    #[error("场大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 场名称
        name: String,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 周期从点找不到对应主点（网格不满足周期匹配）
    #[error("周期映射失败: 点 ({x:.6}, {y:.6}, {z:.6}) 没有匹配的主点")]
    PeriodicMismatch {
        /// x 坐标
        x: f64,
        /// y 坐标
        y: f64,
        /// z 坐标
        z: f64,
    },

    /// 生命周期钩子调用顺序错误
    #[error("生命周期错误: {0}")]
    Lifecycle(String),

    /// 输出失败
    #[error("输出失败: {0}")]
    Io(#[from] IoError),

    /// 基础层错误
    #[error("基础层错误: {0}")]
    Foundation(#[from] CfError),
}

impl PhysicsError {
    /// 场大小不匹配
    pub fn size_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// 检查场大小
    #[inline]
    pub fn check_size(name: &str, expected: usize, actual: usize) -> PhysicsResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }
}
