// crates/cf_physics/src/solvers/mod.rs

//! 线性求解器策略
//!
//! 本 crate 不实现线性求解本身，只负责为外部引擎描述三个求解器：
//!
//! - [`handle`]: 求解器句柄（方法、预条件、容差、失败策略）
//! - [`builder`]: 按迭代/直接模式构建三个句柄
//! - [`tuner`]: 每个速度分量求解前调整试探速度求解器
//!
//! # 失败策略
//!
//! | 求解 | 未收敛 |
//! |---|---|
//! | 试探速度 | 记录警告，继续 |
//! | 速度更新 | 记录警告，继续 |
//! | 压力修正 | 致命错误 |

mod builder;
mod handle;
mod tuner;

pub use builder::{build_solvers, SolverSet};
pub use handle::{
    DirectSettings, KrylovMethod, KrylovSettings, PreconditionerKind, SolveOutcome, SolveStatus,
    SolverHandle, SolverSettings,
};
pub use tuner::tune_tentative_solver;

use serde::{Deserialize, Serialize};

/// 投影法中的三类求解
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveKind {
    /// 试探速度
    TentativeVelocity,
    /// 压力修正
    Pressure,
    /// 速度更新
    VelocityUpdate,
}

impl SolveKind {
    /// 名称
    pub fn name(self) -> &'static str {
        match self {
            Self::TentativeVelocity => "tentative_velocity",
            Self::Pressure => "pressure",
            Self::VelocityUpdate => "velocity_update",
        }
    }
}

impl std::fmt::Display for SolveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
