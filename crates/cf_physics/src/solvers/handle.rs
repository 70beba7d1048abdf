// crates/cf_physics/src/solvers/handle.rs

//! 求解器句柄

use serde::{Deserialize, Serialize};

use super::SolveKind;
use crate::error::{PhysicsError, PhysicsResult};

// ============================================================
// 配置
// ============================================================

/// Krylov 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KrylovMethod {
    /// 双共轭梯度稳定法
    BiCgStab,
    /// 广义最小残差法
    Gmres,
}

/// 预条件器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreconditionerKind {
    /// Jacobi 对角预条件
    Jacobi,
    /// Hypre Euclid（并行 ILU 型代数多重网格变体）
    HypreEuclid,
    /// Hypre BoomerAMG
    HypreAmg,
}

/// Krylov 求解器参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrylovSettings {
    /// 方法
    pub method: KrylovMethod,
    /// 预条件器
    pub preconditioner: PreconditionerKind,
    /// 未收敛时报错
    pub error_on_nonconvergence: bool,
    /// 以上一步解作初值
    pub nonzero_initial_guess: bool,
    /// 打印收敛历史
    pub monitor_convergence: bool,
    /// 最大迭代次数
    pub maximum_iterations: usize,
    /// 相对容差
    pub relative_tolerance: f64,
    /// 绝对容差
    pub absolute_tolerance: f64,
    /// 复用预条件器
    pub preconditioner_reuse: bool,
}

impl KrylovSettings {
    /// 创建参数（初值与监控默认打开，未收敛默认不报错）
    pub fn new(method: KrylovMethod, preconditioner: PreconditionerKind) -> Self {
        Self {
            method,
            preconditioner,
            error_on_nonconvergence: false,
            nonzero_initial_guess: true,
            monitor_convergence: true,
            maximum_iterations: 100,
            relative_tolerance: 1e-8,
            absolute_tolerance: 1e-8,
            preconditioner_reuse: false,
        }
    }

    /// 设置容差
    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.relative_tolerance = rtol;
        self.absolute_tolerance = atol;
        self
    }

    /// 设置最大迭代次数
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.maximum_iterations = max_iter;
        self
    }

    /// 设置预条件器复用
    pub fn with_reuse(mut self, reuse: bool) -> Self {
        self.preconditioner_reuse = reuse;
        self
    }

    /// 未收敛时报错
    pub fn fatal(mut self) -> Self {
        self.error_on_nonconvergence = true;
        self
    }
}

/// LU 直接求解参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectSettings {
    /// 复用分解结果
    pub reuse_factorization: bool,
}

/// 求解器参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SolverSettings {
    /// Krylov 迭代
    Krylov(KrylovSettings),
    /// LU 直接求解
    Direct(DirectSettings),
}

// ============================================================
// 求解结果
// ============================================================

/// 求解状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// 收敛
    Converged,
    /// 达到最大迭代次数
    MaxIterationsReached,
}

/// 外部引擎报告的一次求解结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// 状态
    pub status: SolveStatus,
    /// 迭代次数
    pub iterations: usize,
    /// 最终残差
    pub residual: f64,
}

impl SolveOutcome {
    /// 收敛结果
    pub fn converged(iterations: usize, residual: f64) -> Self {
        Self {
            status: SolveStatus::Converged,
            iterations,
            residual,
        }
    }

    /// 未收敛结果
    pub fn diverged(iterations: usize, residual: f64) -> Self {
        Self {
            status: SolveStatus::MaxIterationsReached,
            iterations,
            residual,
        }
    }

    /// 是否收敛
    pub fn is_converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

// ============================================================
// 句柄
// ============================================================

/// 求解器句柄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverHandle {
    kind: SolveKind,
    settings: SolverSettings,
    /// 诊断用计数器，初始为 0
    pub step_counter: u64,
}

impl SolverHandle {
    /// Krylov 句柄
    pub fn krylov(kind: SolveKind, settings: KrylovSettings) -> Self {
        Self {
            kind,
            settings: SolverSettings::Krylov(settings),
            step_counter: 0,
        }
    }

    /// LU 句柄
    pub fn direct(kind: SolveKind, reuse_factorization: bool) -> Self {
        Self {
            kind,
            settings: SolverSettings::Direct(DirectSettings { reuse_factorization }),
            step_counter: 0,
        }
    }

    /// 求解类型
    pub fn kind(&self) -> SolveKind {
        self.kind
    }

    /// 参数
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Krylov 参数（直接求解时为 `None`）
    pub fn krylov_settings(&self) -> Option<&KrylovSettings> {
        match &self.settings {
            SolverSettings::Krylov(k) => Some(k),
            SolverSettings::Direct(_) => None,
        }
    }

    /// 可写 Krylov 参数
    pub fn krylov_mut(&mut self) -> Option<&mut KrylovSettings> {
        match &mut self.settings {
            SolverSettings::Krylov(k) => Some(k),
            SolverSettings::Direct(_) => None,
        }
    }

    /// 是否为迭代求解器
    pub fn is_krylov(&self) -> bool {
        matches!(self.settings, SolverSettings::Krylov(_))
    }

    /// 未收敛是否致命（直接求解不会未收敛）
    pub fn error_on_nonconvergence(&self) -> bool {
        self.krylov_settings()
            .map_or(false, |k| k.error_on_nonconvergence)
    }

    /// 记录一次求解结果
    ///
    /// 未收敛时：配置为报错则返回 [`PhysicsError::NonConvergence`]，否则记录警告。
    pub fn record_solve(&mut self, outcome: &SolveOutcome) -> PhysicsResult<()> {
        self.step_counter += 1;
        if outcome.is_converged() {
            log::trace!(
                "{} 收敛: {} 次迭代, 残差 {:.3e}",
                self.kind,
                outcome.iterations,
                outcome.residual
            );
            return Ok(());
        }

        if self.error_on_nonconvergence() {
            return Err(PhysicsError::NonConvergence {
                kind: self.kind,
                iterations: outcome.iterations,
                residual: outcome.residual,
            });
        }
        log::warn!(
            "{} 未收敛（继续）: {} 次迭代, 残差 {:.3e}",
            self.kind,
            outcome.iterations,
            outcome.residual
        );
        Ok(())
    }
}
