// crates/cf_physics/src/solvers/builder.rs

//! 求解器构建

use cf_config::ChannelConfig;

use super::handle::{KrylovMethod, KrylovSettings, PreconditionerKind, SolverHandle};
use super::SolveKind;

/// 三个求解器句柄
///
/// 质量集中时速度更新无需求解，`update` 为 `None`。
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSet {
    /// 试探速度
    pub tentative: SolverHandle,
    /// 压力修正
    pub pressure: SolverHandle,
    /// 速度更新
    pub update: Option<SolverHandle>,
}

impl SolverSet {
    /// 按算例配置构建
    pub fn from_config(config: &ChannelConfig) -> Self {
        build_solvers(config.solver.use_krylov_solvers, config.use_lumping())
    }
}

/// 构建求解器
pub fn build_solvers(use_krylov: bool, use_lumping: bool) -> SolverSet {
    let set = if use_krylov {
        SolverSet {
            tentative: SolverHandle::krylov(
                SolveKind::TentativeVelocity,
                KrylovSettings::new(KrylovMethod::BiCgStab, PreconditionerKind::Jacobi)
                    .with_max_iterations(100)
                    .with_tolerances(1e-8, 1e-8)
                    .with_reuse(false),
            ),
            pressure: SolverHandle::krylov(
                SolveKind::Pressure,
                KrylovSettings::new(KrylovMethod::Gmres, PreconditionerKind::HypreAmg)
                    .with_max_iterations(100)
                    .with_tolerances(1e-8, 1e-8)
                    .with_reuse(true)
                    .fatal(),
            ),
            update: (!use_lumping).then(|| {
                SolverHandle::krylov(
                    SolveKind::VelocityUpdate,
                    KrylovSettings::new(KrylovMethod::BiCgStab, PreconditionerKind::HypreEuclid)
                        .with_max_iterations(50)
                        .with_tolerances(1e-9, 1e-10)
                        .with_reuse(true),
                )
            }),
        }
    } else {
        SolverSet {
            tentative: SolverHandle::direct(SolveKind::TentativeVelocity, false),
            pressure: SolverHandle::direct(SolveKind::Pressure, true),
            update: (!use_lumping).then(|| SolverHandle::direct(SolveKind::VelocityUpdate, true)),
        }
    };

    log::debug!(
        "求解器: {}, 速度更新 {}",
        if use_krylov { "Krylov" } else { "LU" },
        if set.update.is_some() { "求解" } else { "集中质量" }
    );
    set
}
