// crates/cf_physics/src/solvers/tuner.rs

//! 试探速度求解器的逐分量调整

use super::handle::SolverHandle;
use crate::fields::VelocityComponent;

/// 第一个分量的容差
const FIRST_COMPONENT_TOL: f64 = 1e-9;
/// 其余分量的容差
const BASELINE_TOL: f64 = 1e-8;

/// 求解某个速度分量前调整试探速度求解器
///
/// `u0` 的算子与上一步差别最大：不复用预条件器并收紧容差；
/// `u1`、`u2` 复用 `u0` 的预条件器。直接求解模式下不做任何事。
pub fn tune_tentative_solver(
    handle: &mut SolverHandle,
    component: VelocityComponent,
    use_krylov: bool,
) {
    if !use_krylov {
        return;
    }
    let Some(settings) = handle.krylov_mut() else {
        return;
    };

    let (reuse, tol) = match component {
        VelocityComponent::U0 => (false, FIRST_COMPONENT_TOL),
        VelocityComponent::U1 | VelocityComponent::U2 => (true, BASELINE_TOL),
    };
    settings.preconditioner_reuse = reuse;
    settings.relative_tolerance = tol;
    settings.absolute_tolerance = tol;
}
