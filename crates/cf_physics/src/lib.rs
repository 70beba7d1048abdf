// crates/cf_physics/src/lib.rs

//! 槽道湍流问题层
//!
//! 为外部 Navier–Stokes 分步引擎提供 Re_τ = 395 槽道流算例：
//! - 周期映射 (domain) - x、z 两个方向的主从面
//! - 边界条件 (boundary) - 壁面无滑移，入口只标记
//! - 初始场 (initial) - 对数律剖面 + 无散随机扰动
//! - 求解器策略 (solvers) - 迭代/直接模式、逐分量调整
//! - 输出 (output) - 平均统计量、三维快照、渲染刷新
//! - 生命周期 (hooks, engine) - 钩子接口与驱动
//!
//! 流场离散通过 [`FunctionSpace`] 能力接口接入，
//! [`StructuredSpace`] 为随附的结构网格实现。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fields;
pub mod hooks;
pub mod initial;
pub mod output;
pub mod solvers;
pub mod space;

pub use boundary::{
    BoundaryConditions, BoundaryRegion, BoundaryRole, ChannelBoundaryBuilder,
    DirichletConstraint, FacetLabel, FacetMarkers,
};
pub use domain::{
    PeriodicDomain, PeriodicMap, PeriodicOffset, PeriodicPair, PeriodicRole, OUT_OF_DOMAIN,
};
pub use engine::{FrozenEngine, LifecycleDriver, NavierStokesEngine, RunSummary, StepContext};
pub use error::{PhysicsError, PhysicsResult};
pub use fields::{
    FieldName, FlowFields, ScalarField, TimeLevel, VectorField, VelocityComponent,
    VelocityHistory,
};
pub use hooks::{ChannelProblem, ProblemHooks};
pub use initial::{log_law_velocity, TurbulentInitializer};
pub use output::{
    ChannelStatistics, EmitReport, OutputCadence, SamplingGrid, StatisticsEmitter,
    VolumeSampler,
};
pub use solvers::{
    build_solvers, tune_tentative_solver, KrylovMethod, KrylovSettings, PreconditionerKind,
    SolveKind, SolveOutcome, SolverHandle, SolverSet, SolverSettings,
};
pub use space::{FunctionSpace, StructuredSpace};
