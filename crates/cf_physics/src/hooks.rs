// crates/cf_physics/src/hooks.rs

//! 问题生命周期钩子
//!
//! 外部 Navier–Stokes 引擎在固定时机调用这些钩子。每个钩子只拿到它需要的
//! 参数，配置在构造时以不可变结构传入。
//!
//! | 钩子 | 调用次数 |
//! |---|---|
//! | `create_bcs` | 一次 |
//! | `initialize` | 一次 |
//! | `pre_solve` | 一次，时间推进前 |
//! | `get_solvers` | 一次 |
//! | `pre_velocity_tentative_solve` | 每步每个速度分量一次 |
//! | `pre_pressure_solve` | 每步一次 |
//! | `update_end_of_timestep` | 每步一次 |
//! | `theend` | 一次，模拟结束 |

use cf_config::ChannelConfig;
use cf_io::{PlotRenderer, SnapshotSink};

use crate::boundary::{BoundaryConditions, ChannelBoundaryBuilder};
use crate::error::PhysicsResult;
use crate::fields::{FlowFields, VelocityComponent, VelocityHistory};
use crate::initial::TurbulentInitializer;
use crate::output::{EmitReport, StatisticsEmitter};
use crate::solvers::{tune_tentative_solver, SolverHandle, SolverSet};
use crate::space::FunctionSpace;

/// 问题钩子
pub trait ProblemHooks<S: FunctionSpace + ?Sized> {
    /// 时间推进前的准备（可视化缓冲区等）
    fn pre_solve(&mut self, space: &S, fields: &FlowFields) -> PhysicsResult<()>;

    /// 构建边界条件，并施加到全部速度时间层
    fn create_bcs(
        &mut self,
        space: &S,
        velocity: &mut VelocityHistory,
    ) -> PhysicsResult<BoundaryConditions>;

    /// 初始化速度；返回是否写入了场
    fn initialize(
        &mut self,
        space: &S,
        velocity: &mut VelocityHistory,
        restart: bool,
    ) -> PhysicsResult<bool>;

    /// 三个求解器
    fn get_solvers(&mut self) -> SolverSet;

    /// 压力求解前（扩展点）
    fn pre_pressure_solve(&mut self) -> PhysicsResult<()> {
        Ok(())
    }

    /// 某个速度分量的试探速度求解前
    fn pre_velocity_tentative_solve(
        &mut self,
        component: VelocityComponent,
        solver: &mut SolverHandle,
    );

    /// 时间步结束
    fn update_end_of_timestep(
        &mut self,
        step: u64,
        space: &S,
        fields: &FlowFields,
    ) -> PhysicsResult<()>;

    /// 模拟结束（扩展点）
    fn theend(&mut self) -> PhysicsResult<()> {
        Ok(())
    }
}

/// 槽道湍流算例
pub struct ChannelProblem<K: SnapshotSink> {
    config: ChannelConfig,
    boundary: ChannelBoundaryBuilder,
    initializer: TurbulentInitializer,
    emitter: StatisticsEmitter<K>,
    last_report: EmitReport,
}

impl<K: SnapshotSink> std::fmt::Debug for ChannelProblem<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelProblem")
            .field("boundary", &self.boundary)
            .field("initializer", &self.initializer)
            .field("emitter", &self.emitter)
            .finish()
    }
}

impl<K: SnapshotSink> ChannelProblem<K> {
    /// 创建算例
    pub fn new(
        config: ChannelConfig,
        sink: K,
        velocity_plot: Box<dyn PlotRenderer>,
        pressure_plot: Box<dyn PlotRenderer>,
    ) -> Self {
        let boundary = ChannelBoundaryBuilder::new(&config.geometry);
        let initializer = TurbulentInitializer::new(&config);
        let emitter = StatisticsEmitter::new(&config, sink, velocity_plot, pressure_plot);
        Self {
            config,
            boundary,
            initializer,
            emitter,
            last_report: EmitReport::default(),
        }
    }

    /// 算例配置
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// 边界条件构建器
    pub fn boundary(&self) -> &ChannelBoundaryBuilder {
        &self.boundary
    }

    /// 输出器
    pub fn emitter(&self) -> &StatisticsEmitter<K> {
        &self.emitter
    }

    /// 最近一步的输出报告
    pub fn last_report(&self) -> &EmitReport {
        &self.last_report
    }

    /// 取回输出端
    pub fn into_sink(self) -> K {
        self.emitter.into_sink()
    }
}

impl<S, K> ProblemHooks<S> for ChannelProblem<K>
where
    S: FunctionSpace + ?Sized,
    K: SnapshotSink,
{
    fn pre_solve(&mut self, space: &S, _fields: &FlowFields) -> PhysicsResult<()> {
        self.emitter.prepare_visualization(space.n_dofs());
        log::debug!(
            "可视化网格 {:?}, 统计网格 {:?}",
            self.emitter.sampler().grid().dims(),
            self.emitter.statistics().grid().dims()
        );
        Ok(())
    }

    fn create_bcs(
        &mut self,
        space: &S,
        velocity: &mut VelocityHistory,
    ) -> PhysicsResult<BoundaryConditions> {
        self.boundary.create_bcs(space, velocity)
    }

    fn initialize(
        &mut self,
        space: &S,
        velocity: &mut VelocityHistory,
        restart: bool,
    ) -> PhysicsResult<bool> {
        self.initializer.initialize(space, velocity, restart)
    }

    fn get_solvers(&mut self) -> SolverSet {
        SolverSet::from_config(&self.config)
    }

    fn pre_velocity_tentative_solve(
        &mut self,
        component: VelocityComponent,
        solver: &mut SolverHandle,
    ) {
        tune_tentative_solver(solver, component, self.config.solver.use_krylov_solvers);
    }

    fn update_end_of_timestep(
        &mut self,
        step: u64,
        space: &S,
        fields: &FlowFields,
    ) -> PhysicsResult<()> {
        self.last_report = self.emitter.on_step_end(step, space, fields)?;
        Ok(())
    }
}
