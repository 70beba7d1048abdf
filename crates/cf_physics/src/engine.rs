// crates/cf_physics/src/engine.rs

//! 生命周期驱动
//!
//! [`LifecycleDriver`] 按固定顺序调用 [`ProblemHooks`]，并把每个时间步的
//! 三类求解委托给 [`NavierStokesEngine`]：
//!
//! ```text
//! create_bcs → initialize → pre_solve → get_solvers
//! 每步:
//!   for c in u0, u1, u2: pre_velocity_tentative_solve(c) → 试探速度
//!   pre_pressure_solve → 压力修正
//!   for c in u0, u1, u2: 速度更新
//!   推进速度历史 → update_end_of_timestep(step)
//! theend
//! ```
//!
//! 压力未收敛立即终止；其余未收敛记录警告后继续。

use cf_config::ChannelConfig;
use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryConditions;
use crate::error::PhysicsResult;
use crate::fields::{FieldName, FlowFields, VelocityComponent};
use crate::hooks::ProblemHooks;
use crate::solvers::{SolveOutcome, SolverHandle};
use crate::space::FunctionSpace;

/// 单步上下文
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    /// 时间步编号（从 1 开始）
    pub step: u64,
    /// 本步结束时刻
    pub time: f64,
    /// 时间步长
    pub dt: f64,
    /// 体积力
    pub body_force: [f64; 3],
}

/// Navier–Stokes 分步求解引擎
pub trait NavierStokesEngine<S: FunctionSpace + ?Sized> {
    /// 引擎名称
    fn name(&self) -> &str;

    /// 求解某个速度分量的试探速度
    fn tentative_velocity(
        &mut self,
        ctx: &StepContext,
        space: &S,
        fields: &mut FlowFields,
        component: VelocityComponent,
        solver: &SolverHandle,
        bcs: &BoundaryConditions,
    ) -> PhysicsResult<SolveOutcome>;

    /// 压力修正
    fn pressure_correction(
        &mut self,
        ctx: &StepContext,
        space: &S,
        fields: &mut FlowFields,
        solver: &SolverHandle,
    ) -> PhysicsResult<SolveOutcome>;

    /// 速度更新；`solver` 为 `None` 时使用集中质量，不需要求解
    fn velocity_update(
        &mut self,
        ctx: &StepContext,
        space: &S,
        fields: &mut FlowFields,
        component: VelocityComponent,
        solver: Option<&SolverHandle>,
        bcs: &BoundaryConditions,
    ) -> PhysicsResult<Option<SolveOutcome>>;
}

/// 运行摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// 完成的时间步数
    pub steps: u64,
    /// 结束时刻
    pub final_time: f64,
    /// 是否从湍流初始场冷启动
    pub initialized: bool,
    /// 被容忍的未收敛次数
    pub tolerated_failures: u64,
}

/// 生命周期驱动
#[derive(Debug)]
pub struct LifecycleDriver<'a, S: FunctionSpace + ?Sized> {
    space: &'a S,
    fields: FlowFields,
    n_steps: u64,
    dt: f64,
    body_force: [f64; 3],
    restart: bool,
}

impl<'a, S: FunctionSpace + ?Sized> LifecycleDriver<'a, S> {
    /// 由配置创建，场初始为零
    pub fn new(config: &ChannelConfig, space: &'a S) -> Self {
        Self {
            space,
            fields: FlowFields::zeros(space.n_dofs()),
            n_steps: config.n_steps(),
            dt: config.time.dt,
            body_force: config.body_force(),
            restart: config.is_restart(),
        }
    }

    /// 使用已恢复的流场（续算）
    pub fn with_fields(mut self, fields: FlowFields) -> Self {
        self.fields = fields;
        self
    }

    /// 覆盖时间步数
    pub fn with_steps(mut self, n_steps: u64) -> Self {
        self.n_steps = n_steps;
        self
    }

    /// 流场
    pub fn fields(&self) -> &FlowFields {
        &self.fields
    }

    /// 取回流场
    pub fn into_fields(self) -> FlowFields {
        self.fields
    }

    /// 执行完整生命周期
    pub fn run<H, E>(&mut self, hooks: &mut H, engine: &mut E) -> PhysicsResult<RunSummary>
    where
        H: ProblemHooks<S>,
        E: NavierStokesEngine<S>,
    {
        let space = self.space;
        crate::error::PhysicsError::check_size(
            "fields",
            space.n_dofs(),
            self.fields.velocity.len(),
        )?;

        let bcs = hooks.create_bcs(space, &mut self.fields.velocity)?;
        let initialized = hooks.initialize(space, &mut self.fields.velocity, self.restart)?;
        hooks.pre_solve(space, &self.fields)?;
        let mut solvers = hooks.get_solvers();

        log::info!(
            "开始时间推进: 引擎 {}, {} 步, dt = {}",
            engine.name(),
            self.n_steps,
            self.dt
        );

        let mut summary = RunSummary {
            initialized,
            ..RunSummary::default()
        };

        for step in 1..=self.n_steps {
            let ctx = StepContext {
                step,
                time: step as f64 * self.dt,
                dt: self.dt,
                body_force: self.body_force,
            };

            for component in VelocityComponent::ALL {
                hooks.pre_velocity_tentative_solve(component, &mut solvers.tentative);
                let outcome = engine.tentative_velocity(
                    &ctx,
                    space,
                    &mut self.fields,
                    component,
                    &solvers.tentative,
                    &bcs,
                )?;
                record(&mut solvers.tentative, &outcome, &mut summary)?;
            }

            hooks.pre_pressure_solve()?;
            let outcome =
                engine.pressure_correction(&ctx, space, &mut self.fields, &solvers.pressure)?;
            record(&mut solvers.pressure, &outcome, &mut summary)?;

            for component in VelocityComponent::ALL {
                let outcome = engine.velocity_update(
                    &ctx,
                    space,
                    &mut self.fields,
                    component,
                    solvers.update.as_ref(),
                    &bcs,
                )?;
                if let (Some(handle), Some(outcome)) = (solvers.update.as_mut(), outcome) {
                    record(handle, &outcome, &mut summary)?;
                }
            }

            self.fields.velocity.rotate();
            hooks.update_end_of_timestep(step, space, &self.fields)?;

            summary.steps = step;
            summary.final_time = ctx.time;
            log::debug!("步 {} 完成, t = {:.6}", step, ctx.time);
        }

        hooks.theend()?;
        log::info!(
            "时间推进结束: {} 步, t = {:.6}, 容忍未收敛 {} 次",
            summary.steps,
            summary.final_time,
            summary.tolerated_failures
        );
        Ok(summary)
    }
}

fn record(
    handle: &mut SolverHandle,
    outcome: &SolveOutcome,
    summary: &mut RunSummary,
) -> PhysicsResult<()> {
    handle.record_solve(outcome)?;
    if !outcome.is_converged() {
        summary.tolerated_failures += 1;
    }
    Ok(())
}

// ============================================================
// 冻结引擎
// ============================================================

/// 不推进流场的引擎
///
/// 每次求解都报告收敛，速度更新时重新施加边界条件。
/// 用于在没有真实求解器的情况下走通全部钩子和输出。
#[derive(Debug, Clone, Default)]
pub struct FrozenEngine {
    solves: u64,
}

impl FrozenEngine {
    /// 创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 已报告的求解次数
    pub fn solves(&self) -> u64 {
        self.solves
    }

    fn converged(&mut self) -> SolveOutcome {
        self.solves += 1;
        SolveOutcome::converged(0, 0.0)
    }
}

impl<S: FunctionSpace + ?Sized> NavierStokesEngine<S> for FrozenEngine {
    fn name(&self) -> &str {
        "frozen"
    }

    fn tentative_velocity(
        &mut self,
        _ctx: &StepContext,
        _space: &S,
        _fields: &mut FlowFields,
        _component: VelocityComponent,
        _solver: &SolverHandle,
        _bcs: &BoundaryConditions,
    ) -> PhysicsResult<SolveOutcome> {
        Ok(self.converged())
    }

    fn pressure_correction(
        &mut self,
        _ctx: &StepContext,
        _space: &S,
        _fields: &mut FlowFields,
        _solver: &SolverHandle,
    ) -> PhysicsResult<SolveOutcome> {
        Ok(self.converged())
    }

    fn velocity_update(
        &mut self,
        _ctx: &StepContext,
        space: &S,
        fields: &mut FlowFields,
        component: VelocityComponent,
        solver: Option<&SolverHandle>,
        bcs: &BoundaryConditions,
    ) -> PhysicsResult<Option<SolveOutcome>> {
        let u = fields.velocity.current_mut().component_mut(component);
        for bc in bcs.get(FieldName::Velocity(component)) {
            bc.apply(u)?;
        }
        space.project(u);
        Ok(solver.map(|_| self.converged()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhysicsError;
    use crate::fields::{TimeLevel, VelocityHistory};
    use crate::solvers::{SolveKind, SolverSet};
    use crate::space::StructuredSpace;
    use cf_config::ChannelGeometry;

    /// 记录调用顺序的钩子
    #[derive(Default)]
    struct RecordingHooks {
        calls: Vec<String>,
        use_lumping: bool,
    }

    impl ProblemHooks<StructuredSpace> for RecordingHooks {
        fn pre_solve(&mut self, _: &StructuredSpace, _: &FlowFields) -> PhysicsResult<()> {
            self.calls.push("pre_solve".into());
            Ok(())
        }

        fn create_bcs(
            &mut self,
            _: &StructuredSpace,
            _: &mut VelocityHistory,
        ) -> PhysicsResult<BoundaryConditions> {
            self.calls.push("create_bcs".into());
            Ok(BoundaryConditions::default())
        }

        fn initialize(
            &mut self,
            _: &StructuredSpace,
            _: &mut VelocityHistory,
            restart: bool,
        ) -> PhysicsResult<bool> {
            self.calls.push("initialize".into());
            Ok(!restart)
        }

        fn get_solvers(&mut self) -> SolverSet {
            self.calls.push("get_solvers".into());
            crate::solvers::build_solvers(true, self.use_lumping)
        }

        fn pre_pressure_solve(&mut self) -> PhysicsResult<()> {
            self.calls.push("pre_pressure_solve".into());
            Ok(())
        }

        fn pre_velocity_tentative_solve(&mut self, c: VelocityComponent, _: &mut SolverHandle) {
            self.calls.push(format!("tentative_{c}"));
        }

        fn update_end_of_timestep(
            &mut self,
            step: u64,
            _: &StructuredSpace,
            _: &FlowFields,
        ) -> PhysicsResult<()> {
            self.calls.push(format!("end_{step}"));
            Ok(())
        }

        fn theend(&mut self) -> PhysicsResult<()> {
            self.calls.push("theend".into());
            Ok(())
        }
    }

    /// 按脚本报告收敛结果的引擎
    struct ScriptedEngine {
        failing: Option<SolveKind>,
    }

    impl ScriptedEngine {
        fn outcome(&self, kind: SolveKind) -> SolveOutcome {
            if self.failing == Some(kind) {
                SolveOutcome::diverged(100, 1e-2)
            } else {
                SolveOutcome::converged(3, 1e-10)
            }
        }
    }

    impl NavierStokesEngine<StructuredSpace> for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        fn tentative_velocity(
            &mut self,
            _: &StepContext,
            _: &StructuredSpace,
            fields: &mut FlowFields,
            c: VelocityComponent,
            _: &SolverHandle,
            _: &BoundaryConditions,
        ) -> PhysicsResult<SolveOutcome> {
            for v in fields.velocity.current_mut().component_mut(c).values_mut() {
                *v += 1.0;
            }
            Ok(self.outcome(SolveKind::TentativeVelocity))
        }

        fn pressure_correction(
            &mut self,
            _: &StepContext,
            _: &StructuredSpace,
            _: &mut FlowFields,
            _: &SolverHandle,
        ) -> PhysicsResult<SolveOutcome> {
            Ok(self.outcome(SolveKind::Pressure))
        }

        fn velocity_update(
            &mut self,
            _: &StepContext,
            _: &StructuredSpace,
            _: &mut FlowFields,
            _: VelocityComponent,
            solver: Option<&SolverHandle>,
            _: &BoundaryConditions,
        ) -> PhysicsResult<Option<SolveOutcome>> {
            Ok(solver.map(|_| self.outcome(SolveKind::VelocityUpdate)))
        }
    }

    fn setup(t_end: f64) -> (ChannelConfig, StructuredSpace) {
        let mut config = ChannelConfig::default();
        config.geometry = ChannelGeometry::new([4.0, 2.0, 2.0], [2, 2, 2]);
        config.time.t_end = t_end;
        config.time.dt = 0.5;
        let space = StructuredSpace::uniform(&config.geometry).unwrap();
        (config, space)
    }

    #[test]
    fn test_hook_order() {
        let (config, space) = setup(1.0);
        let mut hooks = RecordingHooks::default();
        let mut engine = ScriptedEngine { failing: None };

        let summary = LifecycleDriver::new(&config, &space)
            .run(&mut hooks, &mut engine)
            .unwrap();
        assert_eq!(summary.steps, 2);
        assert!((summary.final_time - 1.0).abs() < 1e-12);
        assert!(summary.initialized);

        let step = |n: u64| {
            vec![
                "tentative_u0".to_string(),
                "tentative_u1".into(),
                "tentative_u2".into(),
                "pre_pressure_solve".into(),
                format!("end_{n}"),
            ]
        };
        let mut expected: Vec<String> = ["create_bcs", "initialize", "pre_solve", "get_solvers"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        expected.extend(step(1));
        expected.extend(step(2));
        expected.push("theend".into());
        assert_eq!(hooks.calls, expected);
    }

    #[test]
    fn test_history_rotates_each_step() {
        let (config, space) = setup(1.0);
        let mut driver = LifecycleDriver::new(&config, &space);
        driver
            .run(&mut RecordingHooks::default(), &mut ScriptedEngine { failing: None })
            .unwrap();

        let velocity = &driver.fields().velocity;
        assert_eq!(velocity.current().axis(0).values()[0], 2.0);
        assert_eq!(velocity.level(TimeLevel::Previous).axis(0).values()[0], 2.0);
        assert_eq!(velocity.level(TimeLevel::BeforePrevious).axis(0).values()[0], 1.0);
    }

    #[test]
    fn test_pressure_failure_is_fatal() {
        let (config, space) = setup(1.0);
        let mut hooks = RecordingHooks::default();
        let mut engine = ScriptedEngine {
            failing: Some(SolveKind::Pressure),
        };

        let err = LifecycleDriver::new(&config, &space)
            .run(&mut hooks, &mut engine)
            .unwrap_err();
        assert!(matches!(
            err,
            PhysicsError::NonConvergence {
                kind: SolveKind::Pressure,
                ..
            }
        ));
        assert!(!hooks.calls.iter().any(|c| c == "end_1" || c == "theend"));
    }

    #[test]
    fn test_tentative_failure_tolerated() {
        let (config, space) = setup(1.0);
        let mut engine = ScriptedEngine {
            failing: Some(SolveKind::TentativeVelocity),
        };
        let summary = LifecycleDriver::new(&config, &space)
            .run(&mut RecordingHooks::default(), &mut engine)
            .unwrap();
        assert_eq!(summary.steps, 2);
        assert_eq!(summary.tolerated_failures, 6);
    }

    #[test]
    fn test_lumping_skips_update_solve() {
        let (config, space) = setup(0.5);
        let mut hooks = RecordingHooks {
            use_lumping: true,
            ..RecordingHooks::default()
        };
        let mut engine = ScriptedEngine {
            failing: Some(SolveKind::VelocityUpdate),
        };
        let summary = LifecycleDriver::new(&config, &space)
            .run(&mut hooks, &mut engine)
            .unwrap();
        assert_eq!(summary.tolerated_failures, 0);
    }

    #[test]
    fn test_restart_flag_reaches_initialize() {
        let (mut config, space) = setup(0.5);
        config.restart_folder = Some("previous".into());
        let summary = LifecycleDriver::new(&config, &space)
            .run(&mut RecordingHooks::default(), &mut ScriptedEngine { failing: None })
            .unwrap();
        assert!(!summary.initialized);
    }

    #[test]
    fn test_frozen_engine_keeps_walls() {
        let (config, space) = setup(0.5);
        let mut fields = FlowFields::zeros(space.n_dofs());
        for axis in 0..3 {
            fields.velocity.current_mut().axis_mut(axis).values_mut().fill(1.0);
        }
        let builder = crate::boundary::ChannelBoundaryBuilder::new(&config.geometry);
        let bcs = builder.build(&space);
        let ctx = StepContext {
            step: 1,
            time: 0.5,
            dt: 0.5,
            body_force: config.body_force(),
        };

        let mut engine = FrozenEngine::new();
        let outcome = engine
            .velocity_update(&ctx, &space, &mut fields, VelocityComponent::U1, None, &bcs)
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(engine.solves(), 0);

        let u1 = fields.velocity.current().axis(1).values();
        let wall = &bcs.get(FieldName::Velocity(VelocityComponent::U1))[0];
        for &dof in wall.dofs() {
            assert_eq!(u1[dof], 0.0);
        }
        assert_eq!(fields.velocity.current().axis(0).values()[0], 1.0);
    }
}
