// crates/cf_physics/tests/channel_scenario.rs

//! 槽道算例端到端测试
//! 粗网格上的边界分类、周期映射往返与输出节奏

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use cf_config::{ChannelConfig, ChannelGeometry};
use cf_foundation::DVec3;
use cf_io::{IoResult, JsonFileSink, MemorySink, PlotFrame, PlotRenderer, RunFolders};
use cf_physics::{
    BoundaryRole, ChannelBoundaryBuilder, ChannelProblem, FlowFields, FrozenEngine,
    FunctionSpace, LifecycleDriver, PeriodicDomain, PeriodicOffset, StatisticsEmitter,
    StructuredSpace,
};

/// 渲染调用记录 (物理量, 时间步)
type PlotLog = Rc<RefCell<Vec<(String, u64)>>>;

/// 记录每次刷新的渲染器
struct SharedRenderer {
    name: &'static str,
    log: PlotLog,
}

impl PlotRenderer for SharedRenderer {
    fn name(&self) -> &str {
        self.name
    }

    fn plot(&mut self, frame: &PlotFrame<'_>) -> IoResult<()> {
        self.log.borrow_mut().push((frame.quantity.to_string(), frame.step));
        Ok(())
    }
}

fn renderers() -> (Box<dyn PlotRenderer>, Box<dyn PlotRenderer>, PlotLog) {
    let log = Rc::new(RefCell::new(Vec::new()));
    (
        Box::new(SharedRenderer {
            name: "velocity",
            log: Rc::clone(&log),
        }),
        Box::new(SharedRenderer {
            name: "pressure",
            log: Rc::clone(&log),
        }),
        log,
    )
}

fn coarse_config() -> ChannelConfig {
    let mut config = ChannelConfig::default();
    config.geometry = ChannelGeometry::new([4.0, 2.0, 2.0], [2, 2, 2]);
    config
}

/// 测试 2×2×2 网格上每个边界点恰好属于一类
#[test]
fn test_coarse_boundary_classification() {
    let config = coarse_config();
    let space = StructuredSpace::uniform(&config.geometry).unwrap();
    let builder = ChannelBoundaryBuilder::new(&config.geometry);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut interior = 0;
    for dof in 0..space.n_dofs() {
        let x = space.dof_coordinate(dof);
        let key = match builder.classify(x, space.on_boundary(dof)) {
            BoundaryRole::PeriodicSlave(offset) => {
                // 偏移必须与所在高面一致
                let expected = match (x.x == 4.0, x.z == 1.0) {
                    (true, true) => PeriodicOffset::XZ,
                    (true, false) => PeriodicOffset::X,
                    (false, true) => PeriodicOffset::Z,
                    (false, false) => panic!("slave off the high faces: {x:?}"),
                };
                assert_eq!(offset, expected);
                "slave"
            }
            BoundaryRole::Wall => "wall",
            BoundaryRole::Inlet => "inlet",
            BoundaryRole::PeriodicMaster => "master",
            BoundaryRole::Unconstrained => "unconstrained",
            BoundaryRole::Interior => {
                interior += 1;
                continue;
            }
        };
        *counts.entry(key).or_default() += 1;
    }

    assert_eq!(interior, 1);
    assert_eq!(counts.get("slave"), Some(&15));
    assert_eq!(counts.get("wall"), Some(&8));
    assert_eq!(counts.get("inlet"), Some(&2));
    assert_eq!(counts.get("master"), Some(&1));
    assert_eq!(counts.get("unconstrained"), None);
    assert_eq!(counts.values().sum::<usize>(), 26);
}

/// 测试三类周期映射的往返
#[test]
fn test_periodic_round_trip_on_grid() {
    let config = coarse_config();
    let space = StructuredSpace::uniform(&config.geometry).unwrap();
    let domain = PeriodicDomain::new(&config.geometry);

    let map = space.periodic_map();
    assert_eq!(map.len(), 15);
    for pair in map.pairs() {
        let slave = space.dof_coordinate(pair.slave);
        let master = space.dof_coordinate(pair.master);
        assert!((domain.map(slave) - master).length() < 1e-12);
    }

    let corner = DVec3::new(4.0, 0.0, 1.0);
    assert_eq!(domain.map(corner), DVec3::new(0.0, 0.0, -1.0));
}

/// 测试步 1..20 的输出节奏
#[test]
fn test_emitter_cadence_over_twenty_steps() {
    let config = coarse_config();
    assert_eq!(config.output.update_statistics, 10);
    assert_eq!(config.output.check_save_h5, 10);

    let space = StructuredSpace::channel(&config.geometry).unwrap();
    let (velocity_plot, pressure_plot, log) = renderers();
    let mut emitter =
        StatisticsEmitter::new(&config, MemorySink::new(), velocity_plot, pressure_plot);
    emitter.prepare_visualization(space.n_dofs());

    let fields = FlowFields::zeros(space.n_dofs());
    for step in 1..=20 {
        emitter.on_step_end(step, &space, &fields).unwrap();
    }

    let n_points = emitter.sampler().grid().n_points();
    let sink = emitter.sink();
    let flushed: Vec<u64> = sink.statistics.iter().map(|s| s.step).collect();
    assert_eq!(flushed, vec![10, 20]);
    assert_eq!(sink.statistics[1].samples, 2);

    assert_eq!(sink.snapshots.len(), 10);
    for step in [10, 20] {
        assert_eq!(sink.snapshot_names(step), vec!["u0", "u1", "u2", "enstrophy", "Q"]);
    }
    // 每个快照只含自身的采样
    assert!(sink.snapshots.iter().all(|s| s.values.len() == n_points));

    let calls = log.borrow();
    assert_eq!(
        *calls,
        vec![
            ("pressure".to_string(), 10),
            ("velocity".to_string(), 10),
            ("pressure".to_string(), 20),
            ("velocity".to_string(), 20),
        ]
    );
}

/// 测试完整运行写出的文件
#[test]
fn test_full_run_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ChannelConfig::default();
    config.geometry = ChannelGeometry::new([4.0, 2.0, 2.0], [5, 4, 5]);
    config.time.t_end = 0.5;
    config.time.dt = 0.05;
    config.output.update_statistics = 5;
    config.output.check_save_h5 = 5;
    config.output.folder = dir.path().to_path_buf();

    let folders = RunFolders::create(&config.output.folder).unwrap();
    let (velocity_plot, pressure_plot, _) = renderers();
    let mut problem = ChannelProblem::new(
        config.clone(),
        JsonFileSink::new(folders.clone()),
        velocity_plot,
        pressure_plot,
    );

    let space = StructuredSpace::channel(&config.geometry).unwrap();
    let mut driver = LifecycleDriver::new(&config, &space);
    let summary = driver.run(&mut problem, &mut FrozenEngine::new()).unwrap();

    assert_eq!(summary.steps, 10);
    assert!(summary.initialized);
    assert_eq!(summary.tolerated_failures, 0);

    for step in [5, 10] {
        assert!(folders.stats_dir().join(format!("dump_mean_{step}.json")).exists());
        for name in ["u0", "u1", "u2", "enstrophy", "Q"] {
            assert!(folders
                .snapshot_dir()
                .join(format!("snapshot_{name}_{step}.json"))
                .exists());
        }
    }

    let stats: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(folders.stats_dir().join("dump_mean_10.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(stats["samples"], 2);
}
