// apps/cf_cli/src/commands/run.rs

//! 运行算例命令
//!
//! 在结构网格上用冻结引擎走完整个生命周期：边界条件、湍流初始场、
//! 求解器配置、逐步调整与统计输出。流场本身不推进。

use anyhow::{Context, Result};
use cf_io::{JsonFileSink, LogRenderer, RunFolders};
use cf_physics::{ChannelProblem, FrozenEngine, LifecycleDriver, StructuredSpace};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 结果根目录（覆盖配置）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 总模拟时间（覆盖配置）
    #[arg(short = 't', long)]
    pub end_time: Option<f64>,

    /// 时间步长（覆盖配置）
    #[arg(long)]
    pub dt: Option<f64>,

    /// 续算目录
    #[arg(long)]
    pub restart: Option<PathBuf>,

    /// 使用均匀网格（不做法向拉伸）
    #[arg(long)]
    pub uniform: bool,

    /// JSON 输出缩进
    #[arg(long)]
    pub pretty: bool,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== ChannelFlow 算例启动 ===");

    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(output) = args.output {
        config.output.folder = output;
    }
    if let Some(t_end) = args.end_time {
        config.time.t_end = t_end;
    }
    if let Some(dt) = args.dt {
        config.time.dt = dt;
    }
    if args.restart.is_some() {
        config.restart_folder = args.restart;
    }
    config.validate().context("配置无效")?;

    let folders = match &config.restart_folder {
        Some(dir) => {
            warn!("续算: 流场由外部引擎恢复，冻结引擎从零场开始");
            RunFolders::open(dir)?
        }
        None => RunFolders::create(&config.output.folder)?,
    };
    info!("输出目录: {}", folders.run_dir().display());

    let g = &config.geometry;
    let space = if args.uniform {
        StructuredSpace::uniform(g)?
    } else {
        StructuredSpace::channel(g)?
    };
    info!(
        "网格: {}×{}×{} 单元, {} 个自由度, 周期配对 {}",
        g.nx,
        g.ny,
        g.nz,
        cf_physics::FunctionSpace::n_dofs(&space),
        space.periodic_map().len()
    );

    let mut sink = JsonFileSink::new(folders);
    if args.pretty {
        sink = sink.pretty();
    }
    let mut problem = ChannelProblem::new(
        config.clone(),
        sink,
        Box::new(LogRenderer::new("velocity")),
        Box::new(LogRenderer::new("pressure")),
    );

    let start = Instant::now();
    let mut driver = LifecycleDriver::new(&config, &space);
    let summary = driver
        .run(&mut problem, &mut FrozenEngine::new())
        .context("模拟失败")?;

    info!("=== 算例完成 ===");
    info!("总步数: {}", summary.steps);
    info!("结束时刻: {:.4}", summary.final_time);
    info!("冷启动: {}", summary.initialized);
    info!("容忍未收敛: {}", summary.tolerated_failures);
    info!("计算时间: {:.2} s", start.elapsed().as_secs_f64());

    Ok(())
}
