// apps/cf_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示配置及其派生量。

use anyhow::Result;
use cf_config::ChannelConfig;
use cf_physics::{SamplingGrid, SolverSet, SolverSettings, TurbulentInitializer};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径（缺省为默认配置）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 以 JSON 打印完整配置
    #[arg(long)]
    pub json: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== ChannelFlow 信息 ===");
    let config = super::load_config(args.config.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    print_physics(&config);
    println!();
    print_output(&config);
    println!();
    print_solvers(&config);
    Ok(())
}

fn print_physics(config: &ChannelConfig) {
    let g = &config.geometry;
    let initializer = TurbulentInitializer::new(config);

    println!("=== 物理参数 ===");
    println!("计算域: {:.4} × {:.4} × {:.4}", g.lx, g.ly, g.lz);
    println!("网格: {} × {} × {}", g.nx, g.ny, g.nz);
    println!("ν = {:e}, Re_τ = {}", config.physics.nu, config.physics.re_tau);
    println!("u_τ = {:.6e}", config.u_tau());
    println!("体积力 = {:?}", config.body_force());
    println!("中心线平均速度 = {:.6}", initializer.mean_velocity(0.0));
    println!("T = {}, dt = {}, 步数 = {}", config.time.t_end, config.time.dt, config.n_steps());
}

fn print_output(config: &ChannelConfig) {
    println!("=== 输出 ===");
    println!("结果目录: {}", config.output.folder.display());
    println!("统计累积间隔: {}", config.output.update_statistics);
    println!("写出间隔: {}", config.output.check_save_h5);
    println!("可视化网格: {:?}", SamplingGrid::visualization(&config.geometry).dims());
    println!("统计网格: {:?}", SamplingGrid::statistics(&config.geometry).dims());
}

fn print_solvers(config: &ChannelConfig) {
    println!("=== 求解器 ===");
    if config.solver.use_lumping_of_mass_matrix && !config.use_lumping() {
        println!("质量集中: 关闭（速度阶数 {} > 1）", config.solver.velocity_degree);
    } else {
        println!("质量集中: {}", config.use_lumping());
    }

    let set = SolverSet::from_config(config);
    let handles = [Some(&set.tentative), Some(&set.pressure), set.update.as_ref()];
    for handle in handles.into_iter().flatten() {
        match handle.settings() {
            SolverSettings::Krylov(k) => println!(
                "{}: {:?} + {:?}, 最大迭代 {}, rtol {:e}, atol {:e}, 复用 {}, 未收敛报错 {}",
                handle.kind(),
                k.method,
                k.preconditioner,
                k.maximum_iterations,
                k.relative_tolerance,
                k.absolute_tolerance,
                k.preconditioner_reuse,
                k.error_on_nonconvergence
            ),
            SolverSettings::Direct(d) => println!(
                "{}: LU, 复用分解 {}",
                handle.kind(),
                d.reuse_factorization
            ),
        }
    }
    if set.update.is_none() {
        println!("velocity_update: 集中质量，无需求解");
    }
}
