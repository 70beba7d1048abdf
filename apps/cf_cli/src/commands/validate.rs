// apps/cf_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 解析配置文件，检查数值范围，并确认网格满足周期匹配。

use anyhow::{bail, Result};
use cf_config::ChannelConfig;
use cf_physics::StructuredSpace;
use clap::Args;
use std::path::PathBuf;
use tracing::{error, info};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 同时构建网格检查周期配对
    #[arg(long)]
    pub mesh: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== ChannelFlow 配置验证 ===");
    println!("检查配置文件: {}", args.config.display());

    let config = match ChannelConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            bail!("配置无效: {}", args.config.display());
        }
    };
    println!("  ✓ 配置有效");

    if config.solver.use_lumping_of_mass_matrix && !config.use_lumping() {
        println!("  - 速度阶数 {} 时质量集中不生效", config.solver.velocity_degree);
    }

    if args.mesh {
        let space = StructuredSpace::channel(&config.geometry)?;
        println!("  ✓ 周期配对 {} 个", space.periodic_map().len());
    }

    Ok(())
}
