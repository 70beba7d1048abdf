// apps/cf_cli/src/commands/mod.rs

//! 子命令

pub mod info;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use cf_config::ChannelConfig;
use std::path::Path;

/// 读取配置文件；未给出时使用默认配置
pub(crate) fn load_config(path: Option<&Path>) -> Result<ChannelConfig> {
    match path {
        Some(path) => ChannelConfig::from_file(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display())),
        None => Ok(ChannelConfig::default()),
    }
}
