// crates/cf_config/src/lib.rs

//! ChannelFlow Config Layer
//!
//! 配置层，描述一次槽道湍流模拟所需的全部运行参数。
//!
//! # 模块概览
//!
//! - [`channel`]: `ChannelConfig` 及其子配置
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: cf_cli      ─> loads ChannelConfig
//! Layer 3: cf_physics  ─> consumes ChannelConfig in constructors
//! Layer 2: cf_config   ─> ChannelConfig (本层)
//! Layer 1: cf_foundation
//! ```
//!
//! 配置是不可变的显式结构体，由调用方传入各组件的构造函数，
//! 不存在任何全局参数命名空间。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod error;

pub use channel::{
    ChannelConfig, ChannelGeometry, OutputConfig, PhysicsConfig, SolverOptions, TimeConfig,
};
pub use error::ConfigError;
