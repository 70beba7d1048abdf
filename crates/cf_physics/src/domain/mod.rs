// crates/cf_physics/src/domain/mod.rs

//! 计算域拓扑
//!
//! 槽道计算域在 x、z 两个方向双周期：
//!
//! - [`PeriodicDomain`]: 主/从点判定与从点到主点的仿射映射
//! - [`PeriodicMap`]: 离散空间上的从点 → 主点自由度配对

mod periodic;

pub use periodic::{
    PeriodicDomain, PeriodicMap, PeriodicOffset, PeriodicPair, PeriodicRole, OUT_OF_DOMAIN,
};
