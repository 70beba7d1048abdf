// crates/cf_physics/src/boundary/mod.rs

//! 边界条件模块
//!
//! # 子模块
//!
//! - [`constraint`]: 边界区域谓词与 Dirichlet 约束
//! - [`builder`]: 槽道边界条件构建器
//!
//! # 约定
//!
//! - 三个速度分量共享同一个壁面零值约束（无滑移）
//! - 压力不加约束
//! - 入口（x = 0）只做标记，不加约束；x = 0 同时是周期主面
//!
//! # 使用示例
//!
//! ```ignore
//! use cf_physics::boundary::ChannelBoundaryBuilder;
//!
//! let builder = ChannelBoundaryBuilder::new(&config.geometry);
//! let bcs = builder.create_bcs(&space, &mut fields.velocity)?;
//! assert!(bcs.get(FieldName::Pressure).is_empty());
//! ```

mod builder;
mod constraint;

pub use builder::{
    BoundaryConditions, BoundaryRole, ChannelBoundaryBuilder, FacetLabel, FacetMarkers,
};
pub use constraint::{BoundaryRegion, DirichletConstraint};
