// crates/cf_foundation/src/lib.rs

//! ChannelFlow Foundation Layer
//!
//! 基础层，为整个工作区提供公共抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `CfError` 与 `CfResult`
//! - [`tolerance`]: 坐标比较容差与 `near` 判定
//!
//! # 示例
//!
//! ```
//! use cf_foundation::{near, CfError, CfResult};
//!
//! fn check_wall(y: f64) -> CfResult<()> {
//!     if near(y.abs(), 1.0) {
//!         Ok(())
//!     } else {
//!         Err(CfError::invalid_mesh("法向端点不在壁面上"))
//!     }
//! }
//!
//! assert!(check_wall(-1.0).is_ok());
//! assert!(check_wall(0.5).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod tolerance;

pub use error::{CfError, CfResult};
pub use tolerance::{near, near_with, NEAR_EPS};

/// 三维几何类型（直接使用 glam 双精度类型）
pub use glam::{DMat3, DVec3};
