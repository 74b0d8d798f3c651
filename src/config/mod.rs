//! 配置管理
//!
//! 配置文件 → 环境配置文件 → 环境变量，逐层覆盖。

mod loader;
mod structs;

pub use structs::*;
