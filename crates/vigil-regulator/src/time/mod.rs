//! 时间抽象模块，提供可注入的时钟接口，使租约过期在测试中完全确定。
//!
//! # 结构概览
//! - [`clock::Clock`]：核心时钟 trait，仅暴露单调的 `now`；
//! - [`clock::SystemClock`]：委托 [`std::time::Instant::now`] 的生产实现；
//! - [`clock::MockClock`]：虚拟时钟，测试通过 `advance` 手动推进时间。
//!
//! 控制器从不阻塞等待，因此这里没有 `sleep` 原语；过期只在下一次访问时被发现。

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
