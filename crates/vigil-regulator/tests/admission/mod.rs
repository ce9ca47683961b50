//! 准入语义集成测试入口。
//!
//! # 模块目的（Why）
//! - 汇集控制器对外可观测的准入性质：节点互斥、租约过期、结束守卫、父子不对称、集合与内容集的交互；
//! - 过滤路径统一为 `tests::admission::*`。
//!
//! # 维护提示（How）
//! 新增场景时在此处 `include!` 对应文件；需要推进时间的测试一律注入 `MockClock`，不得 `sleep`。

pub mod tests {
    //! 集成测试命名空间。
    pub mod admission {
        //! 准入相关的集成测试集合。

        use std::sync::Arc;
        use std::time::Duration;

        use vigil_regulator::{ActivityRegulator, MockClock};

        pub(crate) const HOUR: Duration = Duration::from_secs(3600);

        /// 构造注入虚拟时钟的控制器，返回的时钟句柄与控制器共享同一偏移。
        pub(crate) fn regulator_with_clock() -> (ActivityRegulator, MockClock) {
            let clock = MockClock::new();
            let regulator = ActivityRegulator::with_clock(Arc::new(clock.clone()));
            (regulator, clock)
        }

        include!("exclusion.rs");
        include!("expiry.rs");
        include!("hierarchy.rs");
        include!("scenario.rs");
    }
}
