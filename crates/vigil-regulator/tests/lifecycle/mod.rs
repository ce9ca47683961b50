//! 控制器生命周期集成测试入口：启停、续期、授权转交、种类改变与诊断快照。
//!
//! 过滤路径为 `tests::lifecycle::*`；所有时间推进均经由 `MockClock`。

pub mod tests {
    //! 集成测试命名空间。
    pub mod lifecycle {
        //! 生命周期相关的集成测试集合。

        use std::sync::Arc;
        use std::time::Duration;

        use vigil_regulator::{ActivityRegulator, MockClock, RegulatorConfig};

        pub(crate) const HOUR: Duration = Duration::from_secs(3600);

        pub(crate) fn regulator_with_clock() -> (ActivityRegulator, MockClock) {
            regulator_with_config(RegulatorConfig::default())
        }

        pub(crate) fn regulator_with_config(
            config: RegulatorConfig,
        ) -> (ActivityRegulator, MockClock) {
            let clock = MockClock::new();
            let regulator = ActivityRegulator::with_config(Arc::new(clock.clone()), config);
            (regulator, clock)
        }

        include!("service.rs");
        include!("extension.rs");
        include!("conversion.rs");
        include!("change.rs");
    }
}
