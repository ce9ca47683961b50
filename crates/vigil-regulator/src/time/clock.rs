use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// 抽象可注入的时钟。
///
/// # 接口约束
/// - `now` 返回单调递增的时间点；
/// - 实现必须 `Send + Sync + 'static`，以便通过 `Arc<dyn Clock>` 在线程间共享。
///
/// # 使用指引
/// - 生产环境使用 [`SystemClock`]；
/// - 测试注入 [`MockClock`] 并调用 [`MockClock::advance`] 推进时间，验证租约惰性过期。
pub trait Clock: Send + Sync + 'static {
    /// 返回当前的单调时间点。
    fn now(&self) -> Instant;
}

/// 基于标准库单调时钟的系统时钟。
#[derive(Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 虚拟时钟：通过手动推进时间在测试中复现确定性的过期序列。
///
/// # 行为概览
/// - 构造时记录基准 [`Instant`]，之后 `now()` 恒为 `origin + elapsed`；
/// - `advance` 单调增加偏移量；克隆体共享同一偏移，测试可以保留一份句柄而把另一份交给控制器。
#[derive(Clone, Debug)]
pub struct MockClock {
    inner: Arc<MockClockInner>,
}

#[derive(Debug)]
struct MockClockInner {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl MockClock {
    /// 创建起始时间为当前系统时间的虚拟时钟。
    pub fn new() -> Self {
        Self::with_start(Instant::now())
    }

    /// 以指定起始时间构造虚拟时钟。
    pub fn with_start(origin: Instant) -> Self {
        Self {
            inner: Arc::new(MockClockInner {
                origin,
                elapsed: Mutex::new(Duration::ZERO),
            }),
        }
    }

    /// 手动推进虚拟时钟。
    pub fn advance(&self, delta: Duration) {
        let mut elapsed = self.inner.elapsed.lock();
        *elapsed = elapsed.saturating_add(delta);
    }

    /// 返回自起始时间以来的虚拟时间偏移。
    pub fn elapsed(&self) -> Duration {
        *self.inner.elapsed.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.inner.origin + self.elapsed()
    }
}
