pub mod optimization;
pub mod pool;
pub mod rate_limit;
pub mod server;
pub mod session;
pub mod streamable;

pub use optimization::{
    OptimizationConfig, PerformanceMetrics, PerformanceMonitor, RequestBatcher, ResponseCache,
    ResponseOptimizer,
};
pub use pool::{ConnectionPool, PoolConfig};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use server::{HttpTransportConfig, HttpTransportServer, HttpTransportState};
pub use session::{HttpSession, SessionStore};
pub use streamable::{StreamableHttpClient, StreamableHttpClientConfig, StreamableHttpTransport};
