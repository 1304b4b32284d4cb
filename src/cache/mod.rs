pub mod keys;
pub mod macros;
pub mod object_cache;
pub mod register;
pub mod report;
pub mod service;
pub mod traits;

pub use keys::{CacheKey, TtlTier, WarmKey};
pub use register::create_object_cache;
pub use report::{CacheReport, KeyCoverage, KeyState, KeyStatus, PerformanceReport};
pub use service::{CacheService, CacheServiceOptions, CacheStats, ClearScope, WarmReport};
pub use traits::{CacheHealth, CacheResult, ObjectCache};
