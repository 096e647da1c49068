/*!
 * Result caching and rolling context for streaming translation.
 */

pub mod context_window;
pub mod result_cache;

pub use context_window::ContextWindow;
pub use result_cache::{BufferConfig, CacheStats, EvictionPolicy, ResultCache};
