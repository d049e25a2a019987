/// Number of prior exchanges carried into a composed prompt
pub const RECENT_EXCHANGE_LIMIT: usize = 3;

/// Name prefix for quick sessions ("Chat 1", "Chat 2", ...)
pub const QUICK_SESSION_PREFIX: &str = "Chat";

/// Default number of rows returned by the legacy history view
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;
