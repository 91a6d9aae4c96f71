pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const CALENDAR: &str = "📅";
    pub const DONE: &str = "●";
    pub const PENDING: &str = "○";
    pub const DEL: &str = "🗑️";
    pub const SPARKLE: &str = "✨";
}
