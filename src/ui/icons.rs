pub struct Icons;

impl Icons {
    pub const PLATE: &str = "🍽️";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const TREND: &str = "📈";
    pub const NEWS: &str = "📰";
    pub const GLOBE: &str = "🌍";
}
