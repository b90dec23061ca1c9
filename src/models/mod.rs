//! Data models shared by the wizard, the REST client and the dashboard views.

pub mod entry;
pub mod mood;
pub mod session;
mod wire;

pub use entry::{
    DayMoodStat, DayOfWeekBreakdown, Entry, EntryPage, EntryStats, HeatmapCell, MoodHeatmap,
};
pub use mood::Mood;
pub use session::{AuthToken, ProfileUpdate, Registration, SessionContext, UserProfile};
