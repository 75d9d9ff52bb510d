//! pi-statusline library
//!
//! A two-line terminal footer for coding-agent sessions: model, context bar and
//! cost on the first line, repository state on the second. The binary in
//! main.rs feeds it one JSON session document from stdin.

pub mod bar;
pub mod error;
pub mod footer;
pub mod git;
pub mod layout;
pub mod refresh;
pub mod settings;
pub mod style;
pub mod usage;

pub use bar::{BarAllocation, BarUsage, build_bar};
pub use error::{Result, StatuslineError};
pub use footer::{
    Footer, FooterController, FooterSnapshot, LifecycleEvent, RenderEnv, SessionView,
    render_footer_lines,
};
pub use git::{GitCounts, GitInfo, GitRunner, ProcessGitRunner, collect_git_info};
pub use layout::{fit_to_width, truncate_to_width, visible_width};
pub use refresh::{ChangeNotifier, ChangeSignal, Collector, RefreshScheduler, Subscription};
pub use settings::{CompactionOverride, CompactionSettings, SettingsPaths};
pub use usage::{SessionEntry, UsageData, UsageSnapshot, usage_data};
