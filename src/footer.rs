//! The two-line session footer.
//!
//! [`Footer`] owns the cached repository snapshot and the scheduler that
//! refreshes it. Rendering is a pure function of that snapshot plus the
//! host's [`SessionView`], so every redraw is cheap and never touches git.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::bar::{BarUsage, build_bar};
use crate::git::{GitCounts, GitInfo, GitRunner, collect_git_info};
use crate::layout::{bar_cells, fit_to_width, join_segments, visible_width};
use crate::refresh::{ChangeSignal, Collector, REFRESH_INTERVAL, RefreshScheduler};
use crate::settings::{CompactionOverride, CompactionSettings, SettingsPaths, home_dir, merge};
use crate::style::{
    BLUE, CYAN, DIM_CYAN, DIM_GREEN, DIM_MAGENTA, DIM_RED, DIM_WHITE, DIM_YELLOW, GREEN, RED,
    ThinkingLevel, WHITE, YELLOW, format_elapsed, normalize_model, normalize_path, paint,
};
use crate::usage::{SessionEntry, lenient_entries, lenient_opt_number, usage_data};

const DEFAULT_CONTEXT_WINDOW: f64 = 200_000.0;

/// Asks the host to repaint the footer.
pub type Redraw = Arc<dyn Fn() + Send + Sync>;

/// Model metadata supplied by the host.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_number")]
    pub context_window: Option<f64>,
}

/// Live context occupancy reported by the host.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextUsage {
    #[serde(default, deserialize_with = "lenient_opt_number")]
    pub tokens: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_number")]
    pub percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_number")]
    pub context_window: Option<f64>,
}

/// Everything the host knows about the session at render time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(default)]
    pub model: Option<ModelInfo>,
    #[serde(default)]
    pub context_usage: Option<ContextUsage>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub entries: Vec<SessionEntry>,
    #[serde(default)]
    pub cwd: String,
    #[serde(default)]
    pub thinking_level: String,
}

/// State published by each refresh pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FooterSnapshot {
    pub git: GitInfo,
    pub compaction: CompactionSettings,
}

/// Process environment consulted while rendering.
#[derive(Debug, Clone)]
pub struct RenderEnv {
    pub home: String,
    pub now: DateTime<Utc>,
}

impl RenderEnv {
    pub fn current() -> Self {
        Self {
            home: home_dir(),
            now: Utc::now(),
        }
    }
}

fn floor_tokens(n: f64) -> u64 {
    if n.is_finite() && n > 0.0 { n.floor() as u64 } else { 0 }
}

fn percent_colors(used_pct: u64) -> (&'static str, &'static str) {
    if used_pct >= 85 {
        (RED, DIM_RED)
    } else if used_pct >= 60 {
        (YELLOW, DIM_YELLOW)
    } else {
        (GREEN, DIM_GREEN)
    }
}

fn model_segment(view: &SessionView) -> String {
    let raw = view
        .model
        .as_ref()
        .and_then(|model| {
            [model.name.as_deref(), model.id.as_deref()]
                .into_iter()
                .flatten()
                .find(|value| !value.is_empty())
        })
        .unwrap_or("Claude");
    let model = paint(WHITE, &normalize_model(raw));
    let thinking = ThinkingLevel::parse(&view.thinking_level).render();
    join_segments(&[&model, &thinking])
}

fn context_line(width: usize, view: &SessionView, snapshot: &FooterSnapshot, env: &RenderEnv) -> String {
    let usage = usage_data(&view.entries);
    let context = view.context_usage.unwrap_or_default();

    let window = context
        .context_window
        .or_else(|| view.model.as_ref().and_then(|model| model.context_window))
        .unwrap_or(DEFAULT_CONTEXT_WINDOW);
    let total_tokens = floor_tokens(window).max(1);
    let context_tokens = floor_tokens(context.tokens.unwrap_or(0.0));

    let raw_pct = match context.percent {
        Some(pct) if pct.is_finite() && pct > 0.0 => pct,
        _ => context_tokens as f64 * 100.0 / total_tokens as f64,
    };
    let used_pct = raw_pct.round().clamp(0.0, 100.0) as u64;

    let (mut fresh, cached) = match usage.latest {
        Some(latest) => (latest.input, latest.cached()),
        None => (context_tokens, 0),
    };
    let reported = fresh.saturating_add(cached);
    if reported < context_tokens {
        fresh += context_tokens - reported;
    }

    let (pct_color, dim_pct_color) = percent_colors(used_pct);
    let mut right = paint(pct_color, &format!("{used_pct}%"));
    if width >= 50 {
        let used_k = context_tokens.max(fresh.saturating_add(cached)) / 1000;
        let total_k = total_tokens / 1000;
        let _ = write!(right, " {}", paint(dim_pct_color, &format!("{used_k}k/{total_k}k")));
    }
    if width >= 55 {
        let elapsed = format_elapsed(usage.elapsed_ms(env.now));
        let _ = write!(right, " {}", paint(DIM_MAGENTA, &elapsed));
    }
    if width >= 60 && usage.total_cost > 0.0 {
        let cost = format!("${:.2}", usage.total_cost);
        let _ = write!(right, " {}", paint(DIM_YELLOW, &cost));
    }

    let left = model_segment(view);
    let cells = bar_cells(width, visible_width(&left), visible_width(&right));
    let bar = build_bar(
        cells,
        BarUsage {
            total_tokens,
            fresh_tokens: fresh,
            cached_tokens: cached,
        },
        &snapshot.compaction,
    );
    join_segments(&[&left, &bar, &right])
}

fn git_status(counts: &GitCounts) -> String {
    let parts = [
        (counts.staged, DIM_GREEN, "●"),
        (counts.modified, DIM_YELLOW, "●"),
        (counts.untracked, DIM_CYAN, "○"),
        (counts.ahead, CYAN, "↑"),
        (counts.behind, CYAN, "↓"),
    ];
    let rendered: Vec<String> = parts
        .iter()
        .filter(|(count, _, _)| *count > 0)
        .map(|(count, color, glyph)| {
            format!("{}{}", paint(color, glyph), paint(DIM_WHITE, &count.to_string()))
        })
        .collect();
    rendered.join(" ")
}

fn repository_line(view: &SessionView, git: &GitInfo, env: &RenderEnv) -> String {
    let mut line = if git.repository.is_empty() {
        paint(DIM_WHITE, &normalize_path(&view.cwd, &env.home))
    } else {
        paint(CYAN, &git.repository)
    };
    line.push(' ');

    if !git.branch.is_empty() {
        line.push_str(&paint(BLUE, &git.branch));
    }
    if !git.commit.is_empty() {
        let _ = write!(line, " {}", paint(YELLOW, &git.commit));
    }
    if git.added > 0 || git.removed > 0 {
        let _ = write!(
            line,
            " {}/{}",
            paint(GREEN, &format!("+{}", git.added)),
            paint(RED, &format!("-{}", git.removed))
        );
    }
    let status = git_status(&git.counts);
    if !status.is_empty() {
        let _ = write!(line, " {status}");
    }
    line.trim_end().to_string()
}

/// Render both footer lines for a terminal `width` columns wide.
///
/// Non-positive widths yield two empty lines.
pub fn render_footer_lines(
    width: i32,
    view: &SessionView,
    snapshot: &FooterSnapshot,
    env: &RenderEnv,
) -> [String; 2] {
    let Ok(width) = usize::try_from(width) else {
        return [String::new(), String::new()];
    };
    if width == 0 {
        return [String::new(), String::new()];
    }

    let line1 = context_line(width, view, snapshot, env);
    let line2 = repository_line(view, &snapshot.git, env);
    [fit_to_width(&line1, width), fit_to_width(&line2, width)]
}

/// One refresh pass: git state plus freshly reloaded settings.
pub struct FooterCollector<R> {
    runner: R,
    cwd: PathBuf,
    paths: SettingsPaths,
    session_settings: Arc<Mutex<Option<CompactionOverride>>>,
}

impl<R: GitRunner + 'static> FooterCollector<R> {
    pub fn new(
        runner: R,
        cwd: PathBuf,
        paths: SettingsPaths,
        session_settings: Arc<Mutex<Option<CompactionOverride>>>,
    ) -> Self {
        Self {
            runner,
            cwd,
            paths,
            session_settings,
        }
    }
}

impl<R: GitRunner + 'static> Collector for FooterCollector<R> {
    type Output = FooterSnapshot;

    async fn collect(&self) -> FooterSnapshot {
        let session = *self
            .session_settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (git, compaction) = tokio::join!(
            collect_git_info(&self.runner, &self.cwd),
            self.paths.load(session.as_ref()),
        );
        FooterSnapshot { git, compaction }
    }
}

/// Installed footer: cached snapshot plus the scheduler keeping it fresh.
pub struct Footer<R: GitRunner + 'static> {
    snapshot: Arc<RwLock<FooterSnapshot>>,
    session_settings: Arc<Mutex<Option<CompactionOverride>>>,
    scheduler: RefreshScheduler<FooterCollector<R>>,
}

impl<R: GitRunner + 'static> Footer<R> {
    /// Install for `cwd` with settings paths taken from the environment.
    pub fn install(runner: R, cwd: &Path, signal: Option<&dyn ChangeSignal>, redraw: Redraw) -> Self {
        Self::install_with(
            runner,
            cwd,
            SettingsPaths::from_env(cwd),
            REFRESH_INTERVAL,
            signal,
            redraw,
        )
    }

    pub fn install_with(
        runner: R,
        cwd: &Path,
        paths: SettingsPaths,
        period: Duration,
        signal: Option<&dyn ChangeSignal>,
        redraw: Redraw,
    ) -> Self {
        let snapshot = Arc::new(RwLock::new(FooterSnapshot::default()));
        let session_settings = Arc::new(Mutex::new(None));
        let collector =
            FooterCollector::new(runner, cwd.to_path_buf(), paths, Arc::clone(&session_settings));

        let published = Arc::clone(&snapshot);
        let live = Arc::clone(&session_settings);
        let scheduler = RefreshScheduler::start(collector, period, signal, move |mut next: FooterSnapshot| {
            {
                // The pass may have read the session layer before a live event
                // landed; merge the current one under the snapshot lock.
                let mut current = published.write().unwrap_or_else(PoisonError::into_inner);
                let session = *live.lock().unwrap_or_else(PoisonError::into_inner);
                next.compaction = merge(next.compaction, session.as_ref());
                *current = next;
            }
            redraw();
        });
        debug!(cwd = %cwd.display(), "footer installed");

        Self {
            snapshot,
            session_settings,
            scheduler,
        }
    }

    pub fn snapshot(&self) -> FooterSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn render(&self, width: i32, view: &SessionView) -> [String; 2] {
        render_footer_lines(width, view, &self.snapshot(), &RenderEnv::current())
    }

    /// Apply a settings object delivered by a live session event.
    ///
    /// The override takes effect on the next render and is kept on top of the
    /// file layers for every later reload.
    pub fn apply_session_settings(&self, doc: &Value) {
        let Some(layer) = CompactionOverride::from_settings(doc) else {
            return;
        };
        {
            let mut session = self
                .session_settings
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *session = Some(layer.layered_on(*session));
        }
        {
            let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
            snapshot.compaction = merge(snapshot.compaction, Some(&layer));
        }
        self.scheduler.trigger();
    }

    /// Reload settings files and git state.
    pub fn refresh(&self) {
        self.scheduler.trigger();
    }

    pub fn is_disposed(&self) -> bool {
        self.scheduler.is_disposed()
    }

    pub fn dispose(&mut self) {
        self.scheduler.dispose();
        debug!("footer disposed");
    }
}

/// Host lifecycle notifications.
#[derive(Debug, Clone, Copy)]
pub enum LifecycleEvent<'a> {
    SessionStart,
    SessionSwitch,
    SettingsChanged(Option<&'a Value>),
    Shutdown,
}

/// Reinstalls the footer on session start/switch and tears it down on shutdown.
pub struct FooterController<R: GitRunner + Clone + 'static> {
    runner: R,
    signal: Option<Arc<dyn ChangeSignal>>,
    redraw: Redraw,
    footer: Option<Footer<R>>,
}

impl<R: GitRunner + Clone + 'static> FooterController<R> {
    pub fn new(runner: R, signal: Option<Arc<dyn ChangeSignal>>, redraw: Redraw) -> Self {
        Self {
            runner,
            signal,
            redraw,
            footer: None,
        }
    }

    pub fn handle(&mut self, event: LifecycleEvent<'_>, cwd: &Path, has_ui: bool) {
        match event {
            LifecycleEvent::SessionStart | LifecycleEvent::SessionSwitch => {
                self.teardown();
                if !has_ui {
                    return;
                }
                self.footer = Some(Footer::install(
                    self.runner.clone(),
                    cwd,
                    self.signal.as_deref(),
                    Arc::clone(&self.redraw),
                ));
            }
            LifecycleEvent::SettingsChanged(doc) => {
                if let Some(footer) = &self.footer {
                    match doc {
                        Some(doc) => footer.apply_session_settings(doc),
                        None => footer.refresh(),
                    }
                }
            }
            LifecycleEvent::Shutdown => self.teardown(),
        }
    }

    fn teardown(&mut self) {
        if let Some(mut footer) = self.footer.take() {
            footer.dispose();
        }
    }

    pub fn footer(&self) -> Option<&Footer<R>> {
        self.footer.as_ref()
    }

    /// Lines for the installed footer, or two empty lines when none is installed.
    pub fn render(&self, width: i32, view: &SessionView) -> [String; 2] {
        match &self.footer {
            Some(footer) => footer.render(width, view),
            None => [String::new(), String::new()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::visible_width;
    use crate::refresh::ChangeNotifier;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tokio::sync::Semaphore;

    #[derive(Clone, Default)]
    struct FixedRunner {
        replies: Arc<HashMap<String, String>>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedRunner {
        fn repo() -> Self {
            let replies = [
                ("rev-parse --git-dir", ".git"),
                ("branch --show-current", "main"),
                ("rev-parse --short HEAD", "abc1234"),
                ("config --get remote.origin.url", "https://github.com/acme/widgets.git"),
                ("status --porcelain", "M  a.rs\n?? b.rs"),
                ("diff --numstat HEAD", "3\t1\ta.rs"),
            ];
            Self {
                replies: Arc::new(
                    replies
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                calls: Arc::default(),
            }
        }
    }

    impl GitRunner for FixedRunner {
        async fn run(&self, _cwd: &Path, args: &[&str]) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies.get(&args.join(" ")).cloned().unwrap_or_default()
        }
    }

    fn env() -> RenderEnv {
        RenderEnv {
            home: "/home/u".to_string(),
            now: DateTime::parse_from_rfc3339("2026-01-01T01:05:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    fn view() -> SessionView {
        serde_json::from_value(json!({
            "model": {"name": "Claude Opus 4.5", "contextWindow": 200000},
            "contextUsage": {"tokens": 50000, "percent": 25},
            "cwd": "/home/u/src/widgets",
            "thinkingLevel": "high",
            "entries": [
                {"type": "session", "timestamp": "2026-01-01T00:00:00Z"},
                {"type": "message", "message": {"role": "assistant",
                 "usage": {"input": 10000, "cacheRead": 40000, "cost": {"total": 1.5}}}}
            ]
        }))
        .unwrap()
    }

    fn git() -> GitInfo {
        GitInfo {
            repository: "acme/widgets".to_string(),
            branch: "main".to_string(),
            commit: "abc1234".to_string(),
            added: 3,
            removed: 1,
            counts: GitCounts {
                staged: 1,
                modified: 2,
                untracked: 0,
                ahead: 1,
                behind: 0,
            },
        }
    }

    fn strip(line: &str) -> String {
        crate::layout::segments(line)
            .filter_map(|seg| match seg {
                crate::layout::Segment::Text(c) => Some(c),
                crate::layout::Segment::Escape(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_non_positive_width_renders_nothing() {
        let snapshot = FooterSnapshot::default();
        for width in [-10, -1, 0] {
            assert_eq!(render_footer_lines(width, &view(), &snapshot, &env()), ["", ""]);
        }
    }

    #[test]
    fn test_wide_render_contents() {
        let snapshot = FooterSnapshot {
            git: git(),
            compaction: CompactionSettings::default(),
        };
        let [line1, line2] = render_footer_lines(120, &view(), &snapshot, &env());

        let plain1 = strip(&line1);
        assert!(plain1.starts_with("Opus 4.5 ❖ "), "{plain1}");
        assert!(plain1.contains("25%"));
        assert!(plain1.contains("50k/200k"));
        assert!(plain1.contains("1h5m"));
        assert!(plain1.contains("$1.50"));
        assert_eq!(plain1.matches(['■', '□', '▨']).count(), 40);

        let plain2 = strip(&line2);
        assert_eq!(plain2, "acme/widgets main abc1234 +3/-1 ●1 ●2 ↑1");
    }

    #[test]
    fn test_narrow_render_drops_extras_and_fits() {
        let snapshot = FooterSnapshot {
            git: git(),
            compaction: CompactionSettings::default(),
        };
        for width in 1..70 {
            let [line1, line2] = render_footer_lines(width, &view(), &snapshot, &env());
            assert!(visible_width(&line1) <= width as usize, "width {width}: {line1:?}");
            assert!(visible_width(&line2) <= width as usize, "width {width}: {line2:?}");
        }
        let [line1, _] = render_footer_lines(45, &view(), &snapshot, &env());
        assert!(!strip(&line1).contains("50k/200k"));
    }

    #[test]
    fn test_no_repository_shows_normalized_cwd() {
        let [_, line2] = render_footer_lines(80, &view(), &FooterSnapshot::default(), &env());
        assert_eq!(strip(&line2), "~/src/widgets");
    }

    #[test]
    fn test_percent_falls_back_to_token_ratio() {
        let mut view = view();
        view.context_usage = Some(ContextUsage {
            tokens: Some(180_000.0),
            percent: None,
            context_window: None,
        });
        view.entries.clear();
        let [line1, _] = render_footer_lines(120, &view, &FooterSnapshot::default(), &env());
        assert!(strip(&line1).contains("90%"));
        assert!(line1.contains(&paint(RED, "90%")));
    }

    #[test]
    fn test_missing_model_defaults() {
        let view = SessionView::default();
        let [line1, _] = render_footer_lines(120, &view, &FooterSnapshot::default(), &env());
        let plain = strip(&line1);
        assert!(plain.starts_with("Claude "), "{plain}");
        assert!(plain.contains("0%"));
        assert!(plain.contains("0k/200k"));
    }

    fn isolated_paths(dir: &TempDir) -> SettingsPaths {
        SettingsPaths::resolve(dir.path(), dir.path().join("agent").to_str(), "")
    }

    #[tokio::test]
    async fn test_footer_publishes_and_redraws() {
        let dir = TempDir::new().unwrap();
        let redraws = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&redraws);
        let runner = FixedRunner::repo();
        let notifier = ChangeNotifier::new();

        let mut footer = Footer::install_with(
            runner.clone(),
            dir.path(),
            isolated_paths(&dir),
            Duration::from_secs(3600),
            Some(&notifier),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        while redraws.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(footer.snapshot().git.branch, "main");

        let [_, line2] = footer.render(100, &view());
        assert!(strip(&line2).starts_with("acme/widgets main"));

        footer.dispose();
        assert!(footer.is_disposed());
        assert_eq!(notifier.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_session_settings_apply_immediately() {
        let dir = TempDir::new().unwrap();
        let footer = Footer::install_with(
            FixedRunner::default(),
            dir.path(),
            isolated_paths(&dir),
            Duration::from_secs(3600),
            None,
            Arc::new(|| {}),
        );
        footer.apply_session_settings(&json!({"compaction": {"reserveTokens": 1234}}));
        assert_eq!(footer.snapshot().compaction.reserve_tokens, 1234);

        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        let compaction = footer.snapshot().compaction;
        assert_eq!(compaction.reserve_tokens, 1234);
        assert_eq!(compaction.enabled, CompactionSettings::default().enabled);
    }

    /// Answers "" to every query, but only after the test releases a permit.
    #[derive(Clone)]
    struct GatedRunner {
        gate: Arc<Semaphore>,
        calls: Arc<AtomicUsize>,
    }

    impl GitRunner for GatedRunner {
        async fn run(&self, _cwd: &Path, _args: &[&str]) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
            String::new()
        }
    }

    #[tokio::test]
    async fn test_in_flight_pass_keeps_live_override() {
        let dir = TempDir::new().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let redraws = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&redraws);

        let footer = Footer::install_with(
            GatedRunner {
                gate: Arc::clone(&gate),
                calls: Arc::clone(&calls),
            },
            dir.path(),
            isolated_paths(&dir),
            Duration::from_secs(3600),
            None,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        while calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        footer.apply_session_settings(&json!({"compaction": {"reserveTokens": 1234}}));
        gate.add_permits(1);
        while redraws.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        // The queued rerun is parked on the gate, so this is the first pass's result.
        assert_eq!(footer.snapshot().compaction.reserve_tokens, 1234);
    }

    #[tokio::test]
    async fn test_controller_lifecycle() {
        let notifier = Arc::new(ChangeNotifier::new());
        let signal: Arc<dyn ChangeSignal> = notifier.clone();
        let mut controller = FooterController::new(FixedRunner::repo(), Some(signal), Arc::new(|| {}));
        let cwd = Path::new("/tmp");

        controller.handle(LifecycleEvent::SessionStart, cwd, false);
        assert!(controller.footer().is_none());
        assert_eq!(controller.render(80, &view()), ["", ""]);

        controller.handle(LifecycleEvent::SessionStart, cwd, true);
        assert_eq!(notifier.listener_count(), 1);

        controller.handle(LifecycleEvent::SessionSwitch, cwd, true);
        assert_eq!(notifier.listener_count(), 1);

        controller.handle(LifecycleEvent::Shutdown, cwd, true);
        assert!(controller.footer().is_none());
        assert_eq!(notifier.listener_count(), 0);
    }
}
