//! Dashboard controller implementation
//!
//! This module implements the screen-level controller that runs the
//! similar-app detection pass and tracks the app's lifecycle.

use crate::api::{Ack, RemoteService};
use crate::config::DetectionSettings;
use crate::device::{DeviceIdentity, DeviceInfoProvider};
use crate::error::{AppScoutError, get_user_friendly_error};
use crate::matcher::{MatchOptions, SimilarityMatcher};
use crate::platform::bridge::{SimilarAppEvents, Subscription};
use crate::platform::{AppEnumerator, enumerate_or_empty};
use crate::session::{self, SessionContext};
use crate::storage::KeyValueStore;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Foreground state of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    /// In the foreground and receiving input
    Active,
    /// Visible but not receiving input
    Inactive,
    /// Not visible
    Background,
}

/// Events delivered to the dashboard event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The dashboard screen was shown
    Mount,
    /// The application moved between foreground states
    AppStateChanged(AppStatus),
    /// The dashboard screen was torn down
    Unmount,
}

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational
    Info,
    /// Something the user should look at
    Warning,
    /// A failed operation
    Error,
}

/// An advisory alert for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Short heading
    pub title: String,
    /// Body text
    pub message: String,
}

impl Notice {
    /// Build a notice
    pub fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Sink for user-visible notices
pub trait Notifier: Send + Sync {
    /// Show `notice` to the user
    fn notify(&self, notice: Notice);
}

/// [`Notifier`] that writes notices to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!("{}: {}", notice.title, notice.message),
            NoticeLevel::Warning => warn!("{}: {}", notice.title, notice.message),
            NoticeLevel::Error => error!("{}: {}", notice.title, notice.message),
        }
    }
}

/// One-shot gate: the first [`try_acquire`](Self::try_acquire) wins, every later one fails
#[derive(Debug, Default)]
pub struct DetectionLatch {
    fired: AtomicBool,
}

impl DetectionLatch {
    /// An unfired latch
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the latch, returning `true` only for the call that fired it
    pub fn try_acquire(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether the latch has fired
    pub fn is_acquired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

/// What became of the detection report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    /// Nothing matched, so nothing was reported
    NotNeeded,
    /// The device identity was unavailable
    Skipped,
    /// The report is waiting out the report delay on a worker thread; see
    /// [`Dashboard::wait_for_report`]
    Scheduled,
    /// The service accepted the report
    Sent(Ack),
    /// The report failed; carries the user-facing message
    Failed(String),
}

/// Result of one detection pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionOutcome {
    /// Installed apps that resemble a watched app
    pub matched: BTreeSet<String>,
    /// What happened to the report
    pub report: ReportStatus,
}

/// Everything the dashboard talks to
pub struct Collaborators {
    /// Persisted session state
    pub store: Arc<dyn KeyValueStore>,
    /// Installed-app source
    pub enumerator: Box<dyn AppEnumerator>,
    /// Backend
    pub remote: Arc<dyn RemoteService>,
    /// Device identity source
    pub device: Box<dyn DeviceInfoProvider>,
    /// Where notices go
    pub notifier: Arc<dyn Notifier>,
    /// Out-of-process similar-app broadcasts
    pub events: SimilarAppEvents,
}

/// Similar-app detection screen controller
pub struct Dashboard {
    store: Arc<dyn KeyValueStore>,
    enumerator: Box<dyn AppEnumerator>,
    remote: Arc<dyn RemoteService>,
    device: Box<dyn DeviceInfoProvider>,
    notifier: Arc<dyn Notifier>,
    events: SimilarAppEvents,
    options: MatchOptions,
    report_delay: Duration,
    /// Gate for the current session's detection pass
    latch: DetectionLatch,
    /// Token the latch belongs to
    latched_token: Option<String>,
    identity: Option<DeviceIdentity>,
    subscription: Option<Subscription>,
    pending_report: Option<JoinHandle<ReportStatus>>,
}

impl Dashboard {
    /// Create a dashboard from detection settings and its collaborators
    pub fn new(settings: &DetectionSettings, collaborators: Collaborators) -> Self {
        let Collaborators {
            store,
            enumerator,
            remote,
            device,
            notifier,
            events,
        } = collaborators;

        Self {
            store,
            enumerator,
            remote,
            device,
            notifier,
            events,
            options: MatchOptions::from(settings),
            report_delay: Duration::from_millis(settings.report_delay_ms),
            latch: DetectionLatch::new(),
            latched_token: None,
            identity: None,
            subscription: None,
            pending_report: None,
        }
    }

    /// Whether the bridge subscription is live
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Dispatch one lifecycle event
    pub fn handle_event(&mut self, event: LifecycleEvent) -> Option<DetectionOutcome> {
        debug!("Lifecycle event: {:?}", event);
        match event {
            LifecycleEvent::Mount => self.on_mount(),
            LifecycleEvent::AppStateChanged(status) => {
                self.on_app_state(status);
                None
            }
            LifecycleEvent::Unmount => {
                self.on_unmount();
                None
            }
        }
    }

    /// Whether a delayed report has not been collected yet
    pub fn has_pending_report(&self) -> bool {
        self.pending_report.is_some()
    }

    /// Block until the delayed report finishes and return its status
    ///
    /// `None` when no report is pending.
    pub fn wait_for_report(&mut self) -> Option<ReportStatus> {
        let handle = self.pending_report.take()?;
        match handle.join() {
            Ok(status) => Some(status),
            Err(_) => {
                error!("Report worker panicked");
                None
            }
        }
    }

    /// Screen shown: subscribe to broadcasts, load the session, and run the
    /// detection pass once per session token
    ///
    /// Returns `None` when no pass ran (no session, or already ran).
    pub fn on_mount(&mut self) -> Option<DetectionOutcome> {
        if self.subscription.is_none() {
            self.subscription = Some(self.subscribe_to_bridge());
        }

        let session = match SessionContext::load(self.store.as_ref()) {
            Ok(session) => session,
            Err(AppScoutError::AuthMissing) => {
                debug!("No session token; detection skipped");
                return None;
            }
            Err(e) => {
                warn!("Failed to load session, detection skipped: {}", e);
                return None;
            }
        };

        if self.identity.is_none() {
            match self.device.identity() {
                Ok(identity) => self.identity = Some(identity),
                Err(e) => warn!("Failed to read device identity: {}", e),
            }
        }

        if self.latched_token.as_deref() != Some(session.auth_token.as_str()) {
            self.latch = DetectionLatch::new();
            self.latched_token = Some(session.auth_token.clone());
        }
        if !self.latch.try_acquire() {
            debug!("Detection pass already ran for this session");
            return None;
        }

        Some(self.run_detection_pass(&session))
    }

    /// Foreground state changed; leaving the foreground records the time
    pub fn on_app_state(&mut self, status: AppStatus) {
        match status {
            AppStatus::Inactive | AppStatus::Background => {
                match session::record_background(self.store.as_ref(), Utc::now()) {
                    Ok(stamp) => info!("Last close date saved: {}", stamp),
                    Err(e) => warn!("Failed to save last close date: {}", e),
                }
            }
            AppStatus::Active => debug!("App returned to the foreground"),
        }
    }

    /// Screen torn down: stop listening for broadcasts
    pub fn on_unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
            debug!("Dashboard unmounted; bridge subscription released");
        }
    }

    fn subscribe_to_bridge(&self) -> Subscription {
        let notifier = Arc::clone(&self.notifier);
        // Broadcasts are advisory only; reporting follows the fuzzy match
        self.events.subscribe(move |package_name| {
            info!("Platform reported similar app: {}", package_name);
            notifier.notify(Notice::new(
                NoticeLevel::Info,
                "Similar App Detected",
                format!("Similar app with package name {package_name} detected."),
            ));
        })
    }

    /// Enumerate, fetch, match, and report if anything matched
    fn run_detection_pass(&mut self, session: &SessionContext) -> DetectionOutcome {
        info!("Starting detection pass");
        let installed = enumerate_or_empty(self.enumerator.as_ref());

        let reference = self
            .remote
            .fetch_reference_names(&session.auth_token)
            .unwrap_or_else(|e| {
                warn!("Failed to fetch reference app names: {}", e);
                self.notifier.notify(Notice::new(
                    NoticeLevel::Error,
                    "Error",
                    get_user_friendly_error(&e),
                ));
                Vec::new()
            });

        let matched = SimilarityMatcher::new(&reference, self.options).matches(&installed);

        if matched.is_empty() {
            info!("No similar apps found");
            self.notifier.notify(Notice::new(
                NoticeLevel::Info,
                "No Similar Apps Found",
                format!("None of {} installed app(s) resemble a watched app.", installed.len()),
            ));
            return DetectionOutcome {
                matched,
                report: ReportStatus::NotNeeded,
            };
        }

        let names = matched.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        info!("Similar app names: {}", names);
        self.notifier.notify(Notice::new(
            NoticeLevel::Warning,
            "Similar Apps Found",
            format!("You have already installed similar app(s): {names}"),
        ));

        let Some(identity) = self.identity.clone() else {
            warn!("Device identity unavailable; report skipped");
            return DetectionOutcome {
                matched,
                report: ReportStatus::Skipped,
            };
        };

        if self.report_delay.is_zero() {
            let report = send_report(
                self.remote.as_ref(),
                self.notifier.as_ref(),
                &identity,
                session,
                &matched,
            );
            return DetectionOutcome { matched, report };
        }

        // A previous token's report may still be waiting
        if let Some(status) = self.wait_for_report() {
            debug!("Earlier report finished: {:?}", status);
        }

        let remote = Arc::clone(&self.remote);
        let notifier = Arc::clone(&self.notifier);
        let session = session.clone();
        let reported = matched.clone();
        let delay = self.report_delay;
        debug!("Report scheduled in {:?}", delay);
        self.pending_report = Some(std::thread::spawn(move || {
            std::thread::sleep(delay);
            send_report(remote.as_ref(), notifier.as_ref(), &identity, &session, &reported)
        }));

        DetectionOutcome {
            matched,
            report: ReportStatus::Scheduled,
        }
    }

    /// Run the dashboard on its own thread, handling events from `events`
    /// until every sender is dropped
    ///
    /// The dashboard is handed back through the join handle.
    pub fn spawn_event_loop(
        mut self,
        events: mpsc::Receiver<LifecycleEvent>,
    ) -> JoinHandle<Self> {
        std::thread::spawn(move || {
            info!("Entering dashboard event loop");
            while let Ok(event) = events.recv() {
                self.handle_event(event);
            }
            info!("Lifecycle channel disconnected. Exiting dashboard event loop.");
            self.on_unmount();
            if let Some(status) = self.wait_for_report() {
                debug!("Pending report finished: {:?}", status);
            }
            self
        })
    }
}

/// Send the detection report and notify the user of the result
fn send_report(
    remote: &dyn RemoteService,
    notifier: &dyn Notifier,
    identity: &DeviceIdentity,
    session: &SessionContext,
    matched: &BTreeSet<String>,
) -> ReportStatus {
    match remote.report(identity, session, matched) {
        Ok(ack) => {
            info!("User details sent successfully");
            notifier.notify(Notice::new(
                NoticeLevel::Info,
                "Success",
                "User details sent successfully",
            ));
            ReportStatus::Sent(ack)
        }
        Err(e) => {
            let message = format!("Failed to send user details: {}", get_user_friendly_error(&e));
            warn!("{}", message);
            notifier.notify(Notice::new(NoticeLevel::Error, "Error", message.clone()));
            ReportStatus::Failed(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_fires_once() {
        let latch = DetectionLatch::new();
        assert!(!latch.is_acquired());
        assert!(latch.try_acquire());
        assert!(!latch.try_acquire());
        assert!(latch.is_acquired());
    }

    #[test]
    fn test_latch_single_winner_across_threads() {
        let latch = Arc::new(DetectionLatch::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let latch = Arc::clone(&latch);
                std::thread::spawn(move || latch.try_acquire())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_notice_new() {
        let notice = Notice::new(NoticeLevel::Warning, "Title", String::from("Body"));
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.title, "Title");
        assert_eq!(notice.message, "Body");
    }
}
