//! The running application: one context object that owns every piece of
//! mutable state and reacts to timer fires and menu actions.
//!
//! Lifecycle: `Running -> Exiting -> Terminated`. Startup (lock acquisition,
//! the silent exit when another instance runs) happens before a `ClockApp`
//! exists. All callbacks arrive on the one event-loop thread, so no locking is
//! needed here.

use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::autostart::{AutostartController, RunKeyStore};
use crate::clock::{self, ClockIcon, ClockTime};
use crate::config::TICK_PERIOD;
use crate::error::TrayError;
use crate::instance::InstanceGuard;
use crate::scheduler::Scheduler;

/// Presentation side of the tray icon.
pub trait TrayView {
    /// Replace the displayed icon and its tooltip.
    fn update_icon(&mut self, icon: &ClockIcon, tooltip: &str) -> Result<(), TrayError>;

    /// Show the "Startup" entry checked or unchecked.
    fn set_startup_checked(&mut self, checked: bool);

    /// Remove the icon from the notification area.
    fn hide(&mut self) -> Result<(), TrayError>;
}

/// User actions from the context menu.
#[cfg_attr(not(windows), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ToggleStartup,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Exiting,
    Terminated,
}

pub struct ClockApp<V, S> {
    view: V,
    autostart: AutostartController<S>,
    startup_enabled: bool,
    scheduler: Scheduler,
    guard: Option<InstanceGuard>,
    phase: Phase,
}

// Driven by the Windows tray front-end and the tests below.
#[cfg_attr(not(windows), allow(dead_code))]
impl<V: TrayView, S: RunKeyStore> ClockApp<V, S> {
    /// Read the autostart state, build the view with a first icon and start
    /// the timer.
    ///
    /// `build_view` receives the initial icon, its tooltip and the startup
    /// check state.
    pub fn start<F>(
        autostart: AutostartController<S>,
        guard: InstanceGuard,
        time: ClockTime,
        now: Instant,
        build_view: F,
    ) -> Result<Self, TrayError>
    where
        F: FnOnce(&ClockIcon, &str, bool) -> Result<V, TrayError>,
    {
        let startup_enabled = autostart.is_enabled().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read autostart state, assuming disabled");
            false
        });

        let view = build_view(&clock::render(time), &time.to_string(), startup_enabled)?;
        let scheduler = Scheduler::start(TICK_PERIOD, now);

        info!(startup_enabled, lock = guard.name(), "Clock running");

        Ok(Self {
            view,
            autostart,
            startup_enabled,
            scheduler,
            guard: Some(guard),
            phase: Phase::Running,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Next time the event loop must wake for a redraw.
    pub fn deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Redraw if the timer is due at `now`.
    ///
    /// `read_clock` is only consulted when a fire happens, so the drawn time
    /// is the wall-clock time at fire time.
    pub fn on_timer<C>(&mut self, now: Instant, read_clock: C) -> Result<(), TrayError>
    where
        C: FnOnce() -> ClockTime,
    {
        if self.phase != Phase::Running || !self.scheduler.poll(now) {
            return Ok(());
        }

        let time = read_clock();
        trace!(%time, "Tick");
        self.view.update_icon(&clock::render(time), &time.to_string())
    }

    /// Dispatch a menu action. Ignored unless running.
    pub fn handle(&mut self, action: MenuAction) -> Result<(), TrayError> {
        if self.phase != Phase::Running {
            debug!(?action, phase = ?self.phase, "Ignoring menu action");
            return Ok(());
        }

        debug!(?action, "Menu action");
        match action {
            MenuAction::ToggleStartup => {
                self.toggle_startup();
                Ok(())
            }
            MenuAction::Exit => self.exit(),
        }
    }

    fn toggle_startup(&mut self) {
        let desired = !self.startup_enabled;
        match self.autostart.set_enabled(desired) {
            Ok(()) => self.startup_enabled = desired,
            Err(e) => warn!(error = %e, desired, "Failed to change autostart state"),
        }
        // The native check item flips itself on click; always reassert.
        self.view.set_startup_checked(self.startup_enabled);
    }

    /// Stop the timer, hide the icon and release the instance lock.
    fn exit(&mut self) -> Result<(), TrayError> {
        self.phase = Phase::Exiting;
        info!("Exiting");

        self.scheduler.stop();
        let hidden = self.view.hide();
        if let Some(guard) = self.guard.take() {
            guard.release();
        }

        self.phase = Phase::Terminated;
        hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autostart::memory::MemoryRunKey;
    use crate::autostart::MockRunKeyStore;
    use crate::error::PersistenceError;
    use crate::instance::{self, Acquisition};
    use std::io;
    use std::path::Path;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingView {
        tooltips: Vec<String>,
        last_icon: Option<ClockIcon>,
        checked: bool,
        check_updates: usize,
        visible: bool,
        hide_fails: bool,
    }

    impl TrayView for RecordingView {
        fn update_icon(&mut self, icon: &ClockIcon, tooltip: &str) -> Result<(), TrayError> {
            self.last_icon = Some(icon.clone());
            self.tooltips.push(tooltip.to_string());
            Ok(())
        }

        fn set_startup_checked(&mut self, checked: bool) {
            self.checked = checked;
            self.check_updates += 1;
        }

        fn hide(&mut self) -> Result<(), TrayError> {
            if self.hide_fails {
                return Err(TrayError::Platform("shell refused".to_string()));
            }
            self.visible = false;
            Ok(())
        }
    }

    fn lock(name: &str) -> InstanceGuard {
        match instance::acquire(name).unwrap() {
            Acquisition::Acquired(guard) => guard,
            Acquisition::AlreadyHeld => panic!("{} already held", name),
        }
    }

    fn at(hour: u32, minute: u32) -> ClockTime {
        ClockTime::new(hour, minute).unwrap()
    }

    fn start_with<S: RunKeyStore>(
        store: S,
        lock_name: &str,
        t0: Instant,
    ) -> ClockApp<RecordingView, S> {
        let autostart = AutostartController::new(store, "AnalogClock", Path::new("clock"));
        ClockApp::start(autostart, lock(lock_name), at(9, 41), t0, |icon, tooltip, checked| {
            Ok(RecordingView {
                tooltips: vec![tooltip.to_string()],
                last_icon: Some(icon.clone()),
                checked,
                check_updates: 0,
                visible: true,
                hide_fails: false,
            })
        })
        .unwrap()
    }

    #[test]
    fn test_start_shows_initial_state() {
        let store = MemoryRunKey::default();
        store.set("AnalogClock", "clock").unwrap();
        let t0 = Instant::now();
        let app = start_with(store, "_ANALOG_CLOCK_TEST_APP_START", t0);

        assert_eq!(app.phase(), Phase::Running);
        assert!(app.view.visible);
        assert!(app.view.checked);
        assert_eq!(app.view.tooltips, vec!["09:41".to_string()]);
        assert_eq!(
            app.view.last_icon.as_ref().unwrap().as_raw(),
            clock::render(at(9, 41)).as_raw()
        );
        assert_eq!(app.deadline(), Some(t0 + TICK_PERIOD));
    }

    #[test]
    fn test_start_with_unreadable_autostart_list() {
        let mut store = MockRunKeyStore::new();
        store.expect_contains().returning(|_| {
            Err(PersistenceError::Open {
                path: "Run".to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            })
        });

        let app = start_with(store, "_ANALOG_CLOCK_TEST_APP_UNREADABLE", Instant::now());
        assert!(!app.view.checked);
        assert_eq!(app.phase(), Phase::Running);
    }

    #[test]
    fn test_tick_redraws_with_fire_time() {
        let t0 = Instant::now();
        let mut app = start_with(MemoryRunKey::default(), "_ANALOG_CLOCK_TEST_APP_TICK", t0);

        // Not due yet: the clock is not even read.
        app.on_timer(t0 + Duration::from_millis(500), || panic!("read early"))
            .unwrap();
        assert_eq!(app.view.tooltips.len(), 1);

        app.on_timer(t0 + TICK_PERIOD, || at(9, 42)).unwrap();
        assert_eq!(app.view.tooltips.last().unwrap(), "09:42");
        assert_eq!(
            app.view.last_icon.as_ref().unwrap().as_raw(),
            clock::render(at(9, 42)).as_raw()
        );

        app.on_timer(t0 + TICK_PERIOD * 2, || at(13, 5)).unwrap();
        assert_eq!(app.view.tooltips.last().unwrap(), "13:05");
        assert_eq!(app.view.tooltips.len(), 3);
    }

    #[test]
    fn test_toggle_startup_round_trip() {
        let mut app = start_with(
            MemoryRunKey::default(),
            "_ANALOG_CLOCK_TEST_APP_TOGGLE",
            Instant::now(),
        );
        assert!(!app.view.checked);

        app.handle(MenuAction::ToggleStartup).unwrap();
        assert!(app.view.checked);
        assert!(app.autostart.is_enabled().unwrap());

        app.handle(MenuAction::ToggleStartup).unwrap();
        assert!(!app.view.checked);
        assert!(!app.autostart.is_enabled().unwrap());
    }

    #[test]
    fn test_toggle_failure_keeps_check_state() {
        let mut store = MockRunKeyStore::new();
        store.expect_contains().returning(|_| Ok(false));
        store.expect_set().returning(|name, _| {
            Err(PersistenceError::Write {
                name: name.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            })
        });

        let mut app = start_with(store, "_ANALOG_CLOCK_TEST_APP_TOGGLE_FAIL", Instant::now());
        app.handle(MenuAction::ToggleStartup).unwrap();

        assert!(!app.view.checked);
        assert_eq!(app.view.check_updates, 1);
        assert_eq!(app.phase(), Phase::Running);
    }

    #[test]
    fn test_exit_stops_hides_and_releases() {
        let name = "_ANALOG_CLOCK_TEST_APP_EXIT";
        let t0 = Instant::now();
        let mut app = start_with(MemoryRunKey::default(), name, t0);
        assert!(matches!(
            instance::acquire(name).unwrap(),
            Acquisition::AlreadyHeld
        ));

        app.handle(MenuAction::Exit).unwrap();

        assert_eq!(app.phase(), Phase::Terminated);
        assert!(!app.view.visible);
        assert_eq!(app.deadline(), None);

        // No further redraws or menu handling.
        let updates = app.view.tooltips.len();
        app.on_timer(t0 + TICK_PERIOD * 5, || at(10, 0)).unwrap();
        app.handle(MenuAction::ToggleStartup).unwrap();
        assert_eq!(app.view.tooltips.len(), updates);
        assert_eq!(app.view.check_updates, 0);

        // The lock is free for the next instance.
        lock(name).release();
    }

    #[test]
    fn test_exit_releases_lock_when_hide_fails() {
        let name = "_ANALOG_CLOCK_TEST_APP_EXIT_HIDE_FAIL";
        let mut app = start_with(MemoryRunKey::default(), name, Instant::now());
        app.view.hide_fails = true;

        let result = app.handle(MenuAction::Exit);

        assert!(matches!(result, Err(TrayError::Platform(_))));
        assert_eq!(app.phase(), Phase::Terminated);
        assert_eq!(app.deadline(), None);
        lock(name).release();
    }
}
