//! Windows system tray implementation.

use std::time::Instant;

use anyhow::Result;
use tracing::{error, info, warn};
use tray_icon::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuItem, PredefinedMenuItem},
    TrayIcon, TrayIconBuilder,
};
use winit::application::ApplicationHandler;
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use crate::app::{ClockApp, MenuAction, Phase, TrayView};
use crate::autostart::{AutostartController, RegistryRunKey};
use crate::clock::{ClockIcon, ClockTime};
use crate::config;
use crate::error::TrayError;
use crate::instance::InstanceGuard;

use super::menu::{menu_action, menu_entries, MenuEntry};

enum UserEvent {
    Menu(MenuEvent),
}

/// The notification-area icon with its four-entry context menu.
pub struct TrayPresenter {
    tray_icon: TrayIcon,
    startup_item: CheckMenuItem,
}

impl TrayPresenter {
    fn new(icon: &ClockIcon, tooltip: &str, startup_enabled: bool) -> Result<Self, TrayError> {
        let menu = Menu::new();
        let mut startup_item = None;

        for entry in menu_entries() {
            let appended = match entry {
                MenuEntry::Separator => menu.append(&PredefinedMenuItem::separator()),
                MenuEntry::Item {
                    id,
                    label,
                    enabled,
                    checkable: true,
                } => {
                    let item = CheckMenuItem::with_id(id, label, enabled, startup_enabled, None);
                    let appended = menu.append(&item);
                    startup_item = Some(item);
                    appended
                }
                MenuEntry::Item {
                    id, label, enabled, ..
                } => menu.append(&MenuItem::with_id(id, label, enabled, None)),
            };
            appended.map_err(|e| TrayError::Menu(e.to_string()))?;
        }

        let startup_item =
            startup_item.ok_or_else(|| TrayError::Menu("no startup entry".to_string()))?;

        let tray_icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip(tooltip)
            .with_icon(to_tray_icon(icon)?)
            .build()
            .map_err(|e| TrayError::Platform(e.to_string()))?;

        Ok(Self {
            tray_icon,
            startup_item,
        })
    }
}

impl TrayView for TrayPresenter {
    fn update_icon(&mut self, icon: &ClockIcon, tooltip: &str) -> Result<(), TrayError> {
        self.tray_icon
            .set_icon(Some(to_tray_icon(icon)?))
            .map_err(|e| TrayError::Platform(e.to_string()))?;
        self.tray_icon
            .set_tooltip(Some(tooltip))
            .map_err(|e| TrayError::Platform(e.to_string()))
    }

    fn set_startup_checked(&mut self, checked: bool) {
        self.startup_item.set_checked(checked);
    }

    fn hide(&mut self) -> Result<(), TrayError> {
        // Shell icons outlive a killed process unless removed explicitly.
        self.tray_icon
            .set_visible(false)
            .map_err(|e| TrayError::Platform(e.to_string()))
    }
}

fn to_tray_icon(icon: &ClockIcon) -> Result<tray_icon::Icon, TrayError> {
    tray_icon::Icon::from_rgba(icon.as_raw().to_vec(), icon.width(), icon.height())
        .map_err(|e| TrayError::Icon(e.to_string()))
}

/// Event-loop state: the pieces waiting for the loop to start, then the
/// running app.
struct TrayApp {
    pending: Option<(AutostartController<RegistryRunKey>, InstanceGuard)>,
    app: Option<ClockApp<TrayPresenter, RegistryRunKey>>,
    fatal: Option<TrayError>,
}

impl TrayApp {
    fn new(autostart: AutostartController<RegistryRunKey>, guard: InstanceGuard) -> Self {
        Self {
            pending: Some((autostart, guard)),
            app: None,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: TrayError) {
        error!(error = %e, "Tray failure");
        if let Some(app) = self.app.as_mut() {
            // Still take the icon down and give up the lock.
            if let Err(hide_err) = app.handle(MenuAction::Exit) {
                warn!(error = %hide_err, "Failed to hide tray icon after failure");
            }
        }
        self.fatal = Some(e);
        event_loop.exit();
    }
}

impl ApplicationHandler<UserEvent> for TrayApp {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        // The icon must be created once the loop is actually running.
        if cause != StartCause::Init {
            return;
        }
        let Some((autostart, guard)) = self.pending.take() else {
            return;
        };

        match ClockApp::start(
            autostart,
            guard,
            ClockTime::now(),
            Instant::now(),
            TrayPresenter::new,
        ) {
            Ok(app) => {
                info!("System tray icon created successfully");
                self.app = Some(app);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        _event: WindowEvent,
    ) {
        // We don't have any windows, just the tray icon
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        let UserEvent::Menu(event) = event;
        let action = menu_action(event.id.0.as_str());
        let (Some(action), Some(app)) = (action, self.app.as_mut()) else {
            return;
        };

        if let Err(e) = app.handle(action) {
            if action == MenuAction::Exit {
                // Already terminated; the icon may linger until the shell notices.
                error!(error = %e, "Failed to hide tray icon");
            } else {
                self.fail(event_loop, e);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(app) = self.app.as_mut() else {
            return;
        };

        if let Err(e) = app.on_timer(Instant::now(), ClockTime::now) {
            self.fail(event_loop, e);
            return;
        }

        if app.phase() == Phase::Terminated {
            event_loop.exit();
        } else if let Some(deadline) = app.deadline() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
        }
    }
}

/// Run the tray icon until the user picks "Exit".
pub fn run_tray(guard: InstanceGuard) -> Result<()> {
    let autostart =
        AutostartController::for_current_exe(RegistryRunKey::current_user(), config::PRODUCT_NAME)?;

    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;

    let proxy = event_loop.create_proxy();
    MenuEvent::set_event_handler(Some(move |event| {
        let _ = proxy.send_event(UserEvent::Menu(event));
    }));

    let mut app = TrayApp::new(autostart, guard);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e.into()),
        None => {
            info!("Tray event loop finished");
            Ok(())
        }
    }
}
