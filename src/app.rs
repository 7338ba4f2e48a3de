//! Main application module.
//!
//! This module contains the main `App` struct that coordinates
//! the event loop, state management, background pricing runs and rendering.

use crate::api::Session;
use crate::config::{Config, data_dir};
use crate::error::{Error, Result};
use crate::events::{EventHandler, Keymap};
use crate::service::TradeService;
use crate::state::{Action, Notification, Store, View};
use crate::store::JsonPreferenceStore;
use crate::ui::Ui;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use rust_decimal::Decimal;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const LISTING_FILE: &str = "listing.txt";

/// The main application.
pub struct App {
    /// Terminal.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application store.
    store: Store,
    /// Event handler.
    event_handler: EventHandler,
    /// Action receiver.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Sender handed to background tasks.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Pricing pipeline.
    service: Arc<TradeService>,
    /// Inventory API credentials; `None` without a token.
    session: Option<Session>,
    /// Cancels the running pricing run.
    fetch_cancel: Option<CancellationToken>,
    /// Message and time of the notification on screen.
    notification_shown: Option<(String, Instant)>,
    /// Configuration.
    config: Config,
}

impl App {
    /// Create a new application.
    pub async fn new(mut config: Config) -> Result<Self> {
        let had_user_id = config.api.user_id.is_some();
        let user_id = config.ensure_user_id();
        if !had_user_id {
            config.save(None)?;
        }

        let session = match config.api.access_token.clone() {
            Some(token) => match Session::new(user_id, token) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(error = %e, "ignoring configured access token");
                    None
                }
            },
            None => None,
        };

        let preferences = Arc::new(JsonPreferenceStore::open_default().await?);
        let service = Arc::new(TradeService::from_config(&config, preferences)?);
        let keymap = Keymap::from_config(&config.keybindings)?;

        // Create action channel
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut store = Store::new(action_tx.clone(), &config);
        store.app.authenticated = session.is_some();

        let event_handler = EventHandler::new(
            action_tx.clone(),
            keymap,
            Duration::from_millis(config.ui.tick_rate_ms),
        );

        // Set up terminal last so a failed start leaves the shell alone
        enable_raw_mode().map_err(|e| Error::terminal(format!("cannot enable raw mode: {e}")))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        if config.ui.mouse_support {
            execute!(stdout, EnableMouseCapture)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            store,
            event_handler,
            action_rx,
            action_tx,
            service,
            session,
            fetch_cancel: None,
            notification_shown: None,
            config,
        })
    }

    /// Run the application event loop.
    pub async fn run(&mut self) -> Result<()> {
        if self.session.is_some() {
            self.store.dispatch(Action::LoadLeagues)?;
        } else {
            self.store.reduce(Action::ShowNotification(Notification::error(
                "No access token. Set POE_ACCESS_TOKEN and restart.",
            )));
        }

        // Main event loop
        loop {
            // Update event handler with current state
            self.event_handler.update_store_snapshot(&self.store);

            // Render UI
            self.terminal.draw(|frame| {
                Ui::render(frame, &self.store, self.event_handler.keymap());
            })?;

            // Handle events and actions
            tokio::select! {
                // Handle terminal events
                result = self.event_handler.next() => {
                    if let Some(action) = result? {
                        self.handle_action(action).await?;
                    }
                }

                // Handle actions from the channel
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action).await?;
                }
            }

            self.expire_notification();

            // Check if we should quit
            if self.store.app.should_quit {
                break;
            }
        }

        if let Some(cancel) = self.fetch_cancel.take() {
            cancel.cancel();
        }
        Ok(())
    }

    /// Handle an action.
    async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::LoadLeagues => self.load_leagues().await?,
            Action::LoadTabs => self.load_tabs().await?,
            Action::SelectLeague(league) => {
                self.store.reduce(Action::SelectLeague(league));
                self.config.trade.league = self.store.stash.league.clone();
                self.save_config();
                self.store.dispatch(Action::LoadTabs)?;
            }
            Action::StartFetch => self.start_fetch(),
            Action::CancelFetch => {
                if let Some(cancel) = self.fetch_cancel.take() {
                    cancel.cancel();
                    self.notify(Notification::info("Cancelling fetch..."));
                }
            }
            action @ (Action::FetchCompleted(_) | Action::FetchFailed(_)) => {
                self.fetch_cancel = None;
                self.store.reduce(action);
            }
            Action::SetRowValue { name, value } => self.set_row_value(name, value).await,
            action @ (Action::SetDisplayName(_) | Action::SetDivinePrice(_)) => {
                self.store.reduce(action);
                self.config.trade.display_name = self.store.listing.display_name.clone();
                self.config.trade.divine_price = self.store.listing.divine_price;
                self.save_config();
            }
            Action::ExportListing => self.export_listing().await,
            _ => {
                // Let the store handle the action
                self.store.reduce(action);
            }
        }

        Ok(())
    }

    async fn load_leagues(&mut self) -> Result<()> {
        let Some(session) = self.session.clone() else {
            self.notify(Notification::error("No access token. Set POE_ACCESS_TOKEN."));
            return Ok(());
        };
        self.store.reduce(Action::LoadLeagues);

        match self.service.leagues(&session).await {
            Ok(leagues) => {
                info!(count = leagues.len(), "leagues loaded");
                self.store.reduce(Action::LeaguesLoaded(leagues));
                if self.store.stash.league.is_some() {
                    self.store.dispatch(Action::LoadTabs)?;
                }
            }
            Err(e) => self.store.reduce(Action::StashLoadFailed(load_error_message(&e))),
        }
        Ok(())
    }

    async fn load_tabs(&mut self) -> Result<()> {
        let (Some(session), Some(league)) = (self.session.clone(), self.store.stash.league.clone())
        else {
            self.notify(Notification::warning("Select a league first (:league <id>)."));
            return Ok(());
        };
        self.store.reduce(Action::LoadTabs);

        match self.service.tabs(&session, &league).await {
            Ok(tabs) => {
                info!(league, count = tabs.len(), "stash tabs loaded");
                self.store.reduce(Action::TabsLoaded(tabs));
            }
            Err(e) => self.store.reduce(Action::StashLoadFailed(load_error_message(&e))),
        }
        Ok(())
    }

    /// Spawn a pricing run for the chosen tabs.
    fn start_fetch(&mut self) {
        if self.store.items.fetch_in_flight {
            self.notify(Notification::warning("A fetch is already running."));
            return;
        }
        let Some(session) = self.session.clone() else {
            self.notify(Notification::error("No access token. Set POE_ACCESS_TOKEN."));
            return;
        };
        let Some(league) = self.store.stash.league.clone() else {
            self.notify(Notification::warning("Select a league first (:league <id>)."));
            return;
        };
        let tabs = self.store.stash.chosen_tabs();
        if tabs.is_empty() {
            self.notify(Notification::warning("Choose at least one tab to fetch."));
            return;
        }

        self.store.reduce(Action::StartFetch);
        self.store.reduce(Action::SetView(View::Items));

        let cancel = CancellationToken::new();
        self.fetch_cancel = Some(cancel.clone());
        let service = Arc::clone(&self.service);
        let tx = self.action_tx.clone();

        info!(league, tabs = tabs.len(), "starting pricing run");
        tokio::spawn(async move {
            let action = match service.price_tabs(&session, &league, &tabs, &cancel).await {
                Ok(run) => Action::FetchCompleted(Box::new(run)),
                Err(e) => {
                    warn!(error = %e, "pricing run failed");
                    Action::FetchFailed(e.to_string())
                }
            };
            if tx.send(action).is_err() {
                warn!("app closed before the pricing run finished");
            }
        });
    }

    /// Apply a price edit and persist it as the user's override.
    async fn set_row_value(&mut self, name: String, value: Option<Decimal>) {
        if let Err(e) = self.store.apply_row_value(&name, value) {
            self.notify(Notification::error(e.to_string()));
            return;
        }
        let (Some(session), Some(league)) = (self.session.as_ref(), self.store.items.league.as_deref())
        else {
            return;
        };

        match self.service.set_override(session, league, &name, value).await {
            Ok(change) if change.is_change() => {
                self.notify(Notification::success(format!("Saved price for {name}")))
            }
            Ok(_) => {}
            Err(e) => self.notify(Notification::error(format!("Could not save price: {e}"))),
        }
    }

    /// Write the generated listing to the data directory.
    async fn export_listing(&mut self) {
        if !matches!(self.store.listing.text, Some(Ok(_))) {
            self.store.reduce(Action::GenerateListing);
        }
        let Some(Ok(text)) = &self.store.listing.text else {
            return;
        };

        let result = async {
            let dir = data_dir()?;
            tokio::fs::create_dir_all(&dir).await?;
            let path = dir.join(LISTING_FILE);
            tokio::fs::write(&path, text).await?;
            Ok::<_, Error>(path)
        }
        .await;

        match result {
            Ok(path) => {
                info!(path = %path.display(), "listing exported");
                self.notify(Notification::success(format!("Listing written to {}", path.display())));
            }
            Err(e) => self.notify(Notification::error(format!("Export failed: {e}"))),
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.store.reduce(Action::ShowNotification(notification));
    }

    /// Dismiss the notification once its duration has passed.
    fn expire_notification(&mut self) {
        let Some(notification) = &self.store.app.notification else {
            self.notification_shown = None;
            return;
        };
        let expired = match &self.notification_shown {
            Some((message, since)) if *message == notification.message => {
                since.elapsed() >= Duration::from_secs(notification.duration_secs)
            }
            _ => {
                self.notification_shown = Some((notification.message.clone(), Instant::now()));
                false
            }
        };
        if expired {
            self.store.reduce(Action::DismissNotification);
            self.notification_shown = None;
        }
    }

    fn save_config(&mut self) {
        if let Err(e) = self.config.save(None) {
            warn!(error = %e, "could not save config");
            self.notify(Notification::warning(format!("Could not save config: {e}")));
        }
    }
}

fn load_error_message(error: &Error) -> String {
    if error.is_recoverable() {
        format!("{error} (press r to retry)")
    } else {
        error.to_string()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
