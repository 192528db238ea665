//! The workout tracker as one object
//!
//! `WorkoutApp` owns the session, the screen state machine, the signed-in
//! identity and the loaded history. Each public method is one user action:
//! it applies the mutation, keeps derived state consistent, and leaves the
//! app unchanged when it fails. Callers read the result through `view()`.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::{AuthError, AuthGateway, AuthState, Identity};
use crate::models::record::sort_newest_first;
use crate::models::{NewWorkoutRecord, ValidationError, WorkoutCategory, WorkoutRecord};
use crate::navigation::{NavEvent, NavigationController, NavigationError, Screen, Variant};
use crate::session::{DraftField, SessionError, SessionState};
use crate::storage::{LocalStore, RecordStore, StorageError};
use crate::view::{self, AppView, DraftView, UserView};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error(transparent)]
  Session(#[from] SessionError),

  #[error(transparent)]
  Navigation(#[from] NavigationError),

  #[error(transparent)]
  Auth(#[from] AuthError),

  #[error(transparent)]
  Storage(#[from] StorageError),

  #[error("{0} needs an account; this tracker is running in local mode")]
  LocalOnly(&'static str),
}

/// Account and history collaborators of the networked variant
#[derive(Clone)]
pub struct RemoteServices {
  pub auth: Arc<dyn AuthGateway>,
  pub records: Arc<dyn RecordStore>,
}

pub struct WorkoutApp {
  nav: NavigationController,
  session: SessionState,
  auth_state: AuthState,
  history: Vec<WorkoutRecord>,
  local: Arc<dyn LocalStore>,
  remote: Option<RemoteServices>,
}

impl WorkoutApp {
  /// Local variant: restore the exercise list saved on this machine
  pub async fn local(local: Arc<dyn LocalStore>) -> Self {
    let exercises = local.load_local().await;
    log::info!("Local tracker ready with {} saved exercises", exercises.len());

    Self {
      nav: NavigationController::new(Variant::Local),
      session: SessionState::with_exercises(exercises),
      auth_state: AuthState::Unauthenticated,
      history: Vec::new(),
      local,
      remote: None,
    }
  }

  /// Networked variant: start at the auth screen unless a sign-in was remembered
  pub async fn networked(local: Arc<dyn LocalStore>, remote: RemoteServices) -> Self {
    let mut app = Self {
      nav: NavigationController::new(Variant::Networked),
      session: SessionState::new(),
      auth_state: AuthState::Unauthenticated,
      history: Vec::new(),
      local,
      remote: Some(remote),
    };

    if let Some(identity) = app.local.load_identity().await {
      log::info!("Restoring sign-in for {}", identity.email);
      app.auth_state = AuthState::Authenticated(identity);
      if let Err(e) = app.nav.apply(NavEvent::AuthSucceeded, 0) {
        log::error!("Could not restore signed-in screen: {}", e);
      }
      if let Err(e) = app.refresh_history().await {
        log::warn!("Could not load workout history: {}", e);
      }
    }

    app
  }

  pub fn screen(&self) -> Screen {
    self.nav.screen()
  }

  pub fn session(&self) -> &SessionState {
    &self.session
  }

  pub fn auth_state(&self) -> &AuthState {
    &self.auth_state
  }

  pub fn history(&self) -> &[WorkoutRecord] {
    &self.history
  }

  fn remote(&self, action: &'static str) -> Result<&RemoteServices, AppError> {
    self.remote.as_ref().ok_or(AppError::LocalOnly(action))
  }

  // ---------------------------------------------------------------------------
  // Session edits
  // ---------------------------------------------------------------------------

  pub fn toggle_workout(&mut self, category: WorkoutCategory) {
    self.session.toggle_workout(category);
  }

  pub fn update_draft(&mut self, field: DraftField) {
    self.session.update_draft_field(field);
  }

  pub async fn commit_draft(&mut self) -> Result<(), AppError> {
    let entry = self.session.commit_draft()?;
    log::debug!("Added exercise {} ({}x{})", entry.name(), entry.sets(), entry.reps());
    self.flush_local().await;
    Ok(())
  }

  pub async fn delete_exercise(&mut self, index: usize) -> Result<(), AppError> {
    let removed = self.session.delete_exercise(index)?;
    log::debug!("Deleted exercise {}", removed.name());
    self.flush_local().await;
    Ok(())
  }

  /// Local variant only: mirror the exercise list to disk, logging failures
  async fn flush_local(&self) {
    if self.nav.variant() != Variant::Local {
      return;
    }
    if let Err(e) = self.local.save_local(self.session.exercises()).await {
      log::warn!("Could not save exercises locally: {}", e);
    }
  }

  // ---------------------------------------------------------------------------
  // Navigation
  // ---------------------------------------------------------------------------

  pub fn next(&mut self) -> Result<Screen, AppError> {
    Ok(self.nav.apply(NavEvent::Next, self.session.selected_count())?)
  }

  pub fn back(&mut self) -> Result<Screen, AppError> {
    Ok(self.nav.apply(NavEvent::Back, self.session.selected_count())?)
  }

  /// Store the session as a new record, then clear it and show the history
  pub async fn save_session(&mut self) -> Result<Screen, AppError> {
    let remote = self.remote("Saving a workout")?.clone();
    self.nav.target(NavEvent::Save, self.session.selected_count())?;

    let identity = self
      .current_identity()
      .await
      .map_err(|e| match e {
        AppError::Auth(AuthError::NotAuthenticated) => AppError::Storage(StorageError::MissingOwner),
        other => other,
      })?;

    let record = NewWorkoutRecord {
      owner_id: identity.uid.clone(),
      date: Utc::now(),
      workouts: self.session.selected_workouts(),
      exercises: self.session.exercises().to_vec(),
    };
    let id = remote.records.append_record(&identity, &record).await?;
    log::info!("Saved workout {} with {} exercises", id, record.exercises.len());

    self.session.clear();
    let screen = self.nav.apply(NavEvent::Save, 0)?;

    if let Err(e) = self.refresh_history().await {
      log::warn!("Could not reload history after save: {}", e);
      self.history.push(record.into_record(id));
      sort_newest_first(&mut self.history);
    }
    Ok(screen)
  }

  // ---------------------------------------------------------------------------
  // Accounts
  // ---------------------------------------------------------------------------

  pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<Screen, AppError> {
    let auth = self.remote("Creating an account")?.auth.clone();
    self.nav.target(NavEvent::AuthSucceeded, 0)?;
    let identity = auth.sign_up(email.trim(), password).await?;
    self.complete_sign_in(identity).await
  }

  pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Screen, AppError> {
    let auth = self.remote("Signing in")?.auth.clone();
    self.nav.target(NavEvent::AuthSucceeded, 0)?;
    let identity = auth.sign_in(email.trim(), password).await?;
    self.complete_sign_in(identity).await
  }

  async fn complete_sign_in(&mut self, identity: Identity) -> Result<Screen, AppError> {
    log::info!("Signed in as {}", identity.email);
    if let Err(e) = self.local.save_identity(&identity).await {
      log::warn!("Could not remember sign-in: {}", e);
    }
    self.auth_state = AuthState::Authenticated(identity);
    let screen = self.nav.apply(NavEvent::AuthSucceeded, 0)?;

    if let Err(e) = self.refresh_history().await {
      log::warn!("Could not load workout history: {}", e);
    }
    Ok(screen)
  }

  /// Back to the auth screen with selection, exercises and history cleared
  pub async fn logout(&mut self) -> Result<Screen, AppError> {
    let auth = self.remote("Signing out")?.auth.clone();
    let screen = self.nav.apply(NavEvent::Logout, self.session.selected_count())?;

    auth.sign_out().await;
    self.forget_identity().await;
    self.session.clear();
    log::info!("Signed out");
    Ok(screen)
  }

  /// Drop the sign-in and its history; the session is left alone
  async fn forget_identity(&mut self) {
    if let Err(e) = self.local.clear_identity().await {
      log::warn!("Could not clear remembered sign-in: {}", e);
    }
    self.auth_state = AuthState::Unauthenticated;
    self.history.clear();
  }

  /// The signed-in identity, refreshing its token when close to expiry.
  ///
  /// A refresh the provider refuses ends the sign-in but keeps unsaved work;
  /// any other refresh failure leaves everything as it was.
  async fn current_identity(&mut self) -> Result<Identity, AppError> {
    let identity = self
      .auth_state
      .identity()
      .cloned()
      .ok_or(AuthError::NotAuthenticated)?;
    if !identity.needs_refresh() {
      return Ok(identity);
    }

    let auth = self.remote("Refreshing the sign-in")?.auth.clone();
    match auth.refresh(&identity).await {
      Ok(fresh) => {
        if let Err(e) = self.local.save_identity(&fresh).await {
          log::warn!("Could not remember refreshed sign-in: {}", e);
        }
        self.auth_state = AuthState::Authenticated(fresh.clone());
        Ok(fresh)
      }
      Err(AuthError::Provider(reason)) => {
        log::warn!("Sign-in expired ({}), signing out", reason);
        if let Err(e) = self.nav.apply(NavEvent::Logout, 0) {
          log::error!("Could not return to the auth screen: {}", e);
        }
        self.forget_identity().await;
        Err(AuthError::Provider(reason).into())
      }
      Err(e) => Err(e.into()),
    }
  }

  // ---------------------------------------------------------------------------
  // History
  // ---------------------------------------------------------------------------

  /// Reload the signed-in user's records, newest first
  pub async fn refresh_history(&mut self) -> Result<(), AppError> {
    let records = self.remote("Workout history")?.records.clone();
    let identity = self.current_identity().await?;

    let mut history = records.query_records_by_owner(&identity, &identity.uid).await?;
    sort_newest_first(&mut history);
    self.history = history;
    Ok(())
  }

  // ---------------------------------------------------------------------------
  // View
  // ---------------------------------------------------------------------------

  pub fn view(&self) -> AppView {
    let draft = self.session.draft();

    AppView {
      variant: self.nav.variant(),
      screen: self.nav.screen(),
      user: self.auth_state.identity().map(|i| UserView {
        uid: i.uid.clone(),
        email: i.email.clone(),
      }),
      categories: view::category_options(|c| self.session.is_selected(c)),
      can_advance: self.nav.target(NavEvent::Next, self.session.selected_count()).is_ok(),
      draft: DraftView {
        name: draft.name.clone(),
        sets: draft.sets,
        reps: draft.reps,
        weights: draft.weights.clone(),
        weights_text: draft.weights_text.clone().unwrap_or_default(),
      },
      exercises: self
        .session
        .exercises()
        .iter()
        .enumerate()
        .map(|(i, e)| view::exercise_card(i, e))
        .collect(),
      history: self.history.iter().map(view::history_item).collect(),
    }
  }
}
