//! Screen flow
//!
//! Local variant:     SelectWorkout <-> Tracker
//! Networked variant: Auth -> SelectWorkout <-> Tracker -> History -> SelectWorkout,
//!                    plus Logout from anywhere back to Auth

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Exercises kept in local storage, no accounts
    Local,
    /// Accounts plus saved sessions in the remote record store
    Networked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Auth,
    SelectWorkout,
    Tracker,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavEvent {
    AuthSucceeded,
    Next,
    Back,
    Save,
    Logout,
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "auth"),
            Self::SelectWorkout => write!(f, "select_workout"),
            Self::Tracker => write!(f, "tracker"),
            Self::History => write!(f, "history"),
        }
    }
}

impl std::fmt::Display for NavEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthSucceeded => write!(f, "auth_succeeded"),
            Self::Next => write!(f, "next"),
            Self::Back => write!(f, "back"),
            Self::Save => write!(f, "save"),
            Self::Logout => write!(f, "logout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("Select at least one workout first")]
    NoWorkoutsSelected,

    #[error("Cannot {event} from the {from} screen")]
    InvalidTransition { from: Screen, event: NavEvent },
}

#[derive(Debug, Clone)]
pub struct NavigationController {
    variant: Variant,
    screen: Screen,
}

impl NavigationController {
    pub fn new(variant: Variant) -> Self {
        let screen = match variant {
            Variant::Local => Screen::SelectWorkout,
            Variant::Networked => Screen::Auth,
        };
        Self { variant, screen }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Target screen for `event`, without moving.
    ///
    /// `selected_workouts` gates `Next` out of the selection screen.
    pub fn target(&self, event: NavEvent, selected_workouts: usize) -> Result<Screen, NavigationError> {
        use NavEvent::*;
        use Screen::*;

        let networked = self.variant == Variant::Networked;
        let target = match (self.screen, event) {
            (Auth, AuthSucceeded) if networked => Some(SelectWorkout),
            (SelectWorkout, Next) => {
                if selected_workouts == 0 {
                    return Err(NavigationError::NoWorkoutsSelected);
                }
                Some(Tracker)
            }
            (Tracker, Back) => Some(SelectWorkout),
            (Tracker, Save) if networked => Some(History),
            (History, Back) if networked => Some(SelectWorkout),
            (_, Logout) if networked => Some(Auth),
            _ => None,
        };

        target.ok_or(NavigationError::InvalidTransition {
            from: self.screen,
            event,
        })
    }

    /// Move to the target screen, or stay put and report why not
    pub fn apply(&mut self, event: NavEvent, selected_workouts: usize) -> Result<Screen, NavigationError> {
        let target = self.target(event, selected_workouts)?;
        log::debug!("navigation: {} --{}--> {}", self.screen, event, target);
        self.screen = target;
        Ok(target)
    }
}
