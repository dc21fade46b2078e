//! Presenter-side control of the live presentation state.

use slidecast_streamer::{Hub, Stage, State};
use tokio::sync::RwLock;
use tracing::info;

/// Owns the current [`State`] and publishes every change through the hub.
///
/// New viewers receive [`PresentationController::snapshot`] as their first
/// frame.
pub struct PresentationController {
    hub: Hub,
    current: RwLock<State>,
}

impl PresentationController {
    pub fn new(hub: Hub) -> Self {
        Self {
            hub,
            current: RwLock::new(State::default()),
        }
    }

    pub async fn snapshot(&self) -> State {
        self.current.read().await.clone()
    }

    /// Switch to another presentation (or restart this one) at `slide`.
    pub async fn set_state(&self, presentation_id: u32, slide: u32) -> State {
        self.update(|state| {
            *state = State {
                presentation_id,
                stage: Stage::Paused.into(),
                slide,
                info: String::new(),
            };
        })
        .await
    }

    pub async fn next_slide(&self) -> State {
        self.update(|state| state.slide = state.slide.saturating_add(1))
            .await
    }

    pub async fn set_stage(&self, stage: Stage) -> State {
        self.update(|state| state.set_stage(stage)).await
    }

    /// Apply `change` and publish the result while still holding the lock,
    /// so publications follow snapshot order.
    async fn update(&self, change: impl FnOnce(&mut State)) -> State {
        let mut current = self.current.write().await;
        change(&mut current);
        let state = current.clone();
        info!(
            presentation_id = state.presentation_id,
            stage = %state.stage(),
            slide = state.slide,
            "presentation state changed"
        );
        self.hub.publish_state(state.clone());
        state
    }
}
