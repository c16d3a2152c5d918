//! Studio interaction flow.
//!
//! [`StudioController`] ties an [`ImageGenerator`] to a [`CredentialGateway`]:
//!
//! ```text
//! Idle --submit--> Generating --ok--> Success
//!                      |--credential problem--> AwaitingCredential --selected--> Idle
//!                      `--other failure--> Failed(message)
//! ```
//!
//! `Generating` and `AwaitingCredential` ignore submits. The prompt closes
//! only through a successful [`StudioController::select_credential`].

use crate::credential::{CredentialGateway, CredentialState};
use crate::error::StudioError;
use crate::image::{
    GeneratedImage, GenerationRequest, ImageGenerator, ImageResolution, DEFAULT_PROMPT,
};
use tokio::sync::Mutex;

/// Prefix of every user-visible failure message.
pub const FAILURE_PREFIX: &str = "Failed to generate logo. Please try again. ";

/// Where the studio currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StudioState {
    /// Ready for a submit.
    #[default]
    Idle,
    /// A generation is in flight.
    Generating,
    /// The last generation produced an image.
    Success,
    /// The last generation failed with this message.
    Failed(String),
    /// The key selection prompt is open.
    AwaitingCredential,
}

impl StudioState {
    /// Returns true while a request is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Generating)
    }
}

/// Result of a call to [`StudioController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A generation was in flight or the key prompt was open; nothing was sent.
    Ignored,
    /// The submit ran to completion and left the studio in this state.
    Completed(StudioState),
}

#[derive(Debug, Default)]
struct Inner {
    state: StudioState,
    credential: CredentialState,
    prompt: String,
    resolution: ImageResolution,
    image: Option<GeneratedImage>,
}

/// Page-level flow for generating logos.
pub struct StudioController<G> {
    generator: G,
    gateway: CredentialGateway,
    inner: Mutex<Inner>,
}

impl<G: ImageGenerator> StudioController<G> {
    /// Creates a controller with the default prompt and resolution.
    pub fn new(generator: G, gateway: CredentialGateway) -> Self {
        Self {
            generator,
            gateway,
            inner: Mutex::new(Inner {
                prompt: DEFAULT_PROMPT.to_string(),
                ..Inner::default()
            }),
        }
    }

    /// Records whether the host already has a key selected.
    pub async fn initialize(&self) -> CredentialState {
        let has_key = self.gateway.has_credential().await;
        let mut inner = self.inner.lock().await;
        inner.credential.has_key = has_key;
        tracing::info!(has_key, "studio initialized");
        inner.credential
    }

    /// Returns the generator driving this controller.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Returns the credential gateway.
    pub fn gateway(&self) -> &CredentialGateway {
        &self.gateway
    }

    /// Replaces the draft prompt.
    pub async fn set_prompt(&self, prompt: impl Into<String>) {
        self.inner.lock().await.prompt = prompt.into();
    }

    /// Returns the draft prompt.
    pub async fn prompt(&self) -> String {
        self.inner.lock().await.prompt.clone()
    }

    /// Selects the resolution tier for the next submit.
    pub async fn set_resolution(&self, resolution: ImageResolution) {
        self.inner.lock().await.resolution = resolution;
    }

    /// Returns the selected resolution tier.
    pub async fn resolution(&self) -> ImageResolution {
        self.inner.lock().await.resolution
    }

    /// Returns the current state.
    pub async fn state(&self) -> StudioState {
        self.inner.lock().await.state.clone()
    }

    /// Returns the credential status.
    pub async fn credential_state(&self) -> CredentialState {
        self.inner.lock().await.credential
    }

    /// Returns the most recent image, if any.
    pub async fn current_image(&self) -> Option<GeneratedImage> {
        self.inner.lock().await.image.clone()
    }

    /// Returns the inline error message when the last submit failed.
    pub async fn error_message(&self) -> Option<String> {
        match &self.inner.lock().await.state {
            StudioState::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Returns true while a generation is in flight.
    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.state.is_loading()
    }

    /// Returns true while the key selection prompt should be shown.
    pub async fn is_key_prompt_visible(&self) -> bool {
        self.inner.lock().await.state == StudioState::AwaitingCredential
    }

    /// Opens the key selection prompt.
    pub async fn require_credential(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = StudioState::AwaitingCredential;
        inner.credential.awaiting_selection = true;
    }

    /// Generates a logo from the draft prompt and resolution.
    ///
    /// Returns [`SubmitOutcome::Ignored`] while another generation is in
    /// flight or the key prompt is open. Failures never escape; they are
    /// reflected in the state.
    pub async fn submit(&self) -> SubmitOutcome {
        let request = {
            let mut inner = self.inner.lock().await;
            if inner.state.is_loading() {
                tracing::debug!("submit ignored while generating");
                return SubmitOutcome::Ignored;
            }
            if inner.state == StudioState::AwaitingCredential {
                tracing::debug!("submit ignored while key prompt is open");
                return SubmitOutcome::Ignored;
            }
            match GenerationRequest::new(inner.prompt.clone(), inner.resolution) {
                Ok(request) => {
                    inner.state = StudioState::Generating;
                    request
                }
                Err(e) => {
                    inner.state = StudioState::Failed(failure_message(&e));
                    return SubmitOutcome::Completed(inner.state.clone());
                }
            }
        };

        tracing::info!(resolution = %request.resolution(), "generating logo");
        let result = self.generator.generate(&request).await;

        let mut inner = self.inner.lock().await;
        let state = match result {
            Ok(data_uri) => {
                inner.image = Some(GeneratedImage::new(data_uri, &request));
                StudioState::Success
            }
            Err(e) if e.needs_credential() => {
                tracing::info!(error = %e, "API key required");
                StudioState::AwaitingCredential
            }
            Err(e) => StudioState::Failed(failure_message(&e)),
        };
        inner.credential.awaiting_selection = state == StudioState::AwaitingCredential;
        inner.state = state;
        SubmitOutcome::Completed(inner.state.clone())
    }

    /// Runs the host's key selection flow.
    ///
    /// On success the prompt closes and the studio returns to `Idle`. On
    /// failure the state is left as it was.
    pub async fn select_credential(&self) -> bool {
        let selected = self.gateway.request_credential_selection().await;
        let mut inner = self.inner.lock().await;
        if selected {
            inner.credential.has_key = true;
            inner.credential.awaiting_selection = false;
            if inner.state == StudioState::AwaitingCredential {
                inner.state = StudioState::Idle;
            }
        }
        tracing::info!(selected, "key selection finished");
        selected
    }
}

fn failure_message(err: &StudioError) -> String {
    format!("{FAILURE_PREFIX}{}", err.detail())
}

impl<G> std::fmt::Debug for StudioController<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioController")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}
