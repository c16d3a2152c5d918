use async_trait::async_trait;
use logo_studio::{
    CredentialGateway, CredentialHost, GenerationRequest, ImageGenerator, ImageResolution,
    Result, StudioController, StudioError, StudioState, SubmitOutcome, DEFAULT_PROMPT,
    FAILURE_PREFIX,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

enum Reply {
    Image(&'static str),
    CredentialMissing,
    Failed(&'static str),
    NoImage,
}

/// Generator double replaying scripted replies.
#[derive(Default)]
struct ScriptedGenerator {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedGenerator {
    fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Image(data)) => Ok(format!("data:image/png;base64,{data}")),
            Some(Reply::CredentialMissing) => Err(StudioError::CredentialMissing(
                "API Key not found. Please select a key.".into(),
            )),
            Some(Reply::Failed(detail)) => Err(StudioError::GenerationFailed(detail.into())),
            Some(Reply::NoImage) | None => Err(StudioError::NoImageReturned),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Host double with a fixed selection outcome.
struct FakeHost {
    selected: AtomicBool,
    selection_succeeds: bool,
    selections: AtomicUsize,
}

impl FakeHost {
    fn new(selected: bool, selection_succeeds: bool) -> Arc<Self> {
        Arc::new(Self {
            selected: AtomicBool::new(selected),
            selection_succeeds,
            selections: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CredentialHost for FakeHost {
    async fn has_selected_api_key(&self) -> bool {
        self.selected.load(Ordering::SeqCst)
    }

    async fn open_select_key(&self) -> bool {
        self.selections.fetch_add(1, Ordering::SeqCst);
        if self.selection_succeeds {
            self.selected.store(true, Ordering::SeqCst);
        }
        self.selection_succeeds
    }
}

fn studio(
    generator: ScriptedGenerator,
    host: Arc<FakeHost>,
) -> StudioController<Arc<ScriptedGenerator>> {
    StudioController::new(Arc::new(generator), CredentialGateway::new(host))
}

#[tokio::test]
async fn starts_idle_with_default_draft() {
    let studio = studio(ScriptedGenerator::default(), FakeHost::new(true, true));

    assert_eq!(studio.state().await, StudioState::Idle);
    assert_eq!(studio.prompt().await, DEFAULT_PROMPT);
    assert_eq!(studio.resolution().await, ImageResolution::Low);
    assert!(studio.current_image().await.is_none());
    assert!(!studio.credential_state().await.has_key);

    let credential = studio.initialize().await;
    assert!(credential.has_key);
    assert!(!credential.awaiting_selection);
}

#[tokio::test]
async fn successful_submit_stores_image() {
    let studio = studio(
        ScriptedGenerator::new([Reply::Image("AAAA")]),
        FakeHost::new(true, true),
    );
    studio.set_prompt("P").await;
    studio.set_resolution(ImageResolution::Medium).await;

    let outcome = studio.submit().await;

    assert_eq!(outcome, SubmitOutcome::Completed(StudioState::Success));
    let image = studio.current_image().await.unwrap();
    assert_eq!(image.data_uri, "data:image/png;base64,AAAA");
    assert_eq!(image.prompt, "P");
    assert_eq!(image.resolution, ImageResolution::Medium);
    assert!(studio.error_message().await.is_none());

    let requests = studio.generator().requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].prompt(), "P");
    assert_eq!(requests[0].resolution(), ImageResolution::Medium);
}

#[tokio::test]
async fn new_image_replaces_previous() {
    let studio = studio(
        ScriptedGenerator::new([Reply::Image("AAAA"), Reply::Image("BBBB")]),
        FakeHost::new(true, true),
    );

    studio.submit().await;
    studio.set_prompt("second").await;
    studio.submit().await;

    let image = studio.current_image().await.unwrap();
    assert_eq!(image.data_uri, "data:image/png;base64,BBBB");
    assert_eq!(image.prompt, "second");
}

#[tokio::test]
async fn submit_while_generating_is_ignored() {
    let gate = Arc::new(Semaphore::new(0));
    let studio = Arc::new(studio(
        ScriptedGenerator::new([Reply::Image("AAAA")]).gated(gate.clone()),
        FakeHost::new(true, true),
    ));

    let first = tokio::spawn({
        let studio = studio.clone();
        async move { studio.submit().await }
    });

    tokio::time::timeout(Duration::from_secs(5), async {
        while !studio.is_loading().await {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("first submit never started");

    assert_eq!(studio.submit().await, SubmitOutcome::Ignored);
    assert_eq!(studio.state().await, StudioState::Generating);
    assert_eq!(studio.generator().calls(), 1);

    gate.add_permits(1);
    let outcome = first.await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Completed(StudioState::Success));
    assert_eq!(studio.generator().calls(), 1);
}

#[tokio::test]
async fn credential_missing_opens_key_prompt() {
    let host = FakeHost::new(false, true);
    let studio = studio(ScriptedGenerator::new([Reply::CredentialMissing]), host);
    studio.initialize().await;

    let outcome = studio.submit().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Completed(StudioState::AwaitingCredential)
    );
    assert!(studio.is_key_prompt_visible().await);
    assert!(studio.credential_state().await.awaiting_selection);
    assert!(studio.error_message().await.is_none());
}

#[tokio::test]
async fn auth_markers_in_detail_route_to_key_prompt() {
    for detail in ["403 - PERMISSION_DENIED", "Requested entity was not found. API Key"] {
        let studio = studio(
            ScriptedGenerator::new([Reply::Failed(detail)]),
            FakeHost::new(true, true),
        );
        studio.submit().await;
        assert_eq!(studio.state().await, StudioState::AwaitingCredential, "{detail}");
    }
}

#[tokio::test]
async fn other_failures_show_prefixed_message() {
    let studio = studio(
        ScriptedGenerator::new([Reply::Image("AAAA"), Reply::Failed("500 - overloaded")]),
        FakeHost::new(true, true),
    );
    studio.submit().await;

    let outcome = studio.submit().await;

    let expected = format!("{FAILURE_PREFIX}500 - overloaded");
    assert_eq!(
        outcome,
        SubmitOutcome::Completed(StudioState::Failed(expected.clone()))
    );
    assert_eq!(studio.error_message().await, Some(expected));
    // prior result stays displayed
    assert_eq!(
        studio.current_image().await.unwrap().data_uri,
        "data:image/png;base64,AAAA"
    );
}

#[tokio::test]
async fn no_image_is_retryable_failure() {
    let studio = studio(
        ScriptedGenerator::new([Reply::NoImage, Reply::Image("AAAA")]),
        FakeHost::new(true, true),
    );

    studio.submit().await;
    assert_eq!(
        studio.state().await,
        StudioState::Failed(format!(
            "{FAILURE_PREFIX}No image data received from the model."
        ))
    );

    assert_eq!(
        studio.submit().await,
        SubmitOutcome::Completed(StudioState::Success)
    );
}

#[tokio::test]
async fn empty_prompt_fails_without_request() {
    let studio = studio(ScriptedGenerator::default(), FakeHost::new(true, true));
    studio.set_prompt("   ").await;

    let outcome = studio.submit().await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Completed(StudioState::Failed(ref message))
            if message.starts_with(FAILURE_PREFIX)
    ));
    assert_eq!(studio.generator().calls(), 0);
}

#[tokio::test]
async fn successful_selection_returns_to_idle() {
    let host = FakeHost::new(false, true);
    let studio = studio(
        ScriptedGenerator::new([Reply::CredentialMissing, Reply::Image("AAAA")]),
        host.clone(),
    );
    studio.submit().await;

    assert!(studio.select_credential().await);

    assert_eq!(studio.state().await, StudioState::Idle);
    let credential = studio.credential_state().await;
    assert!(credential.has_key);
    assert!(!credential.awaiting_selection);
    assert_eq!(host.selections.load(Ordering::SeqCst), 1);

    assert_eq!(
        studio.submit().await,
        SubmitOutcome::Completed(StudioState::Success)
    );
}

#[tokio::test]
async fn cancelled_selection_keeps_prompt_open() {
    let host = FakeHost::new(false, false);
    let studio = studio(ScriptedGenerator::new([Reply::CredentialMissing]), host);
    studio.submit().await;

    assert!(!studio.select_credential().await);

    assert_eq!(studio.state().await, StudioState::AwaitingCredential);
    assert!(studio.is_key_prompt_visible().await);
    assert!(!studio.credential_state().await.has_key);
    assert!(!studio.gateway().has_credential().await);
}

#[tokio::test]
async fn missing_host_never_selects() {
    let studio = StudioController::new(
        ScriptedGenerator::new([Reply::CredentialMissing]),
        CredentialGateway::unavailable(),
    );
    assert!(!studio.initialize().await.has_key);

    studio.submit().await;
    assert!(!studio.select_credential().await);
    assert_eq!(studio.state().await, StudioState::AwaitingCredential);
}

#[tokio::test]
async fn require_credential_opens_prompt_from_any_state() {
    let studio = studio(
        ScriptedGenerator::new([Reply::Image("AAAA")]),
        FakeHost::new(true, true),
    );
    studio.submit().await;

    studio.require_credential().await;
    assert!(studio.is_key_prompt_visible().await);

    assert!(studio.select_credential().await);
    assert_eq!(studio.state().await, StudioState::Idle);
    assert!(studio.current_image().await.is_some());
}

#[tokio::test]
async fn submit_while_awaiting_credential_is_ignored() {
    let studio = studio(
        ScriptedGenerator::new([Reply::CredentialMissing, Reply::Failed("500 - boom")]),
        FakeHost::new(false, false),
    );
    studio.submit().await;
    assert_eq!(studio.state().await, StudioState::AwaitingCredential);

    assert_eq!(studio.submit().await, SubmitOutcome::Ignored);

    assert_eq!(studio.generator().calls(), 1);
    assert!(studio.is_key_prompt_visible().await);
    let credential = studio.credential_state().await;
    assert!(!credential.has_key);
    assert!(credential.awaiting_selection);
}

#[tokio::test]
async fn completion_after_require_credential_closes_prompt_flag() {
    let gate = Arc::new(Semaphore::new(0));
    let studio = Arc::new(studio(
        ScriptedGenerator::new([Reply::Image("AAAA")]).gated(gate.clone()),
        FakeHost::new(true, true),
    ));

    let first = tokio::spawn({
        let studio = studio.clone();
        async move { studio.submit().await }
    });
    tokio::time::timeout(Duration::from_secs(5), async {
        while !studio.is_loading().await {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("submit never started");

    studio.require_credential().await;
    gate.add_permits(1);

    assert_eq!(
        first.await.unwrap(),
        SubmitOutcome::Completed(StudioState::Success)
    );
    assert!(!studio.credential_state().await.awaiting_selection);
    assert!(!studio.is_key_prompt_visible().await);
}
