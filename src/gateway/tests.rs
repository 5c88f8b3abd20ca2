use super::*;
use async_trait::async_trait;
use ayesha_core::{
    context::Context,
    error::AyeshaError,
    message::{Completion, MessageMetadata},
    persona::{ExtractionPolicy, FactSchema},
};
use ayesha_memory::{MemoryBacking, CONCISE_SUFFIX, DETAILED_SUFFIX};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const GUILD: u64 = 1;
const BOUND: u64 = 10;
const OTHER: u64 = 11;
const USER: u64 = 42;

// --- mocks ---

struct MockProvider {
    reply: Result<String, String>,
    calls: Mutex<Vec<Context>>,
}

impl MockProvider {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(err: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(err.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Context> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, context: &Context) -> Result<Completion, AyeshaError> {
        self.calls.lock().unwrap().push(context.clone());
        match &self.reply {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                metadata: MessageMetadata {
                    provider_used: "mock".into(),
                    ..Default::default()
                },
            }),
            Err(e) => Err(AyeshaError::Provider(e.clone())),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }
}

struct MockImages {
    result: Result<Vec<PathBuf>, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockImages {
    fn returning(paths: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(paths.iter().map(PathBuf::from).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(err: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(err.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for MockImages {
    fn name(&self) -> &str {
        "mock-images"
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<PathBuf>, AyeshaError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.result.clone().map_err(AyeshaError::Provider)
    }
}

#[derive(Default)]
struct MockChannel {
    sent: Mutex<Vec<OutgoingMessage>>,
    files: Mutex<Vec<(u64, PathBuf)>>,
    presence: Mutex<Vec<String>>,
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, AyeshaError> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), AyeshaError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn send_file(&self, channel_id: u64, path: &Path) -> Result<(), AyeshaError> {
        self.files
            .lock()
            .unwrap()
            .push((channel_id, path.to_path_buf()));
        Ok(())
    }

    async fn set_presence(&self, status: &str) -> Result<(), AyeshaError> {
        self.presence.lock().unwrap().push(status.to_string());
        Ok(())
    }

    async fn stop(&self) -> Result<(), AyeshaError> {
        Ok(())
    }
}

// --- helpers ---

struct Harness {
    gateway: Gateway,
    provider: Arc<MockProvider>,
    channel: Arc<MockChannel>,
    backing: Arc<MemoryBacking>,
}

fn harness_with(
    provider: Arc<MockProvider>,
    images: Option<Arc<MockImages>>,
    facts: FactsConfig,
    persona: PersonaDescriptor,
) -> Harness {
    let backing = Arc::new(MemoryBacking::new());
    let memory = Store::open(backing.clone());
    let channel = Arc::new(MockChannel::default());
    let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
    channels.insert("mock".to_string(), channel.clone());
    let gateway = Gateway::new(
        provider.clone(),
        images.map(|i| i as Arc<dyn ImageGenerator>),
        channels,
        memory,
        persona,
        facts,
        ImageConfig::default(),
    );
    Harness {
        gateway,
        provider,
        channel,
        backing,
    }
}

fn harness(provider: Arc<MockProvider>) -> Harness {
    harness_with(
        provider,
        None,
        FactsConfig::default(),
        PersonaDescriptor::default(),
    )
}

fn msg(channel_id: u64, text: &str) -> IncomingMessage {
    IncomingMessage::new("mock", Some(GUILD), channel_id, USER, text)
}

fn admin_msg(channel_id: u64, text: &str) -> IncomingMessage {
    let mut m = msg(channel_id, text);
    m.is_admin = true;
    m
}

impl Harness {
    fn bind(&self) {
        self.gateway
            .memory
            .set_allowed_channel(GUILD, BOUND)
            .unwrap();
    }
}

// --- channel gate ---

#[tokio::test]
async fn test_unbound_guild_produces_nothing() {
    let h = harness(MockProvider::ok("hi"));
    let actions = h.gateway.handle_message(&msg(BOUND, "hello there")).await;
    assert!(actions.is_empty());
    assert!(h.provider.calls().is_empty());
}

#[tokio::test]
async fn test_other_channel_produces_nothing_and_learns_nothing() {
    let h = harness(MockProvider::ok("hi"));
    h.bind();
    let actions = h.gateway.handle_message(&msg(OTHER, "I like tea")).await;
    assert!(actions.is_empty());
    assert!(h.provider.calls().is_empty());
    assert!(h.gateway.memory.facts(USER).is_none());
}

#[tokio::test]
async fn test_direct_message_is_unbound() {
    let h = harness(MockProvider::ok("hi"));
    h.bind();
    let dm = IncomingMessage::new("mock", None, BOUND, USER, "hello");
    assert!(h.gateway.handle_message(&dm).await.is_empty());
}

#[tokio::test]
async fn test_self_messages_ignored() {
    let h = harness(MockProvider::ok("hi"));
    h.bind();
    let mut m = admin_msg(BOUND, "!setchannel <#99>");
    m.author_is_self = true;
    assert!(h.gateway.handle_message(&m).await.is_empty());
    assert_eq!(h.gateway.memory.allowed_channel(GUILD), Some(BOUND));
}

// --- setchannel ---

#[tokio::test]
async fn test_setchannel_from_any_channel_binds() {
    let h = harness(MockProvider::ok("hi"));
    let actions = h
        .gateway
        .handle_message(&admin_msg(OTHER, "!setchannel <#10>"))
        .await;
    assert_eq!(
        actions,
        vec![OutboundAction::send("Ayesha will now reply only in <#10>")]
    );
    assert!(h.gateway.memory.is_allowed(Some(GUILD), BOUND));
    assert!(h.provider.calls().is_empty());
    assert!(h.backing.document("allowed_channels").is_some());
}

#[tokio::test]
async fn test_setchannel_twice_is_idempotent() {
    let h = harness(MockProvider::ok("hi"));
    let m = admin_msg(OTHER, "!setchannel <#10>");
    let first = h.gateway.handle_message(&m).await;
    let doc = h.backing.document("allowed_channels");
    let second = h.gateway.handle_message(&m).await;
    assert_eq!(first, second);
    assert_eq!(h.backing.document("allowed_channels"), doc);
}

#[tokio::test]
async fn test_setchannel_last_write_wins() {
    let h = harness(MockProvider::ok("hi"));
    h.gateway
        .handle_message(&admin_msg(BOUND, "!setchannel <#10>"))
        .await;
    h.gateway
        .handle_message(&admin_msg(BOUND, "!setchannel <#11>"))
        .await;
    assert_eq!(h.gateway.memory.allowed_channel(GUILD), Some(OTHER));
    assert!(h.gateway.handle_message(&msg(BOUND, "hello")).await.is_empty());
    assert_eq!(
        h.gateway.handle_message(&msg(OTHER, "hello")).await.len(),
        1
    );
}

#[tokio::test]
async fn test_setchannel_non_admin_ignored() {
    let h = harness(MockProvider::ok("hi"));
    h.bind();
    let actions = h
        .gateway
        .handle_message(&msg(BOUND, "!setchannel <#11>"))
        .await;
    assert!(actions.is_empty());
    assert_eq!(h.gateway.memory.allowed_channel(GUILD), Some(BOUND));
    assert!(h.provider.calls().is_empty());
}

// --- conversation ---

#[tokio::test]
async fn test_conversation_reply_and_prompt_placeholders() {
    let h = harness(MockProvider::ok("Hey you!"));
    h.bind();
    let actions = h.gateway.handle_message(&msg(BOUND, "hello")).await;
    assert_eq!(actions, vec![OutboundAction::reply("Hey you!")]);

    let calls = h.provider.calls();
    assert_eq!(calls.len(), 1);
    let system = &calls[0].system_prompt;
    assert!(system.starts_with(&PersonaDescriptor::default().intro));
    assert!(system.contains("likes nothing specific"));
    assert!(system.contains("is from an unknown location"));
    assert_eq!(calls[0].current_message, format!("hello\n{CONCISE_SUFFIX}"));
}

#[tokio::test]
async fn test_conversation_uses_learned_facts() {
    let h = harness(MockProvider::ok("ok"));
    h.bind();
    h.gateway
        .handle_message(&msg(BOUND, "I like pizza and I'm from Pune"))
        .await;
    let calls = h.provider.calls();
    let system = &calls[0].system_prompt;
    assert!(system.contains("You know this person likes pizza and is from Pune."));
}

#[tokio::test]
async fn test_length_boundary_selects_suffix() {
    let h = harness(MockProvider::ok("ok"));
    h.bind();
    let short = "a".repeat(49);
    let long = "a".repeat(50);
    h.gateway.handle_message(&msg(BOUND, &short)).await;
    h.gateway.handle_message(&msg(BOUND, &long)).await;
    let calls = h.provider.calls();
    assert!(calls[0].current_message.ends_with(CONCISE_SUFFIX));
    assert!(calls[1].current_message.ends_with(DETAILED_SUFFIX));
}

#[tokio::test]
async fn test_backend_failure_becomes_error_reply() {
    let h = harness(MockProvider::failing("connection refused"));
    h.bind();
    let actions = h.gateway.handle_message(&msg(BOUND, "hello")).await;
    assert_eq!(actions.len(), 1);
    let text = actions[0].text().unwrap();
    assert!(text.starts_with("Error fetching response: "));
    assert!(text.contains("connection refused"));
}

// --- fact learning ---

#[tokio::test]
async fn test_always_policy_persists_every_message() {
    let h = harness(MockProvider::ok("ok"));
    h.bind();
    h.gateway.handle_message(&msg(BOUND, "hello")).await;
    assert_eq!(h.backing.document("memory").as_deref(), Some("{}"));
    assert!(h.gateway.memory.facts(USER).is_none());
}

#[tokio::test]
async fn test_on_trigger_policy_skips_plain_messages() {
    let h = harness_with(
        MockProvider::ok("ok"),
        None,
        FactsConfig {
            policy: ExtractionPolicy::OnTrigger,
            rules: FactSchema::likes_only(),
        },
        PersonaDescriptor::default(),
    );
    h.bind();
    h.gateway.handle_message(&msg(BOUND, "hello")).await;
    assert!(h.backing.document("memory").is_none());

    h.gateway.handle_message(&msg(BOUND, "I like jazz")).await;
    assert_eq!(
        h.gateway.memory.facts(USER).unwrap().likes.as_deref(),
        Some("jazz")
    );
    let calls = h.provider.calls();
    assert!(calls[1].system_prompt.contains("likes jazz."));
    assert!(!calls[1].system_prompt.contains("is from"));
}

#[tokio::test]
async fn test_facts_learned_before_command_check() {
    let h = harness(MockProvider::ok("ok"));
    h.bind();
    h.gateway
        .handle_message(&admin_msg(BOUND, "!setchannel <#10> like cats"))
        .await;
    assert_eq!(
        h.gateway.memory.facts(USER).unwrap().likes.as_deref(),
        Some("cats")
    );
}

// --- self portrait ---

#[tokio::test]
async fn test_self_portrait_refusal_without_backend_call() {
    let images = MockImages::returning(&["/tmp/image_1.png"]);
    let h = harness_with(
        MockProvider::ok("ok"),
        Some(images.clone()),
        FactsConfig::default(),
        PersonaDescriptor::default(),
    );
    h.bind();
    let actions = h
        .gateway
        .handle_message(&msg(BOUND, "Can you SHOW ME YOU?"))
        .await;
    assert_eq!(
        actions,
        vec![OutboundAction::reply(PersonaDescriptor::default().refusal)]
    );
    assert!(h.provider.calls().is_empty());
    assert!(images.prompts().is_empty());
}

#[tokio::test]
async fn test_self_portrait_wins_over_image_trigger() {
    let images = MockImages::returning(&["/tmp/image_1.png"]);
    let h = harness_with(
        MockProvider::ok("ok"),
        Some(images.clone()),
        FactsConfig::default(),
        PersonaDescriptor::default(),
    );
    h.bind();
    let actions = h
        .gateway
        .handle_message(&msg(BOUND, "draw an image of yourself"))
        .await;
    assert_eq!(actions[0].text(), Some(PersonaDescriptor::default().refusal.as_str()));
    assert!(images.prompts().is_empty());
}

// --- images ---

fn image_harness(images: Arc<MockImages>) -> Harness {
    let h = harness_with(
        MockProvider::ok("ok"),
        Some(images),
        FactsConfig::default(),
        PersonaDescriptor::default(),
    );
    h.bind();
    h
}

#[tokio::test]
async fn test_image_command_passes_rest_as_prompt() {
    let images = MockImages::returning(&["/out/image_1.png", "/out/image_2.png"]);
    let h = image_harness(images.clone());
    let actions = h
        .gateway
        .handle_message(&msg(BOUND, "!generateimage a red fox"))
        .await;
    assert_eq!(images.prompts(), vec!["a red fox"]);
    assert_eq!(
        actions,
        vec![
            OutboundAction::SendFile {
                path: PathBuf::from("/out/image_1.png")
            },
            OutboundAction::SendFile {
                path: PathBuf::from("/out/image_2.png")
            },
        ]
    );
    assert!(h.provider.calls().is_empty());
}

#[tokio::test]
async fn test_image_trigger_passes_whole_message() {
    let images = MockImages::returning(&["/out/image_7.png"]);
    let h = image_harness(images.clone());
    h.gateway
        .handle_message(&msg(BOUND, "Please Draw a lighthouse"))
        .await;
    assert_eq!(images.prompts(), vec!["Please Draw a lighthouse"]);
}

#[tokio::test]
async fn test_image_failure_becomes_error_reply() {
    let images = MockImages::failing("quota exceeded");
    let h = image_harness(images);
    let actions = h
        .gateway
        .handle_message(&msg(BOUND, "!generateimage a cat"))
        .await;
    assert_eq!(actions.len(), 1);
    let text = actions[0].text().unwrap();
    assert!(text.starts_with("Error generating image: "));
    assert!(text.contains("quota exceeded"));
}

#[tokio::test]
async fn test_image_empty_result_is_error() {
    let h = image_harness(MockImages::returning(&[]));
    let actions = h
        .gateway
        .handle_message(&msg(BOUND, "!generateimage a cat"))
        .await;
    assert_eq!(
        actions,
        vec![OutboundAction::reply(
            "Error generating image: no images returned"
        )]
    );
}

#[tokio::test]
async fn test_images_disabled_falls_through_to_conversation() {
    let h = harness(MockProvider::ok("words only"));
    h.bind();
    let actions = h
        .gateway
        .handle_message(&msg(BOUND, "draw a cat"))
        .await;
    assert_eq!(actions, vec![OutboundAction::reply("words only")]);
    assert_eq!(h.provider.calls().len(), 1);
}

// --- routing ---

#[test]
fn test_classify_order() {
    let persona = PersonaDescriptor::default();
    let rules = ImageConfig::default();

    let cmd = admin_msg(OTHER, "!setchannel <#10>");
    assert!(matches!(
        routing::classify(&cmd, false, &persona, Some(&rules)),
        routing::Route::Command(_)
    ));

    let plain = msg(OTHER, "hello");
    assert_eq!(
        routing::classify(&plain, false, &persona, Some(&rules)),
        routing::Route::Ignore
    );
    assert_eq!(
        routing::classify(&plain, true, &persona, Some(&rules)),
        routing::Route::Conversation { concise: true }
    );

    let image = msg(BOUND, "create an image of a boat");
    assert_eq!(
        routing::classify(&image, true, &persona, Some(&rules)),
        routing::Route::Image {
            prompt: "create an image of a boat".into()
        }
    );
    assert_eq!(
        routing::classify(&image, true, &persona, None),
        routing::Route::Conversation { concise: true }
    );
}

#[test]
fn test_classify_image_command_needs_space() {
    let persona = PersonaDescriptor::default();
    let rules = ImageConfig::default();
    let bare = msg(BOUND, "!generateimage");
    assert_eq!(
        routing::classify(&bare, true, &persona, Some(&rules)),
        routing::Route::Conversation { concise: true }
    );
    let empty = msg(BOUND, "!generateimage ");
    assert_eq!(
        routing::classify(&empty, true, &persona, Some(&rules)),
        routing::Route::Image {
            prompt: String::new()
        }
    );
}

// --- delivery ---

#[tokio::test]
async fn test_deliver_reply_style_threads_reply() {
    let h = harness(MockProvider::ok("ok"));
    let incoming = msg(BOUND, "hello");
    h.gateway
        .deliver(
            &incoming,
            vec![
                OutboundAction::reply("threaded"),
                OutboundAction::send("plain"),
                OutboundAction::SendFile {
                    path: PathBuf::from("/out/image_3.png"),
                },
            ],
        )
        .await;

    let sent = h.channel.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].text, "threaded");
    assert_eq!(sent[0].reply_to, Some(incoming.id));
    assert_eq!(sent[0].channel_id, BOUND);
    assert_eq!(sent[1].reply_to, None);
    let files = h.channel.files.lock().unwrap().clone();
    assert_eq!(files, vec![(BOUND, PathBuf::from("/out/image_3.png"))]);
}

#[tokio::test]
async fn test_deliver_channel_style_posts_plainly() {
    let h = harness_with(
        MockProvider::ok("ok"),
        None,
        FactsConfig::default(),
        PersonaDescriptor {
            reply_style: ReplyStyle::Channel,
            ..Default::default()
        },
    );
    let incoming = msg(BOUND, "hello");
    h.gateway
        .deliver(&incoming, vec![OutboundAction::reply("plain")])
        .await;
    let sent = h.channel.sent.lock().unwrap().clone();
    assert_eq!(sent[0].reply_to, None);
}

#[tokio::test]
async fn test_dispatch_message_end_to_end() {
    let h = harness(MockProvider::ok("Hi sweetie"));
    h.bind();
    h.gateway.dispatch_message(msg(BOUND, "hi")).await;
    let sent = h.channel.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "Hi sweetie");
}

// --- status ---

#[tokio::test]
async fn test_rotate_status_sets_presence() {
    let h = harness_with(
        MockProvider::ok("ok"),
        None,
        FactsConfig::default(),
        PersonaDescriptor {
            statuses: vec!["Just hanging out!".into()],
            ..Default::default()
        },
    );
    h.gateway.rotate_status().await;
    assert_eq!(
        h.channel.presence.lock().unwrap().clone(),
        vec!["Just hanging out!"]
    );
}

#[tokio::test]
async fn test_rotate_status_without_statuses_is_noop() {
    let h = harness_with(
        MockProvider::ok("ok"),
        None,
        FactsConfig::default(),
        PersonaDescriptor {
            statuses: Vec::new(),
            ..Default::default()
        },
    );
    h.gateway.rotate_status().await;
    assert!(h.channel.presence.lock().unwrap().is_empty());
}
