//! End-to-end scenarios through the chat orchestrator with mock providers.

use application::chat_service::ChatService;
use application::static_questions::{RetryPolicy, StaticQuestionService, STATIC_QUESTIONS};
use application::user_service::UserService;
use domain::conversation::ChatTurn;
use domain::organization::Organization;
use infrastructure::prompt_store::PromptStore;
use infrastructure::store::StoreRegistry;
use infrastructure::vector_index::VectorIndexStore;
use std::sync::Arc;
use std::time::Duration;
use tests::{write_prompt_fixtures, HistogramEmbedder, ScriptedModel};

struct Harness {
    llm: Arc<ScriptedModel>,
    chat: Arc<ChatService>,
    statics: StaticQuestionService,
    users: UserService,
    _prompts_dir: tempfile::TempDir,
}

fn harness(llm: ScriptedModel) -> Harness {
    let prompts_dir = tempfile::tempdir().unwrap();
    write_prompt_fixtures(prompts_dir.path());

    let registry = Arc::new(StoreRegistry::open_in_memory().unwrap());
    let index = Arc::new(VectorIndexStore::new(
        registry.clone(),
        Arc::new(HistogramEmbedder),
    ));
    let llm = Arc::new(llm);
    let prompts = Arc::new(PromptStore::new(prompts_dir.path()));
    let chat = Arc::new(ChatService::new(llm.clone(), prompts, index.clone()));
    Harness {
        llm,
        statics: StaticQuestionService::new(chat.clone(), registry.clone()),
        users: UserService::new(registry, index),
        chat,
        _prompts_dir: prompts_dir,
    }
}

#[tokio::test]
async fn greeting_turn_is_answered_without_retrieval() {
    let h = harness(ScriptedModel::new(&[
        "<response>Hello! How can I help you today?</response><greeting>true</greeting>",
    ]));

    let history = vec![ChatTurn::new("Hello", "")];
    let answer = h
        .chat
        .answer("alice", Organization::General, &history)
        .await
        .unwrap();

    assert_eq!(answer, "Hello! How can I help you today?");
    // A single model call means the RAG node never ran.
    assert_eq!(h.llm.calls(), 1);
}

#[tokio::test]
async fn follow_up_turn_uses_history_and_user_corpus() {
    let h = harness(ScriptedModel::new(&[
        "<greeting>false</greeting><standalone>What is the population of Paris?</standalone>",
        "<response>About two million people.</response>",
    ]));
    h.users
        .create_user(
            "alice",
            "secret",
            "Paris has about two million inhabitants.\n\nThe office opens at nine.",
            Organization::General,
        )
        .await
        .unwrap();

    let history = vec![
        ChatTurn::new("What city?", "Paris"),
        ChatTurn::new("And the population?", ""),
    ];
    let answer = h
        .chat
        .answer("alice", Organization::General, &history)
        .await
        .unwrap();

    assert_eq!(answer, "About two million people.");
    assert_eq!(h.llm.calls(), 2);

    let intent_prompt = h.llm.prompt(0);
    assert!(intent_prompt.contains("question=And the population?"));
    assert!(intent_prompt.contains("User: What city?\nAssistant: Paris"));

    let rag_prompt = h.llm.prompt(1);
    assert!(rag_prompt.contains("chatbot-rag-prompt.md"));
    assert!(rag_prompt.contains("Paris has about two million inhabitants."));
}

#[tokio::test]
async fn organization_selects_its_own_rag_template() {
    let h = harness(ScriptedModel::new(&[
        "<greeting>false</greeting>",
        "<response>Steel and aluminium.</response>",
    ]));
    h.users
        .create_user(
            "plant",
            "secret",
            "We machine steel and aluminium parts.",
            Organization::Manufacturing,
        )
        .await
        .unwrap();

    let history = vec![ChatTurn::new("What materials do you work with?", "")];
    h.chat
        .answer("plant", Organization::Manufacturing, &history)
        .await
        .unwrap();

    assert!(h.llm.prompt(1).contains("manufacturing-rag-prompt.md"));
}

#[tokio::test]
async fn static_check_persists_one_answer_per_question() {
    let h = harness(ScriptedModel::new(&[
        "<response>Reach us at contact@example.com</response><greeting>true</greeting>",
        "<response>Consulting and support.</response><greeting>true</greeting>",
        "<response>We answer from your own documents.</response><greeting>true</greeting>",
    ]));
    h.users
        .create_user("alice", "secret", "corpus", Organization::General)
        .await
        .unwrap();

    let policy = RetryPolicy {
        max_attempts: 2,
        delay: Duration::from_millis(1),
    };
    let answers = h
        .statics
        .answer_static_questions("alice", Organization::General, policy)
        .await
        .unwrap();
    assert_eq!(answers.len(), STATIC_QUESTIONS.len());

    let stored = h
        .statics
        .static_answers_for("alice", Organization::General)
        .unwrap();
    assert_eq!(stored.len(), STATIC_QUESTIONS.len());
    assert_eq!(stored[0].1, "Reach us at contact@example.com");
    // The user-facing question drops the phrasing hint.
    assert_eq!(stored[0].0, "Give me the contact information.");
}

#[tokio::test]
async fn static_check_retries_a_transient_failure_once() {
    let h = harness(ScriptedModel::failing_first(
        1,
        &[
            "<response>a1</response><greeting>true</greeting>",
            "<response>a2</response><greeting>true</greeting>",
            "<response>a3</response><greeting>true</greeting>",
        ],
    ));
    h.users
        .create_user("alice", "secret", "corpus", Organization::General)
        .await
        .unwrap();

    let policy = RetryPolicy {
        max_attempts: 2,
        delay: Duration::from_millis(1),
    };
    let answers = h
        .statics
        .answer_static_questions("alice", Organization::General, policy)
        .await
        .unwrap();

    assert_eq!(answers, vec!["a1", "a2", "a3"]);
    // Three questions plus the one retried failure.
    assert_eq!(h.llm.calls(), 4);
}
