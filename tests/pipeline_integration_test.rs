//! Startup-to-answer pipeline test: ingest a corpus from disk, build the
//! index, and answer a grounded question through the orchestrator.

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tempfile::TempDir;

use ragline::domain::ports::{LanguageModel, TokenStream};
use ragline::infrastructure::knowledge::initialize_knowledge_base;
use ragline::services::{Assistant, KnowledgeBase};
use ragline::{AssistantConfig, ChatResult, KnowledgeConfig};

/// Echoes the retrieved context back so the test can see what the grounded
/// prompt contained.
struct EchoModel;

#[async_trait]
impl LanguageModel for EchoModel {
    async fn classify(&self, _instruction: &str, _message: &str) -> ChatResult<String> {
        Ok("knowledge".to_string())
    }

    async fn stream_reply(&self, _instruction: &str, message: &str) -> ChatResult<TokenStream> {
        let items: Vec<ChatResult<String>> = vec![Ok(message.to_string())];
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

fn knowledge_config(temp: &TempDir) -> KnowledgeConfig {
    KnowledgeConfig {
        primary_path: temp
            .path()
            .join("campus.json")
            .to_string_lossy()
            .into_owned(),
        extra_dir: temp
            .path()
            .join("knowledge")
            .to_string_lossy()
            .into_owned(),
        ..KnowledgeConfig::default()
    }
}

#[tokio::test]
async fn test_disk_corpus_reaches_the_grounded_prompt() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("campus.json"),
        r#"{
            "placements": { "rate_2023": "95 percent of students placed" },
            "departments": ["computer science", "electronics"]
        }"#,
    )
    .unwrap();

    let knowledge_dir = temp.path().join("knowledge");
    fs::create_dir(&knowledge_dir).unwrap();
    fs::write(
        knowledge_dir.join("hostel.md"),
        "Hostel curfew is 10pm on weekdays.",
    )
    .unwrap();

    let index = initialize_knowledge_base(&knowledge_config(&temp)).unwrap();
    assert!(index.len() >= 2);

    let assistant = Assistant::new(
        Arc::new(EchoModel),
        Arc::new(KnowledgeBase::ready(index)),
        AssistantConfig::default(),
    );

    let mut stream = assistant.answer("placements rate for students".to_string());

    let intro = stream.next().await.unwrap().unwrap();
    assert!(intro.starts_with(&AssistantConfig::default().intro));

    let echoed_prompt = stream.next().await.unwrap().unwrap();
    assert!(echoed_prompt.contains("Question:\nplacements rate for students"));
    // The flattened JSON line made it through chunking into the context.
    assert!(echoed_prompt.contains("95 percent of students placed"));

    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_hostel_notes_are_retrievable() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("campus.json"), r#"{ "name": "Example" }"#).unwrap();

    let knowledge_dir = temp.path().join("knowledge");
    fs::create_dir(&knowledge_dir).unwrap();
    fs::write(
        knowledge_dir.join("hostel.md"),
        "Hostel curfew is 10pm on weekdays.",
    )
    .unwrap();

    let index = initialize_knowledge_base(&knowledge_config(&temp)).unwrap();

    let hits = index.query("hostel curfew", 8);
    assert!(!hits.is_empty());
    assert!(hits[0].chunk.text.contains("curfew"));
    assert_eq!(hits[0].chunk.metadata.kind, "md");
}
