//! Answer orchestration.
//!
//! Routes each chat message through intent classification and then either
//! the general path (raw question, generic instruction) or the grounded path
//! (similarity retrieval, context-restricted instruction). Output is a lazy
//! fragment stream fed through a bounded relay channel: the producer task
//! suspends on every send, so a dropped receiver stops generator consumption
//! within one fragment.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::domain::errors::{ChatError, ChatResult};
use crate::domain::models::{AssistantConfig, Intent};
use crate::domain::ports::{LanguageModel, TokenStream};
use crate::services::vector_index::KnowledgeBase;

/// How many chunks are retrieved for a grounded answer.
const RETRIEVED_CHUNKS: usize = 8;

/// Relay capacity of one: fragments are handed to the transport as units,
/// never accumulated, and cancellation is observed at the next send.
const RELAY_CAPACITY: usize = 1;

const CLASSIFIER_INSTRUCTION: &str = "Classify the user query. Respond with only one word: \
    knowledge or general. Use knowledge for questions about the institution's details, \
    admissions, courses, placements, academics, facilities, attendance, accreditation, \
    contact, address, or timings.";

const GENERAL_INSTRUCTION: &str = "You are a helpful AI assistant. Give accurate and concise \
    responses for general questions.";

fn grounded_instruction(fallback: &str) -> String {
    format!(
        "You are the official assistant for this institution. Answer using only the provided \
         context. If asked for role-based people (like director, dean, principal), return names \
         and roles from the context clearly. If the answer is not present in the context, reply \
         exactly: {fallback}"
    )
}

/// Intent-routing answer orchestrator.
pub struct Assistant {
    model: Arc<dyn LanguageModel>,
    knowledge: Arc<KnowledgeBase>,
    persona: AssistantConfig,
}

impl Assistant {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        knowledge: Arc<KnowledgeBase>,
        persona: AssistantConfig,
    ) -> Self {
        Self {
            model,
            knowledge,
            persona,
        }
    }

    /// Answer a chat message as a lazy fragment stream.
    ///
    /// The intro fragment is emitted before any classification or retrieval
    /// work. A classifier or generator failure ends the stream with that
    /// error; fragments already emitted stand. Dropping the returned stream
    /// cancels the producer at its next send.
    pub fn answer(&self, message: String) -> AnswerStream {
        let (tx, rx) = mpsc::channel(RELAY_CAPACITY);

        let model = Arc::clone(&self.model);
        let knowledge = Arc::clone(&self.knowledge);
        let persona = self.persona.clone();

        tokio::spawn(async move {
            if let Err(ChatError::Disconnected) =
                run_answer(model, knowledge, persona, message, tx).await
            {
                tracing::debug!("client disconnected; generation stopped");
            }
        });

        AnswerStream { rx }
    }
}

/// Ordered fragment stream for one request.
///
/// Ends after the producer finishes or after the first error item. Dropping
/// it closes the relay channel, which the producer observes as cancellation.
pub struct AnswerStream {
    rx: mpsc::Receiver<ChatResult<String>>,
}

impl Stream for AnswerStream {
    type Item = ChatResult<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

async fn run_answer(
    model: Arc<dyn LanguageModel>,
    knowledge: Arc<KnowledgeBase>,
    persona: AssistantConfig,
    message: String,
    tx: mpsc::Sender<ChatResult<String>>,
) -> ChatResult<()> {
    // Intro goes out before any model or index work, so the receiver sees
    // output immediately even when classification is slow.
    send(&tx, Ok(format!("{}\n\n", persona.intro))).await?;

    let intent = match model.classify(CLASSIFIER_INSTRUCTION, &message).await {
        Ok(reply) => Intent::from_classifier_reply(&reply),
        Err(err) => return send(&tx, Err(err)).await,
    };

    tracing::debug!(?intent, "classified chat message");

    match intent {
        Intent::General => {
            let reply = model.stream_reply(GENERAL_INSTRUCTION, &message).await;
            relay(reply, &tx).await
        }
        Intent::Grounded => {
            let index = match knowledge.index() {
                Ok(index) => index,
                Err(err) => return send(&tx, Err(err)).await,
            };

            let hits = index.query(&message, RETRIEVED_CHUNKS);
            let context = hits
                .iter()
                .map(|hit| hit.chunk.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");

            if context.trim().is_empty() {
                // No evidence: answer with the fixed fallback instead of
                // letting the generator improvise.
                return send(&tx, Ok(persona.fallback.clone())).await;
            }

            let instruction = grounded_instruction(&persona.fallback);
            let user_turn = format!("Question:\n{message}\n\nContext:\n{context}");

            let reply = model.stream_reply(&instruction, &user_turn).await;
            relay(reply, &tx).await
        }
    }
}

/// Forward generator fragments over the relay, one at a time. The first
/// stream error is forwarded and ends the relay.
async fn relay(
    reply: ChatResult<TokenStream>,
    tx: &mpsc::Sender<ChatResult<String>>,
) -> ChatResult<()> {
    let mut stream = match reply {
        Ok(stream) => stream,
        Err(err) => return send(tx, Err(err)).await,
    };

    while let Some(item) = stream.next().await {
        let terminal = item.is_err();
        send(tx, item).await?;
        if terminal {
            break;
        }
    }

    Ok(())
}

/// Hand one item to the receiver, surfacing a gone receiver as the
/// cancellation signal so the producer stops pulling the generator.
async fn send(
    tx: &mpsc::Sender<ChatResult<String>>,
    item: ChatResult<String>,
) -> ChatResult<()> {
    tx.send(item).await.map_err(|_| ChatError::Disconnected)
}
