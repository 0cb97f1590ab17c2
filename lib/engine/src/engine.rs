//! The query pipeline: retrieve, assemble, prompt, generate.

use crate::config::EngineConfig;
use crate::context::{build_prompt, ContextAssembler};
use crate::embedder::Embedder;
use crate::generator::Generator;
use crate::retriever::Retriever;
use hotelrag_core::{Analytics, Error, ErrorKind, Result, RowStore, VectorIndex};
use hotelrag_storage::Dataset;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// Models and data loaded once at startup and shared read-only by every request
pub struct EngineContext {
    rows: RowStore,
    index: Box<dyn VectorIndex>,
    embedder: Box<dyn Embedder>,
    generator: Generator,
}

impl EngineContext {
    pub fn new(dataset: Dataset, embedder: Box<dyn Embedder>, generator: Generator) -> Result<Self> {
        Self::from_parts(dataset.rows, dataset.index, &dataset.embedder, embedder, generator)
    }

    /// Assemble the context, failing startup unless rows, index and
    /// embedder all agree on size and dimension, and `embedder` is the
    /// model named by `index_embedder`.
    pub fn from_parts(
        rows: RowStore,
        index: Box<dyn VectorIndex>,
        index_embedder: &str,
        embedder: Box<dyn Embedder>,
        generator: Generator,
    ) -> Result<Self> {
        if rows.len() != index.len() {
            return Err(Error::Startup(format!(
                "row store holds {} rows but index holds {} vectors",
                rows.len(),
                index.len()
            )));
        }
        if embedder.model_name() != index_embedder {
            return Err(Error::Startup(format!(
                "index was embedded with {} but queries would use {}",
                index_embedder,
                embedder.model_name()
            )));
        }
        if embedder.dim() != index.dim() {
            return Err(Error::Startup(format!(
                "embedder {} produces dimension {} but index expects {}",
                embedder.model_name(),
                embedder.dim(),
                index.dim()
            )));
        }

        info!(
            "Engine context ready: {} rows, embedder {}, generator {}{}",
            rows.len(),
            embedder.model_name(),
            generator.model_name(),
            if generator.is_serialized() { " (serialized)" } else { "" }
        );
        Ok(Self {
            rows,
            index,
            embedder,
            generator,
        })
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn retriever(&self) -> Retriever<'_> {
        Retriever::new(self.embedder.as_ref(), self.index.as_ref(), &self.rows)
    }
}

/// Pipeline stage of a single query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryState {
    Idle,
    Retrieving,
    Assembling,
    Generating,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub query: String,
    pub answer: String,
    /// Ids of the records the answer was conditioned on; empty when
    /// retrieval found nothing
    #[serde(skip)]
    pub sources: Vec<u64>,
}

/// A query that ended in [`QueryState::Failed`]
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct QueryFailure {
    pub kind: ErrorKind,
    pub message: String,
    /// Stage that was running when the error occurred
    pub failed_at: QueryState,
}

impl QueryFailure {
    fn new(failed_at: QueryState, err: Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            failed_at,
        }
    }
}

/// Answers questions about the hotel data.
///
/// Cheap to clone; clones share the same context and worker permits.
#[derive(Clone)]
pub struct QueryEngine {
    context: Arc<EngineContext>,
    config: EngineConfig,
    assembler: ContextAssembler,
    permits: Arc<Semaphore>,
}

impl QueryEngine {
    pub fn new(context: Arc<EngineContext>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let assembler = ContextAssembler::new(config.context_separator.clone(), config.max_context_chars);
        let permits = Arc::new(Semaphore::new(config.max_concurrent_requests));
        Ok(Self {
            context,
            config,
            assembler,
            permits,
        })
    }

    pub fn context(&self) -> &Arc<EngineContext> {
        &self.context
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Aggregate statistics over every row
    pub fn analytics(&self) -> Analytics {
        Analytics::compute(self.context.rows())
    }

    /// Run the full pipeline on the calling thread.
    ///
    /// Blocks for the duration of embedding, search and generation. Zero
    /// retrieved records is not a failure: the model is asked with an
    /// empty context and [`Answer::sources`] comes back empty.
    pub fn answer(&self, query: &str) -> std::result::Result<Answer, QueryFailure> {
        let mut state = QueryState::Idle;

        advance(&mut state, QueryState::Retrieving);
        let retrieved = self
            .context
            .retriever()
            .retrieve(query, self.config.top_k)
            .map_err(|e| fail(&mut state, e))?;

        if retrieved.is_empty() {
            info!("No records matched; answering from empty context");
        }
        let sources: Vec<u64> = retrieved.iter().map(|r| r.record.id).collect();

        advance(&mut state, QueryState::Assembling);
        let context = self.assembler.build_context(retrieved.iter().map(|r| r.record));
        let prompt = build_prompt(&context, query);
        debug!("Prompt is {} chars from {} records", prompt.len(), sources.len());

        advance(&mut state, QueryState::Generating);
        let answer = self
            .context
            .generator()
            .complete(&prompt, self.config.max_output_tokens)
            .map_err(|e| fail(&mut state, e))?;

        advance(&mut state, QueryState::Succeeded);
        Ok(Answer {
            query: query.to_string(),
            answer,
            sources,
        })
    }

    /// Async entry point: runs [`answer`](Self::answer) on a blocking
    /// worker once a slot in the bounded pool is free.
    pub async fn ask(&self, query: impl Into<String>) -> std::result::Result<Answer, QueryFailure> {
        let query = query.into();
        let request_id = Uuid::new_v4();
        let span = info_span!("ask", %request_id);

        let permit = self.permits.clone().acquire_owned().await.map_err(|_| QueryFailure {
            kind: ErrorKind::Generation,
            message: "worker pool is closed".into(),
            failed_at: QueryState::Idle,
        })?;

        let engine = self.clone();
        let worker = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _enter = span.enter();
            engine.answer(&query)
        });

        match worker.await {
            Ok(result) => result,
            // Only the model call runs foreign code, so a dead worker is
            // charged to generation.
            Err(e) => {
                warn!("Query worker {} did not finish: {}", request_id, e);
                Err(QueryFailure {
                    kind: ErrorKind::Generation,
                    message: format!("query worker did not finish: {}", e),
                    failed_at: QueryState::Generating,
                })
            }
        }
    }
}

fn advance(state: &mut QueryState, next: QueryState) {
    debug!("{:?} -> {:?}", state, next);
    *state = next;
}

fn fail(state: &mut QueryState, err: Error) -> QueryFailure {
    let failed_at = *state;
    warn!("Query failed while {:?}: {}", failed_at, err);
    *state = QueryState::Failed;
    QueryFailure::new(failed_at, err)
}
