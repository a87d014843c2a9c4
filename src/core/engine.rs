use crate::core::template;
use crate::core::{Pipeline, RenderOutcome};
use crate::utils::error::{RenderError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Runs the fetch, render and write stages of a [`Pipeline`] as one invocation.
///
/// Every call to [`RenderEngine::run`] takes a generation number. Writes happen under
/// a lock and only for the newest generation, so overlapping invocations cannot leave
/// an older result in the target.
pub struct RenderEngine<P: Pipeline> {
    pipeline: P,
    fallback_notice: Option<String>,
    generation: AtomicU64,
    write_lock: Mutex<()>,
}

impl<P: Pipeline> RenderEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_fallback(pipeline, None)
    }

    pub fn new_with_fallback(pipeline: P, fallback_notice: Option<String>) -> Self {
        Self {
            pipeline,
            fallback_notice,
            generation: AtomicU64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<RenderOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("Starting pet list render (generation {})", generation);

        match self.render(generation).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!(
                    "❌ Pet list render failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                self.apply_fallback(generation, &e).await;
                Err(e)
            }
        }
    }

    async fn render(&self, generation: u64) -> Result<RenderOutcome> {
        tracing::debug!("Fetching pets...");
        let pets = self.pipeline.extract().await?;
        tracing::info!("Fetched {} pet records", pets.len());

        let rendered = self.pipeline.transform(pets).await?;

        let _guard = self.write_lock.lock().await;
        if self.is_superseded(generation) {
            tracing::warn!(
                "Discarding render of generation {}, a newer invocation is running",
                generation
            );
            return Ok(RenderOutcome::Superseded { generation });
        }

        let records = self.pipeline.load(rendered).await?;
        tracing::info!("✅ Rendered {} pets", records);

        Ok(RenderOutcome::Rendered {
            records,
            generation,
        })
    }

    async fn apply_fallback(&self, generation: u64, error: &RenderError) {
        let Some(notice) = self.fallback_notice.as_deref() else {
            return;
        };
        if !error.allows_fallback() {
            tracing::debug!("Skipping fallback notice for {:?} failure", error.category());
            return;
        }

        let rendered = match template::render_fallback(notice) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::warn!("Could not render fallback notice: {}", e);
                return;
            }
        };

        let _guard = self.write_lock.lock().await;
        if self.is_superseded(generation) {
            return;
        }

        match self.pipeline.load(rendered).await {
            Ok(_) => tracing::info!("Fallback notice written to the page"),
            Err(e) => tracing::warn!("Could not write fallback notice: {}", e),
        }
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::document::InMemoryDocument;
    use crate::core::{Document, PetCollection, PetRecord, RenderedList};
    use std::collections::VecDeque;
    use std::time::Duration;

    type Scripted = (Duration, Result<PetCollection>);

    struct MockPipeline {
        responses: std::sync::Mutex<VecDeque<Scripted>>,
        document: InMemoryDocument,
    }

    impl MockPipeline {
        fn new(document: InMemoryDocument, responses: Vec<Scripted>) -> Self {
            Self {
                responses: std::sync::Mutex::new(responses.into()),
                document,
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for MockPipeline {
        async fn extract(&self) -> Result<PetCollection> {
            let (delay, result) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left");
            tokio::time::sleep(delay).await;
            result
        }

        async fn transform(&self, pets: PetCollection) -> Result<RenderedList> {
            template::render_pet_list(&pets)
        }

        async fn load(&self, rendered: RenderedList) -> Result<usize> {
            self.document.replace_content("pets", &rendered.markup).await?;
            Ok(rendered.record_count)
        }
    }

    fn decode_error() -> RenderError {
        RenderError::DecodeFailure {
            message: "expected a JSON array".to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_renders_and_reports_generation() {
        let document = InMemoryDocument::with_elements([("pets", "")]);
        let pipeline = MockPipeline::new(
            document.clone(),
            vec![(Duration::ZERO, Ok(vec![PetRecord::new("Rex", "Labrador")]))],
        );
        let engine = RenderEngine::new(pipeline);

        let outcome = engine.run().await.unwrap();

        assert_eq!(
            outcome,
            RenderOutcome::Rendered {
                records: 1,
                generation: 1
            }
        );
        assert_eq!(
            document.content("pets").await.as_deref(),
            Some("<p>Rex - Labrador</p>")
        );
    }

    #[tokio::test]
    async fn test_failure_without_fallback_leaves_target_untouched() {
        let document = InMemoryDocument::with_elements([("pets", "<p>Old - Content</p>")]);
        let pipeline = MockPipeline::new(document.clone(), vec![(Duration::ZERO, Err(decode_error()))]);
        let engine = RenderEngine::new(pipeline);

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, RenderError::DecodeFailure { .. }));
        assert_eq!(
            document.content("pets").await.as_deref(),
            Some("<p>Old - Content</p>")
        );
    }

    #[tokio::test]
    async fn test_failure_with_fallback_replaces_target() {
        let document = InMemoryDocument::with_elements([("pets", "<p>Old - Content</p>")]);
        let pipeline = MockPipeline::new(document.clone(), vec![(Duration::ZERO, Err(decode_error()))]);
        let engine =
            RenderEngine::new_with_fallback(pipeline, Some("Pets are unavailable".to_string()));

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, RenderError::DecodeFailure { .. }));
        assert_eq!(
            document.content("pets").await.as_deref(),
            Some(r#"<p class="pets-error">Pets are unavailable</p>"#)
        );
    }

    #[tokio::test]
    async fn test_newer_invocation_wins_over_slow_older_one() {
        let document = InMemoryDocument::with_elements([("pets", "")]);
        let pipeline = MockPipeline::new(
            document.clone(),
            vec![
                (
                    Duration::from_millis(300),
                    Ok(vec![PetRecord::new("Old", "Response")]),
                ),
                (Duration::ZERO, Ok(vec![PetRecord::new("New", "Response")])),
            ],
        );
        let engine = RenderEngine::new(pipeline);

        let (first, second) = tokio::join!(engine.run(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            engine.run().await
        });

        assert_eq!(first.unwrap(), RenderOutcome::Superseded { generation: 1 });
        assert_eq!(
            second.unwrap(),
            RenderOutcome::Rendered {
                records: 1,
                generation: 2
            }
        );
        assert_eq!(
            document.content("pets").await.as_deref(),
            Some("<p>New - Response</p>")
        );
    }

    #[tokio::test]
    async fn test_running_twice_is_idempotent() {
        let pets = vec![
            PetRecord::new("Rex", "Labrador"),
            PetRecord::new("Mimi", "Siamese"),
        ];
        let document = InMemoryDocument::with_elements([("pets", "")]);
        let pipeline = MockPipeline::new(
            document.clone(),
            vec![(Duration::ZERO, Ok(pets.clone())), (Duration::ZERO, Ok(pets))],
        );
        let engine = RenderEngine::new(pipeline);

        engine.run().await.unwrap();
        let once = document.content("pets").await;
        engine.run().await.unwrap();

        assert_eq!(document.content("pets").await, once);
    }
}
