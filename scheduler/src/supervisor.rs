//! Crawl-source supervision
//!
//! A source whose workers died, or whose `use_synonyms` call failed, is torn
//! down and rebuilt from its factory with the last applied synonym set. Output
//! still buffered in the discarded instance is salvaged and handed out with
//! the next drain.

use crawler::CrawlSource;
use shared::{worker_info, worker_warn, SynonymSet, TaggedContent, WorkerId};

use crate::error::SchedulerResult;
use crate::traits::SourceFactory;

pub struct SupervisedSource {
    factory: Box<dyn SourceFactory>,
    source: Option<Box<dyn CrawlSource>>,
    applied: SynonymSet,
    salvaged: Vec<TaggedContent>,
    restarts: u32,
}

impl SupervisedSource {
    pub fn new(factory: Box<dyn SourceFactory>) -> Self {
        Self {
            factory,
            source: None,
            applied: SynonymSet::new(),
            salvaged: Vec::new(),
            restarts: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.factory.name()
    }

    /// How many times the source was rebuilt after a failure
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn is_running(&self) -> bool {
        self.source.as_ref().is_some_and(|source| source.is_running())
    }

    /// Build the source if it is missing, rebuild it if its workers died
    pub async fn ensure_running(&mut self) -> SchedulerResult<()> {
        match &self.source {
            None => self.recreate().await,
            Some(source) if !source.is_running() => {
                worker_warn!(WorkerId::Scheduler, "Source {} stopped running", self.name());
                self.restarts += 1;
                self.recreate().await
            }
            Some(_) => Ok(()),
        }
    }

    /// Apply a new synonym set, rebuilding the source if it rejects it
    pub async fn use_synonyms(&mut self, synonyms: &SynonymSet) -> SchedulerResult<()> {
        self.applied = synonyms.clone();

        let Some(source) = &self.source else {
            return self.recreate().await;
        };

        match source.use_synonyms(synonyms).await {
            Ok(()) => Ok(()),
            Err(e) => {
                worker_warn!(
                    WorkerId::Scheduler,
                    "Source {} rejected synonyms ({}), recreating it",
                    self.name(),
                    e
                );
                self.restarts += 1;
                self.recreate().await
            }
        }
    }

    /// Take everything the source produced since the last drain
    pub fn drain(&mut self) -> Vec<TaggedContent> {
        let mut drained = std::mem::take(&mut self.salvaged);
        if let Some(source) = &self.source {
            drained.extend(source.drain());
        }
        drained
    }

    /// Stop the source and return its remaining output
    pub async fn shutdown(&mut self) -> Vec<TaggedContent> {
        if let Some(source) = self.source.take() {
            source.shutdown().await;
            self.salvaged.extend(source.drain());
        }
        std::mem::take(&mut self.salvaged)
    }

    async fn recreate(&mut self) -> SchedulerResult<()> {
        if let Some(old) = self.source.take() {
            old.shutdown().await;
            self.salvaged.extend(old.drain());
        }

        let source = self.factory.create()?;
        if !self.applied.is_empty() {
            source.use_synonyms(&self.applied).await?;
        }
        worker_info!(
            WorkerId::Scheduler,
            "🔧 Source {} started with {} synonyms",
            self.name(),
            self.applied.len()
        );
        self.source = Some(source);
        Ok(())
    }
}
