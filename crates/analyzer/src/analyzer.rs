use crate::config::{AnalysisConfig, FetchLimits};
use crate::error::{AnalysisError, Result};
use crate::fetch::HttpFetcher;
use crate::pool::{PoolSnapshot, WorkerPool};
use crate::source::{parse_location, TextSource};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinError, JoinSet};
use wordscan_chunker::{Chunker, LineDecoder, TextChunk};
use wordscan_protocol::{AnalysisResponse, WordMatch};
use wordscan_search::{aggregate, find_matches, MatchRecord, WordSet};

type Batch = Result<Vec<MatchRecord>>;
type Matcher = fn(&TextChunk, &WordSet) -> Vec<MatchRecord>;

/// Drives fetch → chunk → parallel match → aggregate for one request at a time.
///
/// An `Analyzer` is built once per process and shared; every request goes through the same
/// worker pool.
#[derive(Debug)]
pub struct Analyzer {
    config: AnalysisConfig,
    chunker: Chunker,
    limits: FetchLimits,
    pool: Arc<WorkerPool>,
    fetcher: HttpFetcher,
    matcher: Matcher,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let limits = config.limits()?;
        let chunker = Chunker::new(config.chunker_config())?;
        let pool = Arc::new(WorkerPool::new(
            config.thread_pool_size,
            config.queue_capacity,
        ));
        let fetcher = HttpFetcher::new(limits)?;

        log::debug!(
            "Analyzer ready: chunk_size={} overlap={} pool={} queue={}",
            config.chunk_size,
            config.chunk_overlap,
            pool.snapshot().limit,
            config.queue_capacity
        );
        Ok(Self {
            config,
            chunker,
            limits,
            pool,
            fetcher,
            matcher: find_matches,
        })
    }

    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn pool_snapshot(&self) -> PoolSnapshot {
        self.pool.snapshot()
    }

    /// Fetch the document at `location` and search it for `words`.
    pub async fn analyze_url(&self, location: &str, words: &[String]) -> Result<AnalysisResponse> {
        let started = Instant::now();
        log::info!(
            "Starting text analysis for URL: {location} with {} words",
            words.len()
        );

        let outcome = self.fetch_and_run(location, words).await;
        self.finish(location, started, outcome)
    }

    /// Search an already-open source for `words`.
    pub async fn analyze<S>(&self, source: &mut S, words: &[String]) -> Result<AnalysisResponse>
    where
        S: TextSource + ?Sized,
    {
        let started = Instant::now();
        let location = source.location().to_string();
        log::info!(
            "Starting text analysis for {location} with {} words",
            words.len()
        );

        let outcome = self.run_with_timeout(source, words).await;
        self.finish(&location, started, outcome)
    }

    async fn fetch_and_run(&self, location: &str, words: &[String]) -> Result<Vec<WordMatch>> {
        let url = parse_location(location)?;
        let words = WordSet::new(words)?;
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = async {
            let mut source = self.fetcher.open(&url).await?;
            self.run(&mut source, words).await
        };
        tokio::time::timeout(self.limits.request_timeout, fetched)
            .await
            .map_err(|_| self.timed_out(url.as_str()))?
    }

    async fn run_with_timeout<S>(&self, source: &mut S, words: &[String]) -> Result<Vec<WordMatch>>
    where
        S: TextSource + ?Sized,
    {
        let words = WordSet::new(words)?;
        if words.is_empty() {
            return Ok(Vec::new());
        }
        let location = source.location().to_string();
        tokio::time::timeout(self.limits.request_timeout, self.run(source, words))
            .await
            .map_err(|_| self.timed_out(&location))?
    }

    fn timed_out(&self, location: &str) -> AnalysisError {
        AnalysisError::read_failure(
            location,
            format!("request timed out after {:?}", self.limits.request_timeout),
        )
    }

    fn finish(
        &self,
        location: &str,
        started: Instant,
        outcome: Result<Vec<WordMatch>>,
    ) -> Result<AnalysisResponse> {
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match outcome {
            Ok(matches) => {
                log::info!(
                    "Text analysis completed in {elapsed_ms} ms. Found matches for {} words",
                    matches.len()
                );
                Ok(AnalysisResponse::success(matches, elapsed_ms))
            }
            Err(err) => {
                log::error!(
                    "Text analysis failed for {location} after {elapsed_ms} ms: {err}"
                );
                Err(err)
            }
        }
    }

    /// Stream the source through the chunker, matching each chunk as soon as it is complete.
    async fn run<S>(&self, source: &mut S, words: WordSet) -> Result<Vec<WordMatch>>
    where
        S: TextSource + ?Sized,
    {
        let words = Arc::new(words);
        let mut decoder = LineDecoder::new();
        let mut chunker = self.chunker.line_chunker();
        let mut tasks: JoinSet<Batch> = JoinSet::new();
        let mut batches = Vec::new();
        let mut dispatched = 0usize;

        while let Some(block) = source.next_block().await? {
            for line in decoder.push(&block) {
                if let Some(chunk) = chunker.push_line(line) {
                    self.dispatch(&mut tasks, &mut batches, chunk, &words).await?;
                    dispatched += 1;
                }
            }
            while let Some(joined) = tasks.try_join_next() {
                batches.push(settle(joined)?);
            }
        }
        if let Some(line) = decoder.finish() {
            if let Some(chunk) = chunker.push_line(line) {
                self.dispatch(&mut tasks, &mut batches, chunk, &words).await?;
                dispatched += 1;
            }
        }
        if let Some(chunk) = chunker.finish() {
            self.dispatch(&mut tasks, &mut batches, chunk, &words).await?;
            dispatched += 1;
        }

        log::info!(
            "Successfully read {dispatched} chunks from {} ({} bytes)",
            source.location(),
            decoder.bytes_seen()
        );
        log::debug!("{}", chunker.stats());

        while let Some(joined) = tasks.join_next().await {
            batches.push(settle(joined)?);
        }
        Ok(aggregate(batches))
    }

    /// Queue `chunk` for matching.
    ///
    /// While the pool queue is full, this request's own finished tasks are settled first;
    /// the request fails only when it has nothing left to wait for.
    async fn dispatch(
        &self,
        tasks: &mut JoinSet<Batch>,
        batches: &mut Vec<Vec<MatchRecord>>,
        chunk: TextChunk,
        words: &Arc<WordSet>,
    ) -> Result<()> {
        let slot = loop {
            if let Some(slot) = self.pool.try_reserve() {
                break slot;
            }
            match tasks.join_next().await {
                Some(joined) => batches.push(settle(joined)?),
                None => return Err(self.pool.queue_full()),
            }
        };

        let words = Arc::clone(words);
        let matcher = self.matcher;
        self.pool.spawn(slot, tasks, move || matcher(&chunk, &words));
        Ok(())
    }
}

fn settle(joined: std::result::Result<Batch, JoinError>) -> Batch {
    joined.map_err(|err| AnalysisError::internal(format!("matcher task failed: {err}")))?
}
