//! Paginated fetcher for "keep fetching until no next page" protocols.
//!
//! The remote directory serves collections page by page; each page says
//! whether a further one exists. The fetcher walks pages in ascending order,
//! pacing requests with a fixed inter-page delay, and favours liveness over
//! completeness of a single page: a page that fails to fetch or decode is
//! logged and yielded as empty, and pagination moves on. A bounded
//! consecutive-failure cutoff stops a run that can no longer make progress.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::Stream;
use futures_util::stream;
use tracing::warn;

use super::ports::{DirectorySource, RemoteRecord, RemoteRecordKind, Sleeper};

/// Pacing and cutoff settings for one fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Fixed delay between successive page requests.
    pub page_delay: Duration,
    /// Consecutive failed pages after which a kind's pagination stops.
    pub max_consecutive_failures: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(1),
            max_consecutive_failures: 3,
        }
    }
}

struct PageCursor {
    page: u32,
    consecutive_failures: u32,
    done: bool,
}

/// Streams the items of a remote collection, one page at a time.
pub struct PaginatedFetcher {
    source: Arc<dyn DirectorySource>,
    sleeper: Arc<dyn Sleeper>,
    config: FetcherConfig,
}

impl PaginatedFetcher {
    /// Build a fetcher over a directory source.
    pub fn new(
        source: Arc<dyn DirectorySource>,
        sleeper: Arc<dyn Sleeper>,
        config: FetcherConfig,
    ) -> Self {
        Self {
            source,
            sleeper,
            config,
        }
    }

    /// Page through `kind` starting at page 1, yielding each page's items.
    ///
    /// The stream ends after the first page reporting `next = false`, or
    /// once the consecutive-failure cutoff is hit. Failed pages yield an
    /// empty item vector so consumers observe the gap without aborting.
    pub fn pages(
        &self,
        kind: RemoteRecordKind,
        created_after: Option<DateTime<Utc>>,
    ) -> impl Stream<Item = Vec<RemoteRecord>> + Send + use<> {
        let source = Arc::clone(&self.source);
        let sleeper = Arc::clone(&self.sleeper);
        let config = self.config.clone();
        let cursor = PageCursor {
            page: 1,
            consecutive_failures: 0,
            done: false,
        };

        stream::unfold(cursor, move |mut cursor| {
            let source = Arc::clone(&source);
            let sleeper = Arc::clone(&sleeper);
            let config = config.clone();
            async move {
                if cursor.done {
                    return None;
                }
                if cursor.page > 1 {
                    sleeper.sleep(config.page_delay).await;
                }

                match source.fetch_page(kind, cursor.page, created_after).await {
                    Ok(page) => {
                        cursor.consecutive_failures = 0;
                        cursor.done = !page.next;
                        cursor.page += 1;
                        Some((page.items, cursor))
                    }
                    Err(error) => {
                        warn!(
                            kind = kind.as_str(),
                            page = cursor.page,
                            error = %error,
                            "directory page abandoned; pagination continues",
                        );
                        cursor.consecutive_failures += 1;
                        if cursor.consecutive_failures >= config.max_consecutive_failures {
                            cursor.done = true;
                        }
                        cursor.page += 1;
                        Some((Vec::new(), cursor))
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use futures_util::StreamExt;

    use super::*;
    use crate::domain::ports::{
        DirectoryPage, DirectorySourceError, ImmediateSleeper, RemoteAccess,
    };

    fn record(id: &str) -> RemoteRecord {
        RemoteRecord {
            id: id.to_owned(),
            label: format!("record {id}"),
            acronym: None,
            status: None,
            access: RemoteAccess::Open,
            created: Utc::now(),
            operation_ids: Vec::new(),
            metadata: serde_json::Value::Null,
        }
    }

    struct ScriptedSource {
        script: Mutex<Vec<Result<DirectoryPage, DirectorySourceError>>>,
        requested_pages: Mutex<Vec<u32>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<DirectoryPage, DirectorySourceError>>) -> Self {
            Self {
                script: Mutex::new(script),
                requested_pages: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<u32> {
            self.requested_pages.lock().expect("pages mutex").clone()
        }
    }

    #[async_trait]
    impl DirectorySource for ScriptedSource {
        async fn fetch_page(
            &self,
            _kind: RemoteRecordKind,
            page: u32,
            _created_after: Option<DateTime<Utc>>,
        ) -> Result<DirectoryPage, DirectorySourceError> {
            self.requested_pages.lock().expect("pages mutex").push(page);
            let mut script = self.script.lock().expect("script mutex");
            if script.is_empty() {
                return Err(DirectorySourceError::transport("script exhausted"));
            }
            script.remove(0)
        }
    }

    struct CountingSleeper(std::sync::atomic::AtomicU32);

    #[async_trait]
    impl Sleeper for CountingSleeper {
        async fn sleep(&self, _duration: Duration) {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    fn page(items: Vec<RemoteRecord>, next: bool) -> Result<DirectoryPage, DirectorySourceError> {
        Ok(DirectoryPage { items, next })
    }

    #[tokio::test]
    async fn requests_pages_in_ascending_order_until_last() {
        let source = Arc::new(ScriptedSource::new(vec![
            page(vec![record("1")], true),
            page(vec![record("2")], true),
            page(vec![record("3")], false),
            page(vec![record("never")], false),
        ]));
        let fetcher = PaginatedFetcher::new(
            Arc::clone(&source) as Arc<dyn DirectorySource>,
            Arc::new(ImmediateSleeper),
            FetcherConfig::default(),
        );

        let pages: Vec<Vec<RemoteRecord>> =
            fetcher.pages(RemoteRecordKind::Operation, None).collect().await;

        assert_eq!(pages.len(), 3, "the stream ends at the first next=false");
        assert_eq!(source.requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failed_page_yields_empty_and_pagination_continues() {
        let source = Arc::new(ScriptedSource::new(vec![
            page(vec![record("1")], true),
            Err(DirectorySourceError::decode("not json")),
            page(vec![record("3")], false),
        ]));
        let fetcher = PaginatedFetcher::new(
            Arc::clone(&source) as Arc<dyn DirectorySource>,
            Arc::new(ImmediateSleeper),
            FetcherConfig::default(),
        );

        let pages: Vec<Vec<RemoteRecord>> =
            fetcher.pages(RemoteRecordKind::Disaster, None).collect().await;

        assert_eq!(pages.len(), 3);
        assert!(pages[1].is_empty(), "the abandoned page appears as empty");
        assert_eq!(pages[2][0].id, "3");
        assert_eq!(source.requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn stops_after_consecutive_failure_cutoff() {
        let source = Arc::new(ScriptedSource::new(vec![
            Err(DirectorySourceError::transport("down")),
            Err(DirectorySourceError::transport("down")),
            Err(DirectorySourceError::transport("down")),
            page(vec![record("unreached")], false),
        ]));
        let fetcher = PaginatedFetcher::new(
            Arc::clone(&source) as Arc<dyn DirectorySource>,
            Arc::new(ImmediateSleeper),
            FetcherConfig::default(),
        );

        let pages: Vec<Vec<RemoteRecord>> =
            fetcher.pages(RemoteRecordKind::Operation, None).collect().await;

        assert_eq!(pages.len(), 3, "the cutoff caps a run that makes no progress");
        assert!(pages.iter().all(Vec::is_empty));
        assert_eq!(source.requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn sleeps_between_pages_but_not_before_the_first() {
        let sleeper = Arc::new(CountingSleeper(std::sync::atomic::AtomicU32::new(0)));
        let source = Arc::new(ScriptedSource::new(vec![
            page(vec![record("1")], true),
            page(vec![record("2")], true),
            page(vec![record("3")], false),
        ]));
        let fetcher = PaginatedFetcher::new(
            source as Arc<dyn DirectorySource>,
            Arc::clone(&sleeper) as Arc<dyn Sleeper>,
            FetcherConfig::default(),
        );

        let _pages: Vec<Vec<RemoteRecord>> =
            fetcher.pages(RemoteRecordKind::Bundle, None).collect().await;

        assert_eq!(sleeper.0.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
