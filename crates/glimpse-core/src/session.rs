//! The search session: one explicit state object owning the result list,
//! pagination counters, and the retained query set, mutated only through its
//! operations so the request/response sequencing is deterministic and
//! testable without a rendering environment.
//!
//! Fresh search and page navigation fail differently on purpose: a failed
//! fresh search clears the grid, a failed page navigation keeps it. Page
//! navigation is also single-flight; a fresh search is not.

use crate::error::Result;
use crate::model::{FilterSet, Pagination, Query, SearchRequest, SearchResponse, SearchResult};
use crate::search::SearchBackend;

pub struct SearchSession<B: SearchBackend> {
    backend: B,
    page_size: u32,
    filters: Option<FilterSet>,
    /// Query set of the most recent search action, reused verbatim by page
    /// navigation so user input is never re-encoded.
    last_queries: Vec<Query>,
    results: Vec<SearchResult>,
    pagination: Pagination,
    loading: bool,
}

impl<B: SearchBackend> SearchSession<B> {
    pub fn new(backend: B, page_size: u32, filters: Option<FilterSet>) -> Self {
        Self {
            backend,
            page_size: page_size.max(1),
            filters,
            last_queries: Vec::new(),
            results: Vec::new(),
            pagination: Pagination::default(),
            loading: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn last_queries(&self) -> &[Query] {
        &self.last_queries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_go_prev(&self) -> bool {
        !self.loading && self.pagination.current_page > 1
    }

    pub fn can_go_next(&self) -> bool {
        !self.loading && self.pagination.current_page < self.pagination.total_pages
    }

    fn request_for_page(&self, page: u32) -> SearchRequest {
        SearchRequest::new(self.last_queries.clone(), page, self.page_size)
            .with_filters(self.filters.clone())
    }

    /// Run a fresh search. Always resets to page 1. The query list is
    /// retained whatever the outcome, so pagination can reuse it later.
    /// On backend or transport failure the result list and pagination are
    /// cleared before the error is returned.
    pub async fn search(&mut self, queries: Vec<Query>) -> Result<()> {
        crate::model::validate_queries(&queries)?;

        self.last_queries = queries;
        self.loading = true;
        let request = self.request_for_page(1);

        match self.backend.search(&request).await {
            Ok(response) => {
                self.loading = false;
                self.apply_fresh(response);
                Ok(())
            }
            Err(err) => {
                self.loading = false;
                self.results.clear();
                self.pagination = Pagination::default();
                Err(err)
            }
        }
    }

    /// Navigate to page `n` reusing the retained queries. Out-of-range pages
    /// and navigation while a request is in flight are no-ops (`Ok(false)`),
    /// with no network call. On success `current_page` is set to `n`
    /// directly; totals come from the response. On failure the existing
    /// results and pagination are left untouched, unlike a fresh search.
    pub async fn go_to_page(&mut self, n: u32) -> Result<bool> {
        if self.loading
            || n < 1
            || n > self.pagination.total_pages
            || self.last_queries.is_empty()
        {
            return Ok(false);
        }

        self.loading = true;
        let request = self.request_for_page(n);

        match self.backend.search(&request).await {
            Ok(response) => {
                self.loading = false;
                self.results = response.results;
                self.pagination = Pagination {
                    current_page: n,
                    total_pages: response.pagination.total_pages,
                    total_results: response.pagination.total_results,
                    has_more: n < response.pagination.total_pages,
                };
                Ok(true)
            }
            Err(err) => {
                self.loading = false;
                Err(err)
            }
        }
    }

    /// Keyboard shortcut target. Same boundary checks as [`go_to_page`];
    /// no direct state mutation.
    ///
    /// [`go_to_page`]: Self::go_to_page
    pub async fn next_page(&mut self) -> Result<bool> {
        self.go_to_page(self.pagination.current_page.saturating_add(1))
            .await
    }

    pub async fn prev_page(&mut self) -> Result<bool> {
        self.go_to_page(self.pagination.current_page.saturating_sub(1))
            .await
    }

    fn apply_fresh(&mut self, response: SearchResponse) {
        self.results = response.results;
        self.pagination = response.pagination;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GlimpseError;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    enum Reply {
        Ok(SearchResponse),
        Err(GlimpseError),
        /// Never resolves; simulates a hung in-flight request.
        Hang,
    }

    #[derive(Clone)]
    struct MockBackend {
        script: Arc<Mutex<VecDeque<Reply>>>,
        seen: Arc<Mutex<Vec<SearchRequest>>>,
    }

    impl MockBackend {
        fn new(script: Vec<Reply>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into_iter().collect())),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn requests(&self) -> Vec<SearchRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl SearchBackend for MockBackend {
        async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
            self.seen.lock().unwrap().push(request.clone());
            let reply = self.script.lock().unwrap().pop_front().expect("script ran dry");
            match reply {
                Reply::Ok(response) => Ok(response),
                Reply::Err(err) => Err(err),
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    fn result(id: &str) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            url: format!("https://cdn.example.com/{id}.mp4"),
            score: 0.9,
            start_time: None,
            end_time: None,
            duration: None,
            thumbnail_url: None,
            title: None,
            match_type: None,
            description: None,
            transcript: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn response(count: usize, current_page: u32, total_pages: u32, total_results: u64) -> Reply {
        Reply::Ok(SearchResponse {
            results: (0..count).map(|i| result(&format!("r{i}"))).collect(),
            pagination: Pagination {
                current_page,
                total_pages,
                total_results,
                has_more: current_page < total_pages,
            },
        })
    }

    fn queries(term: &str) -> Vec<Query> {
        vec![Query::text(term, "multimodal")]
    }

    #[tokio::test]
    async fn test_fresh_search_resets_to_page_one() {
        let backend = MockBackend::new(vec![response(10, 1, 2, 15)]);
        let mut session = SearchSession::new(backend.clone(), 10, None);

        session.search(queries("cat")).await.unwrap();

        assert_eq!(session.results().len(), 10);
        assert_eq!(session.pagination().current_page, 1);
        assert_eq!(session.pagination().total_results, 15);
        assert!(session.can_go_next());
        assert!(!session.can_go_prev());

        let sent = backend.requests();
        assert_eq!(sent[0].page, 1);
        assert_eq!(sent[0].offset_position, 0);
    }

    #[tokio::test]
    async fn test_invalid_queries_stop_before_the_network() {
        let backend = MockBackend::new(vec![]);
        let mut session = SearchSession::new(backend.clone(), 10, None);

        let err = session.search(vec![]).await.unwrap_err();
        assert!(matches!(err, GlimpseError::Validation(_)));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fresh_search_failure_clears_results() {
        let backend = MockBackend::new(vec![
            response(10, 1, 2, 15),
            Reply::Err(GlimpseError::backend(500, "backend down")),
        ]);
        let mut session = SearchSession::new(backend.clone(), 10, None);

        session.search(queries("cat")).await.unwrap();
        assert_eq!(session.results().len(), 10);

        let err = session.search(queries("dog")).await.unwrap_err();
        assert!(matches!(err, GlimpseError::Backend { status: 500, .. }));
        assert!(session.results().is_empty());
        assert_eq!(session.pagination(), Pagination::default());
        // The failed search's queries are still retained.
        assert_eq!(session.last_queries()[0].value, "dog");
    }

    #[tokio::test]
    async fn test_page_navigation_reuses_retained_queries() {
        let backend = MockBackend::new(vec![response(10, 1, 2, 15), response(5, 2, 2, 15)]);
        let mut session = SearchSession::new(backend.clone(), 10, None);

        session.search(queries("cat")).await.unwrap();
        assert!(session.go_to_page(2).await.unwrap());

        let sent = backend.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].queries, sent[0].queries);
        assert_eq!(sent[1].page, 2);
        assert_eq!(sent[1].offset_position, 10);

        assert_eq!(session.pagination().current_page, 2);
        assert!(session.can_go_prev());
        assert!(!session.can_go_next());
    }

    #[tokio::test]
    async fn test_current_page_ignores_response_payload() {
        // The backend reports a bogus currentPage; the session trusts the
        // page it asked for.
        let backend = MockBackend::new(vec![response(10, 1, 3, 25), response(10, 99, 3, 25)]);
        let mut session = SearchSession::new(backend, 10, None);

        session.search(queries("cat")).await.unwrap();
        session.go_to_page(2).await.unwrap();
        assert_eq!(session.pagination().current_page, 2);
        assert!(session.pagination().has_more);
    }

    #[tokio::test]
    async fn test_out_of_range_pages_are_no_ops() {
        let backend = MockBackend::new(vec![response(10, 1, 2, 15)]);
        let mut session = SearchSession::new(backend.clone(), 10, None);
        session.search(queries("cat")).await.unwrap();

        assert!(!session.go_to_page(0).await.unwrap());
        assert!(!session.go_to_page(3).await.unwrap());
        // Only the original search hit the backend.
        assert_eq!(backend.requests().len(), 1);
        assert_eq!(session.pagination().current_page, 1);
    }

    #[tokio::test]
    async fn test_navigation_before_any_search_is_a_no_op() {
        let backend = MockBackend::new(vec![]);
        let mut session = SearchSession::new(backend.clone(), 10, None);
        assert!(!session.go_to_page(1).await.unwrap());
        assert!(!session.next_page().await.unwrap());
        assert!(!session.prev_page().await.unwrap());
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_pagination_failure_preserves_results() {
        let backend = MockBackend::new(vec![
            response(10, 1, 2, 15),
            Reply::Err(GlimpseError::Transport("connection reset".into())),
        ]);
        let mut session = SearchSession::new(backend, 10, None);

        session.search(queries("cat")).await.unwrap();
        let before: Vec<String> = session.results().iter().map(|r| r.id.clone()).collect();

        let err = session.go_to_page(2).await.unwrap_err();
        assert!(matches!(err, GlimpseError::Transport(_)));

        let after: Vec<String> = session.results().iter().map(|r| r.id.clone()).collect();
        assert_eq!(before, after);
        assert_eq!(session.pagination().current_page, 1);
        assert!(session.can_go_next());
    }

    #[tokio::test]
    async fn test_page_navigation_is_single_flight() {
        let backend = MockBackend::new(vec![response(10, 1, 3, 25), Reply::Hang]);
        let mut session = SearchSession::new(backend.clone(), 10, None);
        session.search(queries("cat")).await.unwrap();

        {
            // Start a navigation that hangs, then abandon it mid-flight.
            let fut = session.go_to_page(2);
            tokio::pin!(fut);
            tokio::select! {
                _ = &mut fut => panic!("hung request resolved"),
                _ = tokio::time::sleep(std::time::Duration::from_millis(10)) => {}
            }
        }

        // While the request is considered in flight, further navigation is
        // a no-op with no network call.
        assert!(session.is_loading());
        assert!(!session.go_to_page(3).await.unwrap());
        assert!(!session.can_go_next() && !session.can_go_prev());
        assert_eq!(backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_filters_ride_along_on_every_request() {
        let backend = MockBackend::new(vec![response(1, 1, 2, 11), response(1, 2, 2, 11)]);
        let mut session =
            SearchSession::new(backend.clone(), 10, Some(FilterSet::video_only()));

        session.search(queries("cat")).await.unwrap();
        session.go_to_page(2).await.unwrap();

        for sent in backend.requests() {
            let filters = sent.filters.expect("filters missing");
            assert_eq!(filters.and[0].key, "modality");
        }
    }
}
