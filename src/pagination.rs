use std::time::Duration;

use crate::error::EngineError;
use crate::model::binding::{parse_select_results, Binding, Page};
use crate::query::PagedQuery;
use crate::session::EndpointSession;

const SHRINK_FACTOR: f64 = 0.85;
const MIN_LIMIT_FACTOR: f64 = 0.60;
const MAX_SHRINKS_PER_OFFSET: u32 = 3;
const COOLDOWN_AFTER_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_PAGES: u64 = 10_000;

/// The floor a page size is never shrunk below for a given starting chunk size.
fn min_limit_for(chunk_size: u32) -> u32 {
    ((chunk_size as f64) * MIN_LIMIT_FACTOR).floor().max(1.0) as u32
}

/// Shrink `current` by [`SHRINK_FACTOR`], never going below `min_limit`.
fn shrink_limit(current: u32, min_limit: u32) -> u32 {
    (((current as f64) * SHRINK_FACTOR).floor().max(min_limit as f64) as u32).max(min_limit)
}

/// Walks a [`PagedQuery`] against an [`EndpointSession`], collecting every
/// binding across pages. Shrinks the page size on timeout and keeps the
/// reduced size for subsequent pages (the endpoint is slow, not unlucky).
/// If every shrink still times out at one offset, pagination is abandoned
/// and the timeout is propagated rather than silently truncating results.
pub struct PaginatedIterator<'a> {
    session: &'a mut EndpointSession,
    query: PagedQuery,
    accept: &'static str,
    limit: u32,
    min_limit: u32,
    delay: Duration,
    offset: u64,
    pages_yielded: u64,
    done: bool,
}

impl<'a> PaginatedIterator<'a> {
    pub fn new(session: &'a mut EndpointSession, query: PagedQuery, accept: &'static str, chunk_size: u32, delay: Duration) -> Self {
        let min_limit = min_limit_for(chunk_size);
        Self {
            session,
            query,
            accept,
            limit: chunk_size.max(1),
            min_limit,
            delay,
            offset: 0,
            pages_yielded: 0,
            done: false,
        }
    }

    /// Collect every page into a flat binding list.
    pub async fn collect_all(mut self) -> Result<Vec<Binding>, EngineError> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await? {
            all.extend(page.bindings);
        }
        Ok(all)
    }

    async fn next_page(&mut self) -> Result<Option<Page>, EngineError> {
        if self.done || self.pages_yielded >= MAX_PAGES {
            return Ok(None);
        }

        let mut shrinks = 0u32;

        loop {
            let rendered = self.query.render(self.offset, self.limit);
            match self.session.execute(&rendered, self.accept).await {
                Ok(body) => {
                    let page = parse_select_results(&body)?;
                    let page_len = page.len() as u32;

                    self.pages_yielded += 1;
                    if page_len < self.limit {
                        self.done = true;
                    } else {
                        self.offset += page_len as u64;
                        if !self.delay.is_zero() {
                            self.session.sleep_or_cancel(self.delay).await?;
                        }
                    }
                    return Ok(Some(page));
                }
                Err(EngineError::Timeout(d)) => {
                    if shrinks >= MAX_SHRINKS_PER_OFFSET {
                        tracing::warn!(offset = self.offset, "abandoning pagination after repeated timeouts");
                        self.done = true;
                        return Err(EngineError::Timeout(d));
                    }
                    shrinks += 1;
                    let shrunk = shrink_limit(self.limit, self.min_limit);
                    tracing::warn!(offset = self.offset, old_limit = self.limit, new_limit = shrunk, "shrinking page size after timeout");
                    self.limit = shrunk;
                    self.session.sleep_or_cancel(COOLDOWN_AFTER_TIMEOUT).await?;
                    continue;
                }
                Err(err) => {
                    tracing::warn!(offset = self.offset, %err, "pagination ended by error");
                    self.done = true;
                    return Err(err);
                }
            }
        }
    }
}
