//! Paginated fetch driver.
//!
//! Iterates the source collection page by page (1-indexed), handing each
//! page to a handler. The loop ends on natural exhaustion (empty page or
//! no-more-records signal) or voluntarily when the source's remaining-call
//! quota drops to the configured floor, before the next page is requested.

use async_trait::async_trait;
use tracing::{info, instrument};

use bridge_core::{RecordSource, RecordType, SourceRecord};

use crate::error::SyncResult;

/// Receives each fetched page of records.
#[async_trait]
pub trait PageHandler: Send {
    /// Process one page. An error here aborts the drive.
    async fn handle_page(&mut self, records: Vec<SourceRecord>) -> SyncResult<()>;
}

/// Why the drive stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEnd {
    /// The source reported no further records.
    Exhausted,
    /// The quota signal reached the floor; the run is partial.
    QuotaFloor {
        /// The remaining-call count that tripped the floor.
        remaining: u32,
    },
}

/// Summary of one drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDriveReport {
    /// Pages fetched, including a trailing empty page.
    pub pages_fetched: u32,
    /// Why the drive stopped.
    pub end: PageEnd,
}

/// Drives pagination over a record source.
pub struct PaginationDriver<'a> {
    source: &'a dyn RecordSource,
    quota_floor: u32,
}

impl<'a> PaginationDriver<'a> {
    /// Create a driver with the given quota floor.
    #[must_use]
    pub fn new(source: &'a dyn RecordSource, quota_floor: u32) -> Self {
        Self {
            source,
            quota_floor,
        }
    }

    /// Fetch pages until exhaustion or the quota floor.
    #[instrument(skip(self, handler), fields(record_type = %record_type))]
    pub async fn drive(
        &self,
        record_type: RecordType,
        handler: &mut dyn PageHandler,
    ) -> SyncResult<PageDriveReport> {
        let mut page = 1u32;
        let mut pages_fetched = 0u32;

        loop {
            let fetched = self.source.fetch_page(record_type, page).await?;
            pages_fetched += 1;

            if fetched.records.is_empty() {
                return Ok(PageDriveReport {
                    pages_fetched,
                    end: PageEnd::Exhausted,
                });
            }

            handler.handle_page(fetched.records).await?;

            if !fetched.more_records {
                return Ok(PageDriveReport {
                    pages_fetched,
                    end: PageEnd::Exhausted,
                });
            }

            if let Some(remaining) = fetched.quota_remaining {
                if remaining <= self.quota_floor {
                    info!(
                        remaining,
                        floor = self.quota_floor,
                        "quota floor reached, stopping before next page"
                    );
                    return Ok(PageDriveReport {
                        pages_fetched,
                        end: PageEnd::QuotaFloor { remaining },
                    });
                }
            }

            page += 1;
        }
    }
}
