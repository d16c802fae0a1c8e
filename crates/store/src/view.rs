//! Client-side view of one paged table
//!
//! Every state change bumps a generation counter and hands out a
//! [`FetchTicket`]. A page is applied only with the ticket of the latest
//! change, so a slow response to an old request can never overwrite the rows
//! of a newer one. In-flight requests are not cancelled.

use crate::service::TableService;
use crate::store::{Page, Row};
use schemadash_schema::{
    QueryParams, ServerSideTableState, SortSpec, TableStateOptions, page_count,
};

/// Identifies the request made for one state generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub params: QueryParams,
}

/// Pagination state plus the rows last applied to it
#[derive(Debug, Clone)]
pub struct TableView {
    table: String,
    options: TableStateOptions,
    state: ServerSideTableState,
    generation: u64,
    rows: Vec<Row>,
    total_rows: usize,
}

impl TableView {
    pub fn new(table: impl Into<String>, options: TableStateOptions) -> Self {
        Self {
            table: table.into(),
            state: ServerSideTableState::new(&options),
            options,
            generation: 0,
            rows: Vec::new(),
            total_rows: 0,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn state(&self) -> &ServerSideTableState {
        &self.state
    }

    /// Rows of the last applied page
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Pages available at the current page size
    pub fn page_count(&self) -> usize {
        page_count(self.total_rows, self.state.page_size)
    }

    /// Replace the sorting; returns to the first page
    pub fn set_sorting(&mut self, sorting: Vec<SortSpec>) -> FetchTicket {
        self.state = self.state.on_sort_change(sorting);
        self.bump()
    }

    /// Move to a page, clamping the size
    pub fn set_page(&mut self, page_index: usize, page_size: usize) -> FetchTicket {
        self.state = self
            .state
            .on_page_change(page_index, page_size, &self.options);
        self.bump()
    }

    /// Ticket for re-fetching the current state
    pub fn refresh(&mut self) -> FetchTicket {
        self.bump()
    }

    fn bump(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
            params: self.state.to_query_params(&self.options),
        }
    }

    /// Apply a fetched page if its ticket is current; returns whether it was
    /// applied
    pub fn apply(&mut self, ticket: &FetchTicket, page: Page) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                table = %self.table,
                stale = ticket.generation,
                current = self.generation,
                "Discarding stale page"
            );
            return false;
        }
        self.rows = page.rows;
        self.total_rows = page.total_rows;
        true
    }

    /// Fetch the current state through `service` and apply it.
    ///
    /// On failure the previous rows stay in place; the service has already
    /// reported the error.
    pub async fn load(&mut self, service: &TableService) -> bool {
        let ticket = self.refresh();
        match service.fetch_page(&self.table, &self.state).await {
            Some(page) => self.apply(&ticket, page),
            None => false,
        }
    }
}
