// src/pipeline/history.rs

//! Change log history queries.

use crate::error::Result;
use crate::models::{ChangeLogEntry, ChangeLogPage, PageRequest};
use crate::storage::ChangeLogStore;

/// Load a page of change logs from raw page/limit values.
pub async fn load_history(
    store: &dyn ChangeLogStore,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<ChangeLogPage> {
    let request = PageRequest::new(page, limit);
    log::debug!(
        "Loading change log page {} (limit {})",
        request.page,
        request.limit
    );
    store.list(request).await
}

/// Render one entry as a line of text.
pub fn format_entry(entry: &ChangeLogEntry) -> String {
    format!(
        "{}  {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        entry.summary()
    )
}

/// Render a page as lines of text, with detail for additions and removals.
pub fn render_page(page: &ChangeLogPage) -> Vec<String> {
    let mut lines = Vec::new();
    let p = &page.pagination;
    lines.push(format!(
        "Page {}/{} ({} change logs total)",
        p.page,
        p.total_pages.max(1),
        p.total
    ));

    for entry in &page.data {
        lines.push(format_entry(entry));
        for added in &entry.added_faculties {
            lines.push(format!(
                "    + {} {} ({})",
                added.employee_id, added.name, added.department
            ));
        }
        for deleted in &entry.deleted_faculties {
            lines.push(format!(
                "    - {} {} ({})",
                deleted.employee_id, deleted.name, deleted.department
            ));
        }
    }
    lines
}
