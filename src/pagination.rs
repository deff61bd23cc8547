/// Items per page as presented locally.
pub const LOCAL_PAGE_SIZE: usize = 10;

/// Fixed page size of the catalog search endpoint.
pub const UPSTREAM_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamWindow {
    /// 1-based upstream page number.
    pub page: u32,
    /// Index of the first local item within that upstream page.
    pub offset: usize,
}

/// Maps a 1-based local page onto the upstream page that contains it.
///
/// Pages below 1 are treated as page 1. A zero upstream page size is treated as 1.
pub fn resolve(
    local_page: u32,
    local_page_size: usize,
    upstream_page_size: usize,
) -> UpstreamWindow {
    let upstream_page_size = upstream_page_size.max(1);
    let start = (local_page.max(1) as usize - 1) * local_page_size;

    UpstreamWindow {
        page: (start / upstream_page_size + 1).min(u32::MAX as usize) as u32,
        offset: start % upstream_page_size,
    }
}

/// Slice `[offset, offset + len)` of an upstream page; short pages yield the remainder.
pub fn local_slice<T>(mut items: Vec<T>, offset: usize, len: usize) -> Vec<T> {
    if offset >= items.len() {
        return Vec::new();
    }
    items.truncate(offset.saturating_add(len));
    items.split_off(offset)
}

pub fn total_pages(total_count: u64, local_page_size: usize) -> u32 {
    let size = local_page_size.max(1) as u64;
    total_count.div_ceil(size).clamp(1, u32::MAX as u64) as u32
}
