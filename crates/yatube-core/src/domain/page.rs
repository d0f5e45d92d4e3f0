use serde::Serialize;

/// Number of posts per listing page.
pub const POSTS_PER_PAGE: u64 = 10;

/// One fixed-size slice of an ordered list, as returned by listing queries.
///
/// `number` is 1-based. A request past the last page yields an empty
/// `object_list` with the real totals.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub total_pages: u64,
    pub count: u64,
}

impl<T> Page<T> {
    /// Build a page from a full ordered list, Django-paginator style:
    /// full pages of `per_page` items, remainder on the last page.
    pub fn slice(items: Vec<T>, number: u64, per_page: u64) -> Self {
        let count = items.len() as u64;
        let total_pages = count.div_ceil(per_page).max(1);
        let number = number.max(1);
        let start = (number - 1).saturating_mul(per_page) as usize;
        let object_list: Vec<T> = items
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();

        Self {
            object_list,
            number,
            total_pages,
            count,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            object_list: self.object_list.into_iter().map(f).collect(),
            number: self.number,
            total_pages: self.total_pages,
            count: self.count,
        }
    }
}
