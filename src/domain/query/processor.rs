//! In-process realization of a list query over a materialized collection.
//!
//! filter -> search -> sort -> count -> window -> assemble

use super::field::ListEntity;
use super::page::ListPage;
use super::plan::ListQuery;
use super::search::{self, SearchResult};

/// Runs `query` over `items`. Input order does not matter: ties on every
/// sort term resolve by id, as in the SQL pipeline.
pub fn process<'a, T, I>(query: &ListQuery, items: I) -> ListPage<T>
where
    T: ListEntity,
    I: IntoIterator<Item = &'a T>,
{
    let mut matched: Vec<(&T, Option<SearchResult>)> = items
        .into_iter()
        .filter(|item| item.is_visible() && query.filters.matches(*item))
        .filter_map(|item| match &query.search {
            None => Some((item, None)),
            Some(q) => search::evaluate(q, item).map(|r| (item, Some(r))),
        })
        .collect();

    matched.sort_by(|(a, ra), (b, rb)| query.sort.compare(*a, score_of(ra), *b, score_of(rb)));

    let total = matched.len() as u64;
    let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(query.pagination.limit()).unwrap_or(usize::MAX);

    let (data, results): (Vec<T>, Vec<Option<SearchResult>>) = matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(item, result)| (item.clone(), result))
        .unzip();

    let search_results = query
        .search
        .as_ref()
        .map(|_| results.into_iter().flatten().collect());

    ListPage::assemble(data, search_results, &query.pagination, total)
}

fn score_of(result: &Option<SearchResult>) -> f64 {
    result.as_ref().map_or(0.0, |r| r.score)
}
