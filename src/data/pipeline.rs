use super::filter::{self, FilterCriteria};
use super::model::ListingCollection;
use super::search;
use super::sort;
use super::summary::{self, Summary};

/// What the rendering layer receives after one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub listings: ListingCollection,
    pub summary: Summary,
}

/// filter → search → sort → summarize. Search runs even when the criteria
/// bypass filtering.
pub fn run(listings: &ListingCollection, criteria: &FilterCriteria) -> PipelineOutput {
    let filtered = filter::apply(listings, criteria);
    let searched = search::apply(&filtered, &criteria.search_query);
    let sorted = sort::apply(&searched, criteria.sort_key, criteria.sort_ascending);
    let summary = summary::summarize(&sorted);

    log::debug!(
        "pipeline: {} listings → {} filtered → {} searched (sort by {} {})",
        listings.len(),
        filtered.len(),
        sorted.len(),
        criteria.sort_key,
        if criteria.sort_ascending { "asc" } else { "desc" },
    );

    PipelineOutput {
        listings: sorted,
        summary,
    }
}
