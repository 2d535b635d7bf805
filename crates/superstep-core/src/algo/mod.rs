//! Built-in vertex programs.

mod pagerank;
mod sssp;
mod wcc;

#[cfg(test)]
mod tests;

pub use pagerank::PageRank;
pub use sssp::SingleSourceShortestPaths;
pub use wcc::ConnectedComponents;

/// Smallest message, or `None` if there is none.
fn min_message(messages: impl Iterator<Item = f64>) -> Option<f64> {
    messages.fold(None, |acc, message| {
        Some(acc.map_or(message, |current: f64| current.min(message)))
    })
}
