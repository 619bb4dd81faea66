//! Chapter ordering
//!
//! Derives the chapter order from remote branch names and answers which
//! chapters follow a given branch.

mod parse;

pub use parse::parse_chapter;

use crate::error::{Error, Result};
use crate::types::{BranchChain, Chapter};
use tracing::debug;

/// Build a chapter chain from a set of branch names
///
/// Branches without a chapter token are left out of the chain. Fails with
/// [`Error::EmptyChain`] when no branch qualifies and with
/// [`Error::DuplicateChapter`] when two branches share an index.
pub fn order<I, S>(branch_names: I) -> Result<BranchChain>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut chapters: Vec<Chapter> = Vec::new();

    for name in branch_names {
        match parse_chapter(name.as_ref()) {
            Ok(chapter) => chapters.push(chapter),
            Err(e) => debug!("Excluding branch from chain: {e}"),
        }
    }

    if chapters.is_empty() {
        return Err(Error::EmptyChain);
    }

    chapters.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.name.cmp(&b.name)));
    chapters.dedup_by(|b, a| a.name == b.name);

    if let Some(pair) = chapters.windows(2).find(|w| w[0].index == w[1].index) {
        return Err(Error::DuplicateChapter {
            index: pair[0].index,
            first: pair[0].name.clone(),
            second: pair[1].name.clone(),
        });
    }

    debug!(
        "Chapter chain: {:?}",
        chapters.iter().map(|c| &c.name).collect::<Vec<_>>()
    );

    Ok(BranchChain { chapters })
}

/// Chapters that come after `branch`, in ascending order
///
/// Empty when `branch` is the last chapter.
pub fn downstream_of(chain: &BranchChain, branch: &str) -> Result<Vec<Chapter>> {
    let position = chain
        .chapters()
        .iter()
        .position(|c| c.name == branch)
        .ok_or_else(|| Error::BranchNotFound(branch.to_string()))?;

    Ok(chain.chapters()[position + 1..].to_vec())
}
