//! Chapter token parsing
//!
//! A chapter branch carries a run of digits followed by an underscore, e.g.
//! `01_create_minimal_charm` or `tutorial/3_add_config`. The first such run
//! is the chapter index.

use crate::error::{Error, Result};
use crate::types::Chapter;
use regex::Regex;
use std::sync::OnceLock;

fn chapter_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)_").expect("hardcoded chapter regex is valid"))
}

/// Parse a branch name into a [`Chapter`]
pub fn parse_chapter(name: &str) -> Result<Chapter> {
    let digits = chapter_token()
        .captures(name)
        .and_then(|c| c.get(1))
        .ok_or_else(|| Error::MalformedBranchName(name.to_string()))?;

    let index = digits
        .as_str()
        .parse::<u32>()
        .map_err(|_| Error::MalformedBranchName(name.to_string()))?;

    Ok(Chapter {
        index,
        name: name.to_string(),
    })
}
