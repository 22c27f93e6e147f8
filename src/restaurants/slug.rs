use std::future::Future;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_SLUG_RE: Regex = Regex::new(r"[^a-z0-9]").unwrap();
    static ref DASHES_RE: Regex = Regex::new(r"-+").unwrap();
}

/// Lower-cases, spells out æ/ø/å, turns everything else outside `[a-z0-9]` into single hyphens
/// and trims hyphens from both ends.
pub fn slugify(name: &str) -> String {
    let lowered = name
        .to_lowercase()
        .replace('æ', "ae")
        .replace('ø', "oe")
        .replace('å', "aa");
    let hyphenated = NON_SLUG_RE.replace_all(&lowered, "-");
    let collapsed = DASHES_RE.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

fn candidate(base: &str, counter: u64) -> String {
    if counter == 0 {
        base.to_string()
    } else {
        format!("{base}-{counter}")
    }
}

/// Finds the first free slug for `name`: `base`, then `base-1`, `base-2`, ...
///
/// `exists` is consulted for every candidate. A name without any slug characters never yields an
/// empty slug; numbering starts at `-1` instead. The caller still has to insert under the unique
/// constraint, this only narrows the race.
pub async fn unique_slug<F, Fut, E>(name: &str, mut exists: F) -> Result<String, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let base = slugify(name);
    let mut counter: u64 = if base.is_empty() { 1 } else { 0 };
    loop {
        let slug = candidate(&base, counter);
        if !exists(slug.clone()).await? {
            return Ok(slug);
        }
        counter += 1;
    }
}
