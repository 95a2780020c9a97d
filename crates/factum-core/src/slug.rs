//! Slug derivation — the URL-safe public identity of facts and posts.
//!
//! The algorithm is deterministic: lower-case the input, collapse every run
//! of characters outside the allowed set into a single hyphen, and strip
//! leading/trailing hyphens. The allowed set is ASCII alphanumerics plus
//! the Hangul syllable block, so non-Latin claims keep a meaningful slug
//! instead of collapsing to nothing.
//!
//! Uniqueness is not this module's concern — the store disambiguates
//! against its unique index by appending a numeric suffix.

/// Fallback used when normalization leaves nothing (e.g. all-punctuation
/// input).
pub const EMPTY_SLUG_FALLBACK: &str = "untitled";

fn is_slug_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Derive a slug from free text. Same input always yields the same output.
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  let mut pending_hyphen = false;

  for c in text.to_lowercase().chars() {
    if is_slug_char(c) {
      if pending_hyphen && !slug.is_empty() {
        slug.push('-');
      }
      pending_hyphen = false;
      slug.push(c);
    } else {
      pending_hyphen = true;
    }
  }

  if slug.is_empty() {
    EMPTY_SLUG_FALLBACK.to_owned()
  } else {
    slug
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn basic_claim() {
    assert_eq!(slugify("The sky is green"), "the-sky-is-green");
  }

  #[test]
  fn deterministic() {
    let text = "Vaccines cause autism?";
    assert_eq!(slugify(text), slugify(text));
  }

  #[test]
  fn collapses_runs_and_trims() {
    assert_eq!(slugify("  Hello --- World!!  "), "hello-world");
    assert_eq!(slugify("...leading and trailing..."), "leading-and-trailing");
  }

  #[test]
  fn keeps_digits() {
    assert_eq!(slugify("COVID-19 is over"), "covid-19-is-over");
  }

  #[test]
  fn hangul_passes_through() {
    // Non-Latin claims must not collapse to an empty slug.
    assert_eq!(slugify("지구는 평평하다"), "지구는-평평하다");
    assert_eq!(slugify("한국어 claim 123"), "한국어-claim-123");
  }

  #[test]
  fn empty_normalization_falls_back() {
    assert_eq!(slugify("!!! ???"), EMPTY_SLUG_FALLBACK);
    assert_eq!(slugify(""), EMPTY_SLUG_FALLBACK);
  }

  #[test]
  fn case_insensitive() {
    assert_eq!(slugify("The SKY is GREEN"), slugify("the sky is green"));
  }
}
