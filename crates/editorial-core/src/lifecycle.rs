//! Pre-save normalization of articles.
//!
//! Field defaults and slug derivation run here, explicitly, right before the
//! article service hands an article to the store.

use uuid::Uuid;

use crate::article::{Article, ArticleStatus, NewArticle};
use crate::error::{EditorialError, EditorialResult, FieldErrors};
use crate::slug;

/// Build a storable article from creation input.
///
/// - `status` starts as `draft`
/// - `author_id` falls back to the creating actor
/// - an explicit slug is trimmed; an absent or blank one is derived from
///   the title
pub fn prepare_new(
    input: NewArticle,
    actor_id: Option<Uuid>,
    suffix_len: usize,
) -> EditorialResult<Article> {
    let author_id = input.author_id.or(actor_id).ok_or_else(|| {
        EditorialError::ValidationFailed(FieldErrors::single("author_id", "An author is required."))
    })?;

    let mut article = Article::new(author_id, input.title);
    article.status = ArticleStatus::Draft;
    article.slug = input
        .slug
        .map(|slug| slug.trim().to_string())
        .unwrap_or_default();
    article.rubrik_id = input.rubrik_id;
    article.division_id = input.division_id;
    article.excerpt = input.excerpt;
    article.content = input.content;
    article.is_anonymous = input.is_anonymous;
    article.meta = input.meta;

    normalize(&mut article, suffix_len);
    Ok(article)
}

/// Re-derive the slug when it is blank and the title is not.
///
/// An existing slug is left alone even if the title changed; see
/// [`Article::set_title`] for the regenerating path.
///
/// # Returns
///
/// `true` if a slug was derived
pub fn normalize(article: &mut Article, suffix_len: usize) -> bool {
    if article.slug.trim().is_empty() && !article.title.trim().is_empty() {
        article.slug = slug::derive(&article.title, suffix_len);
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_new_defaults_author_and_slug() {
        let actor = Uuid::now_v7();
        let article = prepare_new(NewArticle::titled("Election night"), Some(actor), 6).unwrap();

        assert_eq!(article.author_id, actor);
        assert_eq!(article.status, ArticleStatus::Draft);
        assert!(article.slug.starts_with("election-night-"));
    }

    #[test]
    fn test_prepare_new_keeps_explicit_values() {
        let actor = Uuid::now_v7();
        let owner = Uuid::now_v7();
        let input = NewArticle {
            author_id: Some(owner),
            slug: Some("custom-slug".to_string()),
            ..NewArticle::titled("Election night")
        };

        let article = prepare_new(input, Some(actor), 6).unwrap();
        assert_eq!(article.author_id, owner);
        assert_eq!(article.slug, "custom-slug");
    }

    #[test]
    fn test_prepare_new_trims_explicit_slug() {
        let input = NewArticle {
            slug: Some(" fixed ".to_string()),
            ..NewArticle::titled("Election night")
        };
        let article = prepare_new(input, Some(Uuid::now_v7()), 6).unwrap();
        assert_eq!(article.slug, "fixed");

        let input = NewArticle {
            slug: Some("   ".to_string()),
            ..NewArticle::titled("Election night")
        };
        let article = prepare_new(input, Some(Uuid::now_v7()), 6).unwrap();
        assert!(article.slug.starts_with("election-night-"));
    }

    #[test]
    fn test_prepare_new_requires_an_author() {
        let err = prepare_new(NewArticle::titled("Orphan"), None, 6).unwrap_err();
        assert!(err.field_errors().unwrap().has("author_id"));
    }

    #[test]
    fn test_normalize_only_fills_blank_slug() {
        let mut article = Article::new(Uuid::now_v7(), "First title");
        assert!(normalize(&mut article, 6));
        let first = article.slug.clone();

        article.title = "Second title".to_string();
        assert!(!normalize(&mut article, 6));
        assert_eq!(article.slug, first);

        article.slug = " ".to_string();
        assert!(normalize(&mut article, 6));
        assert!(article.slug.starts_with("second-title-"));
    }

    #[test]
    fn test_normalize_leaves_untitled_article_alone() {
        let mut article = Article::new(Uuid::now_v7(), "");
        assert!(!normalize(&mut article, 6));
        assert!(article.slug.is_empty());
    }
}
