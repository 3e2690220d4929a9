//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use thriftx_core::domain::{NewsletterSubscription, Post, PostSummary, User, mask_email};
use thriftx_core::error::RepoError;
use thriftx_core::ports::{NewsletterRepository, PostRepository, UserRepository};

use super::entity::newsletter::{self, Entity as NewsletterEntity};
use super::entity::post::{self, Entity as PostEntity, SummaryRow};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL newsletter subscription repository.
pub type PostgresNewsletterRepository = PostgresBaseRepository<NewsletterEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

/// Escape LIKE wildcards so the query matches literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn lower_like(expr: impl Into<SimpleExpr>, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(expr)).like(LikeExpr::new(pattern).escape('\\'))
}

fn search_condition(query: &str) -> Condition {
    let pattern = like_pattern(query);
    Condition::any()
        .add(lower_like(Expr::col(post::Column::Title), &pattern))
        .add(lower_like(Expr::col(post::Column::Author), &pattern))
        .add(lower_like(Expr::col(post::Column::Body), &pattern))
        .add(lower_like(Expr::col(post::Column::Category), &pattern))
        .add(tag_like(pattern))
}

/// Any single tag matches, so the JSON syntax of the array never does.
fn tag_like(pattern: String) -> SimpleExpr {
    Expr::cust_with_values(
        r#"EXISTS (SELECT 1 FROM jsonb_array_elements_text("posts"."tags") AS t(tag) WHERE lower(t.tag) LIKE $1 ESCAPE '')"#,
        [pattern],
    )
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_summaries(&self) -> Result<Vec<PostSummary>, RepoError> {
        let rows = PostEntity::find()
            .select_only()
            .columns([
                post::Column::Id,
                post::Column::Title,
                post::Column::Date,
                post::Column::Author,
                post::Column::ImageUrl,
            ])
            .order_by_desc(post::Column::Date)
            .into_model::<SummaryRow>()
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        let mut select = PostEntity::find();
        if !query.is_empty() {
            select = select.filter(search_condition(query));
        }

        let result = select
            .order_by_desc(post::Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl NewsletterRepository for PostgresNewsletterRepository {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<NewsletterSubscription>, RepoError> {
        let result = NewsletterEntity::find()
            .filter(newsletter::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_search_matches_tags_element_wise() {
        let sql = PostEntity::find()
            .filter(search_condition("Denim"))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"jsonb_array_elements_text("posts"."tags")"#), "{sql}");
        assert!(sql.contains("lower(t.tag) LIKE '%denim%'"), "{sql}");
        assert!(!sql.contains("CAST"), "{sql}");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Vintage"), "%vintage%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
