//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
    Select, UpdateMany, Value,
};
use uuid::Uuid;

use quill_core::domain::{Category, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, PostOrder, PostQuery, PostRepository, TextMatch,
    UserRepository,
};
use quill_core::text::escape_like;

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err, upsert};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let masked_local = match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***"),
            _ => "***".to_string(),
        };
        format!("{}{}", masked_local, domain)
    } else {
        "***".to_string()
    }
}

// Custom fragments use Postgres `$n` placeholders; sea-query renumbers them
// into the statement and leaves `?` as literal text on this backend.

/// `array_append` guarded so the id appears at most once.
fn append_id(column: &str, id: Uuid) -> SimpleExpr {
    Expr::cust_with_values(
        format!("CASE WHEN $1 = ANY({column}) THEN {column} ELSE array_append({column}, $2) END"),
        [id, id],
    )
}

fn remove_id(column: &str, id: Uuid) -> SimpleExpr {
    Expr::cust_with_values(format!("array_remove({column}, $1)"), [id])
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(login = %mask_email(login), "Finding user by email or username");

        let result = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(login))
                    .add(user::Column::Username.eq(login)),
            )
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn attach_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), RepoError> {
        UserEntity::update_many()
            .col_expr(user::Column::PostIds, append_id("post_ids", post_id))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn detach_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), RepoError> {
        UserEntity::update_many()
            .col_expr(user::Column::PostIds, remove_id("post_ids", post_id))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}

fn rename_category(id: Uuid, name: &str, slug: &str) -> UpdateMany<CategoryEntity> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    CategoryEntity::update_many()
        .col_expr(category::Column::Name, Expr::value(name.to_owned()))
        .col_expr(category::Column::Slug, Expr::value(slug.to_owned()))
        .col_expr(category::Column::UpdatedAt, Expr::value(now))
        .filter(category::Column::Id.eq(id))
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::CreatedAt)
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = CategoryEntity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn rename(
        &self,
        id: Uuid,
        name: &str,
        slug: &str,
    ) -> Result<Option<Category>, RepoError> {
        let result = rename_category(id, name, slug)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        <Self as BaseRepository<Category, Uuid>>::find_by_id(self, id).await
    }

    async fn attach_post(&self, category_id: Uuid, post_id: Uuid) -> Result<(), RepoError> {
        CategoryEntity::update_many()
            .col_expr(category::Column::PostIds, append_id("post_ids", post_id))
            .filter(category::Column::Id.eq(category_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn detach_post(&self, category_id: Uuid, post_id: Uuid) -> Result<(), RepoError> {
        CategoryEntity::update_many()
            .col_expr(category::Column::PostIds, remove_id("post_ids", post_id))
            .filter(category::Column::Id.eq(category_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}

/// PostgreSQL post repository. Translates `PostQuery` into a single SELECT.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// Build the SELECT for a post query. Kept separate so it can be inspected
/// without a connection.
pub(crate) fn select_posts(query: &PostQuery) -> Select<PostEntity> {
    let mut cond = Condition::all();

    if let Some(id) = query.exclude_id {
        cond = cond.add(post::Column::Id.ne(id));
    }
    if let Some(topics) = &query.related_to {
        cond = cond.add(
            Condition::any()
                .add(Expr::cust_with_values(
                    "category_ids && $1",
                    [Value::from(topics.category_ids.clone())],
                ))
                .add(Expr::cust_with_values(
                    "tags && $1",
                    [Value::from(topics.tags.clone())],
                )),
        );
    }
    if let Some(category_id) = query.category_id {
        cond = cond.add(Expr::cust_with_values(
            "$1 = ANY(category_ids)",
            [category_id],
        ));
    }
    if let Some(tag) = &query.tag {
        cond = cond.add(Expr::cust_with_values("$1 = ANY(tags)", [tag.clone()]));
    }
    if let Some(status) = query.status {
        cond = cond.add(post::Column::Status.eq(post::Status::from(status)));
    }
    match &query.text {
        Some(TextMatch::Substring(needle)) => {
            let pattern = format!("%{}%", escape_like(needle));
            cond = cond.add(Expr::cust_with_values(
                "(title ILIKE $1 OR content ILIKE $2)",
                [pattern.clone(), pattern],
            ));
        }
        Some(TextMatch::FullText(text)) => {
            cond = cond.add(Expr::cust_with_values(
                "to_tsvector('english', title || ' ' || content) @@ plainto_tsquery('english', $1)",
                [text.clone()],
            ));
        }
        None => {}
    }

    let select = PostEntity::find().filter(cond);
    let select = match query.order {
        PostOrder::Oldest => select
            .order_by_asc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id),
        PostOrder::Newest => select
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id),
        PostOrder::Popularity => select
            .order_by(Expr::cust("cardinality(likes)"), Order::Desc)
            .order_by_desc(post::Column::Views)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id),
    };

    match query.limit {
        Some(limit) => select.limit(limit),
        None => select,
    }
}

fn into_posts(models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
    models.into_iter().map(Post::try_from).collect()
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(Post::try_from)
            .transpose()
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::try_from(entity.clone())?;
        upsert::<PostEntity>(&self.db, model).await?;
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        tracing::debug!(?query, "Finding posts");

        let models = select_posts(query)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        into_posts(models)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(Post::try_from)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, QueryTrait};

    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ada@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("ada"), "***");
    }

    #[test]
    fn test_back_reference_updates_bind_their_ids() {
        let user_id = Uuid::new_v4();
        let post_id = Uuid::new_v4();

        let append = UserEntity::update_many()
            .col_expr(user::Column::PostIds, append_id("post_ids", post_id))
            .filter(user::Column::Id.eq(user_id))
            .build(DatabaseBackend::Postgres);
        assert!(append.sql.contains("CASE WHEN $1 = ANY(post_ids)"));
        assert!(append.sql.contains("array_append(post_ids, $2)"));
        assert!(!append.sql.contains('?'));
        let values = append.values.unwrap().0;
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], Value::from(post_id));
        assert_eq!(values[1], Value::from(post_id));
        assert_eq!(values[2], Value::from(user_id));

        let remove = CategoryEntity::update_many()
            .col_expr(category::Column::PostIds, remove_id("post_ids", post_id))
            .filter(category::Column::Id.eq(user_id))
            .build(DatabaseBackend::Postgres);
        assert!(remove.sql.contains("array_remove(post_ids, $1)"));
        assert_eq!(remove.values.unwrap().0.len(), 2);
    }

    #[test]
    fn test_rename_leaves_back_references_alone() {
        let statement =
            rename_category(Uuid::new_v4(), "Rust", "rust").build(DatabaseBackend::Postgres);

        assert!(statement.sql.starts_with(r#"UPDATE "categories" SET"#));
        assert!(statement.sql.contains(r#""name" = $1"#));
        assert!(statement.sql.contains(r#""slug" = $2"#));
        assert!(!statement.sql.contains("post_ids"));
    }
}
