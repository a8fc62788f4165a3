//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::{Comment, PostStatus};
use quill_core::error::RepoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Status {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "review")]
    Review,
}

impl From<PostStatus> for Status {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Draft => Status::Draft,
            PostStatus::Published => Status::Published,
            PostStatus::Pending => Status::Pending,
            PostStatus::Review => Status::Review,
        }
    }
}

impl From<Status> for PostStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Draft => PostStatus::Draft,
            Status::Published => PostStatus::Published,
            Status::Pending => PostStatus::Pending,
            Status::Review => PostStatus::Review,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub image_url: String,
    pub is_featured: bool,
    pub status: Status,
    pub tags: Vec<String>,
    pub category_ids: Vec<Uuid>,
    pub likes: Vec<Uuid>,
    pub views: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub comments: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post. Fails when the embedded
/// comments cannot be decoded.
impl TryFrom<Model> for quill_core::domain::Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let comments: Vec<Comment> = serde_json::from_value(model.comments).map_err(|e| {
            RepoError::Query(format!("post {} has malformed comments: {e}", model.id))
        })?;

        Ok(Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            slug: model.slug,
            content: model.content,
            image_url: model.image_url,
            is_featured: model.is_featured,
            status: model.status.into(),
            tags: model.tags,
            category_ids: model.category_ids,
            likes: model.likes,
            views: u64::try_from(model.views).unwrap_or(0),
            comments,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl TryFrom<quill_core::domain::Post> for ActiveModel {
    type Error = RepoError;

    fn try_from(post: quill_core::domain::Post) -> Result<Self, Self::Error> {
        let comments = serde_json::to_value(&post.comments)
            .map_err(|e| RepoError::Query(format!("cannot encode comments: {e}")))?;

        Ok(Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            title: Set(post.title),
            slug: Set(post.slug),
            content: Set(post.content),
            image_url: Set(post.image_url),
            is_featured: Set(post.is_featured),
            status: Set(post.status.into()),
            tags: Set(post.tags),
            category_ids: Set(post.category_ids),
            likes: Set(post.likes),
            views: Set(i64::try_from(post.views).unwrap_or(i64::MAX)),
            comments: Set(comments),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        })
    }
}
