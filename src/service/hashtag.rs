use super::{
    view::{post_views, PostView},
    Error, Page, Resource, Result,
};
use entity::{hashtag, post, post_hashtag};
use itertools::Itertools;
use sea_orm::{entity::*, query::*, sea_query::OnConflict, ConnectionTrait, DbConn};
use std::collections::HashMap;

/// Scan `content` for `#word` tokens.
///
/// A token is the run of word characters (alphanumeric or `_`) right after a
/// `#`. Names are returned verbatim without the `#`, in order of first
/// appearance, each name once. Comparison is case-sensitive: `#Rust` and
/// `#rust` are two tags.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    content
        .split('#')
        .skip(1)
        .filter_map(|rest| {
            let end = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            (end > 0).then(|| &rest[..end])
        })
        .unique()
        .map(str::to_owned)
        .collect()
}

#[derive(Debug)]
pub struct HashtagService;

impl HashtagService {
    /// Hashtag rows for every tag in `content`, creating the missing ones.
    ///
    /// Existing rows are reused. Inserts use `ON CONFLICT DO NOTHING` on the
    /// unique name, so two writers racing on a new tag end up sharing one row.
    pub async fn resolve<C>(db: &C, content: &str) -> Result<Vec<hashtag::Model>>
    where
        C: ConnectionTrait,
    {
        let names = extract_hashtags(content);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let existing = Self::find_by_names(db, &names).await?;
        for name in names.iter().filter(|name| !existing.contains_key(*name)) {
            tracing::debug!("creating hashtag #{name}");
            hashtag::Entity::insert(hashtag::ActiveModel {
                name: Set(name.to_owned()),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::column(hashtag::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        }

        let mut all = Self::find_by_names(db, &names).await?;
        Ok(names.iter().filter_map(|name| all.remove(name)).collect())
    }

    async fn find_by_names<C>(db: &C, names: &[String]) -> Result<HashMap<String, hashtag::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(hashtag::Entity::find()
            .filter(hashtag::Column::Name.is_in(names.iter().cloned()))
            .all(db)
            .await?
            .into_iter()
            .map(|tag| (tag.name.clone(), tag))
            .collect())
    }

    /// Replace the hashtag links of a post with those found in `content`.
    pub(crate) async fn relink<C>(db: &C, post_id: i32, content: &str) -> Result<Vec<hashtag::Model>>
    where
        C: ConnectionTrait,
    {
        post_hashtag::Entity::delete_many()
            .filter(post_hashtag::Column::PostId.eq(post_id))
            .exec(db)
            .await?;

        let tags = Self::resolve(db, content).await?;
        if !tags.is_empty() {
            post_hashtag::Entity::insert_many(tags.iter().map(|tag| post_hashtag::ActiveModel {
                post_id: Set(post_id),
                hashtag_id: Set(tag.hashtag_id),
            }))
            .exec_without_returning(db)
            .await?;
        }
        Ok(tags)
    }

    /// Posts tagged with `name`, newest first.
    pub async fn posts_for_tag(
        db: &DbConn,
        viewer: Option<i32>,
        name: &str,
        page: Page,
    ) -> Result<Vec<PostView>> {
        let name = name.strip_prefix('#').unwrap_or(name);
        let tag = hashtag::Entity::find()
            .filter(hashtag::Column::Name.eq(name))
            .one(db)
            .await?
            .ok_or(Error::NotFound(Resource::Hashtag))?;

        let posts = tag
            .find_related(post::Entity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::PostId)
            .offset(page.skip)
            .limit(page.limit)
            .all(db)
            .await?;

        post_views(db, viewer, posts).await
    }
}
