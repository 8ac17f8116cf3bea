//! First-boot demo data
//!
//! Seeding only runs against a database with no users, so restarting the
//! server never duplicates rows. Each step is best effort: a failure is
//! logged and the remaining steps still run.

use crate::models::{PostPayload, TagPayload};
use crate::services::auth::AuthService;
use crate::services::post::PostService;
use crate::services::resource::Resource;
use crate::services::tag::TagService;

/// Demo accounts as (username, password, fixed token)
const SEED_USERS: &[(&str, &str, &str)] = &[
    ("gneale@mac.com", "password", "grantstoken"),
    ("kiki@mac.com", "password", "kikistoken"),
    ("u3", "123", "u3 token"),
    ("u4", "123", "u4 token"),
];

/// Demo posts as (title, content, tag title)
const SEED_POSTS: &[(&str, &str, &str)] = &[
    (
        "A new day in Dordogne",
        "lots of new day in the dordogne",
        "News",
    ),
    (
        "The best day in Dordogne",
        "lots of best day in the dordogne",
        "Happening",
    ),
];

const SEED_TAGS: &[&str] = &["News", "Happening"];

/// What a seeding run created
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// True when the database already had users and nothing was attempted
    pub skipped: bool,
    pub users: usize,
    pub tokens: usize,
    pub tags: usize,
    pub posts: usize,
    pub post_tags: usize,
}

/// Populate an empty database with demo users, tokens, tags and posts.
pub async fn seed_data(auth: &AuthService, posts: &PostService, tags: &TagService) -> SeedReport {
    let mut report = SeedReport::default();

    match auth.count_users().await {
        Ok(0) => {}
        Ok(count) => {
            tracing::debug!("Skipping seed data, {} user(s) already exist", count);
            report.skipped = true;
            return report;
        }
        Err(e) => {
            tracing::warn!("Skipping seed data, could not count users: {}", e);
            report.skipped = true;
            return report;
        }
    }

    for (username, password, token) in SEED_USERS {
        let user = match auth.register(username, password).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Failed to seed user {}: {}", username, e);
                continue;
            }
        };
        report.users += 1;

        match auth.issue_fixed_token(user.id, token).await {
            Ok(_) => report.tokens += 1,
            Err(e) => tracing::warn!("Failed to seed token for {}: {}", username, e),
        }
    }

    let mut tag_ids = Vec::new();
    for title in SEED_TAGS {
        let payload = TagPayload {
            title: Some(title.to_string()),
        };
        match tags.store(payload).await {
            Ok(created) => {
                report.tags += 1;
                tag_ids.push((*title, created.tag.id));
            }
            Err(e) => tracing::warn!("Failed to seed tag {}: {}", title, e),
        }
    }

    for (title, content, tag_title) in SEED_POSTS {
        let payload = PostPayload {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            published: Some(false),
        };
        let post = match posts.store(payload).await {
            Ok(created) => created.post,
            Err(e) => {
                tracing::warn!("Failed to seed post {}: {}", title, e);
                continue;
            }
        };
        report.posts += 1;

        let Some(&(_, tag_id)) = tag_ids.iter().find(|(t, _)| t == tag_title) else {
            tracing::warn!("Tag {} missing, post {} left untagged", tag_title, post.id);
            continue;
        };
        match posts.add_tag(post.id, tag_id).await {
            Ok(_) => report.post_tags += 1,
            Err(e) => tracing::warn!("Failed to tag seeded post {}: {}", post.id, e),
        }
    }

    tracing::info!(
        "Seeded {} user(s), {} token(s), {} tag(s), {} post(s)",
        report.users,
        report.tokens,
        report.tags,
        report.posts
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxAccessTokenRepository, SqlxPostRepository, SqlxTagRepository, SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};

    async fn setup_services() -> (AuthService, PostService, TagService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let tag_repo = SqlxTagRepository::boxed(pool.clone());
        (
            AuthService::new(
                SqlxUserRepository::boxed(pool.clone()),
                SqlxAccessTokenRepository::boxed(pool.clone()),
            ),
            PostService::new(SqlxPostRepository::boxed(pool), tag_repo.clone()),
            TagService::new(tag_repo),
        )
    }

    #[tokio::test]
    async fn test_seed_populates_empty_database() {
        let (auth, posts, tags) = setup_services().await;

        let report = seed_data(&auth, &posts, &tags).await;

        assert_eq!(
            report,
            SeedReport {
                skipped: false,
                users: 4,
                tokens: 4,
                tags: 2,
                posts: 2,
                post_tags: 2,
            }
        );

        let grant = auth.authenticate_by_token("grantstoken").await.unwrap().unwrap();
        assert_eq!(grant.username, "gneale@mac.com");
        let u3 = auth.authenticate_by_password("u3", "123").await.unwrap();
        assert_eq!(u3.username, "u3");

        let seeded = posts.index().await.unwrap();
        assert_eq!(seeded.len(), 2);
        assert_eq!(seeded[0].post.title, "A new day in Dordogne");
        assert!(!seeded[0].post.published);
        assert_eq!(seeded[0].tags[0].title, "News");
        assert_eq!(seeded[1].tags[0].title, "Happening");
    }

    #[tokio::test]
    async fn test_seed_twice_creates_no_duplicates() {
        let (auth, posts, tags) = setup_services().await;

        seed_data(&auth, &posts, &tags).await;
        let second = seed_data(&auth, &posts, &tags).await;

        assert!(second.skipped);
        assert_eq!(second.users, 0);
        assert_eq!(auth.count_users().await.unwrap(), 4);
        assert_eq!(tags.index().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_seed_skipped_when_users_exist() {
        let (auth, posts, tags) = setup_services().await;
        auth.register("someone", "pw").await.unwrap();

        let report = seed_data(&auth, &posts, &tags).await;

        assert!(report.skipped);
        assert!(posts.index().await.unwrap().is_empty());
    }
}
