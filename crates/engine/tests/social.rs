use chrono::{Duration, Utc};
use sea_orm::Database;

use engine::{
    Account, AccountKind, Actor, Engine, EngineError, InstituteType, NewAccount, NewPost, Post,
    PostFilter, PostKind, PostPatch, PostStatus, SharePlatform,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn account(engine: &Engine, username: &str, kind: AccountKind) -> Account {
    let mut cmd = NewAccount::new(username, "password", kind);
    if kind == AccountKind::Institute {
        cmd = cmd.institute_type(InstituteType::Khanqah);
    }
    engine.create_account(cmd, Utc::now()).await.unwrap()
}

fn ids(accounts: &[Account]) -> Vec<Uuid> {
    accounts.iter().map(|account| account.id).collect()
}

#[tokio::test]
async fn follow_lists_both_sides_in_order() {
    let engine = engine().await;
    let zaid = account(&engine, "zaid", AccountKind::User).await;
    let amina = account(&engine, "amina", AccountKind::User).await;
    let masjid = account(&engine, "masjid", AccountKind::Institute).await;
    let madrasa = account(&engine, "madrasa", AccountKind::Institute).await;
    let t0 = Utc::now();

    engine.follow(zaid.id, madrasa.id, t0).await.unwrap();
    engine
        .follow(zaid.id, masjid.id, t0 + Duration::seconds(1))
        .await
        .unwrap();
    engine
        .follow(amina.id, masjid.id, t0 + Duration::seconds(2))
        .await
        .unwrap();

    let following = engine.following(zaid.id).await.unwrap();
    assert_eq!(ids(&following), [madrasa.id, masjid.id]);

    let followers = engine.followers(masjid.id).await.unwrap();
    assert_eq!(ids(&followers), [zaid.id, amina.id]);
    assert_eq!(engine.followers(madrasa.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn following_twice_is_rejected() {
    let engine = engine().await;
    let zaid = account(&engine, "zaid", AccountKind::User).await;
    let masjid = account(&engine, "masjid", AccountKind::Institute).await;

    engine.follow(zaid.id, masjid.id, Utc::now()).await.unwrap();
    let err = engine
        .follow(zaid.id, masjid.id, Utc::now())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey("already following this institute".to_string())
    );
    assert_eq!(engine.followers(masjid.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn follow_targets_must_be_institutes() {
    let engine = engine().await;
    let zaid = account(&engine, "zaid", AccountKind::User).await;
    let amina = account(&engine, "amina", AccountKind::User).await;

    let err = engine
        .follow(zaid.id, amina.id, Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("institute not exists".to_string()));

    let err = engine.followers(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("institute not exists".to_string()));
}

#[tokio::test]
async fn unfollow_is_idempotent() {
    let engine = engine().await;
    let zaid = account(&engine, "zaid", AccountKind::User).await;
    let masjid = account(&engine, "masjid", AccountKind::Institute).await;

    engine.follow(zaid.id, masjid.id, Utc::now()).await.unwrap();
    engine.unfollow(zaid.id, masjid.id).await.unwrap();
    engine.unfollow(zaid.id, masjid.id).await.unwrap();
    assert!(engine.following(zaid.id).await.unwrap().is_empty());

    let err = engine.unfollow(zaid.id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn institute_removes_a_follower() {
    let engine = engine().await;
    let zaid = account(&engine, "zaid", AccountKind::User).await;
    let amina = account(&engine, "amina", AccountKind::User).await;
    let masjid = account(&engine, "masjid", AccountKind::Institute).await;

    engine.follow(zaid.id, masjid.id, Utc::now()).await.unwrap();
    engine.remove_follower(masjid.id, zaid.id).await.unwrap();
    assert!(engine.followers(masjid.id).await.unwrap().is_empty());

    let err = engine
        .remove_follower(masjid.id, amina.id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("follower not exists".to_string()));
}

async fn notice(engine: &Engine, institute: &Account, title: &str) -> Post {
    engine
        .create_post(
            NewPost::new(institute.id, PostKind::Notice, title, Utc::now())
                .description("  After isha  ")
                .location("Main hall"),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn create_and_edit_post() {
    let engine = engine().await;
    let masjid = account(&engine, "masjid", AccountKind::Institute).await;
    let madrasa = account(&engine, "madrasa", AccountKind::Institute).await;

    let post = notice(&engine, &masjid, " Dars tonight ").await;
    assert_eq!(post.title, "Dars tonight");
    assert_eq!(post.description.as_deref(), Some("After isha"));
    assert_eq!(post.status, PostStatus::Active);

    let edited = engine
        .edit_post(
            post.id,
            masjid.id,
            PostPatch::default()
                .kind(PostKind::Hadith)
                .title("Hadith of the week")
                .location(" "),
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(edited.kind, PostKind::Hadith);
    assert_eq!(edited.title, "Hadith of the week");
    assert_eq!(edited.location, None);
    assert_eq!(edited.description.as_deref(), Some("After isha"));

    let stored = engine.post(post.id).await.unwrap();
    assert_eq!(stored.title, "Hadith of the week");

    let err = engine
        .edit_post(post.id, madrasa.id, PostPatch::default().title("x"), Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Forbidden("not the owner of this post".to_string()));

    let err = engine
        .create_post(NewPost::new(masjid.id, PostKind::Quran, "  ", Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Validation("title must not be empty".to_string()));
}

#[tokio::test]
async fn comments_and_replies_stay_in_order() {
    let engine = engine().await;
    let masjid = account(&engine, "masjid", AccountKind::Institute).await;
    let zaid = account(&engine, "zaid", AccountKind::User).await;
    let amina = account(&engine, "amina", AccountKind::User).await;
    let post = notice(&engine, &masjid, "Eid prayer").await;
    let now = Utc::now();

    let first = engine
        .comment_on_post(post.id, Actor::User(zaid.id), "What time?", now)
        .await
        .unwrap();
    let second = engine
        .comment_on_post(post.id, Actor::User(amina.id), "Is there parking?", now)
        .await
        .unwrap();
    engine
        .reply_to_comment(post.id, second.id, Actor::Institute(masjid.id), "Yes", now)
        .await
        .unwrap();
    engine
        .reply_to_comment(post.id, first.id, Actor::Institute(masjid.id), "7:30", now)
        .await
        .unwrap();
    engine
        .reply_to_comment(post.id, first.id, Actor::User(zaid.id), "Thanks", now)
        .await
        .unwrap();

    let stored = engine.post(post.id).await.unwrap();
    assert_eq!(stored.comments.len(), 2);
    assert_eq!(stored.comments[0].id, first.id);
    assert_eq!(stored.comments[0].author, Actor::User(zaid.id));
    let replies: Vec<_> = stored.comments[0]
        .replies
        .iter()
        .map(|reply| (reply.author, reply.text.as_str()))
        .collect();
    assert_eq!(
        replies,
        [
            (Actor::Institute(masjid.id), "7:30"),
            (Actor::User(zaid.id), "Thanks")
        ]
    );
    assert_eq!(stored.comments[1].replies.len(), 1);

    let err = engine
        .reply_to_comment(post.id, Uuid::new_v4(), Actor::User(zaid.id), "?", now)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("comment not exists".to_string()));

    let err = engine
        .comment_on_post(post.id, Actor::User(zaid.id), "   ", now)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Validation("comment must not be empty".to_string()));
}

#[tokio::test]
async fn likes_toggle_and_shares_count() {
    let engine = engine().await;
    let masjid = account(&engine, "masjid", AccountKind::Institute).await;
    let zaid = account(&engine, "zaid", AccountKind::User).await;
    let amina = account(&engine, "amina", AccountKind::User).await;
    let post = notice(&engine, &masjid, "Fundraiser").await;
    let now = Utc::now();

    let outcome = engine.toggle_like(post.id, zaid.id, now).await.unwrap();
    assert!(outcome.liked);
    assert_eq!(outcome.likes, 1);
    let outcome = engine.toggle_like(post.id, amina.id, now).await.unwrap();
    assert_eq!(outcome.likes, 2);
    let outcome = engine.toggle_like(post.id, zaid.id, now).await.unwrap();
    assert!(!outcome.liked);
    assert_eq!(outcome.likes, 1);

    let err = engine
        .toggle_like(post.id, masjid.id, now)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));

    assert_eq!(
        engine
            .share_post(post.id, zaid.id, SharePlatform::Whatsapp, now)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        engine
            .share_post(post.id, zaid.id, SharePlatform::default(), now)
            .await
            .unwrap(),
        2
    );

    let stored = engine.post(post.id).await.unwrap();
    assert_eq!(stored.likes, 1);
    assert_eq!(stored.shares, 2);
}

#[tokio::test]
async fn inactive_posts_leave_the_listing_and_take_no_reactions() {
    let engine = engine().await;
    let masjid = account(&engine, "masjid", AccountKind::Institute).await;
    let madrasa = account(&engine, "madrasa", AccountKind::Institute).await;
    let zaid = account(&engine, "zaid", AccountKind::User).await;
    let root = account(&engine, "root", AccountKind::Admin).await;
    let post = notice(&engine, &masjid, "Old notice").await;
    let now = Utc::now();

    let err = engine
        .set_post_status(post.id, madrasa.id, PostStatus::Inactive, now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine
        .set_post_status(post.id, masjid.id, PostStatus::Inactive, now)
        .await
        .unwrap();
    assert!(engine.posts(PostFilter::default()).await.unwrap().is_empty());
    assert_eq!(
        engine.post(post.id).await.unwrap().status,
        PostStatus::Inactive
    );

    let err = engine.toggle_like(post.id, zaid.id, now).await.unwrap_err();
    assert_eq!(err, EngineError::InvalidTransition("post is inactive".to_string()));
    let err = engine
        .comment_on_post(post.id, Actor::User(zaid.id), "hello", now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    let err = engine
        .moderate_post(zaid.id, post.id, PostStatus::Active, now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    engine
        .moderate_post(root.id, post.id, PostStatus::Active, now)
        .await
        .unwrap();
    assert_eq!(engine.posts(PostFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn blocked_posts_are_left_out_of_the_viewers_feed() {
    let engine = engine().await;
    let masjid = account(&engine, "masjid", AccountKind::Institute).await;
    let madrasa = account(&engine, "madrasa", AccountKind::Institute).await;
    let zaid = account(&engine, "zaid", AccountKind::User).await;
    let amina = account(&engine, "amina", AccountKind::User).await;
    let t0 = Utc::now();

    let older = engine
        .create_post(NewPost::new(masjid.id, PostKind::Quran, "Ayah", t0))
        .await
        .unwrap();
    let newer = engine
        .create_post(NewPost::new(
            madrasa.id,
            PostKind::Notice,
            "Admissions",
            t0 + Duration::seconds(1),
        ))
        .await
        .unwrap();

    let all = engine.posts(PostFilter::default()).await.unwrap();
    let listed: Vec<_> = all.iter().map(|post| post.id).collect();
    assert_eq!(listed, [newer.id, older.id]);

    engine.block_post(zaid.id, newer.id, t0).await.unwrap();
    engine.block_post(zaid.id, newer.id, t0).await.unwrap();
    let feed = engine
        .posts(PostFilter {
            viewer: Some(zaid.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id, older.id);

    let others = engine
        .posts(PostFilter {
            viewer: Some(amina.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(others.len(), 2);

    let by_masjid = engine
        .posts(PostFilter {
            institute_id: Some(masjid.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_masjid.len(), 1);

    engine.unblock_post(zaid.id, newer.id).await.unwrap();
    let feed = engine
        .posts(PostFilter {
            viewer: Some(zaid.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(feed.len(), 2);

    let err = engine
        .block_post(zaid.id, Uuid::new_v4(), t0)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("post not exists".to_string()));
}

#[tokio::test]
async fn deleting_a_post_removes_its_discussion() {
    let engine = engine().await;
    let masjid = account(&engine, "masjid", AccountKind::Institute).await;
    let madrasa = account(&engine, "madrasa", AccountKind::Institute).await;
    let zaid = account(&engine, "zaid", AccountKind::User).await;
    let post = notice(&engine, &masjid, "Lost and found").await;
    let now = Utc::now();

    let comment = engine
        .comment_on_post(post.id, Actor::User(zaid.id), "My umbrella", now)
        .await
        .unwrap();
    engine
        .reply_to_comment(post.id, comment.id, Actor::Institute(masjid.id), "At the desk", now)
        .await
        .unwrap();
    engine.toggle_like(post.id, zaid.id, now).await.unwrap();
    engine.block_post(zaid.id, post.id, now).await.unwrap();

    let err = engine.delete_post(post.id, madrasa.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine.delete_post(post.id, masjid.id).await.unwrap();
    let err = engine.post(post.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("post not exists".to_string()));
}
