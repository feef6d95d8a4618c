//! 里程碑通知流程集成测试
//!
//! 使用真实 PostgreSQL 验证计数变更、通知投递、历史写回在同一事务内完成。
//! 行锁、JSONB 历史和回滚语义无法通过 mock 覆盖，因此需要集成测试。
//!
//! ## 运行方式
//!
//! ```bash
//! DATABASE_URL=postgres://... cargo test --test milestone_flow_test -- --ignored
//! ```

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::broadcast;
use uuid::Uuid;

use milestone_service::dto::{CreateCommentRequest, CreateReplyRequest};
use milestone_service::milestone::MilestoneNotifier;
use milestone_service::notification::{
    BroadcastDispatcher, MessageCatalog, Notification, NotificationKind, ResourceRef,
    UnavailableDispatcher,
};
use milestone_service::repository::{HistoryOwner, HistoryRepository};
use milestone_service::{
    CommentLikeService, CommentService, GameBookmarkService, MIGRATOR, NotificationCategory,
    ServiceError, TalkPickBookmarkService,
};

// ==================== 辅助函数 ====================

/// 从环境变量读取数据库 URL，未设置则 panic
fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests")
}

async fn setup_pool() -> PgPool {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    MIGRATOR.run(&pool).await.expect("迁移失败");
    pool
}

/// 广播投递的通知器，同时返回订阅端
fn broadcast_notifier() -> (Arc<MilestoneNotifier>, broadcast::Receiver<Notification>) {
    let dispatcher = Arc::new(BroadcastDispatcher::default());
    let receiver = dispatcher.subscribe();
    let notifier = MilestoneNotifier::new(dispatcher, Arc::new(MessageCatalog::default()));
    (Arc::new(notifier), receiver)
}

fn failing_notifier() -> Arc<MilestoneNotifier> {
    Arc::new(MilestoneNotifier::new(
        Arc::new(UnavailableDispatcher),
        Arc::new(MessageCatalog::default()),
    ))
}

/// 取出已广播的全部通知
fn drain(receiver: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut received = Vec::new();
    while let Ok(notification) = receiver.try_recv() {
        received.push(notification);
    }
    received
}

/// 插入会员，昵称随机避免并行冲突
async fn seed_member(pool: &PgPool) -> i64 {
    let simple = Uuid::now_v7().simple().to_string();
    let nickname = format!("it_{}", &simple[simple.len() - 20..]);
    sqlx::query_scalar("INSERT INTO members (nickname) VALUES ($1) RETURNING id")
        .bind(nickname)
        .fetch_one(pool)
        .await
        .expect("插入测试会员失败")
}

async fn seed_members(pool: &PgPool, n: usize) -> Vec<i64> {
    let mut ids = Vec::with_capacity(n);
    for _ in 0..n {
        ids.push(seed_member(pool).await);
    }
    ids
}

/// 插入集合和一个游戏，返回 (集合 ID, 游戏 ID)
async fn seed_game_set(pool: &PgPool, owner_id: i64, bookmarks: i64) -> (i64, i64) {
    let game_set_id: i64 = sqlx::query_scalar(
        "INSERT INTO game_sets (member_id, title, bookmarks) VALUES ($1, 'IntegTest Set', $2) RETURNING id",
    )
    .bind(owner_id)
    .bind(bookmarks)
    .fetch_one(pool)
    .await
    .expect("插入测试集合失败");

    let game_id: i64 =
        sqlx::query_scalar("INSERT INTO games (game_set_id, description) VALUES ($1, 'A or B') RETURNING id")
            .bind(game_set_id)
            .fetch_one(pool)
            .await
            .expect("插入测试游戏失败");

    (game_set_id, game_id)
}

async fn seed_talk_pick(pool: &PgPool, owner_id: i64, bookmarks: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO talk_picks (member_id, title, bookmarks) VALUES ($1, 'IntegTest Pick', $2) RETURNING id",
    )
    .bind(owner_id)
    .bind(bookmarks)
    .fetch_one(pool)
    .await
    .expect("插入测试话题帖失败")
}

async fn seed_comment(pool: &PgPool, talk_pick_id: i64, member_id: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO comments (talk_pick_id, member_id, content) VALUES ($1, $2, 'seed') RETURNING id",
    )
    .bind(talk_pick_id)
    .bind(member_id)
    .fetch_one(pool)
    .await
    .expect("插入测试评论失败")
}

async fn seed_comment_likes(pool: &PgPool, comment_id: i64, member_ids: &[i64]) {
    for member_id in member_ids {
        sqlx::query("INSERT INTO likes (resource_id, like_type, member_id) VALUES ($1, 'COMMENT', $2)")
            .bind(comment_id)
            .bind(member_id)
            .execute(pool)
            .await
            .expect("插入测试点赞失败");
    }
}

async fn talk_pick_bookmarks(pool: &PgPool, talk_pick_id: i64) -> i64 {
    sqlx::query_scalar("SELECT bookmarks FROM talk_picks WHERE id = $1")
        .bind(talk_pick_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ==================== 收藏 ====================

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_game_bookmark_tenth_notifies_owner() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let member = seed_member(&pool).await;
    let (game_set_id, game_id) = seed_game_set(&pool, owner, 9).await;

    let (notifier, mut receiver) = broadcast_notifier();
    let svc = GameBookmarkService::new(pool.clone(), notifier);

    let result = svc.create_bookmark(game_set_id, game_id, member).await.unwrap();
    assert_eq!(result.bookmarks, 10);
    assert!(result.notified);

    let received = drain(&mut receiver);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].recipient_id, owner);
    assert_eq!(received[0].resource, ResourceRef::GameSet(game_set_id));
    assert_eq!(received[0].category, NotificationCategory::WrittenGame);
    assert_eq!(received[0].kind, NotificationKind::Milestone);
    assert_eq!(received[0].message, "10개의 북마크를 달성했습니다");

    let history = HistoryRepository::new(pool.clone())
        .find(HistoryOwner::GameSet, game_set_id)
        .await
        .unwrap()
        .unwrap();
    assert!(history.is_sent("BOOKMARK_10"));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_game_bookmark_own_set_rejected() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let (game_set_id, game_id) = seed_game_set(&pool, owner, 0).await;

    let (notifier, _receiver) = broadcast_notifier();
    let svc = GameBookmarkService::new(pool.clone(), notifier);

    let result = svc.create_bookmark(game_set_id, game_id, owner).await;
    assert!(matches!(result, Err(ServiceError::CannotBookmarkOwnResource(id)) if id == game_set_id));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_end_game_set_bookmark_deactivates_votes() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let member = seed_member(&pool).await;
    let (game_set_id, game_id) = seed_game_set(&pool, owner, 0).await;

    let (notifier, _receiver) = broadcast_notifier();
    let svc = GameBookmarkService::new(pool.clone(), notifier);

    svc.create_bookmark(game_set_id, game_id, member).await.unwrap();
    svc.delete_bookmark(game_set_id, member).await.unwrap();

    sqlx::query("INSERT INTO game_votes (member_id, game_id) VALUES ($1, $2)")
        .bind(member)
        .bind(game_id)
        .execute(&pool)
        .await
        .unwrap();

    let result = svc.create_end_game_set_bookmark(game_set_id, member).await.unwrap();
    assert_eq!(result.bookmarks, 1);

    let active_votes: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM game_votes WHERE member_id = $1 AND game_id = $2 AND active",
    )
    .bind(member)
    .bind(game_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(active_votes, 0, "恢复结束收藏时应作废投票");
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_talk_pick_bookmark_hundred_sends_badge() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let member = seed_member(&pool).await;
    let talk_pick_id = seed_talk_pick(&pool, owner, 99).await;

    let (notifier, mut receiver) = broadcast_notifier();
    let svc = TalkPickBookmarkService::new(pool.clone(), notifier);

    let result = svc.create_bookmark(talk_pick_id, member).await.unwrap();
    assert_eq!(result.bookmarks, 100);
    assert!(result.notified);

    let kinds: Vec<NotificationKind> = drain(&mut receiver).into_iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::Milestone, NotificationKind::Badge]);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_rebookmark_does_not_notify_twice() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let member = seed_member(&pool).await;
    let talk_pick_id = seed_talk_pick(&pool, owner, 9).await;

    let (notifier, mut receiver) = broadcast_notifier();
    let svc = TalkPickBookmarkService::new(pool.clone(), notifier);

    let first = svc.create_bookmark(talk_pick_id, member).await.unwrap();
    assert!(first.notified);

    let deleted = svc.delete_bookmark(talk_pick_id, member).await.unwrap();
    assert_eq!(deleted.bookmarks, 9);
    assert!(!deleted.notified);

    let again = svc.create_bookmark(talk_pick_id, member).await.unwrap();
    assert_eq!(again.bookmarks, 10);
    assert!(!again.notified, "同一阈值只通知一次");

    assert_eq!(drain(&mut receiver).len(), 1);

    let duplicate = svc.create_bookmark(talk_pick_id, member).await;
    assert!(matches!(duplicate, Err(ServiceError::AlreadyBookmarked(_))));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_dispatch_failure_rolls_back_bookmark() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let member = seed_member(&pool).await;
    let talk_pick_id = seed_talk_pick(&pool, owner, 9).await;

    let svc = TalkPickBookmarkService::new(pool.clone(), failing_notifier());

    let result = svc.create_bookmark(talk_pick_id, member).await;
    assert!(matches!(result, Err(ServiceError::Dispatch(_))));
    assert!(result.unwrap_err().is_retryable());

    assert_eq!(talk_pick_bookmarks(&pool, talk_pick_id).await, 9, "计数应回滚");

    let bookmark_rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM talk_pick_bookmarks WHERE talk_pick_id = $1 AND member_id = $2",
    )
    .bind(talk_pick_id)
    .bind(member)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(bookmark_rows, 0, "收藏记录应回滚");

    let history = HistoryRepository::new(pool.clone())
        .find(HistoryOwner::TalkPick, talk_pick_id)
        .await
        .unwrap()
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_non_milestone_bookmark_ignores_failing_dispatcher() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let member = seed_member(&pool).await;
    let talk_pick_id = seed_talk_pick(&pool, owner, 3).await;

    let svc = TalkPickBookmarkService::new(pool.clone(), failing_notifier());

    let result = svc.create_bookmark(talk_pick_id, member).await.unwrap();
    assert_eq!(result.bookmarks, 4);
    assert!(!result.notified);
}

// ==================== 评论与回复 ====================

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_tenth_comment_counts_replies() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let writer = seed_member(&pool).await;
    let talk_pick_id = seed_talk_pick(&pool, owner, 0).await;

    let (notifier, mut receiver) = broadcast_notifier();
    let svc = CommentService::new(pool.clone(), notifier, 1);

    let parent = seed_comment(&pool, talk_pick_id, writer).await;
    for _ in 0..7 {
        seed_comment(&pool, talk_pick_id, writer).await;
    }
    // 回复也计入话题帖评论总数，但回复本身不触发评论里程碑
    let reply = svc
        .create_reply(CreateReplyRequest {
            talk_pick_id,
            parent_id: parent,
            member_id: writer,
            content: "self reply".to_string(),
        })
        .await
        .unwrap();
    assert!(!reply.notified);
    assert!(drain(&mut receiver).is_empty());

    let result = svc
        .create_comment(CreateCommentRequest {
            talk_pick_id,
            member_id: writer,
            content: "tenth".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(result.count, 10);
    assert!(result.notified);

    let received = drain(&mut receiver);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].recipient_id, owner);
    assert_eq!(received[0].category, NotificationCategory::WrittenTalkPick);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_first_reply_from_other_member_notifies_once() {
    let pool = setup_pool().await;
    let [owner, writer, replier, another] = <[i64; 4]>::try_from(seed_members(&pool, 4).await).unwrap();
    let talk_pick_id = seed_talk_pick(&pool, owner, 0).await;
    let parent = seed_comment(&pool, talk_pick_id, writer).await;

    let (notifier, mut receiver) = broadcast_notifier();
    let svc = CommentService::new(pool.clone(), notifier, 1);

    let reply = |member_id: i64| CreateReplyRequest {
        talk_pick_id,
        parent_id: parent,
        member_id,
        content: "reply".to_string(),
    };

    // 作者自己回复不算首条回复
    let own = svc.create_reply(reply(writer)).await.unwrap();
    assert!(!own.notified);

    let first = svc.create_reply(reply(replier)).await.unwrap();
    assert_eq!(first.count, 2);
    assert!(first.notified);

    let received = drain(&mut receiver);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].kind, NotificationKind::FirstReply);
    assert_eq!(received[0].recipient_id, writer);
    assert_eq!(received[0].category, NotificationCategory::OthersTalkPick);

    let flagged: bool =
        sqlx::query_scalar("SELECT is_notified_for_first_reply FROM comments WHERE id = $1")
            .bind(parent)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(flagged);

    let second = svc.create_reply(reply(another)).await.unwrap();
    assert!(!second.notified);
    assert!(drain(&mut receiver).is_empty());
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_reply_to_reply_exceeds_max_depth() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let writer = seed_member(&pool).await;
    let talk_pick_id = seed_talk_pick(&pool, owner, 0).await;
    let parent = seed_comment(&pool, talk_pick_id, writer).await;

    let (notifier, _receiver) = broadcast_notifier();
    let svc = CommentService::new(pool.clone(), notifier, 1);

    let reply = svc
        .create_reply(CreateReplyRequest {
            talk_pick_id,
            parent_id: parent,
            member_id: owner,
            content: "reply".to_string(),
        })
        .await
        .unwrap();

    let nested = svc
        .create_reply(CreateReplyRequest {
            talk_pick_id,
            parent_id: reply.comment_id,
            member_id: writer,
            content: "nested".to_string(),
        })
        .await;
    assert!(matches!(nested, Err(ServiceError::ExceedMaxDepth { max_depth: 1 })));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_update_comment_by_other_member_forbidden() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let writer = seed_member(&pool).await;
    let talk_pick_id = seed_talk_pick(&pool, owner, 0).await;
    let comment_id = seed_comment(&pool, talk_pick_id, writer).await;

    let (notifier, _receiver) = broadcast_notifier();
    let svc = CommentService::new(pool.clone(), notifier, 1);

    let result = svc.update_comment(comment_id, talk_pick_id, owner, "edited").await;
    assert!(matches!(result, Err(ServiceError::ForbiddenCommentModify(_))));

    svc.update_comment(comment_id, talk_pick_id, writer, "edited")
        .await
        .unwrap();
    let (content, is_edited): (String, bool) =
        sqlx::query_as("SELECT content, is_edited FROM comments WHERE id = $1")
            .bind(comment_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(content, "edited");
    assert!(is_edited);
}

// ==================== 点赞 ====================

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_tenth_like_on_author_comment_is_written_talk_pick() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let talk_pick_id = seed_talk_pick(&pool, owner, 0).await;
    let comment_id = seed_comment(&pool, talk_pick_id, owner).await;

    let likers = seed_members(&pool, 10).await;
    seed_comment_likes(&pool, comment_id, &likers[..9]).await;

    let (notifier, mut receiver) = broadcast_notifier();
    let svc = CommentLikeService::new(pool.clone(), notifier);

    let result = svc.like_comment(comment_id, talk_pick_id, likers[9]).await.unwrap();
    assert_eq!(result.like_count, 10);
    assert!(result.notified);

    let received = drain(&mut receiver);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].recipient_id, owner);
    assert_eq!(received[0].category, NotificationCategory::WrittenTalkPick);

    let history = HistoryRepository::new(pool.clone())
        .find(HistoryOwner::Comment, comment_id)
        .await
        .unwrap()
        .unwrap();
    assert!(history.is_sent("LIKE_10"));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_like_own_comment_and_unlike_rules() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let writer = seed_member(&pool).await;
    let liker = seed_member(&pool).await;
    let talk_pick_id = seed_talk_pick(&pool, owner, 0).await;
    let comment_id = seed_comment(&pool, talk_pick_id, writer).await;

    let (notifier, _receiver) = broadcast_notifier();
    let svc = CommentLikeService::new(pool.clone(), notifier);

    let own = svc.like_comment(comment_id, talk_pick_id, writer).await;
    assert!(matches!(own, Err(ServiceError::ForbiddenLikeOwnComment(_))));

    let not_liked = svc.unlike_comment(comment_id, talk_pick_id, liker).await;
    assert!(matches!(not_liked, Err(ServiceError::NotLikedComment(_))));

    let liked = svc.like_comment(comment_id, talk_pick_id, liker).await.unwrap();
    assert_eq!(liked.like_count, 1);

    let unliked = svc.unlike_comment(comment_id, talk_pick_id, liker).await.unwrap();
    assert_eq!(unliked.like_count, 0);
    assert!(!unliked.notified);
}

// ==================== 最佳评论 ====================

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_best_comments_listed_first_and_flagged() {
    let pool = setup_pool().await;
    let owner = seed_member(&pool).await;
    let writer = seed_member(&pool).await;
    let talk_pick_id = seed_talk_pick(&pool, owner, 0).await;

    let plain = seed_comment(&pool, talk_pick_id, writer).await;
    let popular = seed_comment(&pool, talk_pick_id, writer).await;
    let likers = seed_members(&pool, 3).await;
    seed_comment_likes(&pool, popular, &likers).await;
    seed_comment_likes(&pool, plain, &likers[..1]).await;

    let (notifier, _receiver) = broadcast_notifier();
    let svc = CommentService::new(pool.clone(), notifier, 1);

    let page = svc
        .find_best_comments(talk_pick_id, milestone_service::dto::PageRequest::new(0, 10))
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].id, popular);
    assert!(page.items[0].is_best);
    assert!(!page.items[1].is_best);

    let is_best: bool = sqlx::query_scalar("SELECT is_best FROM comments WHERE id = $1")
        .bind(popular)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(is_best);
}
