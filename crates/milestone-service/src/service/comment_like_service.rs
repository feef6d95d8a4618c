//! 评论点赞服务
//!
//! 激活点赞数达到里程碑时通知评论作者。评论作者就是话题帖作者时
//! 分类为 `WRITTEN_TALK_PICK`，否则为 `OTHERS_TALK_PICK`。

use std::sync::Arc;

use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use super::dto::LikeResult;
use super::{ensure_member, notify_milestone};
use crate::error::{Result, ServiceError};
use crate::milestone::MilestoneNotifier;
use crate::models::{Comment, LikeType, MilestoneSite, NotificationCategory, TalkPick};
use crate::notification::{NotificationTarget, ResourceRef};
use crate::repository::{CommentRepository, HistoryOwner, LikeRepository, TalkPickRepository};

/// 评论点赞服务
pub struct CommentLikeService {
    pool: PgPool,
    notifier: Arc<MilestoneNotifier>,
}

impl CommentLikeService {
    pub fn new(pool: PgPool, notifier: Arc<MilestoneNotifier>) -> Self {
        Self { pool, notifier }
    }

    /// 点赞评论
    #[instrument(skip(self))]
    pub async fn like_comment(
        &self,
        comment_id: i64,
        talk_pick_id: i64,
        member_id: i64,
    ) -> Result<LikeResult> {
        let mut tx = self.pool.begin().await?;

        let (talk_pick, comment) = Self::lock_comment(&mut tx, comment_id, talk_pick_id).await?;
        ensure_member(&mut tx, member_id).await?;

        if comment.is_written_by(member_id) {
            return Err(ServiceError::ForbiddenLikeOwnComment(comment_id));
        }

        let like_id =
            match LikeRepository::get_for_update(&mut tx, comment_id, LikeType::Comment, member_id)
                .await?
            {
                Some(like) if like.active => {
                    return Err(ServiceError::AlreadyLikedComment(comment_id));
                }
                Some(like) => {
                    LikeRepository::set_active_in_tx(&mut tx, like.id, true).await?;
                    like.id
                }
                None => {
                    LikeRepository::create_in_tx(&mut tx, comment_id, LikeType::Comment, member_id)
                        .await?
                }
            };

        let like_count =
            LikeRepository::count_active_in_tx(&mut tx, comment_id, LikeType::Comment).await?;

        let target = NotificationTarget::new(
            comment.member_id,
            ResourceRef::TalkPick(talk_pick.id),
            NotificationCategory::for_talk_pick(comment.member_id, talk_pick.member_id),
        );
        let notified = notify_milestone(
            &mut tx,
            &self.notifier,
            MilestoneSite::CommentLike,
            like_count,
            &target,
            (HistoryOwner::Comment, comment.id),
            comment.notification_history.0,
        )
        .await?;

        tx.commit().await?;

        info!(like_count, notified, "评论点赞成功");
        Ok(LikeResult {
            like_id,
            like_count,
            notified,
        })
    }

    /// 取消点赞（不通知）
    #[instrument(skip(self))]
    pub async fn unlike_comment(
        &self,
        comment_id: i64,
        talk_pick_id: i64,
        member_id: i64,
    ) -> Result<LikeResult> {
        let mut tx = self.pool.begin().await?;

        Self::lock_comment(&mut tx, comment_id, talk_pick_id).await?;
        ensure_member(&mut tx, member_id).await?;

        let like = LikeRepository::get_for_update(&mut tx, comment_id, LikeType::Comment, member_id)
            .await?
            .filter(|like| like.active)
            .ok_or(ServiceError::NotLikedComment(comment_id))?;

        LikeRepository::set_active_in_tx(&mut tx, like.id, false).await?;
        let like_count =
            LikeRepository::count_active_in_tx(&mut tx, comment_id, LikeType::Comment).await?;

        tx.commit().await?;

        info!(like_count, "评论点赞已取消");
        Ok(LikeResult {
            like_id: like.id,
            like_count,
            notified: false,
        })
    }

    /// 校验话题帖并锁定其下的评论
    async fn lock_comment(
        tx: &mut PgConnection,
        comment_id: i64,
        talk_pick_id: i64,
    ) -> Result<(TalkPick, Comment)> {
        let talk_pick = TalkPickRepository::get_in_tx(tx, talk_pick_id)
            .await?
            .ok_or(ServiceError::TalkPickNotFound(talk_pick_id))?;

        let comment = CommentRepository::get_for_update(tx, comment_id)
            .await?
            .ok_or(ServiceError::CommentNotFound(comment_id))?;

        if !comment.belongs_to(talk_pick_id) {
            return Err(ServiceError::CommentNotInTalkPick {
                talk_pick_id,
                comment_id,
            });
        }

        Ok((talk_pick, comment))
    }
}
