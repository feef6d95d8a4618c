//! 评论服务
//!
//! - 评论：话题帖评论总数达到里程碑时通知话题帖作者
//! - 回复：父评论收到他人第一条回复，或回复数达到 50/100 时通知父评论作者
//! - 修改、删除仅限作者本人
//! - 最佳评论查询

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, instrument};

use super::best_comment;
use super::dto::{
    BestCommentDto, CommentResult, CreateCommentRequest, CreateReplyRequest, Page, PageRequest,
};
use super::{ensure_member, notify_milestone};
use crate::error::{Result, ServiceError};
use crate::milestone::{MilestoneNotifier, ReplyContext};
use crate::models::{Comment, MilestoneSite, NotificationCategory};
use crate::notification::{NotificationTarget, ResourceRef};
use crate::repository::{
    CommentRepository, HistoryOwner, HistoryRepository, TalkPickRepository,
};

/// 评论服务
pub struct CommentService {
    pool: PgPool,
    comment_repo: CommentRepository,
    talk_pick_repo: TalkPickRepository,
    notifier: Arc<MilestoneNotifier>,
    max_depth: usize,
}

impl CommentService {
    pub fn new(pool: PgPool, notifier: Arc<MilestoneNotifier>, max_depth: usize) -> Self {
        Self {
            comment_repo: CommentRepository::new(pool.clone()),
            talk_pick_repo: TalkPickRepository::new(pool.clone()),
            pool,
            notifier,
            max_depth,
        }
    }

    /// 发表评论
    #[instrument(skip(self, request), fields(talk_pick_id = request.talk_pick_id, member_id = request.member_id))]
    pub async fn create_comment(&self, request: CreateCommentRequest) -> Result<CommentResult> {
        let mut tx = self.pool.begin().await?;

        let talk_pick = TalkPickRepository::get_for_update(&mut tx, request.talk_pick_id)
            .await?
            .ok_or(ServiceError::TalkPickNotFound(request.talk_pick_id))?;
        ensure_member(&mut tx, request.member_id).await?;

        let comment = CommentRepository::create_in_tx(
            &mut tx,
            talk_pick.id,
            request.member_id,
            None,
            &request.content,
        )
        .await?;

        let count = CommentRepository::count_by_talk_pick_in_tx(&mut tx, talk_pick.id).await?;

        let target = NotificationTarget::new(
            talk_pick.member_id,
            ResourceRef::TalkPick(talk_pick.id),
            NotificationCategory::WrittenTalkPick,
        );
        let notified = notify_milestone(
            &mut tx,
            &self.notifier,
            MilestoneSite::TalkPickComment,
            count,
            &target,
            (HistoryOwner::TalkPick, talk_pick.id),
            talk_pick.notification_history.0,
        )
        .await?;

        tx.commit().await?;

        info!(comment_id = comment.id, count, notified, "评论已发表");
        Ok(CommentResult {
            comment_id: comment.id,
            count,
            notified,
        })
    }

    /// 回复评论
    ///
    /// 父评论必须属于该话题帖，且深度小于最大回复深度
    #[instrument(skip(self, request), fields(talk_pick_id = request.talk_pick_id, parent_id = request.parent_id))]
    pub async fn create_reply(&self, request: CreateReplyRequest) -> Result<CommentResult> {
        let mut tx = self.pool.begin().await?;

        let talk_pick = TalkPickRepository::get_in_tx(&mut tx, request.talk_pick_id)
            .await?
            .ok_or(ServiceError::TalkPickNotFound(request.talk_pick_id))?;

        let parent = CommentRepository::get_for_update(&mut tx, request.parent_id)
            .await?
            .ok_or(ServiceError::CommentNotFound(request.parent_id))?;

        if !parent.belongs_to(talk_pick.id) {
            return Err(ServiceError::ParentCommentNotInTalkPick {
                talk_pick_id: talk_pick.id,
                parent_id: parent.id,
            });
        }

        let depth = CommentRepository::depth_in_tx(&mut tx, parent.id).await?;
        if depth >= self.max_depth as i64 {
            return Err(ServiceError::ExceedMaxDepth {
                max_depth: self.max_depth,
            });
        }

        ensure_member(&mut tx, request.member_id).await?;

        let reply = CommentRepository::create_in_tx(
            &mut tx,
            talk_pick.id,
            request.member_id,
            Some(parent.id),
            &request.content,
        )
        .await?;

        let reply_author_ids = CommentRepository::reply_author_ids_in_tx(&mut tx, parent.id).await?;
        let context = ReplyContext {
            reply_count: reply_author_ids.len() as i64,
            parent_author_id: parent.member_id,
            reply_author_ids,
            already_notified_first_reply: parent.is_notified_for_first_reply,
        };

        let target = NotificationTarget::new(
            parent.member_id,
            ResourceRef::TalkPick(talk_pick.id),
            NotificationCategory::for_talk_pick(parent.member_id, talk_pick.member_id),
        );
        let history = parent.notification_history.0.clone();
        let outcome = self
            .notifier
            .notify_reply(&context, &target, history.clone())
            .await?;

        if outcome.first_reply_sent {
            CommentRepository::mark_first_reply_notified_in_tx(&mut tx, parent.id).await?;
        }
        let notified = outcome.history != history;
        if notified {
            HistoryRepository::save_in_tx(&mut tx, HistoryOwner::Comment, parent.id, &outcome.history)
                .await?;
        }

        tx.commit().await?;

        info!(reply_id = reply.id, reply_count = context.reply_count, notified, "回复已发表");
        Ok(CommentResult {
            comment_id: reply.id,
            count: context.reply_count,
            notified,
        })
    }

    /// 修改评论
    #[instrument(skip(self, content))]
    pub async fn update_comment(
        &self,
        comment_id: i64,
        talk_pick_id: i64,
        member_id: i64,
        content: &str,
    ) -> Result<()> {
        let comment = self
            .authorize(
                comment_id,
                talk_pick_id,
                member_id,
                ServiceError::ForbiddenCommentModify(comment_id),
            )
            .await?;

        self.comment_repo.update_content(comment.id, content).await?;
        info!("评论已修改");
        Ok(())
    }

    /// 删除评论
    #[instrument(skip(self))]
    pub async fn delete_comment(
        &self,
        comment_id: i64,
        talk_pick_id: i64,
        member_id: i64,
    ) -> Result<()> {
        let comment = self
            .authorize(
                comment_id,
                talk_pick_id,
                member_id,
                ServiceError::ForbiddenCommentDelete(comment_id),
            )
            .await?;

        self.comment_repo.delete(comment.id).await?;
        info!("评论已删除");
        Ok(())
    }

    /// 最佳评论优先的评论列表
    ///
    /// 同时持久化每条顶层评论的最佳标记
    #[instrument(skip(self))]
    pub async fn find_best_comments(
        &self,
        talk_pick_id: i64,
        page: PageRequest,
    ) -> Result<Page<BestCommentDto>> {
        self.talk_pick_repo
            .find_by_id(talk_pick_id)
            .await?
            .ok_or(ServiceError::TalkPickNotFound(talk_pick_id))?;

        let comments = self.comment_repo.list_top_level_with_likes(talk_pick_id).await?;
        let ranked = best_comment::rank(comments);

        let best_ids: Vec<i64> = ranked.iter().filter(|c| c.is_best).map(|c| c.id).collect();
        self.comment_repo
            .update_best_flags(talk_pick_id, &best_ids)
            .await?;

        Ok(best_comment::paginate(&ranked, page))
    }

    /// 校验评论存在、作者本人、且属于该话题帖
    async fn authorize(
        &self,
        comment_id: i64,
        talk_pick_id: i64,
        member_id: i64,
        forbidden: ServiceError,
    ) -> Result<Comment> {
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .ok_or(ServiceError::CommentNotFound(comment_id))?;

        self.talk_pick_repo
            .find_by_id(talk_pick_id)
            .await?
            .ok_or(ServiceError::TalkPickNotFound(talk_pick_id))?;

        if !comment.is_written_by(member_id) {
            return Err(forbidden);
        }

        if !comment.belongs_to(talk_pick_id) {
            return Err(ServiceError::CommentNotInTalkPick {
                talk_pick_id,
                comment_id,
            });
        }

        Ok(comment)
    }
}
