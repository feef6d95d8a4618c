//! 最佳评论排序
//!
//! 点赞数不少于 10，或等于当前最高点赞数的顶层评论为最佳评论。
//! 最佳评论按创建时间倒序排在前面，其余评论同样按创建时间倒序跟在后面。

use super::dto::{BestCommentDto, Page, PageRequest};
use crate::models::CommentWithLikes;

/// 成为最佳评论的最少点赞数
pub const MIN_LIKES_FOR_BEST: i64 = 10;

/// 排序并标记最佳评论
///
/// 没有评论时最高点赞数视为 0。
pub fn rank(comments: Vec<CommentWithLikes>) -> Vec<BestCommentDto> {
    let max_likes = comments.iter().map(|c| c.like_count).max().unwrap_or(0);

    let (mut best, mut others): (Vec<BestCommentDto>, Vec<BestCommentDto>) = comments
        .into_iter()
        .map(|c| BestCommentDto {
            id: c.id,
            member_id: c.member_id,
            content: c.content,
            like_count: c.like_count,
            is_best: c.like_count >= MIN_LIKES_FOR_BEST || c.like_count == max_likes,
            created_at: c.created_at,
        })
        .partition(|c| c.is_best);

    best.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    others.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    best.extend(others);
    best
}

/// 截取一页
pub fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let start = page.offset.min(items.len());
    let end = start.saturating_add(page.size).min(items.len());

    Page {
        items: items[start..end].to_vec(),
        total: items.len(),
        offset: page.offset,
        size: page.size,
    }
}
