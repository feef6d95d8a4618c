//! 领域模型
//!
//! 父资源实体、通知历史以及相关枚举

pub mod community;
pub mod enums;
pub mod history;

// 重新导出常用类型
pub use community::{
    Comment, CommentWithLikes, GameBookmark, GameSet, Like, TalkPick, TalkPickBookmark,
};
pub use enums::{EventPrefix, FIRST_REPLY_KEY, LikeType, MilestoneSite, NotificationCategory};
pub use history::NotificationHistory;
