//! 请求字段校验
//!
//! 长度按字符计数（而不是字节），中文标题与英文标题同样对待。

use chrono::{DateTime, Utc};

pub const TITLE_MIN: usize = 2;
pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 2000;
pub const INSTRUCTION_MAX: usize = 5000;
pub const MAX_SCORE_MIN: i32 = 1;
pub const MAX_SCORE_MAX: i32 = 1000;
pub const CONTENT_MAX: usize = 10000;
pub const FEEDBACK_MAX: usize = 2000;

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn validate_title(title: &str) -> Result<(), &'static str> {
    let len = char_len(title.trim());
    if !(TITLE_MIN..=TITLE_MAX).contains(&len) {
        return Err("标题长度必须在 2 到 200 个字符之间");
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), &'static str> {
    let len = char_len(description.trim());
    if !(DESCRIPTION_MIN..=DESCRIPTION_MAX).contains(&len) {
        return Err("描述长度必须在 10 到 2000 个字符之间");
    }
    Ok(())
}

pub fn validate_instruction(instruction: &str) -> Result<(), &'static str> {
    if char_len(instruction) > INSTRUCTION_MAX {
        return Err("作业说明不能超过 5000 个字符");
    }
    Ok(())
}

pub fn validate_max_score(max_score: i32) -> Result<(), &'static str> {
    if !(MAX_SCORE_MIN..=MAX_SCORE_MAX).contains(&max_score) {
        return Err("满分必须在 1 到 1000 之间");
    }
    Ok(())
}

pub fn validate_deadline(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), &'static str> {
    if deadline <= now {
        return Err("截止时间必须晚于当前时间");
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), &'static str> {
    if char_len(content) > CONTENT_MAX {
        return Err("提交内容不能超过 10000 个字符");
    }
    Ok(())
}

pub fn validate_feedback(feedback: &str) -> Result<(), &'static str> {
    if char_len(feedback) > FEEDBACK_MAX {
        return Err("评语不能超过 2000 个字符");
    }
    Ok(())
}

/// 0 <= score <= max_score
pub fn validate_score(score: i32, max_score: i32) -> Result<(), &'static str> {
    if score < 0 {
        return Err("分数不能为负数");
    }
    if score > max_score {
        return Err("分数不能超过作业满分");
    }
    Ok(())
}
