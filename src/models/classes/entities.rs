use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/class.ts")]
pub struct Class {
    // 班级ID
    pub id: i64,
    // 班级名称
    pub name: String,
    // 科目
    pub subject: Option<String>,
    // 选课码（唯一）
    pub enrollment_code: String,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Class {
    pub fn brief(&self) -> ClassBrief {
        ClassBrief {
            id: self.id,
            name: self.name.clone(),
            subject: self.subject.clone(),
        }
    }
}

// 嵌入其他响应中的班级摘要（不含选课码）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/class.ts")]
pub struct ClassBrief {
    pub id: i64,
    pub name: String,
    pub subject: Option<String>,
}
