use serde::Deserialize;
use ts_rs::TS;

/// 通过选课码加入班级
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "lms/class.ts")]
pub struct JoinClassRequest {
    pub enrollment_code: String,
}
