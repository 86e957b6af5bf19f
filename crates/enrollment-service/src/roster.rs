//! CSV 花名册解析
//!
//! 批量选课输入的纯函数解析：首行视为表头丢弃，
//! 邮箱、名、姓三字段全部非空的行才被接受，
//! 畸形行静默丢弃——这是明确的非错误策略，不计入失败。
//! 函数全定义且确定，任何输入都不会报错，最坏结果是零行。

use crate::service::dto::StudentRecord;

/// 解析原始花名册文本
///
/// 列顺序：email, firstName, lastName[, departmentId]。
/// 花名册上传的行默认开启"发送邀请"标记。
pub fn parse_roster(raw: &str) -> Vec<StudentRecord> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed.lines().skip(1).filter_map(parse_row).collect()
}

fn parse_row(line: &str) -> Option<StudentRecord> {
    let mut fields = line.split(',').map(str::trim);

    let email = fields.next().unwrap_or_default();
    let first_name = fields.next().unwrap_or_default();
    let last_name = fields.next().unwrap_or_default();

    if email.is_empty() || first_name.is_empty() || last_name.is_empty() {
        return None;
    }

    let department_id = fields
        .next()
        .filter(|field| !field.is_empty())
        .map(str::to_string);

    Some(StudentRecord {
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        department_id,
        send_invitation: true,
    })
}
