//! Keyword and token lists used by column scoring.
//!
//! Header keywords are matched against the lowercased header. Value tokens
//! are matched case-insensitively against sampled values, except personal
//! name tokens which are matched as-is.

/// Header keywords suggesting a name column.
pub const NAME_HEADER_KEYWORDS: &[&str] = &[
    "名前",
    "氏名",
    "name",
    "full name",
    "社員名",
    "employee name",
    "名",
];

/// Header keywords suggesting a position column.
pub const POSITION_HEADER_KEYWORDS: &[&str] =
    &["役職", "職位", "position", "title", "job title", "職務"];

/// Header keywords suggesting a department column.
pub const DEPARTMENT_HEADER_KEYWORDS: &[&str] = &[
    "部署",
    "部門",
    "所属",
    "department",
    "dept",
    "division",
    "課",
];

/// Job title tokens found in position values.
pub const POSITION_VALUE_TOKENS: &[&str] =
    &["部長", "課長", "主任", "係長", "manager", "director", "staff"];

/// Organisational unit tokens found in department values.
pub const DEPARTMENT_VALUE_TOKENS: &[&str] = &[
    "部",
    "課",
    "department",
    "division",
    "営業",
    "技術",
    "経理",
    "人事",
];

/// Common Japanese family and given names.
pub const NAME_VALUE_TOKENS: &[&str] = &["田中", "佐藤", "鈴木", "山田", "太郎", "花子", "一郎"];

/// Katakana range used as the first half of the script heuristic.
pub const KATAKANA: std::ops::RangeInclusive<char> = 'ア'..='ヴ';

/// CJK ideograph range used as the second half of the script heuristic.
pub const KANJI: std::ops::RangeInclusive<char> = '一'..='鿿';
