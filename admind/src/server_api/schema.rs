//! 入力スキーマ検証
//!
//! エンドポイント入力の宣言的なフィールドルール。検証失敗は
//! フィールド名をキーにしたエラーツリー（`details`）になり、
//! クライアント側でフォーム項目へマッピングされる想定。
//!
//! スキーマを持つエンドポイントは常に検証される（空入力 `{}` も含む）。
//! スキーマなしのエンドポイントは入力を素通しする。

use crate::common::error::ValidationErrors;
use serde_json::Value;
use uuid::Uuid;

/// 文字列フィールドの形式制約
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// メールアドレス
    Email,
    /// UUID
    Uuid,
}

/// フィールド種別と制約
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// 文字列（長さ・形式・列挙制約つき）
    String {
        /// 最小長
        min_len: Option<usize>,
        /// 最大長
        max_len: Option<usize>,
        /// 形式制約
        format: Option<StringFormat>,
        /// 許可する値の列挙
        one_of: Option<&'static [&'static str]>,
    },
    /// 数値
    Number {
        /// 正の数のみ許可
        positive: bool,
        /// 整数のみ許可
        integer: bool,
    },
    /// 真偽値
    Bool,
    /// `[{id, value}]` 形式のカラムフィルター配列
    FilterArray {
        /// 許可するカラムID
        valid_ids: &'static [&'static str],
    },
    /// `[{id, desc}]` 形式のソート指定配列
    SortArray {
        /// 許可するカラムID
        valid_ids: &'static [&'static str],
    },
}

impl FieldKind {
    /// 制約なしの文字列
    pub fn string() -> Self {
        FieldKind::String {
            min_len: None,
            max_len: None,
            format: None,
            one_of: None,
        }
    }

    /// 長さ制約つきの文字列
    pub fn string_len(min_len: usize, max_len: Option<usize>) -> Self {
        FieldKind::String {
            min_len: Some(min_len),
            max_len,
            format: None,
            one_of: None,
        }
    }

    /// メールアドレス
    pub fn email() -> Self {
        FieldKind::String {
            min_len: None,
            max_len: None,
            format: Some(StringFormat::Email),
            one_of: None,
        }
    }

    /// UUID文字列
    pub fn uuid() -> Self {
        FieldKind::String {
            min_len: None,
            max_len: None,
            format: Some(StringFormat::Uuid),
            one_of: None,
        }
    }

    /// 列挙値
    pub fn enum_of(values: &'static [&'static str]) -> Self {
        FieldKind::String {
            min_len: None,
            max_len: None,
            format: None,
            one_of: Some(values),
        }
    }

    /// 正の整数
    pub fn positive_int() -> Self {
        FieldKind::Number {
            positive: true,
            integer: true,
        }
    }

    /// 真偽値
    pub fn boolean() -> Self {
        FieldKind::Bool
    }

    /// カラムフィルター配列
    pub fn filter_array(valid_ids: &'static [&'static str]) -> Self {
        FieldKind::FilterArray { valid_ids }
    }

    /// ソート指定配列
    pub fn sort_array(valid_ids: &'static [&'static str]) -> Self {
        FieldKind::SortArray { valid_ids }
    }
}

#[derive(Debug, Clone)]
struct FieldRule {
    name: &'static str,
    required: bool,
    kind: FieldKind,
}

/// 等値制約（password / passwordConfirmation 用）
#[derive(Debug, Clone)]
struct EqualsRule {
    left: &'static str,
    right: &'static str,
    /// エラーを帰属させるフィールド
    report_on: &'static str,
    message: &'static str,
}

/// 入力スキーマ
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    fields: Vec<FieldRule>,
    equals: Vec<EqualsRule>,
}

impl InputSchema {
    /// 空のスキーマを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 必須フィールドを追加
    pub fn required(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldRule {
            name,
            required: true,
            kind,
        });
        self
    }

    /// 任意フィールドを追加
    pub fn optional(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldRule {
            name,
            required: false,
            kind,
        });
        self
    }

    /// 2フィールドの値が一致することを要求（エラーは`report_on`へ帰属）
    pub fn equals(
        mut self,
        left: &'static str,
        right: &'static str,
        report_on: &'static str,
        message: &'static str,
    ) -> Self {
        self.equals.push(EqualsRule {
            left,
            right,
            report_on,
            message,
        });
        self
    }

    /// 入力値を検証する
    ///
    /// 未知のフィールドは無視する。入力はオブジェクトでなければならない。
    pub fn validate(&self, input: &Value) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let Some(object) = input.as_object() else {
            errors.push("_root", format!("Expected object, received {}", json_type_name(input)));
            return Err(errors);
        };

        for rule in &self.fields {
            match object.get(rule.name) {
                None | Some(Value::Null) => {
                    if rule.required {
                        errors.push(rule.name, "Required");
                    }
                }
                Some(value) => validate_field(rule, value, &mut errors),
            }
        }

        for rule in &self.equals {
            let left = object.get(rule.left);
            let right = object.get(rule.right);
            if left != right {
                errors.push(rule.report_on, rule.message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_field(rule: &FieldRule, value: &Value, errors: &mut ValidationErrors) {
    match &rule.kind {
        FieldKind::String {
            min_len,
            max_len,
            format,
            one_of,
        } => {
            let Some(s) = value.as_str() else {
                errors.push(
                    rule.name,
                    format!("Expected string, received {}", json_type_name(value)),
                );
                return;
            };
            if let Some(min) = min_len {
                if s.chars().count() < *min {
                    errors.push(
                        rule.name,
                        format!("String must contain at least {} character(s)", min),
                    );
                }
            }
            if let Some(max) = max_len {
                if s.chars().count() > *max {
                    errors.push(
                        rule.name,
                        format!("String must contain at most {} character(s)", max),
                    );
                }
            }
            match format {
                Some(StringFormat::Email) if !looks_like_email(s) => {
                    errors.push(rule.name, "Invalid email");
                }
                Some(StringFormat::Uuid) if Uuid::parse_str(s).is_err() => {
                    errors.push(rule.name, "Invalid uuid");
                }
                _ => {}
            }
            if let Some(allowed) = one_of {
                if !allowed.contains(&s) {
                    let expected = allowed
                        .iter()
                        .map(|v| format!("'{}'", v))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    errors.push(
                        rule.name,
                        format!("Invalid enum value. Expected {}", expected),
                    );
                }
            }
        }
        FieldKind::Number { positive, integer } => {
            let Some(n) = value.as_f64() else {
                errors.push(
                    rule.name,
                    format!("Expected number, received {}", json_type_name(value)),
                );
                return;
            };
            // 小数はここで弾く。検証を通った整数は型付き層でも必ず受理される。
            if *integer && value.as_i64().is_none() && value.as_u64().is_none() {
                errors.push(rule.name, "Expected integer, received float");
                return;
            }
            if *positive && n <= 0.0 {
                errors.push(rule.name, "Number must be greater than 0");
            }
        }
        FieldKind::Bool => {
            if !value.is_boolean() {
                errors.push(
                    rule.name,
                    format!("Expected boolean, received {}", json_type_name(value)),
                );
            }
        }
        FieldKind::FilterArray { valid_ids } => {
            validate_entry_array(rule.name, value, valid_ids, "value", EntryValue::String, errors)
        }
        FieldKind::SortArray { valid_ids } => {
            validate_entry_array(rule.name, value, valid_ids, "desc", EntryValue::Bool, errors)
        }
    }
}

#[derive(Clone, Copy)]
enum EntryValue {
    String,
    Bool,
}

/// `[{id, <payload>}]` 形式の配列を検証する共通処理
fn validate_entry_array(
    field: &str,
    value: &Value,
    valid_ids: &[&str],
    payload_key: &str,
    payload_kind: EntryValue,
    errors: &mut ValidationErrors,
) {
    let Some(entries) = value.as_array() else {
        errors.push(
            field,
            format!("Expected array, received {}", json_type_name(value)),
        );
        return;
    };

    for (index, entry) in entries.iter().enumerate() {
        let Some(object) = entry.as_object() else {
            errors.push(field, format!("Element {} must be an object", index));
            continue;
        };
        match object.get("id").and_then(Value::as_str) {
            Some(id) if valid_ids.contains(&id) => {}
            Some(id) => {
                let expected = valid_ids
                    .iter()
                    .map(|v| format!("'{}'", v))
                    .collect::<Vec<_>>()
                    .join(" | ");
                errors.push(
                    field,
                    format!("Invalid enum value '{}'. Expected {}", id, expected),
                );
            }
            None => errors.push(field, format!("Element {} is missing a string 'id'", index)),
        }
        let payload_ok = match payload_kind {
            EntryValue::String => object.get(payload_key).map(Value::is_string),
            EntryValue::Bool => object.get(payload_key).map(Value::is_boolean),
        };
        if payload_ok != Some(true) {
            let expected = match payload_kind {
                EntryValue::String => "string",
                EntryValue::Bool => "boolean",
            };
            errors.push(
                field,
                format!("Element {} must have a {} '{}'", index, expected, payload_key),
            );
        }
    }
}

fn looks_like_email(s: &str) -> bool {
    // 緩いチェック。完全なRFC準拠は狙わない。
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.contains(char::is_whitespace)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
