//! Pre-built tables and registry documents.

use crate::table::Table;
use crate::value::Value;

/// Columns `[A, B, C]` with one row `{A: 1, B: 2, C: 3}`.
///
/// # Example
///
/// ```
/// use importprep::testing::abc_table;
///
/// assert_eq!(abc_table().row_count(), 1);
/// ```
#[must_use]
pub fn abc_table() -> Table {
    Table::from_rows(
        ["A", "B", "C"],
        vec![vec![1i64.into(), 2i64.into(), 3i64.into()]],
    )
    .expect("fixture is well-formed")
}

/// A small product listing as exported from a back-office spreadsheet.
#[must_use]
pub fn sample_listing() -> Table {
    Table::from_rows(
        ["content.id", "content.title", "content.price", "content.status", "memo"],
        vec![
            vec![
                Value::text("A-001"),
                Value::text("しらす丼"),
                1200i64.into(),
                Value::text("下書き"),
                Value::Null,
            ],
            vec![
                Value::text("A-002"),
                Value::text("海鮮丼"),
                1800i64.into(),
                Value::text("下書き"),
                Value::text("季節限定"),
            ],
            vec![
                Value::text("A-003"),
                Value::text("釜揚げうどん"),
                650.5.into(),
                Value::text("確認中"),
                Value::text("要確認"),
            ],
        ],
    )
    .expect("fixture is well-formed")
}

/// A registry document covering [`sample_listing`], with one unknown type tag
/// and one line lacking an item name.
#[must_use]
pub fn sample_registry() -> &'static str {
    "\
# データ項目一覧

|項目|項目名|型|説明|
|--|--|--|--|
| 1 | content.id | string | 管理ID |
| 2 | content.title | string | 商品名 |
| 3 | content.price | number | 価格 |
| 4 | content.status | string | 公開状態 |
| 5 | content.tags | array | タグ |
| 6 | content.published | boolean | 公開フラグ |
| 7 | content.extra | integer | 未対応の型 |
| 8 |  | object | 名前なし |
"
}

/// [`sample_listing`] as UTF-8 CSV text.
#[must_use]
pub fn sample_listing_csv() -> &'static str {
    "\
content.id,content.title,content.price,content.status,memo
A-001,しらす丼,1200,下書き,
A-002,海鮮丼,1800,下書き,季節限定
A-003,釜揚げうどん,650.5,確認中,要確認
"
}
